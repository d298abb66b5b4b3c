//! Catalog commands.

use products_plus_core::ProductId;
use products_plus_storefront::api::Category;
use products_plus_storefront::error::Result;
use products_plus_storefront::state::AppState;

use crate::output;

pub async fn list(state: &AppState, category: Option<Category>) -> Result<()> {
    let products = state.catalog().list_products(category).await?;
    output::products(&products, state.config().currency);
    Ok(())
}

pub async fn search(state: &AppState, query: &str, category: Option<Category>) -> Result<()> {
    let products = state.catalog_search().search(query, category).await?;
    if products.is_empty() {
        output::notice(&format!("No products match \"{query}\"."));
    } else {
        output::products(&products, state.config().currency);
    }
    Ok(())
}

pub async fn show(state: &AppState, id: ProductId) -> Result<()> {
    let product = state.catalog().get_product(id).await?;
    output::product(&product, state.config().currency);
    Ok(())
}
