//! Product search on top of the catalog client.

use tracing::instrument;

use crate::api::{ApiError, CatalogClient, Category, Product};

/// Keep products whose title contains `query`, ignoring case.
///
/// A blank query keeps everything.
#[must_use]
pub fn filter_by_title(products: Vec<Product>, query: &str) -> Vec<Product> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return products;
    }
    products
        .into_iter()
        .filter(|p| p.title.to_lowercase().contains(&query))
        .collect()
}

/// Catalog browsing and search.
pub struct CatalogService<'a> {
    client: &'a CatalogClient,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(client: &'a CatalogClient) -> Self {
        Self { client }
    }

    /// Search product titles within an optional category.
    ///
    /// The listing comes from the client's cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        category: Option<Category>,
    ) -> Result<Vec<Product>, ApiError> {
        let products = self.client.list_products(category).await?;
        Ok(filter_by_title(products, query))
    }
}
