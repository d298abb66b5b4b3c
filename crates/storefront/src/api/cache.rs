//! Cache types for catalog responses.

use super::types::Product;

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Cache key for a single product.
pub fn product_key(id: impl std::fmt::Display) -> String {
    format!("product:{id}")
}

/// Cache key for a product listing, optionally filtered by category.
pub fn products_key(category: Option<&str>) -> String {
    format!("products:{}", category.unwrap_or(""))
}
