//! Read-only product catalog client.
//!
//! Caches products and listings using `moka` (TTL from configuration).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use products_plus_core::ProductId;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheValue, product_key, products_key};
use super::types::{Category, Product};
use super::{ApiClient, ApiError};

/// Maximum number of cached catalog entries.
const CACHE_CAPACITY: u64 = 1000;

/// Client for the product catalog service.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.api.base_url().as_str())
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish()
    }
}

impl CatalogClient {
    /// Create a new catalog client rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                api: ApiClient::new(base_url),
                cache,
            }),
        }
    }

    /// List products, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Product>, ApiError> {
        let category_name = category.map(Category::as_str);
        let cache_key = products_key(category_name);

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let api = &self.inner.api;
        let mut url = api.endpoint("products")?;
        if let Some(name) = category_name {
            url.query_pairs_mut().append_pair("category", name);
        }
        let products: Vec<Product> = api.send_json(api.http().get(url)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = product_key(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let api = &self.inner.api;
        let request = api.http().get(api.endpoint(&format!("products/{id}"))?);
        let body = api.send(request).await?;

        // The public catalog answers unknown IDs with 200 and an empty body
        if body.trim().is_empty() || body.trim() == "null" {
            return Err(ApiError::NotFound(format!("Product not found: {id}")));
        }
        let product: Product = serde_json::from_str(&body)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.cache.invalidate(&product_key(id)).await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
