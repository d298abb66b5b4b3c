//! Application state shared by front ends.

use std::sync::Arc;

use crate::api::{ApiClient, CatalogClient};
use crate::config::StorefrontConfig;
use crate::services::auth::AuthService;
use crate::services::cart::{CartSessionManager, SharedCartSession};
use crate::services::catalog::CatalogService;
use crate::services::checkout::CheckoutService;
use crate::services::profile::ProfileService;
use crate::storage::{FileStore, StorageError};

/// Cart session manager wired to the real backend and the file store.
pub type StorefrontCart = CartSessionManager<ApiClient, Arc<FileStore>>;

/// Application state.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configured clients and the local store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    catalog: CatalogClient,
    store: Arc<FileStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store cannot be opened.
    pub fn new(config: StorefrontConfig) -> Result<Self, StorageError> {
        let api = ApiClient::new(config.api_url.clone());
        let catalog = CatalogClient::new(config.catalog_url.clone(), config.catalog_cache_ttl);
        let store = Arc::new(FileStore::open(&config.data_dir)?);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                catalog,
                store,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Client for the cart/auth/payments backend.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    #[must_use]
    pub fn store(&self) -> &Arc<FileStore> {
        &self.inner.store
    }

    /// Cart session manager for the session persisted in the local store.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store cannot be read.
    pub fn cart_session(&self) -> Result<StorefrontCart, StorageError> {
        CartSessionManager::restore(self.inner.api.clone(), Arc::clone(&self.inner.store))
    }

    /// Like [`cart_session`](Self::cart_session), for use from several tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store cannot be read.
    pub fn shared_cart_session(
        &self,
    ) -> Result<SharedCartSession<ApiClient, Arc<FileStore>>, StorageError> {
        self.cart_session().map(SharedCartSession::new)
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_, ApiClient> {
        AuthService::new(&self.inner.api)
    }

    #[must_use]
    pub fn catalog_search(&self) -> CatalogService<'_> {
        CatalogService::new(&self.inner.catalog)
    }

    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_, ApiClient> {
        CheckoutService::new(&self.inner.api, self.inner.config.currency)
    }

    #[must_use]
    pub fn profile(&self) -> ProfileService<'_, ApiClient> {
        ProfileService::new(&self.inner.api)
    }
}
