//! App Context

use std::{fmt, sync::Arc};

use apotheca::pricing::ShippingPolicy;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::{
    api::{ApiClient, ReqwestTransport, RetryPolicy, StorefrontApi, StorefrontClient, Transport},
    auth::{AuthService, SessionStore},
    config::AppConfig,
    domain::{carts::CartStore, catalog::ProductCache, checkout::CheckoutService},
    storage::{FileStore, KeyValueStore, StorageError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to open data directory")]
    Storage(#[source] StorageError),

    #[error("failed to build HTTP client")]
    Http(#[source] reqwest::Error),

    #[error("unknown currency code {0}")]
    UnknownCurrency(String),
}

/// Store-wide settings shared by the cart and checkout.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    pub currency: &'static Currency,
    pub shipping: ShippingPolicy,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            currency: iso::DZD,
            shipping: ShippingPolicy::default(),
        }
    }
}

/// Every storefront component, wired together.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn KeyValueStore>,
    pub sessions: Arc<SessionStore>,
    pub api: Arc<dyn StorefrontApi>,
    pub auth: Arc<AuthService>,
    pub products: Arc<ProductCache>,
    pub carts: Arc<CartStore>,
    pub checkout: Arc<CheckoutService>,
    pub settings: StoreSettings,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .field("products", &self.products)
            .field("carts", &self.carts)
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from configuration: a file store in the data directory and an
    /// HTTP transport to the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created, the HTTP client cannot be
    /// built, or the currency code is unknown.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let store = FileStore::open(&config.store.data_dir).map_err(AppInitError::Storage)?;

        let transport = ReqwestTransport::new(&config.api.api_url, config.api.timeout())
            .map_err(AppInitError::Http)?;

        let currency = iso::find(&config.store.currency)
            .ok_or_else(|| AppInitError::UnknownCurrency(config.store.currency.clone()))?;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(transport),
            config.api.retry_policy(),
            StoreSettings {
                currency,
                shipping: config.store.shipping_policy(),
            },
        ))
    }

    /// Build application context over an HTTP transport.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        retry: RetryPolicy,
        settings: StoreSettings,
    ) -> Self {
        let sessions = Arc::new(SessionStore::load(Arc::clone(&store)));
        let client = ApiClient::new(transport, Arc::clone(&sessions), retry);
        let api = Arc::new(StorefrontClient::new(client, settings.currency));

        Self::with_api(store, sessions, api, settings)
    }

    /// Build application context over an existing storefront API.
    #[must_use]
    pub fn with_api(
        store: Arc<dyn KeyValueStore>,
        sessions: Arc<SessionStore>,
        api: Arc<dyn StorefrontApi>,
        settings: StoreSettings,
    ) -> Self {
        let products = Arc::new(ProductCache::load(Arc::clone(&api), Arc::clone(&store)));
        let carts = Arc::new(CartStore::load(
            Arc::clone(&store),
            Arc::clone(&products),
            settings.shipping,
        ));
        let checkout = Arc::new(CheckoutService::new(
            Arc::clone(&api),
            Arc::clone(&products),
            Arc::clone(&carts),
            settings.currency,
        ));
        let auth = Arc::new(AuthService::new(Arc::clone(&api), Arc::clone(&sessions)));

        Self {
            store,
            sessions,
            api,
            auth,
            products,
            carts,
            checkout,
            settings,
        }
    }
}
