//! Product cache.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use apotheca::{
    catalog::Catalog,
    products::{ProductId, ProductSnapshot},
};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    api::{ProductDraft, ProductQuery, StorefrontApi},
    domain::catalog::CatalogError,
    storage::{KeyValueStore, keys, load_document, save_document},
};

/// Products requested per listing page during a refresh.
pub const PAGE_SIZE: u32 = 100;

/// Upper bound on listing pages fetched by one refresh, whatever the backend reports.
pub const MAX_PAGES: u32 = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedCatalog {
    products: Catalog,

    #[serde(default)]
    refreshed_at: Option<Timestamp>,
}

/// Persisted catalog, either with its refresh time or as the bare product array older builds
/// wrote.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Stamped(CachedCatalog),
    Bare(Catalog),
}

impl From<CatalogDocument> for CachedCatalog {
    fn from(document: CatalogDocument) -> Self {
        match document {
            CatalogDocument::Stamped(cached) => cached,
            CatalogDocument::Bare(products) => Self {
                products,
                refreshed_at: None,
            },
        }
    }
}

/// Local mirror of the backend's active products.
///
/// The mirror is replaced wholesale by [`ProductCache::refresh`] and never expires on its own.
pub struct ProductCache {
    api: Arc<dyn StorefrontApi>,
    store: Arc<dyn KeyValueStore>,
    state: RwLock<Arc<CachedCatalog>>,
}

impl fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.current();

        f.debug_struct("ProductCache")
            .field("products", &state.products.len())
            .field("refreshed_at", &state.refreshed_at)
            .finish_non_exhaustive()
    }
}

impl ProductCache {
    /// Create a cache primed from the persisted catalog, if one is readable.
    #[must_use]
    pub fn load(api: Arc<dyn StorefrontApi>, store: Arc<dyn KeyValueStore>) -> Self {
        let cached = match load_document::<CatalogDocument>(store.as_ref(), keys::PRODUCTS) {
            Ok(document) => document.map(CachedCatalog::from).unwrap_or_default(),
            Err(error) => {
                warn!(%error, "ignoring unreadable product cache");
                CachedCatalog::default()
            }
        };

        debug!(products = cached.products.len(), "product cache loaded");

        Self {
            api,
            store,
            state: RwLock::new(Arc::new(cached)),
        }
    }

    /// Fetch every page of active products and replace the cache with them.
    ///
    /// The cache is only swapped once all pages have arrived; on any failure the previous
    /// contents are kept. Returns the number of products now cached.
    ///
    /// # Errors
    ///
    /// Returns an error if a page cannot be fetched. A failure to persist the new catalog is
    /// logged and does not fail the refresh.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, CatalogError> {
        let mut products: Vec<ProductSnapshot> = Vec::new();
        let mut query = ProductQuery::page(1, PAGE_SIZE);
        let mut pages = None;

        loop {
            let page = self.api.list_products(&query).await?;
            let total_pages = *pages.get_or_insert(page.pages.min(MAX_PAGES));

            debug!(page = query.page, pages = total_pages, "received product page");

            let empty = page.products.is_empty();
            products.extend(page.products.into_iter().filter(|product| product.active));

            if empty || query.page >= total_pages {
                break;
            }

            query.page += 1;
        }

        let refreshed = Arc::new(CachedCatalog {
            products: Catalog::new(products),
            refreshed_at: Some(Timestamp::now()),
        });
        let count = refreshed.products.len();

        if let Err(error) = save_document(self.store.as_ref(), keys::PRODUCTS, refreshed.as_ref())
        {
            warn!(%error, "failed to persist product cache");
        }

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = refreshed;

        info!(products = count, "product cache refreshed");

        Ok(count)
    }

    /// Look up a cached product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product is not cached.
    pub fn find(&self, id: &str) -> Result<ProductSnapshot, CatalogError> {
        self.current()
            .products
            .find(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(ProductId::new(id)))
    }

    /// Cached products matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&ProductSnapshot) -> bool) -> Vec<ProductSnapshot> {
        self.current()
            .products
            .products()
            .iter()
            .filter(|product| predicate(product))
            .cloned()
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<ProductSnapshot> {
        self.current()
            .products
            .by_category(category)
            .cloned()
            .collect()
    }

    pub fn search(&self, text: &str) -> Vec<ProductSnapshot> {
        self.current()
            .products
            .search(text)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn promotions(&self) -> Vec<ProductSnapshot> {
        self.current().products.promotions().cloned().collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.current()
            .products
            .categories()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Run `f` against the current catalog without copying it.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&self.current().products)
    }

    /// When the cache was last filled from the backend.
    pub fn last_refreshed(&self) -> Option<Timestamp> {
        self.current().refreshed_at
    }

    /// Admin: create a product, then refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the product or the refresh fails.
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<ProductSnapshot, CatalogError> {
        let created = self.api.create_product(draft).await?;

        info!(product = %created.id, "product created");
        self.refresh().await?;

        Ok(created)
    }

    /// Admin: update a product, then refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the refresh fails.
    pub async fn update_product(
        &self,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<ProductSnapshot, CatalogError> {
        let updated = self.api.update_product(id, draft).await?;

        info!(product = %updated.id, "product updated");
        self.refresh().await?;

        Ok(updated)
    }

    /// Admin: delete a product, then refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the refresh fails.
    pub async fn delete_product(&self, id: &str) -> Result<(), CatalogError> {
        self.api.delete_product(id).await?;

        info!(product = id, "product deleted");
        self.refresh().await?;

        Ok(())
    }

    fn current(&self) -> Arc<CachedCatalog> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        api::{ApiError, MockStorefrontApi, ProductPage},
        storage::MemoryStore,
        test::fixtures::{page, snapshot},
    };

    use super::*;

    fn cache(api: MockStorefrontApi, store: Arc<dyn KeyValueStore>) -> ProductCache {
        ProductCache::load(Arc::new(api), store)
    }

    #[tokio::test]
    async fn refresh_collects_every_page() -> TestResult {
        let mut api = MockStorefrontApi::new();

        api.expect_list_products()
            .times(2)
            .returning(|query| match query.page {
                1 => Ok(page(1, 2, vec![snapshot("P1", 1000, 5)])),
                _ => Ok(page(2, 2, vec![snapshot("P2", 2000, 0)])),
            });

        let products = cache(api, Arc::new(MemoryStore::new()));

        assert_eq!(products.refresh().await?, 2);
        assert_eq!(products.find("P2")?.stock, 0);
        assert!(products.last_refreshed().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn failed_page_leaves_cache_untouched() -> TestResult {
        let mut api = MockStorefrontApi::new();
        let mut calls = 0;

        api.expect_list_products().returning(move |_| {
            calls += 1;

            match calls {
                1 => Ok(page(1, 1, vec![snapshot("P1", 1000, 5)])),
                2 => Ok(page(1, 2, vec![snapshot("P9", 1000, 5)])),
                _ => Err(ApiError::Timeout),
            }
        });

        let products = cache(api, Arc::new(MemoryStore::new()));
        products.refresh().await?;

        let result = products.refresh().await;

        assert!(matches!(result, Err(CatalogError::Api(ApiError::Timeout))));
        assert!(products.find("P1").is_ok());
        assert!(matches!(products.find("P9"), Err(CatalogError::NotFound(_))));

        Ok(())
    }

    #[tokio::test]
    async fn refreshed_catalog_survives_reload() -> TestResult {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut api = MockStorefrontApi::new();

        api.expect_list_products()
            .once()
            .returning(|_| Ok(page(1, 1, vec![snapshot("P1", 1000, 5)])));

        cache(api, Arc::clone(&store)).refresh().await?;

        let reloaded = cache(MockStorefrontApi::new(), store);

        assert_eq!(reloaded.find("P1")?.price, 1000);
        assert!(reloaded.last_refreshed().is_some());

        Ok(())
    }

    #[test]
    fn bare_product_array_loads_without_timestamp() -> TestResult {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        save_document(
            store.as_ref(),
            keys::PRODUCTS,
            &vec![snapshot("P1", 1000, 5)],
        )?;

        let products = cache(MockStorefrontApi::new(), store);

        assert!(products.find("P1").is_ok());
        assert_eq!(products.last_refreshed(), None);

        Ok(())
    }

    #[test]
    fn corrupt_cache_starts_empty() -> TestResult {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(keys::PRODUCTS, "{{{")?;

        let products = cache(MockStorefrontApi::new(), store);

        assert!(products.with_catalog(Catalog::is_empty));

        Ok(())
    }

    #[tokio::test]
    async fn inactive_products_are_not_cached() -> TestResult {
        let mut api = MockStorefrontApi::new();

        api.expect_list_products().once().returning(|_| {
            Ok(ProductPage {
                products: vec![
                    snapshot("P1", 1000, 5),
                    ProductSnapshot {
                        active: false,
                        ..snapshot("P2", 1000, 5)
                    },
                ],
                page: 1,
                pages: 1,
                total: Some(2),
            })
        });

        let products = cache(api, Arc::new(MemoryStore::new()));
        products.refresh().await?;

        assert!(products.find("P2").is_err());
        assert_eq!(products.filter(|product| product.price == 1000).len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn delete_refreshes_the_cache() -> TestResult {
        let mut api = MockStorefrontApi::new();

        api.expect_delete_product().once().returning(|_| Ok(()));
        api.expect_list_products()
            .once()
            .returning(|_| Ok(page(1, 1, vec![snapshot("P2", 1000, 5)])));

        let products = cache(api, Arc::new(MemoryStore::new()));
        products.delete_product("P1").await?;

        assert_eq!(products.categories(), ["Soins"]);

        Ok(())
    }

    #[tokio::test]
    async fn refresh_counts_pages_itself() -> TestResult {
        let mut api = MockStorefrontApi::new();
        let mut served = 0;

        // The backend echoes page 1 whatever was asked for.
        api.expect_list_products().times(2).returning(move |_| {
            served += 1;
            Ok(page(1, 2, vec![snapshot(&format!("P{served}"), 1000, 5)]))
        });

        let products = cache(api, Arc::new(MemoryStore::new()));

        assert_eq!(products.refresh().await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn refresh_stops_on_empty_page() -> TestResult {
        let mut api = MockStorefrontApi::new();

        api.expect_list_products()
            .times(2)
            .returning(|query| match query.page {
                1 => Ok(page(1, 5, vec![snapshot("P1", 1000, 5)])),
                _ => Ok(page(2, 5, vec![])),
            });

        let products = cache(api, Arc::new(MemoryStore::new()));

        assert_eq!(products.refresh().await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn refresh_page_count_is_capped() -> TestResult {
        let mut api = MockStorefrontApi::new();

        api.expect_list_products()
            .times(usize::try_from(MAX_PAGES)?)
            .returning(|query| {
                Ok(page(
                    query.page,
                    u32::MAX,
                    vec![snapshot(&format!("P{}", query.page), 1000, 5)],
                ))
            });

        let products = cache(api, Arc::new(MemoryStore::new()));

        assert_eq!(products.refresh().await?, usize::try_from(MAX_PAGES)?);

        Ok(())
    }

    #[tokio::test]
    async fn create_and_update_refresh_the_cache() -> TestResult {
        let mut api = MockStorefrontApi::new();
        let mut listings = 0;

        api.expect_create_product()
            .once()
            .returning(|_| Ok(snapshot("P2", 1500, 4)));
        api.expect_update_product()
            .once()
            .withf(|id, draft| id == "P2" && draft.stock == 9)
            .returning(|_, _| Ok(snapshot("P2", 1500, 9)));
        api.expect_list_products().times(2).returning(move |_| {
            listings += 1;
            let stock = if listings == 1 { 4 } else { 9 };

            Ok(page(1, 1, vec![snapshot("P2", 1500, stock)]))
        });

        let products = cache(api, Arc::new(MemoryStore::new()));
        let draft = ProductDraft::from_snapshot(&snapshot("P2", 1500, 4), rusty_money::iso::DZD)?;

        products.create_product(&draft).await?;
        assert_eq!(products.find("P2")?.stock, 4);

        products
            .update_product("P2", &ProductDraft { stock: 9, ..draft })
            .await?;
        assert_eq!(products.find("P2")?.stock, 9);

        Ok(())
    }
}
