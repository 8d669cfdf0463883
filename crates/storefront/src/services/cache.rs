//! Read-through cache of rendered view data, keyed by view path.
//!
//! Server actions invalidate the paths their writes affect; the next read
//! of those views goes back to the store. Entries also expire after five
//! minutes.
//!
//! A read that started before an invalidation never repopulates the cache:
//! every invalidation bumps a generation counter, and a loaded value is only
//! kept if the generation it was read under is still current.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use marche_core::{ProductId, Uid};

use crate::db::{MarketStore, RepositoryError};
use crate::models::Product;

/// Path of the catalog view.
pub const CATALOG_PATH: &str = "/products";

/// Path of the seller's product list.
pub const SELLER_PRODUCTS_PATH: &str = "/vendeur/mes-produits";

#[derive(Debug, Clone)]
enum ViewData {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}

/// Cache of store reads backing the catalog views.
#[derive(Clone)]
pub struct ViewCache {
    entries: Cache<String, ViewData>,
    generation: Arc<AtomicU64>,
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewCache {
    #[must_use]
    pub fn new() -> Self {
        let entries = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .support_invalidation_closures()
            .build();
        Self {
            entries,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Cache `data` unless an invalidation ran since `seen` was read.
    async fn put(&self, key: String, data: ViewData, seen: u64) {
        if self.generation() != seen {
            debug!(%key, "View changed during load, not caching");
            return;
        }
        self.entries.insert(key.clone(), data).await;
        // An invalidation may have cleared the cache between the check and
        // the insert.
        if self.generation() != seen {
            self.entries.invalidate(&key).await;
        }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns the store error on a cache miss that fails to load.
    pub async fn catalog(
        &self,
        store: &dyn MarketStore,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let key = CATALOG_PATH.to_string();
        if let Some(ViewData::Products(products)) = self.entries.get(&key).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let seen = self.generation();
        let products = Arc::new(store.list_products().await?);
        self.put(key, ViewData::Products(Arc::clone(&products)), seen)
            .await;
        Ok(products)
    }

    /// A single product; misses are not cached.
    ///
    /// # Errors
    ///
    /// Returns the store error on a cache miss that fails to load.
    pub async fn product(
        &self,
        store: &dyn MarketStore,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let key = product_path(id);
        if let Some(ViewData::Product(product)) = self.entries.get(&key).await {
            debug!(%id, "Cache hit for product");
            return Ok(Some(*product));
        }

        let seen = self.generation();
        let product = store.product(id).await?;
        if let Some(product) = &product {
            self.put(key, ViewData::Product(Box::new(product.clone())), seen)
                .await;
        }
        Ok(product)
    }

    /// Products owned by `seller_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns the store error on a cache miss that fails to load.
    pub async fn seller_products(
        &self,
        store: &dyn MarketStore,
        seller_id: Uid,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let key = format!("{SELLER_PRODUCTS_PATH}?seller={seller_id}");
        if let Some(ViewData::Products(products)) = self.entries.get(&key).await {
            return Ok(products);
        }

        let seen = self.generation();
        let products = Arc::new(store.products_by_seller(seller_id).await?);
        self.put(key, ViewData::Products(Arc::clone(&products)), seen)
            .await;
        Ok(products)
    }

    /// Drop every entry rendered under one of `paths`, including per-user
    /// variants (`path?...`).
    pub fn invalidate<S: AsRef<str>>(&self, paths: &[S]) {
        let paths: Vec<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();
        debug!(?paths, "Invalidating views");
        self.generation.fetch_add(1, Ordering::SeqCst);
        let result = self.entries.invalidate_entries_if(move |key, _| {
            paths.iter().any(|path| {
                key == path
                    || key
                        .strip_prefix(path.as_str())
                        .is_some_and(|rest| rest.starts_with('?'))
            })
        });
        if let Err(e) = result {
            warn!(error = %e, "Cache invalidation failed, clearing all views");
            self.entries.invalidate_all();
        }
    }
}

/// View path of a product detail page.
#[must_use]
pub fn product_path(id: ProductId) -> String {
    format!("{CATALOG_PATH}/{id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::{Price, ProductCategory};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ProductFields;

    fn product(seller: Uid, name: &str) -> Product {
        Product::new(
            seller,
            ProductFields {
                name: name.to_string(),
                description: "Tomates fraîches du jardin".to_string(),
                price: Price::parse("3").unwrap(),
                category: ProductCategory::Vegetables,
                image_url: String::new(),
                image_hint: String::new(),
            },
        )
    }

    #[tokio::test]
    async fn test_catalog_is_cached_until_invalidated() {
        let store = MemoryStore::new();
        let cache = ViewCache::new();
        let seller = Uid::generate();

        store.insert_product(&product(seller, "Tomates")).await.unwrap();
        assert_eq!(cache.catalog(&store).await.unwrap().len(), 1);

        store.insert_product(&product(seller, "Oignons")).await.unwrap();
        assert_eq!(cache.catalog(&store).await.unwrap().len(), 1);

        cache.invalidate(&["/", CATALOG_PATH]);
        assert_eq!(cache.catalog(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seller_views_invalidated_by_base_path() {
        let store = MemoryStore::new();
        let cache = ViewCache::new();
        let seller = Uid::generate();

        assert!(cache.seller_products(&store, seller).await.unwrap().is_empty());
        store.insert_product(&product(seller, "Tomates")).await.unwrap();
        assert!(cache.seller_products(&store, seller).await.unwrap().is_empty());

        cache.invalidate(&[SELLER_PRODUCTS_PATH]);
        assert_eq!(cache.seller_products(&store, seller).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_overlapping_a_write_is_not_cached() {
        let store = MemoryStore::new();
        let cache = ViewCache::new();
        let seller = Uid::generate();

        // A read loads the empty catalog, then a write invalidates before
        // the read stores its result.
        let seen = cache.generation();
        let stale = Arc::new(store.list_products().await.unwrap());
        store.insert_product(&product(seller, "Tomates")).await.unwrap();
        cache.invalidate(&[CATALOG_PATH]);
        cache
            .put(CATALOG_PATH.to_string(), ViewData::Products(stale), seen)
            .await;

        assert!(cache.entries.get(CATALOG_PATH).await.is_none());
        assert_eq!(cache.catalog(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_after_write_is_cached() {
        let store = MemoryStore::new();
        let cache = ViewCache::new();
        cache.invalidate(&[CATALOG_PATH]);

        cache.catalog(&store).await.unwrap();
        assert!(cache.entries.get(CATALOG_PATH).await.is_some());
    }

    #[tokio::test]
    async fn test_missing_product_not_cached() {
        let store = MemoryStore::new();
        let cache = ViewCache::new();
        let tomatoes = product(Uid::generate(), "Tomates");

        assert!(cache.product(&store, tomatoes.id).await.unwrap().is_none());
        store.insert_product(&tomatoes).await.unwrap();
        assert!(cache.product(&store, tomatoes.id).await.unwrap().is_some());
    }
}
