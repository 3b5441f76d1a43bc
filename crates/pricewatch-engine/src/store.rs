//! The narrow contract to the external catalog store.
//!
//! The engine reads products and writes back updated URL entries plus the
//! recomputed aggregate; everything else about persistence (schema,
//! users, settings) belongs to the external collaborator behind this
//! trait. [`MemoryCatalog`] backs tests and the CLI's snapshot flow.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use pricewatch_core::{ProductAggregate, ProductUrlEntry, TrackedProduct};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found in catalog")]
    ProductNotFound(Uuid),

    #[error("catalog io error: {0}")]
    Io(String),
}

/// Selection criteria for a refresh run, matching the trigger surface:
/// a whole category, a brand, a single product, or everything (optionally
/// capped).
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub product_id: Option<Uuid>,
    pub limit: Option<usize>,
}

/// Read/write contract against the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Loads the products selected by `filter`, including disabled ones
    /// (the orchestrator counts those as skipped rather than hiding them).
    async fn load_products(&self, filter: &ProductFilter)
        -> Result<Vec<TrackedProduct>, StoreError>;

    /// Persists a product's updated URL entries and recomputed aggregate.
    async fn persist_product(
        &self,
        id: Uuid,
        urls: &[ProductUrlEntry],
        aggregate: &ProductAggregate,
    ) -> Result<(), StoreError>;
}

/// In-memory catalog used by tests and the CLI snapshot flow.
pub struct MemoryCatalog {
    products: Mutex<Vec<TrackedProduct>>,
    aggregates: Mutex<HashMap<Uuid, ProductAggregate>>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new(products: Vec<TrackedProduct>) -> Self {
        Self {
            products: Mutex::new(products),
            aggregates: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of every product, for writing a snapshot back out.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TrackedProduct> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The last aggregate persisted for a product, if any.
    #[must_use]
    pub fn aggregate_for(&self, id: Uuid) -> Option<ProductAggregate> {
        self.aggregates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn load_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<TrackedProduct>, StoreError> {
        let products = self.products.lock().unwrap_or_else(PoisonError::into_inner);

        let mut selected: Vec<TrackedProduct> = products
            .iter()
            .filter(|p| match filter.product_id {
                Some(id) => p.id == id,
                None => true,
            })
            .filter(|p| match &filter.category {
                Some(category) => p.category.as_deref() == Some(category.as_str()),
                None => true,
            })
            .filter(|p| match &filter.brand {
                Some(brand) => p.brand.as_deref() == Some(brand.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            selected.truncate(limit);
        }

        if filter.product_id.is_some() && selected.is_empty() {
            return Err(StoreError::ProductNotFound(
                filter.product_id.unwrap_or_default(),
            ));
        }

        Ok(selected)
    }

    async fn persist_product(
        &self,
        id: Uuid,
        urls: &[ProductUrlEntry],
        aggregate: &ProductAggregate,
    ) -> Result<(), StoreError> {
        let mut products = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Err(StoreError::ProductNotFound(id));
        };
        product.urls = urls.to_vec();
        drop(products);

        self.aggregates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, aggregate.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pricewatch_core::CrawlStatus;

    fn product(name: &str, category: &str, brand: &str) -> TrackedProduct {
        TrackedProduct {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: Some(category.to_string()),
            brand: Some(brand.to_string()),
            disabled: false,
            updated_at: Utc::now(),
            urls: vec![ProductUrlEntry::new("https://example.com/p/1")],
        }
    }

    #[tokio::test]
    async fn load_filters_by_category() {
        let store = MemoryCatalog::new(vec![
            product("Galaxy S24", "phones", "samsung"),
            product("MacBook Air", "laptops", "apple"),
        ]);
        let found = store
            .load_products(&ProductFilter {
                category: Some("phones".to_string()),
                ..ProductFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Galaxy S24");
    }

    #[tokio::test]
    async fn load_filters_by_brand_and_limit() {
        let store = MemoryCatalog::new(vec![
            product("Galaxy S24", "phones", "samsung"),
            product("Galaxy Tab", "tablets", "samsung"),
            product("iPhone 15", "phones", "apple"),
        ]);
        let found = store
            .load_products(&ProductFilter {
                brand: Some("samsung".to_string()),
                limit: Some(1),
                ..ProductFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn load_by_unknown_product_id_is_an_error() {
        let store = MemoryCatalog::new(vec![product("Galaxy S24", "phones", "samsung")]);
        let missing = Uuid::new_v4();
        let err = store
            .load_products(&ProductFilter {
                product_id: Some(missing),
                ..ProductFilter::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn persist_updates_urls_and_aggregate() {
        let p = product("Galaxy S24", "phones", "samsung");
        let id = p.id;
        let store = MemoryCatalog::new(vec![p]);

        let mut urls = vec![ProductUrlEntry::new("https://example.com/p/1")];
        urls[0].record_success(12_000_000, Utc::now());
        let aggregate = crate::aggregate(&urls);

        store.persist_product(id, &urls, &aggregate).await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].urls[0].current_price, Some(12_000_000));
        let stored = store.aggregate_for(id).unwrap();
        assert_eq!(stored.lowest_price, Some(12_000_000));
        assert_eq!(stored.crawl_status, CrawlStatus::Success);
    }

    #[tokio::test]
    async fn persist_unknown_product_is_an_error() {
        let store = MemoryCatalog::new(vec![]);
        let err = store
            .persist_product(
                Uuid::new_v4(),
                &[],
                &ProductAggregate {
                    lowest_price: None,
                    last_crawled_at: None,
                    crawl_status: CrawlStatus::Pending,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(_)));
    }
}
