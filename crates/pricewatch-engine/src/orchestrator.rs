//! Crawl orchestration: runs the site extractors over a refresh batch
//! under nested concurrency limiters.
//!
//! Products move through an outer limiter and each product's URLs through
//! an inner one, capping total in-flight extractions at
//! `product_concurrency × url_concurrency`. One entry's failure never
//! aborts its siblings; every failure degrades into that entry's recorded
//! state and a line in the run summary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use pricewatch_core::{AppConfig, CrawlResult, ProductAggregate, TrackedProduct};
use pricewatch_scraper::Dispatcher;

use crate::aggregate::aggregate;
use crate::lock::CategoryLocks;
use crate::store::{CatalogStore, ProductFilter};
use crate::EngineError;

/// The single crawl seam the orchestrator depends on. Production uses
/// [`Dispatcher`]; tests substitute a scripted implementation.
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Crawls one URL, folding every failure (including dispatch failures
    /// such as an unknown site hint) into the returned [`CrawlResult`].
    async fn crawl_url(&self, url: &str, site_hint: Option<&str>) -> CrawlResult;
}

#[async_trait]
impl Crawler for Dispatcher {
    async fn crawl_url(&self, url: &str, site_hint: Option<&str>) -> CrawlResult {
        match self.resolve(url, site_hint) {
            Ok(extractor) => extractor.crawl(url).await,
            Err(err) => CrawlResult::fail(err.to_string()),
        }
    }
}

/// Tuning for one refresh run.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    /// Outer limiter: products processed concurrently.
    pub product_concurrency: usize,
    /// Inner limiter: URLs crawled concurrently within one product.
    pub url_concurrency: usize,
    /// Products updated more recently than this are skipped.
    pub min_refresh_interval: Duration,
    /// Injected clock for deterministic tests; `None` uses `Utc::now()`.
    pub now: Option<DateTime<Utc>>,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            product_concurrency: 2,
            url_concurrency: 5,
            min_refresh_interval: Duration::minutes(10),
            now: None,
        }
    }
}

impl RefreshOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            product_concurrency: config.product_concurrency,
            url_concurrency: config.url_concurrency,
            min_refresh_interval: Duration::minutes(config.min_refresh_interval_mins),
            now: None,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

/// Result of one refresh run, handed back to the triggering caller.
#[derive(Debug)]
pub struct RefreshSummary {
    /// Products selected by the filter, including skipped ones.
    pub total: usize,
    pub refreshed: usize,
    pub skipped: usize,
    /// One line per degraded unit: failed URL crawls and persist errors.
    pub errors: Vec<String>,
    pub products: Vec<RefreshedProduct>,
}

/// Per-product outcome of a refresh run.
#[derive(Debug)]
pub struct RefreshedProduct {
    pub id: Uuid,
    pub name: String,
    pub aggregate: ProductAggregate,
}

struct ProductOutcome {
    product: RefreshedProduct,
    errors: Vec<String>,
}

/// Drives refresh runs: selection, skip policy, bounded fan-out, merge,
/// aggregation, and persistence.
pub struct Orchestrator {
    crawler: Arc<dyn Crawler>,
    store: Arc<dyn CatalogStore>,
    locks: CategoryLocks,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        crawler: Arc<dyn Crawler>,
        store: Arc<dyn CatalogStore>,
        locks: CategoryLocks,
    ) -> Self {
        Self {
            crawler,
            store,
            locks,
        }
    }

    /// Runs one refresh over the products selected by `filter`.
    ///
    /// When the filter names a category, the category lock is held for the
    /// duration of the run; a concurrent request for the same category is
    /// rejected with [`EngineError::CategoryBusy`] instead of queueing.
    ///
    /// # Errors
    ///
    /// - [`EngineError::CategoryBusy`] — the category is already refreshing.
    /// - [`EngineError::Store`] — the initial product load failed. Failures
    ///   after that point degrade into the summary's error list instead.
    pub async fn refresh(
        &self,
        filter: &ProductFilter,
        options: &RefreshOptions,
    ) -> Result<RefreshSummary, EngineError> {
        let _category_guard = match &filter.category {
            Some(category) => Some(
                self.locks
                    .try_acquire(category)
                    .ok_or_else(|| EngineError::CategoryBusy(category.clone()))?,
            ),
            None => None,
        };

        let products = self.store.load_products(filter).await?;
        let total = products.len();
        let now = options.now();

        let mut skipped = 0usize;
        let mut to_refresh = Vec::new();
        for product in products {
            match skip_reason(&product, now, options.min_refresh_interval) {
                Some(reason) => {
                    tracing::debug!(product = %product.name, reason, "skipping product");
                    skipped += 1;
                }
                None => to_refresh.push(product),
            }
        }

        let outcomes: Vec<ProductOutcome> = stream::iter(to_refresh)
            .map(|product| self.refresh_product(product, options))
            .buffer_unordered(options.product_concurrency.max(1))
            .collect()
            .await;

        let mut errors = Vec::new();
        let mut refreshed = Vec::new();
        for outcome in outcomes {
            errors.extend(outcome.errors);
            refreshed.push(outcome.product);
        }

        tracing::info!(
            total,
            refreshed = refreshed.len(),
            skipped,
            errors = errors.len(),
            "refresh run complete"
        );

        Ok(RefreshSummary {
            total,
            refreshed: refreshed.len(),
            skipped,
            errors,
            products: refreshed,
        })
    }

    /// Crawls every URL of one product, merges the results, and persists
    /// the updated entries plus the recomputed aggregate.
    async fn refresh_product(
        &self,
        mut product: TrackedProduct,
        options: &RefreshOptions,
    ) -> ProductOutcome {
        let targets: Vec<(usize, String, Option<String>)> = product
            .urls
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, entry.url.clone(), entry.site.clone()))
            .collect();

        // collect() yields in completion order, which is exactly the order
        // history points must be appended in.
        let results: Vec<(usize, CrawlResult)> = stream::iter(targets)
            .map(|(idx, url, site)| {
                let crawler = Arc::clone(&self.crawler);
                async move { (idx, crawler.crawl_url(&url, site.as_deref()).await) }
            })
            .buffer_unordered(options.url_concurrency.max(1))
            .collect()
            .await;

        let mut errors = Vec::new();
        for (idx, result) in results {
            let Some(entry) = product.urls.get_mut(idx) else {
                continue;
            };
            match (result.success, result.price) {
                (true, Some(price)) => entry.record_success(price, options.now()),
                _ => {
                    let message = result
                        .error
                        .unwrap_or_else(|| "crawl failed".to_string());
                    errors.push(format!("{} ({}): {message}", product.name, entry.url));
                    entry.record_failure(message);
                }
            }
        }

        let agg = aggregate(&product.urls);
        if let Err(err) = self
            .store
            .persist_product(product.id, &product.urls, &agg)
            .await
        {
            tracing::error!(product = %product.name, error = %err, "failed to persist refreshed product");
            errors.push(format!("{}: {err}", product.name));
        }

        ProductOutcome {
            product: RefreshedProduct {
                id: product.id,
                name: product.name,
                aggregate: agg,
            },
            errors,
        }
    }
}

/// Why a product sits out this run, if it does.
fn skip_reason(
    product: &TrackedProduct,
    now: DateTime<Utc>,
    min_interval: Duration,
) -> Option<&'static str> {
    if product.disabled {
        return Some("disabled");
    }
    if product.urls.is_empty() {
        return Some("no tracked URLs");
    }
    if now.signed_duration_since(product.updated_at) < min_interval {
        return Some("refreshed recently");
    }
    None
}
