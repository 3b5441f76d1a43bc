use std::path::PathBuf;

/// Runtime configuration for the crawling engine, loaded from
/// `PRICEWATCH_*` environment variables (see [`crate::config`]).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the JSON catalog snapshot the CLI reads and writes.
    pub catalog_path: PathBuf,
    pub log_level: String,
    /// Total timeout for a static HTTP fetch.
    pub request_timeout_secs: u64,
    /// User agent sent on static fetches. Desktop-browser by default;
    /// several target sites serve reduced markup to non-browser agents.
    pub user_agent: String,
    /// Outer limiter: products refreshed concurrently.
    pub product_concurrency: usize,
    /// Inner limiter: URLs crawled concurrently within one product.
    pub url_concurrency: usize,
    /// Products updated within this window are skipped by a refresh run.
    pub min_refresh_interval_mins: i64,
    /// Headless browser pages kept by the pool (bounds rendered crawls).
    pub browser_pool_size: usize,
    /// Timeout for a single headless page navigation.
    pub navigation_timeout_secs: u64,
    /// Delay after navigation before querying a rendered page's DOM.
    pub render_settle_ms: u64,
    /// Default plausibility floor: parsed numbers below this are rejected
    /// as non-prices. Individual sites may override upward.
    pub price_floor: u64,
}
