use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of points kept in [`ProductUrlEntry::price_history`].
/// Appending beyond the cap evicts the oldest point first.
pub const PRICE_HISTORY_CAP: usize = 10;

/// Rollup state of the most recent crawl of a URL (or of a product, when
/// aggregated across its URLs).
///
/// Transitions: `Pending → Success` or `Pending → Failed` on the first
/// crawl, then `Success ↔ Failed` as later crawls succeed or fail. An
/// entry never returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlStatus::Pending => write!(f, "pending"),
            CrawlStatus::Success => write!(f, "success"),
            CrawlStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a single extraction attempt against one product URL.
///
/// Invariant: `success == true` exactly when `price` is `Some`; a failed
/// result always carries a non-empty `error`. Construct through
/// [`CrawlResult::ok`] / [`CrawlResult::fail`] to preserve this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub success: bool,
    /// Extracted price in the site's canonical integer unit (toman or
    /// rial depending on the site), `None` on failure.
    pub price: Option<u64>,
    /// Diagnostic message on failure: `"HTTP <status>"`,
    /// `"Product not available"`, `"Price not found"`, or the underlying
    /// fetch/navigation error.
    pub error: Option<String>,
}

impl CrawlResult {
    /// A successful extraction carrying the canonical price.
    #[must_use]
    pub fn ok(price: u64) -> Self {
        Self {
            success: true,
            price: Some(price),
            error: None,
        }
    }

    /// A failed extraction carrying a diagnostic message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            price: None,
            error: Some(error.into()),
        }
    }
}

/// One observed price at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: u64,
    pub crawled_at: DateTime<Utc>,
}

/// A single tracked URL of a product, together with its crawl state and
/// bounded price history.
///
/// Mutated only by the orchestrator after each crawl, via
/// [`record_success`](Self::record_success) /
/// [`record_failure`](Self::record_failure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUrlEntry {
    pub url: String,
    /// Explicit site identity hint (kebab-case site name). When absent the
    /// dispatcher derives the site from the URL hostname.
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub current_price: Option<u64>,
    #[serde(default)]
    pub last_crawled_at: Option<DateTime<Utc>>,
    pub crawl_status: CrawlStatus,
    #[serde(default)]
    pub crawl_error: Option<String>,
    /// Most recent observations, oldest first, capped at
    /// [`PRICE_HISTORY_CAP`].
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
}

impl ProductUrlEntry {
    /// A fresh, never-crawled entry for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            site: None,
            current_price: None,
            last_crawled_at: None,
            crawl_status: CrawlStatus::Pending,
            crawl_error: None,
            price_history: Vec::new(),
        }
    }

    /// Same as [`new`](Self::new) with an explicit site hint.
    #[must_use]
    pub fn with_site(url: impl Into<String>, site: impl Into<String>) -> Self {
        let mut entry = Self::new(url);
        entry.site = Some(site.into());
        entry
    }

    /// Merge a successful crawl: appends a history point (evicting the
    /// oldest beyond [`PRICE_HISTORY_CAP`]), updates the current price and
    /// timestamp, and clears any previous error.
    pub fn record_success(&mut self, price: u64, at: DateTime<Utc>) {
        self.price_history.push(PricePoint {
            price,
            crawled_at: at,
        });
        if self.price_history.len() > PRICE_HISTORY_CAP {
            let excess = self.price_history.len() - PRICE_HISTORY_CAP;
            self.price_history.drain(..excess);
        }
        self.current_price = Some(price);
        self.last_crawled_at = Some(at);
        self.crawl_status = CrawlStatus::Success;
        self.crawl_error = None;
    }

    /// Merge a failed crawl: the last known price, timestamp, and history
    /// are preserved so the UI can keep showing the most recent successful
    /// observation alongside the failure diagnostic.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.crawl_status = CrawlStatus::Failed;
        self.crawl_error = Some(error.into());
    }
}

/// A product as read from the catalog store: identity, refresh gating
/// fields, and its tracked URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedProduct {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Disabled products are skipped by every refresh run.
    #[serde(default)]
    pub disabled: bool,
    pub updated_at: DateTime<Utc>,
    pub urls: Vec<ProductUrlEntry>,
}

/// Product-level rollup derived from a product's URL entries. Recomputed
/// in full whenever any entry changes; never independently mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAggregate {
    /// Minimum `current_price` across entries, `None` when no entry has a
    /// price.
    pub lowest_price: Option<u64>,
    /// Maximum `last_crawled_at` across entries, `None` when no entry has
    /// ever been crawled.
    pub last_crawled_at: Option<DateTime<Utc>>,
    /// `Success` if any entry succeeded, else `Failed` if any failed, else
    /// `Pending`.
    pub crawl_status: CrawlStatus,
}
