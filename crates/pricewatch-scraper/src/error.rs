use thiserror::Error;

/// Failures produced while extracting a price from a product page.
///
/// The `Display` output of each variant is exactly the diagnostic string
/// recorded on a failed [`pricewatch_core::CrawlResult`]; extractors never
/// propagate these past their own boundary.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Non-2xx response from a static fetch.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    /// The page loaded but explicitly marks the product as out of stock.
    /// Distinguished from [`PriceNotFound`](Self::PriceNotFound) so callers
    /// can keep showing the last known price.
    #[error("Product not available")]
    Unavailable,

    /// Every extraction strategy came up empty and the page carries no
    /// unavailability marker.
    #[error("Price not found")]
    PriceNotFound,

    /// Network-level failure; message passed through from the HTTP client.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Headless browser launch, navigation, or evaluation failure.
    #[error("{0}")]
    Browser(String),

    /// A site hint named an identity with no registered extractor.
    #[error("no extractor registered for site \"{0}\"")]
    UnknownSite(String),
}
