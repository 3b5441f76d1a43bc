//! Product-level rollup over a product's URL entries.

use pricewatch_core::{CrawlStatus, ProductAggregate, ProductUrlEntry};

/// Recomputes the product aggregate in full from the current entry set.
///
/// Pure and idempotent: the same entries always produce the same
/// aggregate. Called after every entry merge; the aggregate is never
/// patched incrementally.
#[must_use]
pub fn aggregate(entries: &[ProductUrlEntry]) -> ProductAggregate {
    let lowest_price = entries.iter().filter_map(|e| e.current_price).min();
    let last_crawled_at = entries.iter().filter_map(|e| e.last_crawled_at).max();

    let crawl_status = if entries
        .iter()
        .any(|e| e.crawl_status == CrawlStatus::Success)
    {
        CrawlStatus::Success
    } else if entries.iter().any(|e| e.crawl_status == CrawlStatus::Failed) {
        CrawlStatus::Failed
    } else {
        CrawlStatus::Pending
    };

    ProductAggregate {
        lowest_price,
        last_crawled_at,
        crawl_status,
    }
}
