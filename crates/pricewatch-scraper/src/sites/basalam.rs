//! Basalam product-page extractor.
//!
//! Marketplace of small vendors on Next.js; the state blob nests the
//! vendor's `price` under the product payload. Marketplace pages also
//! carry many other vendors' prices in "similar products", which is why
//! the DOM fallback stays inside the vendor card.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const STATE_KEYS: &[&str] = &["price", "primaryPrice"];

const PRICE_SCOPES: &[&str] = &[
    "div[data-testid=\"vendor-card\"] span[data-testid=\"product-price\"]",
    "div[data-testid=\"vendor-card\"] span[class*=\"price\"]",
];

const UNAVAILABLE_MARKERS: &[&str] = &["غرفه‌دار فعلا این محصول را نمی‌فروشد"];

pub(super) struct Basalam {
    fetch: Arc<FetchClient>,
}

impl Basalam {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Basalam {
    fn site(&self) -> SiteId {
        SiteId::Basalam
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = extract::next_data_price(html, STATE_KEYS, &PRICE_RULES) {
        return Ok(price);
    }
    if let Some(price) = extract::select_price(html, PRICE_SCOPES, &PRICE_RULES) {
        return Ok(price);
    }
    let text = extract::page_text(html);
    if let Some(price) = extract::scan_text_prices(&text, &PRICE_RULES).first().copied() {
        return Ok(price);
    }
    if extract::is_unavailable(&text, UNAVAILABLE_MARKERS) {
        return Err(ScrapeError::Unavailable);
    }
    Err(ScrapeError::PriceNotFound)
}
