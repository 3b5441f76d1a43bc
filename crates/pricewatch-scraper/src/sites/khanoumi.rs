//! Khanoumi product-page extractor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

// Cosmetics listings repeat prices in "frequently bought together" rails;
// only the add-to-cart section is trusted.
const PRICE_SCOPES: &[&str] = &[
    "div.add-to-cart-section span.final-price",
    "div.add-to-cart-section del + span",
];

const UNAVAILABLE_MARKERS: &[&str] = &["این محصول به پایان رسیده"];

pub(super) struct Khanoumi {
    fetch: Arc<FetchClient>,
}

impl Khanoumi {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Khanoumi {
    fn site(&self) -> SiteId {
        SiteId::Khanoumi
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = extract::jsonld_price(html, &PRICE_RULES) {
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
