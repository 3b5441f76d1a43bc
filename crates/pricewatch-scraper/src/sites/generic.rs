//! Fallback extractor for hostnames with no dedicated implementation.
//!
//! Runs the signals most storefront engines share: schema.org JSON-LD,
//! microdata/open-graph price metas, the usual price class names, then
//! the free-text scan. The floor is the most conservative of any site —
//! with no site-specific scoping, small numbers are far more likely to be
//! ratings or counts than real prices.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(50_000);

const ATTR_SCOPES: &[(&str, &str)] = &[
    ("meta[property=\"product:price:amount\"]", "content"),
    ("meta[itemprop=\"price\"]", "content"),
    ("[itemprop=\"price\"]", "content"),
];

const PRICE_SCOPES: &[&str] = &[
    "[itemprop=\"price\"]",
    "span.product-price",
    "div.product-price",
    "span.price ins",
    "span.price",
];

const UNAVAILABLE_MARKERS: &[&str] = &[];

pub(super) struct Generic {
    fetch: Arc<FetchClient>,
}

impl Generic {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Generic {
    fn site(&self) -> SiteId {
        SiteId::Generic
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = extract::jsonld_price(html, &PRICE_RULES) {
        tracing::debug!(price, "generic: price from JSON-LD");
        return Ok(price);
    }
    if let Some(price) = extract::select_attr_price(html, ATTR_SCOPES, &PRICE_RULES) {
        tracing::debug!(price, "generic: price from meta/microdata");
        return Ok(price);
    }
    if let Some(price) = extract::select_price(html, PRICE_SCOPES, &PRICE_RULES) {
        tracing::debug!(price, "generic: price from common selectors");
        return Ok(price);
    }
    let text = extract::page_text(html);
    if let Some(price) = extract::scan_text_prices(&text, &PRICE_RULES).first().copied() {
        tracing::debug!(price, "generic: price from text scan");
        return Ok(price);
    }
    if extract::is_unavailable(&text, UNAVAILABLE_MARKERS) {
        return Err(ScrapeError::Unavailable);
    }
    Err(ScrapeError::PriceNotFound)
}
