//! Technolife product-page extractor.
//!
//! The storefront inlines its state as `window.__INITIAL_STATE__`; the
//! active seller's price sits under a `price_ecommerce` key. Markup
//! selectors are a fallback only — class names rotate with each deploy.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::{parse_price, PriceRules};
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div#product_buy_box span.text-primary-500",
    "div#product_buy_box span[class*=\"price\"]",
];

const UNAVAILABLE_MARKERS: &[&str] = &["این کالا در حال حاضر قابل خرید نیست"];

pub(super) struct Technolife {
    fetch: Arc<FetchClient>,
}

impl Technolife {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Technolife {
    fn site(&self) -> SiteId {
        SiteId::Technolife
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

/// Pulls the active-seller price out of the inlined state blob.
///
/// Matches `"price_ecommerce":12345000` and the quoted variant
/// `"price_ecommerce":"12345000"`.
fn initial_state_price(html: &str) -> Option<u64> {
    if !html.contains("__INITIAL_STATE__") {
        return None;
    }
    let re = Regex::new(r#""price_ecommerce"\s*:\s*"?(\d+)"#).expect("valid regex");
    let cap = re.captures(html)?;
    parse_price(&cap[1], &PRICE_RULES)
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = initial_state_price(html) {
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
