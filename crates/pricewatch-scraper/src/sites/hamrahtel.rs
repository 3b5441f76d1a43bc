//! Hamrahtel product-page extractor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div[data-role=\"buy-section\"] strong.price",
    "div[data-role=\"buy-section\"] span[class*=\"amount\"]",
];

// Open-graph price meta survives theme changes better than the markup.
const ATTR_SCOPES: &[(&str, &str)] = &[
    ("meta[property=\"product:price:amount\"]", "content"),
];

const UNAVAILABLE_MARKERS: &[&str] = &["موجودی این کالا به اتمام رسیده"];

pub(super) struct Hamrahtel {
    fetch: Arc<FetchClient>,
}

impl Hamrahtel {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Hamrahtel {
    fn site(&self) -> SiteId {
        SiteId::Hamrahtel
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = extract::select_attr_price(html, ATTR_SCOPES, &PRICE_RULES) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn og_price_meta_is_the_primary_signal() {
        let html = r#"
            <meta property="product:price:amount" content="18490000">
            <div data-role="buy-section"><strong class="price">۱۸,۹۰۰,۰۰۰</strong></div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 18_490_000);
    }

    #[test]
    fn buy_section_selector_is_the_fallback() {
        let html =
            r#"<div data-role="buy-section"><strong class="price">۱۸,۹۰۰,۰۰۰ تومان</strong></div>"#;
        assert_eq!(price_from_html(html).unwrap(), 18_900_000);
    }

    #[test]
    fn stock_depleted_phrase_is_unavailable() {
        let html = "<p>موجودی این کالا به اتمام رسیده است</p>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
