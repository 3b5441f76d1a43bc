//! Digistyle product-page extractor.
//!
//! Shares Digikala's platform ancestry: reliable JSON-LD, BEM-style
//! selectors in the product summary column.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div.c-product__summary span.c-price__value",
    "div.c-product__summary div.c-price",
];

const UNAVAILABLE_MARKERS: &[&str] = &[];

pub(super) struct Digistyle {
    fetch: Arc<FetchClient>,
}

impl Digistyle {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Digistyle {
    fn site(&self) -> SiteId {
        SiteId::Digistyle
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_price_value_is_extracted() {
        let html = r#"
            <div class="c-product__summary">
                <span class="c-price__value">۳,۲۵۰,۰۰۰</span>
            </div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 3_250_000);
    }

    #[test]
    fn common_unavailable_marker_applies_without_site_phrases() {
        let html = "<div>ناموجود</div>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
