//! Timcheh product-page extractor.
//!
//! JSON-LD is present on server-rendered pages; the DOM fallback uses
//! attribute-contains selectors because Timcheh ships hashed CSS-module
//! class names (`styles_price__xK2f9`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div[class*=\"styles_buyBox\"] span[class*=\"styles_price\"]",
    "div[class*=\"buyBox\"] span[class*=\"price\"]",
];

const UNAVAILABLE_MARKERS: &[&str] = &["این کالا فعلا موجود نیست"];

pub(super) struct Timcheh {
    fetch: Arc<FetchClient>,
}

impl Timcheh {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Timcheh {
    fn site(&self) -> SiteId {
        SiteId::Timcheh
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
    fn hashed_class_selector_matches_by_substring() {
        let html = r#"
            <div class="styles_buyBox__a8Xq1">
                <span class="styles_price__xK2f9">۸۹۵,۰۰۰ تومان</span>
            </div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 895_000);
    }

    #[test]
    fn jsonld_takes_priority() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "Product", "offers": {"price": 870000}}
            </script>
            <div class="styles_buyBox__a8Xq1"><span class="styles_price__xK2f9">۸۹۵,۰۰۰</span></div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 870_000);
    }

    #[test]
    fn out_of_stock_phrase_is_unavailable() {
        let html = "<span>این کالا فعلا موجود نیست</span>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
