//! Plaza product-page extractor.
//!
//! Rial-denominated listings; JSON-LD is present but intermittently
//! truncated by their CDN, so the selector path earns its keep.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(10_000);

const PRICE_SCOPES: &[&str] = &[
    "section.product-header span.sale-price",
    "section.product-header span[class*=\"price\"]",
];

const UNAVAILABLE_MARKERS: &[&str] = &["ناموجود در پلازا"];

pub(super) struct Plaza {
    fetch: Arc<FetchClient>,
}

impl Plaza {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Plaza {
    fn site(&self) -> SiteId {
        SiteId::Plaza
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
    fn jsonld_rial_price_is_extracted() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "Product", "offers": {"price": "365000000", "priceCurrency": "IRR"}}
            </script>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 365_000_000);
    }

    #[test]
    fn selector_handles_truncated_jsonld() {
        // A cut-off JSON-LD block must not poison the cascade.
        let html = r#"
            <script type="application/ld+json">{"@type": "Product", "offers": {"pri</script>
            <section class="product-header"><span class="sale-price">۳۶۵,۰۰۰,۰۰۰ ریال</span></section>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 365_000_000);
    }

    #[test]
    fn plaza_specific_unavailable_phrase() {
        let html = "<div>ناموجود در پلازا</div>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
