//! SnappMarket product-page extractor (rendered).
//!
//! The buy box nests the amount inside several absolutely-positioned
//! wrappers that confuse text flattening, so the primary strategy runs a
//! small script in-page and reads the node's `textContent` directly; the
//! serialized DOM only backs up the script result.

use std::sync::Arc;

use async_trait::async_trait;

use crate::browser::PagePool;
use crate::error::ScrapeError;
use crate::numerals::{parse_price, PriceRules};
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCRIPT: &str = r#"
(() => {
    const el = document.querySelector('section[data-testid="buy-box"] [data-testid="price"]')
        || document.querySelector('section.product-detail span.price-value');
    return el ? el.textContent : null;
})()
"#;

const PRICE_SCOPES: &[&str] = &[
    "section[data-testid=\"buy-box\"] [data-testid=\"price\"]",
    "section.product-detail span.price-value",
];

const UNAVAILABLE_MARKERS: &[&str] = &["موجودی تمام شد"];

pub(super) struct SnappMarket {
    pool: Arc<PagePool>,
}

impl SnappMarket {
    pub(super) fn new(pool: Arc<PagePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteExtractor for SnappMarket {
    fn site(&self) -> SiteId {
        SiteId::SnappMarket
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let rendered = self.pool.render(url, Some(PRICE_SCRIPT)).await?;

        if let Some(price) = rendered
            .evaluated
            .as_deref()
            .and_then(|text| parse_price(text, &PRICE_RULES))
        {
            return Ok(price);
        }

        price_from_html(&rendered.html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
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
    fn dom_fallback_reads_buy_box() {
        let html = r#"
            <section data-testid="buy-box"><span data-testid="price">۸۷,۵۰۰ تومان</span></section>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 87_500);
    }

    #[test]
    fn evaluated_text_parses_through_shared_rules() {
        assert_eq!(
            parse_price("  ۸۷,۵۰۰ تومان ", &PRICE_RULES),
            Some(87_500)
        );
    }

    #[test]
    fn stockout_phrase_is_unavailable() {
        let html = "<div>موجودی تمام شد</div>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
