//! Shared extraction strategies composed by the per-site extractors.
//!
//! Strategy order is fixed across all sites (structured data, scoped
//! selectors, free-text scan, unavailability markers); each site module
//! supplies its own selector scopes, price rules, and marker phrases.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::numerals::{parse_price, PriceRules};

/// Unavailability phrases common across the target sites. Site modules
/// extend this with their own wording.
pub(super) const COMMON_UNAVAILABLE: &[&str] = &[
    "ناموجود",
    "اتمام موجودی",
    "موجود نیست",
    "توقف تولید",
];

/// Extracts a price from schema.org JSON-LD `Product` payloads.
///
/// Walks every `application/ld+json` block, accepting top-level objects,
/// arrays, and `@graph` containers; `offers` may be a single offer or an
/// array (lowest wins). Price values may be JSON numbers or strings in
/// any supported digit system.
pub(super) fn jsonld_price(html: &str, rules: &PriceRules) -> Option<u64> {
    if !html.contains("application/ld+json") {
        return None;
    }

    let re = Regex::new(r#"(?s)<script[^>]*application/ld\+json[^>]*>(.*?)</script>"#)
        .expect("valid regex");

    for cap in re.captures_iter(html) {
        let Ok(value) = serde_json::from_str::<Value>(cap[1].trim()) else {
            continue;
        };
        if let Some(price) = product_price(&value, rules) {
            return Some(price);
        }
    }
    None
}

fn product_price(value: &Value, rules: &PriceRules) -> Option<u64> {
    match value {
        Value::Array(items) => items.iter().find_map(|v| product_price(v, rules)),
        Value::Object(obj) => {
            if type_matches(obj.get("@type"), "Product") {
                return offers_price(obj.get("offers")?, rules);
            }
            if let Some(graph) = obj.get("@graph") {
                return product_price(graph, rules);
            }
            None
        }
        _ => None,
    }
}

fn type_matches(type_field: Option<&Value>, wanted: &str) -> bool {
    match type_field {
        Some(Value::String(s)) => s == wanted,
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(wanted)),
        _ => false,
    }
}

fn offers_price(offers: &Value, rules: &PriceRules) -> Option<u64> {
    match offers {
        Value::Array(items) => items.iter().filter_map(|o| offers_price(o, rules)).min(),
        Value::Object(obj) => {
            let raw = obj.get("price").or_else(|| obj.get("lowPrice"))?;
            json_price(raw, rules)
        }
        _ => None,
    }
}

/// Parses a price out of a JSON number or string value.
pub(super) fn json_price(value: &Value, rules: &PriceRules) -> Option<u64> {
    match value {
        Value::Number(n) => parse_price(&n.to_string(), rules),
        Value::String(s) => parse_price(s, rules),
        _ => None,
    }
}

/// Extracts a price from a Next.js `__NEXT_DATA__` state blob by searching
/// the JSON tree depth-first for the given keys, in key-priority order at
/// each object.
pub(super) fn next_data_price(html: &str, keys: &[&str], rules: &PriceRules) -> Option<u64> {
    if !html.contains("__NEXT_DATA__") {
        return None;
    }

    let re = Regex::new(r#"(?s)<script[^>]*id="__NEXT_DATA__"[^>]*>(.*?)</script>"#)
        .expect("valid regex");
    let cap = re.captures(html)?;
    let value = serde_json::from_str::<Value>(cap[1].trim()).ok()?;
    deep_key_price(&value, keys, rules)
}

fn deep_key_price(value: &Value, keys: &[&str], rules: &PriceRules) -> Option<u64> {
    match value {
        Value::Object(obj) => {
            for key in keys {
                if let Some(found) = obj.get(*key).and_then(|v| json_price(v, rules)) {
                    return Some(found);
                }
            }
            obj.values().find_map(|v| deep_key_price(v, keys, rules))
        }
        Value::Array(items) => items.iter().find_map(|v| deep_key_price(v, keys, rules)),
        _ => None,
    }
}

/// Queries the first matching selector scope and parses its text content.
///
/// Scopes are tried in priority order and must anchor on the primary
/// product container; unscoped price selectors pick up seller listings and
/// recommendation cards elsewhere on the page.
pub(super) fn select_price(html: &str, scopes: &[&str], rules: &PriceRules) -> Option<u64> {
    let document = Html::parse_document(html);

    for scope in scopes {
        let Ok(selector) = Selector::parse(scope) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect::<Vec<_>>().join(" ");
            if let Some(price) = parse_price(&text, rules) {
                return Some(price);
            }
        }
    }
    None
}

/// Like [`select_price`] but reads an attribute value instead of text
/// content (`meta[itemprop=price]` and friends).
pub(super) fn select_attr_price(
    html: &str,
    scopes: &[(&str, &str)],
    rules: &PriceRules,
) -> Option<u64> {
    let document = Html::parse_document(html);

    for (scope, attr) in scopes {
        let Ok(selector) = Selector::parse(scope) else {
            continue;
        };
        if let Some(raw) = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
        {
            if let Some(price) = parse_price(raw, rules) {
                return Some(price);
            }
        }
    }
    None
}

/// Flattens a document to its visible text, for the free-text scan and
/// the unavailability check.
pub(super) fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Scans flattened page text for currency-suffixed numeric runs.
///
/// Candidates are returned in document order with later duplicates
/// removed; callers take the first (the buy box renders before related
/// listings on every supported site). The plausibility floor does the
/// heavy lifting here: ratings, counts, and model numbers parse as small
/// integers and are dropped.
pub(super) fn scan_text_prices(text: &str, rules: &PriceRules) -> Vec<u64> {
    let re = Regex::new(r"([0-9۰-۹٠-٩][0-9۰-۹٠-٩,،٬.\s]*)\s*(?:تومان|ریال)")
        .expect("valid regex");

    let mut seen = Vec::new();
    for cap in re.captures_iter(text) {
        if let Some(price) = parse_price(&cap[1], rules) {
            if !seen.contains(&price) {
                seen.push(price);
            }
        }
    }
    seen
}

/// Whether the flattened page text carries any of the site's
/// out-of-stock phrases.
pub(super) fn is_unavailable(text: &str, markers: &[&str]) -> bool {
    COMMON_UNAVAILABLE
        .iter()
        .chain(markers)
        .any(|marker| text.contains(marker))
}
