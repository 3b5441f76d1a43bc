//! Numeral normalization and price parsing.
//!
//! Target sites mix three digit systems — Latin, Persian (U+06F0–06F9),
//! and Arabic-Indic (U+0660–0669) — and three thousands-separator
//! conventions (`,`, `،`, `٬`, plus plain/thin/no-break spaces). Everything
//! here is pure string work; see [`crate::sites`] for how it composes into
//! full extraction.

/// Thresholds applied when deciding whether a parsed number is a real
/// price. Each site module owns a const instance; free-text scans in
/// particular misread ratings, counts, and model numbers as prices, and
/// the floor filters those out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRules {
    /// Minimum accepted value. Values below this parse to `None`.
    pub floor: u64,
}

impl PriceRules {
    #[must_use]
    pub const fn with_floor(floor: u64) -> Self {
        Self { floor }
    }
}

impl Default for PriceRules {
    fn default() -> Self {
        Self { floor: 1000 }
    }
}

/// Maps Persian and Arabic-Indic digits to their ASCII equivalents,
/// passing every other character through unchanged.
#[must_use]
pub fn fold_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => {
                char::from(b'0' + u8::try_from(u32::from(c) - 0x06F0).unwrap_or(0))
            }
            '\u{0660}'..='\u{0669}' => {
                char::from(b'0' + u8::try_from(u32::from(c) - 0x0660).unwrap_or(0))
            }
            _ => c,
        })
        .collect()
}

/// Parses a price string into an integer, tolerating mixed digit systems
/// and separator conventions.
///
/// Rules:
/// 1. Persian/Arabic-Indic digits are folded to ASCII first.
/// 2. Thousands separators (`,`, `،`, `٬`) and all whitespace are stripped.
/// 3. Dots are thousands separators when every dot-delimited group after
///    the first is exactly 3 digits (`"1.234"` → `1234`,
///    `"1.234.567"` → `1234567`); a lone trailing group of another length
///    is a decimal fraction and is truncated.
/// 4. Returns `None` when no digits remain, the value does not fit, or it
///    falls below `rules.floor`.
#[must_use]
pub fn parse_price(text: &str, rules: &PriceRules) -> Option<u64> {
    let folded = fold_digits(text);
    let cleaned: String = folded
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let value = parse_dotted(&cleaned)?;
    if value < rules.floor {
        return None;
    }
    Some(value)
}

/// Resolves the dot convention on a digits-and-dots string.
fn parse_dotted(s: &str) -> Option<u64> {
    let parts: Vec<&str> = s.split('.').collect();

    if parts.len() == 1 {
        return parts[0].parse::<u64>().ok();
    }

    // "1.234" / "1.234.567": every group after the first is a 3-digit
    // thousands group, so the dots are separators, not a decimal point.
    let thousands_notation =
        !parts[0].is_empty() && parts[1..].iter().all(|group| group.len() == 3);
    if thousands_notation {
        return parts.concat().parse::<u64>().ok();
    }

    // A single dot with a non-3-digit tail (or an empty integer part) is a
    // genuine decimal; truncate the fraction.
    if parts.len() == 2 {
        let value = s.parse::<f64>().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        return Some(value as u64);
    }

    // Multiple dots with inconsistent group lengths: malformed.
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PriceRules {
        PriceRules::with_floor(1000)
    }

    #[test]
    fn folds_persian_digits() {
        assert_eq!(fold_digits("۲۲۳۷۷"), "22377");
    }

    #[test]
    fn folds_arabic_indic_digits() {
        assert_eq!(fold_digits("٣٤٥٦"), "3456");
    }

    #[test]
    fn leaves_latin_text_untouched() {
        assert_eq!(fold_digits("1,250 تومان"), "1,250 تومان");
    }

    #[test]
    fn parses_persian_price_with_separators() {
        assert_eq!(parse_price("۲۲,۳۷۷,۷۰۰", &rules()), Some(22_377_700));
    }

    #[test]
    fn parses_persian_comma_separator() {
        assert_eq!(parse_price("۱۲،۵۰۰،۰۰۰", &rules()), Some(12_500_000));
    }

    #[test]
    fn parses_arabic_thousands_separator() {
        assert_eq!(parse_price("٤٥٬٠٠٠", &rules()), Some(45_000));
    }

    #[test]
    fn parses_mixed_digit_systems() {
        assert_eq!(parse_price("1۲٣456", &rules()), Some(123_456));
    }

    #[test]
    fn trailing_three_digit_dot_group_is_thousands() {
        assert_eq!(parse_price("1.234", &rules()), Some(1234));
    }

    #[test]
    fn repeated_dot_groups_are_thousands() {
        assert_eq!(parse_price("1.234.567", &rules()), Some(1_234_567));
    }

    #[test]
    fn short_dot_tail_is_a_decimal() {
        // 1250.5 truncates; well above the floor.
        assert_eq!(parse_price("1250.5", &rules()), Some(1250));
    }

    #[test]
    fn currency_suffix_is_ignored() {
        assert_eq!(parse_price("12,500 تومان", &rules()), Some(12_500));
    }

    #[test]
    fn whitespace_separators_are_stripped() {
        assert_eq!(parse_price("5 200 000", &rules()), Some(5_200_000));
        assert_eq!(parse_price("5\u{a0}200\u{a0}000", &rules()), Some(5_200_000));
    }

    #[test]
    fn below_floor_is_rejected() {
        assert_eq!(parse_price("500", &rules()), None);
        assert_eq!(parse_price("999", &rules()), None);
        assert_eq!(parse_price("1000", &rules()), Some(1000));
    }

    #[test]
    fn no_digits_is_none() {
        assert_eq!(parse_price("تماس بگیرید", &rules()), None);
        assert_eq!(parse_price("", &rules()), None);
    }

    #[test]
    fn malformed_dot_groups_are_none() {
        assert_eq!(parse_price("1.23.456", &rules()), None);
    }

    #[test]
    fn higher_floor_filters_more() {
        let strict = PriceRules::with_floor(50_000);
        assert_eq!(parse_price("12,500", &strict), None);
        assert_eq!(parse_price("62,500", &strict), Some(62_500));
    }
}
