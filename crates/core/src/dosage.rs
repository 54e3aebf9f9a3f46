//! Dosage pattern parsing.
//!
//! Dosages are written as per-slot unit counts such as `1-0-1` (morning, noon, night) or
//! `1 1 1 1`, often mixed with words. Tokens are split on whitespace, hyphens, slashes and
//! commas; each token contributes its leading number, if it has one.

use serde_json::Value;

/// A parsed dosage string.
#[derive(Clone, Debug, PartialEq)]
pub struct DosagePattern {
    /// Non-empty tokens after splitting.
    pub tokens: Vec<String>,
    /// Numeric values of the tokens that start with a number, in token order.
    pub values: Vec<f64>,
    /// Sum of `values`.
    pub total: f64,
}

impl DosagePattern {
    pub fn parse(dosage: &str) -> Self {
        let tokens: Vec<String> = dosage
            .trim()
            .split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | ','))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let values: Vec<f64> = tokens.iter().filter_map(|t| leading_number(t)).collect();
        let total = values.iter().sum();

        Self {
            tokens,
            values,
            total,
        }
    }

    /// True when there was text but none of it read as a number.
    pub fn is_unrecognised(&self) -> bool {
        self.values.is_empty() && !self.tokens.is_empty()
    }

    /// The total as JSON, integral totals rendered without a fraction.
    ///
    /// An infinite total has no JSON number and renders as `null`.
    pub fn total_json(&self) -> Value {
        number_json(self.total)
    }

    /// The total as message text, with infinite totals spelled `Infinity`.
    pub fn total_text(&self) -> String {
        match self.total {
            t if t == f64::INFINITY => "Infinity".to_string(),
            t if t == f64::NEG_INFINITY => "-Infinity".to_string(),
            t => t.to_string(),
        }
    }
}

/// Parse the longest numeric prefix of `token`, e.g. `500mg` reads as 500.
///
/// Accepts an optional sign followed by `Infinity` or by digits with an optional fraction and
/// exponent. Values too large for `f64` read as infinite. Returns `None` if the token does not
/// start with a number.
fn leading_number(token: &str) -> Option<f64> {
    const INFINITY_WORD: &str = "Infinity";

    let bytes = token.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if token[end..].starts_with(INFINITY_WORD) {
        let magnitude = f64::INFINITY;
        return Some(if bytes[0] == b'-' { -magnitude } else { magnitude });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    token[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan())
}

fn number_json(value: f64) -> Value {
    const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INT {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_hyphenated_pattern() {
        let parsed = DosagePattern::parse("1-0-1");
        assert_eq!(parsed.tokens, vec!["1", "0", "1"]);
        assert_eq!(parsed.values, vec![1.0, 0.0, 1.0]);
        assert_eq!(parsed.total, 2.0);
        assert!(!parsed.is_unrecognised());
    }

    #[test]
    fn test_parse_mixed_separators() {
        let parsed = DosagePattern::parse(" 1 / 1, 1 -- 1 ");
        assert_eq!(parsed.tokens.len(), 4);
        assert_eq!(parsed.total, 4.0);
    }

    #[test]
    fn test_parse_words_only_is_unrecognised() {
        let parsed = DosagePattern::parse("twice daily");
        assert_eq!(parsed.tokens, vec!["twice", "daily"]);
        assert!(parsed.values.is_empty());
        assert_eq!(parsed.total, 0.0);
        assert!(parsed.is_unrecognised());
    }

    #[test]
    fn test_zero_pattern_is_recognised() {
        let parsed = DosagePattern::parse("0-0-0");
        assert_eq!(parsed.total, 0.0);
        assert!(!parsed.is_unrecognised());
    }

    #[test]
    fn test_blank_dosage_has_no_tokens() {
        let parsed = DosagePattern::parse("   ");
        assert!(parsed.tokens.is_empty());
        assert!(!parsed.is_unrecognised());
    }

    #[test]
    fn test_tokens_contribute_leading_numbers() {
        let parsed = DosagePattern::parse("1tab 0.5tab half");
        assert_eq!(parsed.values, vec![1.0, 0.5]);
        assert_eq!(parsed.total, 1.5);
    }

    #[test]
    fn test_leading_number_variants() {
        assert_eq!(leading_number("2"), Some(2.0));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("1."), Some(1.0));
        assert_eq!(leading_number("+3x"), Some(3.0));
        assert_eq!(leading_number("1e2mg"), Some(100.0));
        assert_eq!(leading_number("2e"), Some(2.0));
        assert_eq!(leading_number("500mg"), Some(500.0));
        assert_eq!(leading_number("mg500"), None);
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number("+"), None);
        assert_eq!(leading_number("inf"), None);
        assert_eq!(leading_number("NaN"), None);
    }

    #[test]
    fn test_overflowing_and_infinite_tokens_stay_numeric() {
        assert_eq!(leading_number("1e400"), Some(f64::INFINITY));
        assert_eq!(leading_number("Infinitymg"), Some(f64::INFINITY));
        assert_eq!(leading_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(leading_number("infinity"), None);

        let parsed = DosagePattern::parse("1e400");
        assert!(!parsed.is_unrecognised());
        assert_eq!(parsed.total, f64::INFINITY);
        assert_eq!(parsed.total_json(), Value::Null);
        assert_eq!(parsed.total_text(), "Infinity");
    }

    #[test]
    fn test_total_json_renders_integers_without_fraction() {
        assert_eq!(DosagePattern::parse("2-2-3").total_json(), json!(7));
        assert_eq!(DosagePattern::parse("2.5-2.5-2.5").total_json(), json!(7.5));
    }
}
