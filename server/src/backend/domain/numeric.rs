//! Numeric and currency normalization for pt-BR formatted input.
//!
//! Every other module parses and formats numbers through these functions.
//! Input follows the Brazilian convention: `.` groups thousands and `,` marks
//! the decimal part, so `"1.234,56"` is one thousand two hundred thirty-four
//! and fifty-six cents. Parsing is lenient and never fails.

pub use shared::truncate_whole;

const CURRENCY_SYMBOL: &str = "R$";

/// Parse a locale formatted decimal, returning `None` when nothing numeric
/// can be read from the input (empty, letters only, lone separators).
///
/// The currency symbol and whitespace are ignored, every `.` is dropped as a
/// thousands separator, the first `,` becomes the decimal point and the
/// longest numeric prefix is read (trailing garbage is ignored).
pub fn try_parse_locale_decimal(input: &str) -> Option<f64> {
    let cleaned: String = input
        .replace(CURRENCY_SYMBOL, "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    let normalized = cleaned.replacen(',', ".", 1);

    let prefix = numeric_prefix(&normalized);
    if prefix.is_empty() {
        return None;
    }

    prefix.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a locale formatted decimal; empty or unparseable input is `0`.
pub fn parse_locale_decimal(input: &str) -> f64 {
    try_parse_locale_decimal(input).unwrap_or(0.0)
}

/// Format a value as Brazilian currency, e.g. `R$ 66.672,45`
pub fn format_currency(value: f64) -> String {
    let value = sanitize(value, 2);
    let fixed = format!("{:.2}", value.abs());
    let (integer_part, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let sign = if value < 0.0 { "-" } else { "" };
    format!(
        "{}{} {},{}",
        sign,
        CURRENCY_SYMBOL,
        group_thousands(integer_part),
        fraction
    )
}

/// Format a plain number with a comma decimal separator and no grouping,
/// e.g. `format_decimal(37.99, 2) == "37,99"`
pub fn format_decimal(value: f64, places: usize) -> String {
    let value = sanitize(value, places);
    format!("{:.*}", places, value).replace('.', ",")
}

/// NaN and infinities display as zero, and so does anything that would
/// round to a negative zero.
fn sanitize(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let half_unit = 0.5 / 10f64.powi(places as i32);
    if value.abs() < half_unit {
        0.0
    } else {
        value
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

fn numeric_prefix(s: &str) -> &str {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_point = false;

    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if seen_digit {
        &s[..end]
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_decimal() {
        assert_eq!(parse_locale_decimal("1.234,56"), 1234.56);
        assert_eq!(parse_locale_decimal("1,31"), 1.31);
        assert_eq!(parse_locale_decimal("63"), 63.0);
        assert_eq!(parse_locale_decimal("R$ 282,94"), 282.94);
        assert_eq!(parse_locale_decimal(" 2 "), 2.0);
    }

    #[test]
    fn test_dot_is_a_thousands_separator() {
        assert_eq!(parse_locale_decimal("1.31"), 131.0);
        assert_eq!(parse_locale_decimal("1.000.000"), 1_000_000.0);
    }

    #[test]
    fn test_unparseable_input_is_zero() {
        assert_eq!(parse_locale_decimal(""), 0.0);
        assert_eq!(parse_locale_decimal("abc"), 0.0);
        assert_eq!(parse_locale_decimal(","), 0.0);
        assert_eq!(parse_locale_decimal("-"), 0.0);
        assert!(try_parse_locale_decimal("abc").is_none());
        assert!(try_parse_locale_decimal("   ").is_none());
    }

    #[test]
    fn test_trailing_garbage_is_ignored() {
        assert_eq!(parse_locale_decimal("12abc"), 12.0);
        assert_eq!(parse_locale_decimal("1,5,7"), 1.5);
    }

    #[test]
    fn test_truncate_whole() {
        assert_eq!(truncate_whole(20.9), 20);
        assert_eq!(truncate_whole(-3.0), 0);
        assert_eq!(truncate_whole(f64::NAN), 0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(66672.45), "R$ 66.672,45");
        assert_eq!(format_currency(140242.05), "R$ 140.242,05");
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(63.0), "R$ 63,00");
        assert_eq!(format_currency(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_currency(f64::NAN), "R$ 0,00");
        assert_eq!(format_currency(-0.001), "R$ 0,00");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(37.99, 2), "37,99");
        assert_eq!(format_decimal(10800.0, 2), "10800,00");
        assert_eq!(format_decimal(2.6, 1), "2,6");
        assert_eq!(format_decimal(f64::INFINITY, 2), "0,00");
    }

    #[test]
    fn test_formatted_currency_parses_back() {
        let formatted = format_currency(73569.6);
        assert!((parse_locale_decimal(&formatted) - 73569.6).abs() < 0.001);
    }
}
