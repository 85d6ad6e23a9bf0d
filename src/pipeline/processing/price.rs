use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not an ASCII digit or a literal decimal point.
static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").expect("static regex"));

/// Parse a scraped price string such as `"1 200 CHF"` or `"900'000.-"`.
///
/// Whitespace, currency symbols, letters and thousands separators are
/// stripped. Commas are separators too, never decimal points, so
/// `"1200,50"` reads as `120050`. Returns `None` when nothing numeric is
/// left or the remainder is not a valid float (e.g. `"1.2.3"`).
pub fn parse_price(raw_price: &str) -> Option<f64> {
    let compact: String = raw_price.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = NON_NUMERIC.replace_all(&compact, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_spaces_and_currency() {
        assert_eq!(parse_price("1 200 CHF"), Some(1200.0));
        assert_eq!(parse_price("CHF 1'250'000"), Some(1_250_000.0));
        assert_eq!(parse_price("€ 350\u{a0}000"), Some(350_000.0));
        assert_eq!(parse_price("\t42\n"), Some(42.0));
    }

    #[test]
    fn test_keeps_decimal_point() {
        assert_eq!(parse_price("900'000.-"), Some(900_000.0));
        assert_eq!(parse_price("1 234.50 EUR"), Some(1234.5));
        assert_eq!(parse_price(".5"), Some(0.5));
    }

    #[test]
    fn test_comma_is_dropped_not_decimal() {
        assert_eq!(parse_price("1200,50"), Some(120_050.0));
        assert_eq!(parse_price("1,250,000.75"), Some(1_250_000.75));
    }

    #[test]
    fn test_no_digits_is_none() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("   "), None);
        assert_eq!(parse_price("Preis auf Anfrage"), None);
        assert_eq!(parse_price("CHF -"), None);
    }

    #[test]
    fn test_unparseable_remainder_is_none() {
        assert_eq!(parse_price("1.2.3"), None);
        assert_eq!(parse_price("Fr. 1.200.000.-"), None);
        assert_eq!(parse_price("."), None);
    }
}
