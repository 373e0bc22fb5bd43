use crate::error::{Error, Result};

/// Formats a number the way JavaScript's `Number#toString` does (`20`, `0.5`, `1e21`).
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let v = if v == 0.0 { 0.0 } else { v };
    let mut buf = ryu_js::Buffer::new();
    buf.format_finite(v).to_string()
}

/// Parses a numeric option value, reporting the key on failure.
pub fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::invalid_option(key, value))
}

/// Parses a non-negative integer option value.
pub fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::invalid_option(key, value))
}

/// Rounds to `digits` decimal places.
pub fn round_to(v: f64, digits: i32) -> f64 {
    let p = 10f64.powi(digits);
    (v * p).round() / p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_have_no_fraction() {
        assert_eq!(fmt_number(20.0), "20");
        assert_eq!(fmt_number(-0.0), "0");
        assert_eq!(fmt_number(0.5), "0.5");
        assert_eq!(fmt_number(-3.25), "-3.25");
    }

    #[test]
    fn parse_reports_the_key() {
        assert_eq!(parse_number("dx", " 12.5 ").unwrap(), 12.5);
        let err = parse_number("dx", "abc").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for dx: abc");
        assert!(parse_number("dx", "NaN").is_err());
        assert!(parse_count("count", "-1").is_err());
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(fmt_number(round_to(1.23456, 2)), "1.23");
        assert_eq!(fmt_number(round_to(100.0 / 3.0, 2)), "33.33");
    }
}
