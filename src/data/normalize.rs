use super::error::NormalizationError;

// ---------------------------------------------------------------------------
// RawValue – a measure cell as it arrives from the source
// ---------------------------------------------------------------------------

/// A measure cell before normalization.
///
/// CSV cells always arrive as text; JSON and Parquet sources may already
/// carry numbers, which pass through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

/// Convert a raw measure cell into an `f64`.
pub fn normalize(raw: &RawValue) -> Result<f64, NormalizationError> {
    match raw {
        RawValue::Number(v) => Ok(*v),
        RawValue::Text(s) => normalize_str(s),
    }
}

/// Clean an accounting-formatted string and parse it.
///
/// * `$` and `,` are dropped
/// * `(500)` means `-500`
/// * blank and a lone `-` mean zero
pub fn normalize_str(s: &str) -> Result<f64, NormalizationError> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ')'))
        .map(|c| if c == '(' { '-' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "-" {
        return Ok(0.0);
    }

    cleaned.parse::<f64>().map_err(|_| NormalizationError {
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_and_grouping() {
        assert_eq!(normalize(&RawValue::from("$1,234.50")).unwrap(), 1234.50);
        assert_eq!(normalize_str(" $32,370.00 ").unwrap(), 32370.0);
    }

    #[test]
    fn parentheses_mean_negative() {
        assert_eq!(normalize(&RawValue::from("($500)")).unwrap(), -500.0);
        assert_eq!(normalize_str(" $(4,533.75)").unwrap(), -4533.75);
    }

    #[test]
    fn blank_and_dash_are_zero() {
        assert_eq!(normalize(&RawValue::from("")).unwrap(), 0.0);
        assert_eq!(normalize(&RawValue::from("-")).unwrap(), 0.0);
        assert_eq!(normalize_str(" $-   ").unwrap(), 0.0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(normalize(&RawValue::from(42.0)).unwrap(), 42.0);
        assert_eq!(normalize(&RawValue::Number(-0.25)).unwrap(), -0.25);
    }

    #[test]
    fn stray_text_is_rejected() {
        let err = normalize_str("$12abc").unwrap_err();
        assert_eq!(err.value, "$12abc");
        assert!(normalize_str("n/a").is_err());
    }
}
