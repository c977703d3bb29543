// ---------------------------------------------------------------------------
// Number formatting for KPI cards and tables
// ---------------------------------------------------------------------------

/// Round to a whole number and insert thousands separators: `1234567.8` → `1,234,568`.
pub fn format_count(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// `-1234.4` → `-$1,234`.
pub fn format_currency(v: f64) -> String {
    let s = format_count(v);
    match s.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${s}"),
    }
}

/// One decimal place with a percent sign.
pub fn format_percent(v: f64) -> String {
    format!("{v:.1}%")
}

/// Two decimals with separators, for table cells.
pub fn format_amount(v: f64) -> String {
    let cents = (v.abs() * 100.0).round() as u64;
    let whole = format_count((cents / 100) as f64);
    let sign = if v < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{whole}.{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_group_thousands() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.4), "999");
        assert_eq!(format_count(1000.0), "1,000");
        assert_eq!(format_count(1234567.8), "1,234,568");
        assert_eq!(format_count(-45210.0), "-45,210");
    }

    #[test]
    fn currency_and_percent() {
        assert_eq!(format_currency(118726350.26), "$118,726,350");
        assert_eq!(format_currency(-1234.4), "-$1,234");
        assert_eq!(format_percent(1.6666), "1.7%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn amounts_keep_cents() {
        assert_eq!(format_amount(32370.0), "32,370.00");
        assert_eq!(format_amount(-4533.75), "-4,533.75");
        assert_eq!(format_amount(0.004), "0.00");
    }
}
