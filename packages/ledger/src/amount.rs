//! Money helpers. Amounts are `f64` rupees kept to two decimals.

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole paise (hundredths), for comparisons that must not trip on float noise.
pub fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Two decimals, with a trailing `.00` dropped: `1500.00` → `"1500"`, `12.5` → `"12.50"`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let text = format!("{:.2}", round2(value));
    match text.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(4442.4449), 4442.44);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.0), 0.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1500.0), "1500");
        assert_eq!(format_amount(12.5), "12.50");
        assert_eq!(format_amount(4442.444), "4442.44");
        assert_eq!(format_amount(f64::NAN), "0");
    }

    #[test]
    fn test_cents_absorb_noise() {
        let sum: f64 = [0.1, 0.2].iter().sum();
        assert_eq!(to_cents(sum), to_cents(0.3));
    }
}
