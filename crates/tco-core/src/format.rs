//! # Display Formatting
//!
//! Number, currency and percentage strings for result views and reports.
//!
//! ## Rounding
//! Values are rounded half away from zero (`2.5 → 3`, `-2.5 → -3`). A value
//! that rounds to zero never gets a minus sign.

/// Default currency symbol.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Formats a number with grouped thousands and a fixed number of decimals.
///
/// ```rust
/// use tco_core::format::format_number;
///
/// assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
/// assert_eq!(format_number(8.1, 0), "8");
/// assert_eq!(format_number(-0.004, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = round_half_away(value, decimals);
    let fixed = format!("{:.*}", decimals, rounded.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Formats whole currency units with the default symbol: `$810,000`.
pub fn format_currency(amount: f64) -> String {
    format_currency_with(amount, DEFAULT_CURRENCY_SYMBOL)
}

/// Formats whole currency units with a custom symbol.
///
/// The sign goes before the symbol: `-$1,500`.
pub fn format_currency_with(amount: f64, symbol: &str) -> String {
    let number = format_number(amount, 0);
    match number.strip_prefix('-') {
        Some(magnitude) => format!("-{symbol}{magnitude}"),
        None => format!("{symbol}{number}"),
    }
}

/// Formats a 0-100 percentage: `format_percentage(49.38, 1)` is `49.4%`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{}%", format_number(value, decimals))
}

fn round_half_away(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    // f64::round is already half away from zero.
    let rounded = scaled.round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(100_000.0, 0), "100,000");
        assert_eq!(format_number(4_050_000.0, 0), "4,050,000");
        assert_eq!(format_number(2_219.178, 2), "2,219.18");
    }

    #[test]
    fn test_format_number_rounds_half_away_from_zero() {
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(-2.5, 0), "-3");
        assert_eq!(format_number(-0.4, 0), "0");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::NAN, 2), "NaN");
        assert_eq!(format_number(f64::INFINITY, 0), "inf");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(810_000.0), "$810,000");
        assert_eq!(format_currency(2_219.18), "$2,219");
        assert_eq!(format_currency(-1_500.0), "-$1,500");
        assert_eq!(format_currency_with(15_000.0, "MX$"), "MX$15,000");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(49.382_716, 1), "49.4%");
        assert_eq!(format_percentage(100.0, 1), "100.0%");
        assert_eq!(format_percentage(0.0, 1), "0.0%");
    }
}
