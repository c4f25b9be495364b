//! Display formatting for numbers shown in results and steps.

/// Format `num` with at most `decimals` fraction digits.
///
/// Very large (`> 1e15`) and very small (`< 1e-6`, non-zero) magnitudes switch
/// to exponential notation. Trailing zeros are trimmed.
pub fn format_number(num: f64, decimals: usize) -> String {
    if num.is_nan() {
        return "N/A".into();
    }
    if num.is_infinite() {
        return if num > 0.0 { "∞".into() } else { "-∞".into() };
    }

    let abs = num.abs();
    if abs > 1e15 || (abs < 1e-6 && num != 0.0) {
        return format!("{num:.decimals$e}");
    }

    let fixed = format!("{num:.decimals$}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".into()
    } else {
        trimmed.to_string()
    }
}

/// Shorthand used across the calculators for step text.
pub fn fmt(num: f64) -> String {
    format_number(num, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_trims() {
        assert_eq!(format_number(2.5, 2), "2.5");
        assert_eq!(format_number(3.0, 2), "3");
        assert_eq!(format_number(1.0 / 3.0, 4), "0.3333");
        assert_eq!(format_number(-0.00001, 2), "-1.00e-5");
        assert_eq!(format_number(-0.0, 2), "0");
    }

    #[test]
    fn test_format_number_exponential() {
        assert_eq!(format_number(2e16, 2), "2.00e16");
        assert_eq!(format_number(1.5e-7, 1), "1.5e-7");
    }

    #[test]
    fn test_format_number_special() {
        assert_eq!(format_number(f64::NAN, 2), "N/A");
        assert_eq!(format_number(0.0, 2), "0");
    }
}
