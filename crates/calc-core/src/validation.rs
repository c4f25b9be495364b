//! Input validation shared by every calculator.
//!
//! Validation runs before any arithmetic: a calculator never computes with a
//! value that failed these checks.

use crate::error::{CalcError, CalcResult};

/// Constraints for a single numeric field.
#[derive(Debug, Clone, Copy)]
pub struct NumberRule {
    pub min: f64,
    pub max: f64,
    pub allow_zero: bool,
    pub allow_negative: bool,
    pub allow_decimal: bool,
}

impl Default for NumberRule {
    fn default() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            allow_zero: true,
            allow_negative: true,
            allow_decimal: true,
        }
    }
}

impl NumberRule {
    pub fn non_zero() -> Self {
        Self {
            allow_zero: false,
            ..Self::default()
        }
    }

    pub fn check(&self, num: f64) -> CalcResult<f64> {
        if !num.is_finite() {
            return Err(CalcError::validation("Please enter a valid number"));
        }
        if !self.allow_decimal && num.fract() != 0.0 {
            return Err(CalcError::validation("Please enter a whole number"));
        }
        if !self.allow_negative && num < 0.0 {
            return Err(CalcError::validation("Please enter a positive number"));
        }
        if !self.allow_zero && num == 0.0 {
            return Err(CalcError::validation("This value cannot be zero"));
        }
        if num < self.min {
            return Err(CalcError::Validation(format!(
                "Value must be at least {}",
                self.min
            )));
        }
        if num > self.max {
            return Err(CalcError::Validation(format!(
                "Value must be at most {}",
                self.max
            )));
        }
        Ok(num)
    }

    /// Parse a raw text field and check it.
    pub fn parse(&self, raw: &str) -> CalcResult<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CalcError::validation("This field is required"));
        }
        let num: f64 = raw
            .parse()
            .map_err(|_| CalcError::validation("Please enter a valid number"))?;
        self.check(num)
    }
}

/// Reject NaN and infinities in a named field.
pub fn require_finite(name: &str, num: f64) -> CalcResult<f64> {
    if num.is_finite() {
        Ok(num)
    } else {
        Err(CalcError::Validation(format!("{name} must be a finite number")))
    }
}

/// Split a comma-separated list, dropping blank and non-numeric entries.
pub fn parse_number_list(raw: &str) -> Vec<f64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect()
}

/// Require a non-empty list of finite numbers.
pub fn require_values(values: &[f64]) -> CalcResult<()> {
    if values.is_empty() {
        return Err(CalcError::validation("At least one value is required"));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CalcError::validation("Please enter valid numbers"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_required() {
        let err = NumberRule::default().parse("  ").unwrap_err();
        assert_eq!(err.to_string(), "invalid input: This field is required");
    }

    #[test]
    fn test_parse_not_a_number() {
        assert!(NumberRule::default().parse("abc").is_err());
        assert_eq!(NumberRule::default().parse(" 4.5 ").unwrap(), 4.5);
    }

    #[test]
    fn test_integer_rule() {
        let rule = NumberRule {
            allow_negative: false,
            allow_decimal: false,
            ..NumberRule::default()
        };
        assert!(rule.check(3.5).is_err());
        assert!(rule.check(-1.0).is_err());
        assert_eq!(rule.check(7.0).unwrap(), 7.0);
    }

    #[test]
    fn test_bounds() {
        let rule = NumberRule {
            max: 170.0,
            ..NumberRule::default()
        };
        assert!(rule.check(171.0).is_err());
        assert!(NumberRule::non_zero().check(0.0).is_err());
        assert!(rule.check(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_number_list() {
        assert_eq!(parse_number_list("1, 2,,x, 3.5 "), vec![1.0, 2.0, 3.5]);
        assert!(parse_number_list("").is_empty());
    }

    #[test]
    fn test_require_values() {
        assert!(require_values(&[]).is_err());
        assert!(require_values(&[1.0, f64::INFINITY]).is_err());
        assert!(require_values(&[1.0]).is_ok());
    }
}
