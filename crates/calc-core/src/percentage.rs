use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CalcError, CalcResult};
use crate::format::fmt;
use crate::step::{Solution, Step};
use crate::validation::require_finite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentageMode {
    /// What is X% of Y?
    Of,
    /// X is what % of Y?
    Reverse,
    /// Percentage increase from X to Y.
    Increase,
    /// Percentage decrease from X to Y.
    Decrease,
}

impl fmt::Display for PercentageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Of => write!(f, "of"),
            Self::Reverse => write!(f, "reverse"),
            Self::Increase => write!(f, "increase"),
            Self::Decrease => write!(f, "decrease"),
        }
    }
}

impl std::str::FromStr for PercentageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "of" | "basic" => Ok(Self::Of),
            "reverse" | "what" => Ok(Self::Reverse),
            "increase" => Ok(Self::Increase),
            "decrease" => Ok(Self::Decrease),
            _ => Err(format!("invalid percentage mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageOutcome {
    pub mode: PercentageMode,
    pub value: f64,
    pub summary: String,
}

/// `(percent / 100) * of`
pub fn percent_of(percent: f64, of: f64) -> f64 {
    (percent / 100.0) * of
}

/// `(part / whole) * 100`; `whole` must be non-zero.
pub fn what_percent(part: f64, whole: f64) -> CalcResult<f64> {
    if whole == 0.0 {
        return Err(CalcError::domain(
            "Cannot divide by zero. The second number cannot be zero.",
        ));
    }
    Ok((part / whole) * 100.0)
}

/// `((new - original) / original) * 100`
pub fn percent_increase(original: f64, new: f64) -> CalcResult<f64> {
    check_original(original)?;
    Ok(((new - original) / original) * 100.0)
}

/// `((original - new) / original) * 100`
pub fn percent_decrease(original: f64, new: f64) -> CalcResult<f64> {
    check_original(original)?;
    Ok(((original - new) / original) * 100.0)
}

fn check_original(original: f64) -> CalcResult<()> {
    if original == 0.0 {
        return Err(CalcError::domain(
            "Original value cannot be zero for percentage change calculations.",
        ));
    }
    Ok(())
}

/// Run one of the percentage calculations with a worked solution.
pub fn calculate(mode: PercentageMode, a: f64, b: f64) -> CalcResult<Solution<PercentageOutcome>> {
    require_finite("first value", a)?;
    require_finite("second value", b)?;

    let (value, steps, summary) = match mode {
        PercentageMode::Of => {
            if b < 0.0 {
                return Err(CalcError::validation("Please enter a positive number"));
            }
            let value = percent_of(a, b);
            let steps = vec![
                Step::new(
                    "Convert percentage to decimal",
                    format!("{}% = {} ÷ 100 = {}", fmt(a), fmt(a), fmt(a / 100.0)),
                ),
                Step::new(
                    "Multiply decimal by the number",
                    format!("{} × {} = {}", fmt(a / 100.0), fmt(b), fmt(value)),
                ),
                Step::new(
                    "Final Result",
                    format!("{}% of {} = {}", fmt(a), fmt(b), fmt(value)),
                ),
            ];
            (value, steps, format!("{}% of {} = {}", fmt(a), fmt(b), fmt(value)))
        }
        PercentageMode::Reverse => {
            let value = what_percent(a, b)?;
            let steps = vec![
                Step::new(
                    "Divide the first number by the second",
                    format!("{} ÷ {} = {}", fmt(a), fmt(b), fmt(a / b)),
                ),
                Step::new(
                    "Multiply by 100 to convert to percentage",
                    format!("{} × 100 = {}%", fmt(a / b), fmt(value)),
                ),
            ];
            (value, steps, format!("{} is {}% of {}", fmt(a), fmt(value), fmt(b)))
        }
        PercentageMode::Increase => {
            let value = percent_increase(a, b)?;
            let diff = b - a;
            let steps = change_steps("increase", a, b, diff, value);
            (value, steps, format!("Percentage Increase: {}%", fmt(value)))
        }
        PercentageMode::Decrease => {
            let value = percent_decrease(a, b)?;
            let diff = a - b;
            let steps = change_steps("decrease", a, b, diff, value);
            (value, steps, format!("Percentage Decrease: {}%", fmt(value)))
        }
    };

    Ok(Solution::new(
        PercentageOutcome {
            mode,
            value,
            summary,
        },
        steps,
    ))
}

fn change_steps(label: &str, original: f64, new: f64, diff: f64, pct: f64) -> Vec<Step> {
    let (lhs, rhs) = if label == "increase" {
        (new, original)
    } else {
        (original, new)
    };
    vec![
        Step::new(
            format!("Calculate the {label}"),
            format!("{} - {} = {}", fmt(lhs), fmt(rhs), fmt(diff)),
        ),
        Step::new(
            format!("Divide {label} by original value"),
            format!("{} ÷ {} = {}", fmt(diff), fmt(original), fmt(diff / original)),
        ),
        Step::new(
            "Multiply by 100 to get percentage",
            format!("{} × 100 = {}%", fmt(diff / original), fmt(pct)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(20.0, 50.0), 10.0);
    }

    #[test]
    fn test_what_percent() {
        assert_eq!(what_percent(25.0, 200.0).unwrap(), 12.5);
        assert!(what_percent(1.0, 0.0).is_err());
    }

    #[test]
    fn test_increase_and_decrease() {
        assert_eq!(percent_increase(50.0, 75.0).unwrap(), 50.0);
        assert_eq!(percent_decrease(100.0, 80.0).unwrap(), 20.0);
        assert!(percent_increase(0.0, 5.0).is_err());
        assert!(percent_decrease(0.0, 5.0).is_err());
    }

    #[test]
    fn test_calculate_with_steps() {
        let sol = calculate(PercentageMode::Increase, 50.0, 75.0).unwrap();
        assert_eq!(sol.value.value, 50.0);
        assert_eq!(sol.steps.len(), 3);
        assert_eq!(sol.steps[0].value, "75 - 50 = 25");
        assert_eq!(sol.value.summary, "Percentage Increase: 50%");
    }

    #[test]
    fn test_calculate_rejects_negative_base() {
        assert!(calculate(PercentageMode::Of, 10.0, -5.0).is_err());
        assert!(calculate(PercentageMode::Of, f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Basic".parse::<PercentageMode>().unwrap(), PercentageMode::Of);
        assert_eq!(PercentageMode::Decrease.to_string(), "decrease");
        assert!("sideways".parse::<PercentageMode>().is_err());
    }
}
