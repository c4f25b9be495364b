//! Descriptive statistics over a list of numbers.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::fmt;
use crate::step::{Solution, Step};
use crate::validation::require_values;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviationKind {
    /// Divide by N.
    #[default]
    Population,
    /// Divide by N - 1.
    Sample,
}

impl fmt::Display for DeviationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Population => write!(f, "population"),
            Self::Sample => write!(f, "sample"),
        }
    }
}

impl std::str::FromStr for DeviationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "population" | "pop" => Ok(Self::Population),
            "sample" => Ok(Self::Sample),
            _ => Err(format!("invalid deviation kind: {s}")),
        }
    }
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> CalcResult<f64> {
    require_values(values)?;
    Ok(sum(values) / values.len() as f64)
}

/// Middle element of the sorted values, or the average of the two middles.
pub fn median(values: &[f64]) -> CalcResult<f64> {
    require_values(values)?;
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Every value sharing the highest frequency, ascending.
///
/// Empty when no value occurs more than once.
pub fn modes(values: &[f64]) -> CalcResult<Vec<f64>> {
    require_values(values)?;
    let mut freq: HashMap<u64, usize> = HashMap::new();
    for v in values {
        // -0.0 and 0.0 count as the same value
        *freq.entry((v + 0.0).to_bits()).or_default() += 1;
    }
    let max_freq = freq.values().copied().max().unwrap_or(0);
    if max_freq <= 1 {
        return Ok(Vec::new());
    }
    let mut result: Vec<f64> = freq
        .into_iter()
        .filter(|(_, count)| *count == max_freq)
        .map(|(bits, _)| f64::from_bits(bits))
        .collect();
    result.sort_by(f64::total_cmp);
    Ok(result)
}

pub fn min(values: &[f64]) -> CalcResult<f64> {
    require_values(values)?;
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn max(values: &[f64]) -> CalcResult<f64> {
    require_values(values)?;
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn range(values: &[f64]) -> CalcResult<f64> {
    Ok(max(values)? - min(values)?)
}

pub fn variance(values: &[f64], kind: DeviationKind) -> CalcResult<f64> {
    let mu = mean(values)?;
    let divisor = match kind {
        DeviationKind::Population => values.len(),
        DeviationKind::Sample => {
            if values.len() < 2 {
                return Err(CalcError::domain(
                    "sample variance requires at least two values",
                ));
            }
            values.len() - 1
        }
    };
    let squared: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    Ok(squared / divisor as f64)
}

pub fn std_dev(values: &[f64], kind: DeviationKind) -> CalcResult<f64> {
    Ok(variance(values, kind)?.sqrt())
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// "2, 3" or "No mode".
pub fn describe_modes(modes: &[f64]) -> String {
    if modes.is_empty() {
        "No mode".into()
    } else {
        modes.iter().map(|m| fmt(*m)).collect::<Vec<_>>().join(", ")
    }
}

// ---------------------------------------------------------------------------
// Calculator outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Average {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub modes: Vec<f64>,
    pub range: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(flatten)]
    pub average: Average,
    pub variance: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deviation {
    pub kind: DeviationKind,
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Mean, median, mode and range of `values`.
pub fn average(values: &[f64]) -> CalcResult<Solution<Average>> {
    let avg = Average {
        count: values.len(),
        sum: sum(values),
        mean: mean(values)?,
        median: median(values)?,
        modes: modes(values)?,
        range: range(values)?,
        min: min(values)?,
        max: max(values)?,
    };
    let steps = vec![
        Step::new(
            "Sum of values",
            format!("Σ = {} over {} values", fmt(avg.sum), avg.count),
        ),
        Step::new(
            "Mean",
            format!("{} ÷ {} = {}", fmt(avg.sum), avg.count, fmt(avg.mean)),
        ),
        Step::new("Median (middle of sorted values)", fmt(avg.median)),
        Step::new("Mode", describe_modes(&avg.modes)),
        Step::new(
            "Range",
            format!("{} - {} = {}", fmt(avg.max), fmt(avg.min), fmt(avg.range)),
        ),
    ];
    Ok(Solution::new(avg, steps))
}

/// Full summary including population variance and standard deviation.
pub fn summarize(values: &[f64]) -> CalcResult<Solution<Summary>> {
    let avg = average(values)?;
    let var = variance(values, DeviationKind::Population)?;
    let mut steps = avg.steps;
    steps.push(Step::new("Variance", format!("σ² = {}", fmt(var))));
    steps.push(Step::new(
        "Standard Deviation",
        format!("σ = √{} = {}", fmt(var), fmt(var.sqrt())),
    ));
    Ok(Solution::new(
        Summary {
            average: avg.value,
            variance: var,
            std_dev: var.sqrt(),
        },
        steps,
    ))
}

/// Variance and standard deviation of the chosen kind.
pub fn deviation(values: &[f64], kind: DeviationKind) -> CalcResult<Solution<Deviation>> {
    let mu = mean(values)?;
    let var = variance(values, kind)?;
    let sd = var.sqrt();
    let symbol = match kind {
        DeviationKind::Population => "σ",
        DeviationKind::Sample => "s",
    };
    let steps = vec![
        Step::new("Calculate Mean", format!("μ = {}", fmt(mu))),
        Step::new("Calculate Variance", format!("{symbol}² = {}", fmt(var))),
        Step::new(
            "Standard Deviation",
            format!("{symbol} = √{} = {}", fmt(var), fmt(sd)),
        ),
    ];
    Ok(Solution::new(
        Deviation {
            kind,
            count: values.len(),
            mean: mu,
            variance: var,
            std_dev: sd,
        },
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: [f64; 5] = [1.0, 2.0, 2.0, 3.0, 4.0];

    #[test]
    fn test_mean_median_mode() {
        assert!((mean(&DATA).unwrap() - 2.4).abs() < 1e-12);
        assert_eq!(median(&DATA).unwrap(), 2.0);
        assert_eq!(modes(&DATA).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_no_mode_and_ties() {
        assert!(modes(&[1.0, 2.0, 3.0]).unwrap().is_empty());
        assert_eq!(modes(&[3.0, 1.0, 1.0, 3.0, 2.0]).unwrap(), vec![1.0, 3.0]);
        assert_eq!(describe_modes(&[]), "No mode");
    }

    #[test]
    fn test_range() {
        assert_eq!(range(&DATA).unwrap(), 3.0);
    }

    #[test]
    fn test_variance_kinds() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(variance(&values, DeviationKind::Population).unwrap(), 4.0);
        assert_eq!(std_dev(&values, DeviationKind::Population).unwrap(), 2.0);
        let sample = variance(&values, DeviationKind::Sample).unwrap();
        assert!((sample - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_requires_two_values() {
        assert!(variance(&[5.0], DeviationKind::Sample).is_err());
        assert_eq!(variance(&[5.0], DeviationKind::Population).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(mean(&[]).is_err());
        assert!(summarize(&[]).is_err());
    }

    #[test]
    fn test_summarize() {
        let sol = summarize(&DATA).unwrap();
        assert_eq!(sol.value.average.count, 5);
        assert_eq!(sol.value.average.max, 4.0);
        assert_eq!(sol.steps.last().unwrap().description, "Standard Deviation");
    }

    #[test]
    fn test_deviation_steps() {
        let sol = deviation(&[1.0, 3.0], DeviationKind::Sample).unwrap();
        assert_eq!(sol.value.variance, 2.0);
        assert_eq!(sol.steps[0].value, "μ = 2");
    }
}
