use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::format::format_number;
use crate::step::{Solution, Step};
use crate::validation::require_finite;

/// Below this magnitude a sine/cosine is treated as an exact zero, so
/// `tan(90°)` reports undefined instead of 1.6e16.
const ZERO_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degrees => write!(f, "degrees"),
            Self::Radians => write!(f, "radians"),
        }
    }
}

impl std::str::FromStr for AngleUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "degrees" | "deg" => Ok(Self::Degrees),
            "radians" | "rad" => Ok(Self::Radians),
            _ => Err(format!("invalid angle unit: {s}")),
        }
    }
}

/// The six ratios of one angle. Undefined ratios are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrigValues {
    pub angle: f64,
    pub unit: AngleUnit,
    pub radians: f64,
    pub sin: f64,
    pub cos: f64,
    pub tan: Option<f64>,
    pub csc: Option<f64>,
    pub sec: Option<f64>,
    pub cot: Option<f64>,
}

fn snap(v: f64) -> f64 {
    if v.abs() < ZERO_EPSILON {
        0.0
    } else {
        v
    }
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        None
    } else {
        Some(snap(num / den))
    }
}

fn show(v: Option<f64>) -> String {
    v.map(|v| format_number(v, 6))
        .unwrap_or_else(|| "undefined".into())
}

pub fn trig_values(angle: f64, unit: AngleUnit) -> CalcResult<Solution<TrigValues>> {
    require_finite("angle", angle)?;
    let radians = match unit {
        AngleUnit::Degrees => angle * PI / 180.0,
        AngleUnit::Radians => angle,
    };
    let sin = snap(radians.sin());
    let cos = snap(radians.cos());

    let values = TrigValues {
        angle,
        unit,
        radians,
        sin,
        cos,
        tan: ratio(sin, cos),
        csc: ratio(1.0, sin),
        sec: ratio(1.0, cos),
        cot: ratio(cos, sin),
    };

    let steps = vec![
        Step::new(
            "Convert to Radians",
            format!("{} {unit} = {} rad", format_number(angle, 6), format_number(radians, 6)),
        ),
        Step::new("sin", format_number(sin, 6)),
        Step::new("cos", format_number(cos, 6)),
        Step::new("tan = sin/cos", show(values.tan)),
        Step::new("csc = 1/sin", show(values.csc)),
        Step::new("sec = 1/cos", show(values.sec)),
        Step::new("cot = cos/sin", show(values.cot)),
    ];
    Ok(Solution::new(values, steps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_thirty_degrees() {
        let v = trig_values(30.0, AngleUnit::Degrees).unwrap().value;
        assert!(close(v.sin, 0.5));
        assert!(close(v.csc.unwrap(), 2.0));
        assert!(close(v.tan.unwrap(), 3f64.sqrt() / 3.0));
    }

    #[test]
    fn test_right_angle_tan_undefined() {
        let v = trig_values(90.0, AngleUnit::Degrees).unwrap().value;
        assert!(close(v.sin, 1.0));
        assert_eq!(v.cos, 0.0);
        assert_eq!(v.tan, None);
        assert_eq!(v.sec, None);
        assert_eq!(v.cot, Some(0.0));
    }

    #[test]
    fn test_zero_angle() {
        let sol = trig_values(0.0, AngleUnit::Radians).unwrap();
        assert_eq!(sol.value.csc, None);
        assert_eq!(sol.value.cot, None);
        assert!(sol.steps.iter().any(|s| s.value == "undefined"));
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!("RAD".parse::<AngleUnit>().unwrap(), AngleUnit::Radians);
        assert!("grad".parse::<AngleUnit>().is_err());
    }
}
