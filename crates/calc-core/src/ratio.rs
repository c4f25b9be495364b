use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::fmt;
use crate::integer::gcd;
use crate::step::{Solution, Step};
use crate::validation::NumberRule;

/// Most fraction digits considered when scaling decimal terms to integers.
const MAX_SCALE_DIGITS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioOutcome {
    pub left: f64,
    pub right: f64,
    pub simplified_left: u64,
    pub simplified_right: u64,
    pub decimal: f64,
}

fn decimal_digits(num: f64) -> i32 {
    (0..=MAX_SCALE_DIGITS)
        .find(|&k| {
            let scaled = num * 10f64.powi(k);
            (scaled - scaled.round()).abs() < 1e-9
        })
        .unwrap_or(MAX_SCALE_DIGITS)
}

/// Reduce `a:b` to lowest whole-number terms.
pub fn simplify_ratio(a: f64, b: f64) -> CalcResult<Solution<RatioOutcome>> {
    let rule = NumberRule {
        allow_negative: false,
        ..NumberRule::default()
    };
    rule.check(a)?;
    rule.check(b)?;
    if b == 0.0 {
        return Err(CalcError::domain("the second term of a ratio cannot be zero"));
    }

    let scale = 10f64.powi(decimal_digits(a).max(decimal_digits(b)));
    let (sa, sb) = ((a * scale).round(), (b * scale).round());
    if sa > u64::MAX as f64 || sb > u64::MAX as f64 {
        return Err(CalcError::domain("ratio terms are too large"));
    }
    if (a != 0.0 && sa == 0.0) || sb == 0.0 {
        return Err(CalcError::Domain(format!(
            "ratio terms must not need more than {MAX_SCALE_DIGITS} decimal places"
        )));
    }
    let (ia, ib) = (sa as u64, sb as u64);
    let g = gcd(ia, ib).max(1);
    let (left, right) = (ia / g, ib / g);

    let mut steps = vec![Step::new("Original Ratio", format!("{}:{}", fmt(a), fmt(b)))];
    if scale > 1.0 {
        steps.push(Step::new(
            "Scale to Whole Numbers",
            format!("× {} → {ia}:{ib}", fmt(scale)),
        ));
    }
    steps.push(Step::new("Greatest Common Divisor", format!("GCD({ia}, {ib}) = {g}")));
    steps.push(Step::new("Simplified Ratio", format!("{left}:{right}")));

    Ok(Solution::new(
        RatioOutcome {
            left: a,
            right: b,
            simplified_left: left,
            simplified_right: right,
            decimal: a / b,
        },
        steps,
    ))
}

/// Solve `a:b = c:x` for `x`.
pub fn solve_proportion(a: f64, b: f64, c: f64) -> CalcResult<Solution<f64>> {
    NumberRule::non_zero().check(a)?;
    NumberRule::default().check(b)?;
    NumberRule::default().check(c)?;
    let x = b * c / a;
    let steps = vec![
        Step::new("Proportion", format!("{}:{} = {}:x", fmt(a), fmt(b), fmt(c))),
        Step::new("Cross Multiply", format!("{}·x = {}·{}", fmt(a), fmt(b), fmt(c))),
        Step::new("Solve", format!("x = {}", fmt(x))),
    ];
    Ok(Solution::new(x, steps))
}
