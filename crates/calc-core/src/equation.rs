//! Linear and quadratic equation solving.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::fmt;
use crate::step::{Solution, Step};
use crate::validation::require_finite;

/// Solutions of `ax + b = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LinearSolution {
    Unique { x: f64 },
    Infinite,
    NoSolution,
}

pub fn solve_linear(a: f64, b: f64) -> CalcResult<Solution<LinearSolution>> {
    require_finite("a", a)?;
    require_finite("b", b)?;

    let mut steps = vec![Step::new(
        "Original equation",
        format!("{}x + {} = 0", fmt(a), fmt(b)),
    )];

    let solution = if a != 0.0 {
        let x = -b / a;
        steps.push(Step::new(
            "Subtract b from both sides",
            format!("{}x = {}", fmt(a), fmt(-b)),
        ));
        steps.push(Step::new(
            "Divide by a",
            format!("x = {} / {}", fmt(-b), fmt(a)),
        ));
        steps.push(Step::new("Solution", format!("x = {}", fmt(x))));
        LinearSolution::Unique { x }
    } else if b == 0.0 {
        steps.push(Step::new(
            "a = 0 and b = 0",
            "0 = 0 holds for every x: infinite solutions",
        ));
        LinearSolution::Infinite
    } else {
        steps.push(Step::new(
            "a = 0 and b ≠ 0",
            format!("{} = 0 is never true: no solution", fmt(b)),
        ));
        LinearSolution::NoSolution
    };

    Ok(Solution::new(solution, steps))
}

/// Roots of `ax² + bx + c = 0`, classified by the discriminant sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuadraticRoots {
    /// Δ > 0: `x1 = (-b + √Δ) / 2a`, `x2 = (-b - √Δ) / 2a`.
    TwoReal { x1: f64, x2: f64 },
    /// Δ = 0: `x = -b / 2a`.
    Repeated { x: f64 },
    /// Δ < 0: `re ± im·i` with `re = -b / 2a`, `im = √|Δ| / 2a`.
    Complex { re: f64, im: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quadratic {
    pub discriminant: f64,
    pub roots: QuadraticRoots,
}

pub fn discriminant(a: f64, b: f64, c: f64) -> f64 {
    b * b - 4.0 * a * c
}

pub fn solve_quadratic(a: f64, b: f64, c: f64) -> CalcResult<Solution<Quadratic>> {
    require_finite("a", a)?;
    require_finite("b", b)?;
    require_finite("c", c)?;
    if a == 0.0 {
        return Err(CalcError::domain(
            "Coefficient a cannot be zero for quadratic equation",
        ));
    }

    let d = discriminant(a, b, c);
    let mut steps = vec![
        Step::new("Quadratic Formula", "x = (-b ± √(b² - 4ac)) / (2a)"),
        Step::new(
            "Calculate Discriminant (Δ)",
            format!(
                "Δ = b² - 4ac = {}² - 4({})({}) = {}",
                fmt(b),
                fmt(a),
                fmt(c),
                fmt(d)
            ),
        ),
    ];

    let two_a = 2.0 * a;
    let roots = if d > 0.0 {
        let sqrt_d = d.sqrt();
        let x1 = (-b + sqrt_d) / two_a;
        let x2 = (-b - sqrt_d) / two_a;
        steps.push(Step::new(
            "Two Real Solutions",
            format!("x₁ = {}, x₂ = {}", fmt(x1), fmt(x2)),
        ));
        QuadraticRoots::TwoReal { x1, x2 }
    } else if d == 0.0 {
        let x = -b / two_a;
        steps.push(Step::new(
            "One Real Solution (Repeated Root)",
            format!("x = {}", fmt(x)),
        ));
        QuadraticRoots::Repeated { x }
    } else {
        // -0.0 + 0.0 normalizes a negative zero real part
        let re = -b / two_a + 0.0;
        let im = d.abs().sqrt() / two_a;
        steps.push(Step::new(
            "Two Complex Solutions",
            format!(
                "x₁ = {} + {}i, x₂ = {} - {}i",
                fmt(re),
                fmt(im),
                fmt(re),
                fmt(im)
            ),
        ));
        QuadraticRoots::Complex { re, im }
    };

    Ok(Solution::new(
        Quadratic {
            discriminant: d,
            roots,
        },
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_unique() {
        let sol = solve_linear(2.0, -4.0).unwrap();
        assert_eq!(sol.value, LinearSolution::Unique { x: 2.0 });
        assert_eq!(sol.steps.last().unwrap().value, "x = 2");
    }

    #[test]
    fn test_linear_degenerate() {
        assert_eq!(solve_linear(0.0, 0.0).unwrap().value, LinearSolution::Infinite);
        assert_eq!(solve_linear(0.0, 3.0).unwrap().value, LinearSolution::NoSolution);
    }

    #[test]
    fn test_quadratic_two_real() {
        let sol = solve_quadratic(1.0, -5.0, 6.0).unwrap();
        assert_eq!(sol.value.discriminant, 1.0);
        assert_eq!(
            sol.value.roots,
            QuadraticRoots::TwoReal { x1: 3.0, x2: 2.0 }
        );
    }

    #[test]
    fn test_quadratic_repeated() {
        let sol = solve_quadratic(1.0, -4.0, 4.0).unwrap();
        assert_eq!(sol.value.discriminant, 0.0);
        assert_eq!(sol.value.roots, QuadraticRoots::Repeated { x: 2.0 });
    }

    #[test]
    fn test_quadratic_complex() {
        let sol = solve_quadratic(1.0, 0.0, 1.0).unwrap();
        assert_eq!(sol.value.discriminant, -4.0);
        assert_eq!(sol.value.roots, QuadraticRoots::Complex { re: 0.0, im: 1.0 });
        assert_eq!(sol.steps[2].value, "x₁ = 0 + 1i, x₂ = 0 - 1i");
    }

    #[test]
    fn test_quadratic_rejects_zero_a() {
        let err = solve_quadratic(0.0, 1.0, 1.0).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_roots_serialize_tagged() {
        let json = serde_json::to_value(QuadraticRoots::Repeated { x: 2.0 }).unwrap();
        assert_eq!(json["type"], "repeated");
        assert_eq!(json["x"], 2.0);
    }
}
