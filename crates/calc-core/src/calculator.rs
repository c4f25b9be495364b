//! Typed dispatch over every calculator.
//!
//! A [`CalcRequest`] is the tagged union `{"calculatorType": ..., "input": {...}}`.
//! Running it yields a [`Computed`] document whose `result` is the serialized
//! outcome of that calculator, ready to be shown or logged to history.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalcError, CalcResult};
use crate::fraction::{self, Fraction, FractionOp};
use crate::grades::{self, Assignment, Category, Course, GpaScale};
use crate::matrix::{self, Matrix, MatrixOp};
use crate::percentage::{self, PercentageMode};
use crate::polynomial::{self, DEFAULT_VARIABLE};
use crate::record::CalculationRecord;
use crate::stats::{self, DeviationKind};
use crate::step::{Solution, Step};
use crate::trig::{self, AngleUnit};
use crate::validation::parse_number_list;
use crate::{equation, expression, integer, ratio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorKind {
    Basic,
    Percentage,
    Ratio,
    Proportion,
    Average,
    Statistics,
    StandardDeviation,
    Gpa,
    Grade,
    WeightedGrade,
    Factorial,
    PermutationCombination,
    LcmGcd,
    LinearEquation,
    QuadraticEquation,
    Matrix,
    Fraction,
    Derivative,
    Integral,
    Trigonometry,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 20] = [
        Self::Basic,
        Self::Percentage,
        Self::Ratio,
        Self::Proportion,
        Self::Average,
        Self::Statistics,
        Self::StandardDeviation,
        Self::Gpa,
        Self::Grade,
        Self::WeightedGrade,
        Self::Factorial,
        Self::PermutationCombination,
        Self::LcmGcd,
        Self::LinearEquation,
        Self::QuadraticEquation,
        Self::Matrix,
        Self::Fraction,
        Self::Derivative,
        Self::Integral,
        Self::Trigonometry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Percentage => "percentage",
            Self::Ratio => "ratio",
            Self::Proportion => "proportion",
            Self::Average => "average",
            Self::Statistics => "statistics",
            Self::StandardDeviation => "standard-deviation",
            Self::Gpa => "gpa",
            Self::Grade => "grade",
            Self::WeightedGrade => "weighted-grade",
            Self::Factorial => "factorial",
            Self::PermutationCombination => "permutation-combination",
            Self::LcmGcd => "lcm-gcd",
            Self::LinearEquation => "linear-equation",
            Self::QuadraticEquation => "quadratic-equation",
            Self::Matrix => "matrix",
            Self::Fraction => "fraction",
            Self::Derivative => "derivative",
            Self::Integral => "integral",
            Self::Trigonometry => "trigonometry",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Basic => "Evaluate an arithmetic expression",
            Self::Percentage => "Percent of a value, reverse percentage, increase and decrease",
            Self::Ratio => "Simplify a ratio to lowest whole-number terms",
            Self::Proportion => "Solve a:b = c:x",
            Self::Average => "Mean, median, mode and range of a list",
            Self::Statistics => "Descriptive statistics including variance",
            Self::StandardDeviation => "Population or sample standard deviation",
            Self::Gpa => "Credit-weighted GPA on a 4.0 or 5.0 scale",
            Self::Grade => "Percentage and letter grade from assignment scores",
            Self::WeightedGrade => "Final grade from weighted categories",
            Self::Factorial => "n! with exact digits up to 34!",
            Self::PermutationCombination => "P(n,r) and C(n,r)",
            Self::LcmGcd => "LCM, GCD and prime factorizations",
            Self::LinearEquation => "Solve ax + b = 0",
            Self::QuadraticEquation => "Solve ax² + bx + c = 0",
            Self::Matrix => "Add, subtract, multiply, transpose or take the determinant",
            Self::Fraction => "Fraction arithmetic with simplification",
            Self::Derivative => "Differentiate a polynomial",
            Self::Integral => "Integrate a polynomial, optionally between bounds",
            Self::Trigonometry => "Six trigonometric ratios of an angle",
        }
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CalculatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s_lower)
            .ok_or_else(|| format!("invalid calculator type: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A list of numbers, given either as a JSON array or as comma-separated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberList {
    List(Vec<f64>),
    Text(String),
}

impl NumberList {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::List(v) => v.clone(),
            Self::Text(s) => parse_number_list(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInput {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageInput {
    pub mode: PercentageMode,
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioInput {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionInput {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesInput {
    pub values: NumberList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationInput {
    pub values: NumberList,
    #[serde(default)]
    pub kind: DeviationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaInput {
    #[serde(default)]
    pub scale: GpaScale,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeInput {
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedGradeInput {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorialInput {
    pub n: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationInput {
    pub n: i64,
    pub r: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcmGcdInput {
    pub numbers: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearInput {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadraticInput {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixInput {
    pub operation: MatrixOp,
    pub a: Matrix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Matrix>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractionInput {
    pub a: Fraction,
    pub operation: FractionOp,
    pub b: Fraction,
}

fn default_variable() -> char {
    DEFAULT_VARIABLE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivativeInput {
    pub expression: String,
    #[serde(default = "default_variable")]
    pub variable: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegralInput {
    pub expression: String,
    #[serde(default = "default_variable")]
    pub variable: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrigInput {
    pub angle: f64,
    #[serde(default)]
    pub unit: AngleUnit,
}

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calculatorType", content = "input", rename_all = "kebab-case")]
pub enum CalcRequest {
    Basic(BasicInput),
    Percentage(PercentageInput),
    Ratio(RatioInput),
    Proportion(ProportionInput),
    Average(ValuesInput),
    Statistics(ValuesInput),
    StandardDeviation(DeviationInput),
    Gpa(GpaInput),
    Grade(GradeInput),
    WeightedGrade(WeightedGradeInput),
    Factorial(FactorialInput),
    PermutationCombination(PermutationInput),
    LcmGcd(LcmGcdInput),
    LinearEquation(LinearInput),
    QuadraticEquation(QuadraticInput),
    Matrix(MatrixInput),
    Fraction(FractionInput),
    Derivative(DerivativeInput),
    Integral(IntegralInput),
    Trigonometry(TrigInput),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Computed {
    pub calculator_type: CalculatorKind,
    pub result: Value,
    pub steps: Vec<Step>,
}

impl Computed {
    /// History record for this result, with `input` as the caller sent it.
    pub fn into_record(self, input: Value) -> CalcResult<CalculationRecord> {
        CalculationRecord::new(self.calculator_type.as_str(), input, self.result, self.steps)
    }
}

fn computed<T: Serialize>(kind: CalculatorKind, sol: Solution<T>) -> CalcResult<Computed> {
    Ok(Computed {
        calculator_type: kind,
        result: serde_json::to_value(&sol.value)?,
        steps: sol.steps,
    })
}

impl CalcRequest {
    /// Build a request from a calculator name and its raw JSON input.
    pub fn from_parts(calculator_type: &str, input: Value) -> CalcResult<Self> {
        let kind: CalculatorKind = calculator_type.parse().map_err(CalcError::Validation)?;
        let tagged = serde_json::json!({ "calculatorType": kind.as_str(), "input": input });
        serde_json::from_value(tagged)
            .map_err(|e| CalcError::Validation(format!("invalid {kind} input: {e}")))
    }

    pub fn kind(&self) -> CalculatorKind {
        match self {
            Self::Basic(_) => CalculatorKind::Basic,
            Self::Percentage(_) => CalculatorKind::Percentage,
            Self::Ratio(_) => CalculatorKind::Ratio,
            Self::Proportion(_) => CalculatorKind::Proportion,
            Self::Average(_) => CalculatorKind::Average,
            Self::Statistics(_) => CalculatorKind::Statistics,
            Self::StandardDeviation(_) => CalculatorKind::StandardDeviation,
            Self::Gpa(_) => CalculatorKind::Gpa,
            Self::Grade(_) => CalculatorKind::Grade,
            Self::WeightedGrade(_) => CalculatorKind::WeightedGrade,
            Self::Factorial(_) => CalculatorKind::Factorial,
            Self::PermutationCombination(_) => CalculatorKind::PermutationCombination,
            Self::LcmGcd(_) => CalculatorKind::LcmGcd,
            Self::LinearEquation(_) => CalculatorKind::LinearEquation,
            Self::QuadraticEquation(_) => CalculatorKind::QuadraticEquation,
            Self::Matrix(_) => CalculatorKind::Matrix,
            Self::Fraction(_) => CalculatorKind::Fraction,
            Self::Derivative(_) => CalculatorKind::Derivative,
            Self::Integral(_) => CalculatorKind::Integral,
            Self::Trigonometry(_) => CalculatorKind::Trigonometry,
        }
    }

    /// The `input` half of the tagged representation.
    pub fn input_json(&self) -> CalcResult<Value> {
        let mut tagged = serde_json::to_value(self)?;
        Ok(tagged
            .get_mut("input")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    pub fn run(&self) -> CalcResult<Computed> {
        let kind = self.kind();
        match self {
            Self::Basic(i) => computed(kind, expression::evaluation(&i.expression)?),
            Self::Percentage(i) => computed(kind, percentage::calculate(i.mode, i.a, i.b)?),
            Self::Ratio(i) => computed(kind, ratio::simplify_ratio(i.a, i.b)?),
            Self::Proportion(i) => computed(kind, ratio::solve_proportion(i.a, i.b, i.c)?),
            Self::Average(i) => computed(kind, stats::average(&i.values.values())?),
            Self::Statistics(i) => computed(kind, stats::summarize(&i.values.values())?),
            Self::StandardDeviation(i) => {
                computed(kind, stats::deviation(&i.values.values(), i.kind)?)
            }
            Self::Gpa(i) => computed(kind, grades::gpa(&i.courses, i.scale)?),
            Self::Grade(i) => computed(kind, grades::grade(&i.assignments)?),
            Self::WeightedGrade(i) => computed(kind, grades::weighted_grade(&i.categories)?),
            Self::Factorial(i) => computed(kind, integer::factorial_solution(i.n)?),
            Self::PermutationCombination(i) => {
                computed(kind, integer::permutation_combination(i.n, i.r)?)
            }
            Self::LcmGcd(i) => computed(kind, integer::lcm_gcd(&i.numbers)?),
            Self::LinearEquation(i) => computed(kind, equation::solve_linear(i.a, i.b)?),
            Self::QuadraticEquation(i) => {
                computed(kind, equation::solve_quadratic(i.a, i.b, i.c)?)
            }
            Self::Matrix(i) => computed(kind, matrix::calculate(i.operation, &i.a, i.b.as_ref())?),
            Self::Fraction(i) => computed(kind, fraction::calculate(i.a, i.operation, i.b)?),
            Self::Derivative(i) => computed(kind, polynomial::derivative(&i.expression, i.variable)?),
            Self::Integral(i) => {
                let bounds = match (i.lower, i.upper) {
                    (Some(lo), Some(hi)) => Some((lo, hi)),
                    (None, None) => None,
                    _ => {
                        return Err(CalcError::validation(
                            "both lower and upper limits are required for a definite integral",
                        ))
                    }
                };
                computed(kind, polynomial::integral(&i.expression, i.variable, bounds)?)
            }
            Self::Trigonometry(i) => computed(kind, trig::trig_values(i.angle, i.unit)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in CalculatorKind::ALL {
            assert_eq!(kind.as_str().parse::<CalculatorKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                Value::String(kind.as_str().to_string())
            );
        }
        assert!("calculus".parse::<CalculatorKind>().is_err());
    }

    #[test]
    fn test_tagged_request() {
        let req: CalcRequest = serde_json::from_value(json!({
            "calculatorType": "quadratic-equation",
            "input": {"a": 1, "b": -3, "c": 2}
        }))
        .unwrap();
        assert_eq!(req.kind(), CalculatorKind::QuadraticEquation);
        let out = req.run().unwrap();
        assert_eq!(out.result["roots"]["type"], "twoReal");
        assert!(!out.steps.is_empty());
    }

    #[test]
    fn test_from_parts_validation() {
        let err = CalcRequest::from_parts("nope", json!({})).unwrap_err();
        assert!(matches!(err, CalcError::Validation(_)));
        let err = CalcRequest::from_parts("factorial", json!({"k": 3})).unwrap_err();
        assert!(err.to_string().contains("factorial"));
    }

    #[test]
    fn test_number_list_forms() {
        let a = CalcRequest::from_parts("average", json!({"values": [1, 2, 3]})).unwrap();
        let b = CalcRequest::from_parts("average", json!({"values": "1, 2, x, 3"})).unwrap();
        assert_eq!(a.run().unwrap().result, b.run().unwrap().result);
    }

    #[test]
    fn test_fraction_request() {
        let req = CalcRequest::from_parts(
            "fraction",
            json!({"a": {"num": 1, "den": 2}, "operation": "add", "b": {"num": 1, "den": 3}}),
        )
        .unwrap();
        let out = req.run().unwrap();
        assert_eq!(out.result["simplified"], json!({"num": 5, "den": 6}));
        assert!(CalcRequest::from_parts(
            "fraction",
            json!({"a": {"num": 1, "den": 0}, "operation": "add", "b": {"num": 1, "den": 3}}),
        )
        .is_err());
    }

    #[test]
    fn test_integral_bounds_pairing() {
        let req = CalcRequest::from_parts("integral", json!({"expression": "x", "lower": 0}))
            .unwrap();
        assert!(matches!(req.run(), Err(CalcError::Validation(_))));
        let req = CalcRequest::from_parts(
            "integral",
            json!({"expression": "2x", "lower": 0, "upper": 3}),
        )
        .unwrap();
        assert_eq!(req.run().unwrap().result["value"], json!(9.0));
    }

    #[test]
    fn test_unsupported_derivative_is_error() {
        let req = CalcRequest::from_parts("derivative", json!({"expression": "sin(x)"})).unwrap();
        assert!(matches!(req.run(), Err(CalcError::Unsupported(_))));
    }

    #[test]
    fn test_into_record() {
        let req = CalcRequest::from_parts("factorial", json!({"n": 5})).unwrap();
        let input = req.input_json().unwrap();
        let rec = req.run().unwrap().into_record(input).unwrap();
        assert_eq!(rec.calculator_type, "factorial");
        assert_eq!(rec.input, json!({"n": 5}));
        assert_eq!(rec.result["value"], json!(120.0));
    }
}
