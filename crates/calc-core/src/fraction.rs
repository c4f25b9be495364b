//! Fraction arithmetic with GCD reduction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::format_number;
use crate::integer::gcd;
use crate::step::{Solution, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFraction")]
pub struct Fraction {
    pub num: i64,
    pub den: i64,
}

#[derive(Deserialize)]
struct RawFraction {
    num: i64,
    den: i64,
}

impl TryFrom<RawFraction> for Fraction {
    type Error = CalcError;

    fn try_from(raw: RawFraction) -> Result<Self, Self::Error> {
        Fraction::new(raw.num, raw.den)
    }
}

impl Fraction {
    pub fn new(num: i64, den: i64) -> CalcResult<Self> {
        if den == 0 {
            return Err(CalcError::domain("Denominator cannot be zero"));
        }
        Ok(Self { num, den })
    }

    fn from_wide(num: i128, den: i128) -> CalcResult<Self> {
        if den == 0 {
            return Err(CalcError::domain("Cannot divide by a zero fraction"));
        }
        let overflow = || CalcError::domain("fraction is too large to represent");
        Ok(Self {
            num: i64::try_from(num).map_err(|_| overflow())?,
            den: i64::try_from(den).map_err(|_| overflow())?,
        })
    }

    /// Divide both parts by `gcd(|num|, |den|)` and move the sign to the numerator.
    pub fn reduce(self) -> CalcResult<Self> {
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs()) as i128;
        let (mut num, mut den) = (self.num as i128 / g, self.den as i128 / g);
        if den < 0 {
            num = -num;
            den = -den;
        }
        // i64::MIN over a negative denominator can leave the i64 range
        Self::from_wide(num, den)
    }

    /// `a/b + c/d = (ad + cb) / bd`, unreduced.
    pub fn add(self, other: Fraction) -> CalcResult<Fraction> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * d + c * b, b * d)
    }

    /// `a/b - c/d = (ad - cb) / bd`, unreduced.
    pub fn sub(self, other: Fraction) -> CalcResult<Fraction> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * d - c * b, b * d)
    }

    pub fn mul(self, other: Fraction) -> CalcResult<Fraction> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * c, b * d)
    }

    /// Multiply by the reciprocal of `other`.
    pub fn div(self, other: Fraction) -> CalcResult<Fraction> {
        let (a, b, c, d) = self.wide(other);
        Self::from_wide(a * d, b * c)
    }

    fn wide(self, other: Fraction) -> (i128, i128, i128, i128) {
        (
            self.num as i128,
            self.den as i128,
            other.num as i128,
            other.den as i128,
        )
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn to_mixed(self) -> MixedNumber {
        let n = self.num.unsigned_abs();
        let d = self.den.unsigned_abs();
        MixedNumber {
            negative: (self.num < 0) != (self.den < 0) && self.num != 0,
            whole: n / d,
            num: n % d,
            den: d,
        }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl std::str::FromStr for Fraction {
    type Err = CalcError;

    /// `"3/4"`, `"-2/5"` or a whole number `"7"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CalcError::Validation(format!("invalid fraction: {s}"));
        match s.trim().split_once('/') {
            Some((n, d)) => Fraction::new(
                n.trim().parse().map_err(|_| bad())?,
                d.trim().parse().map_err(|_| bad())?,
            ),
            None => Fraction::new(s.trim().parse().map_err(|_| bad())?, 1),
        }
    }
}

/// `whole num/den` with the sign carried separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedNumber {
    pub negative: bool,
    pub whole: u64,
    pub num: u64,
    pub den: u64,
}

impl fmt::Display for MixedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        match (self.whole, self.num) {
            (0, 0) => write!(f, "0"),
            (0, r) => write!(f, "{sign}{r}/{}", self.den),
            (w, 0) => write!(f, "{sign}{w}"),
            (w, r) => write!(f, "{sign}{w} {r}/{}", self.den),
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractionOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl FractionOp {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '×',
            Self::Divide => '÷',
        }
    }
}

impl std::str::FromStr for FractionOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" | "+" => Ok(Self::Add),
            "subtract" | "sub" | "-" => Ok(Self::Subtract),
            "multiply" | "mul" | "*" | "x" | "×" => Ok(Self::Multiply),
            "divide" | "div" | "/" | "÷" => Ok(Self::Divide),
            _ => Err(format!("invalid fraction operation: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FractionOutcome {
    pub unsimplified: Fraction,
    pub simplified: Fraction,
    pub decimal: f64,
    pub mixed: String,
}

pub fn calculate(a: Fraction, op: FractionOp, b: Fraction) -> CalcResult<Solution<FractionOutcome>> {
    let raw = match op {
        FractionOp::Add => a.add(b)?,
        FractionOp::Subtract => a.sub(b)?,
        FractionOp::Multiply => a.mul(b)?,
        FractionOp::Divide => a.div(b)?,
    };
    let simplified = raw.reduce()?;
    let mixed = simplified.to_mixed().to_string();
    let decimal = simplified.to_f64();

    let rule = match op {
        FractionOp::Add | FractionOp::Subtract => format!(
            "({} × {}) {} ({} × {}) over {} × {}",
            a.num, b.den, op.symbol(), b.num, a.den, a.den, b.den
        ),
        FractionOp::Multiply => format!(
            "({} × {}) / ({} × {})",
            a.num, b.num, a.den, b.den
        ),
        FractionOp::Divide => format!(
            "{a} × {}/{} (multiply by the reciprocal)",
            b.den, b.num
        ),
    };
    let steps = vec![
        Step::new("Problem", format!("{a} {} {b}", op.symbol())),
        Step::new("Apply operation", rule),
        Step::new("Unsimplified result", raw.to_string()),
        Step::new(
            "Simplify by GCD",
            format!(
                "GCD({}, {}) = {} → {simplified}",
                raw.num.unsigned_abs(),
                raw.den.unsigned_abs(),
                gcd(raw.num.unsigned_abs(), raw.den.unsigned_abs())
            ),
        ),
        Step::new("Decimal", format_number(decimal, 6)),
        Step::new("Mixed number", mixed.clone()),
    ];

    Ok(Solution::new(
        FractionOutcome {
            unsimplified: raw,
            simplified,
            decimal,
            mixed,
        },
        steps,
    ))
}
