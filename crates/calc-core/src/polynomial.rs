//! Single-variable polynomial calculus.
//!
//! An expression is a `+`-separated list of terms, each of the form
//! `[-][coef][*]x[^n]` or a bare constant. Each term is tokenized and turned
//! into a `(coefficient, exponent)` pair; the power rule is then applied term
//! by term. Binary `-`, products of variables, parentheses and
//! non-polynomial functions are rejected with [`CalcError::Unsupported`]
//! rather than passed through.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::fmt;
use crate::step::{Solution, Step};
use crate::validation::require_finite;

pub const DEFAULT_VARIABLE: char = 'x';

/// Largest exponent magnitude the parser accepts.
pub const MAX_EXPONENT: i32 = 10_000;

fn exponent_overflow() -> CalcError {
    CalcError::domain("exponent is too large to represent")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub coef: f64,
    pub exp: i32,
}

impl Term {
    pub fn new(coef: f64, exp: i32) -> Self {
        Self { coef, exp }
    }

    /// Power rule: `c·xⁿ → c·n·xⁿ⁻¹`. Constants vanish.
    pub fn derivative(self) -> CalcResult<Option<Term>> {
        if self.exp == 0 {
            return Ok(None);
        }
        let exp = self.exp.checked_sub(1).ok_or_else(exponent_overflow)?;
        Ok(Some(Term::new(self.coef * self.exp as f64, exp)))
    }

    /// Inverse power rule: `c·xⁿ → c/(n+1)·xⁿ⁺¹`, undefined for `n = -1`.
    pub fn antiderivative(self) -> CalcResult<Term> {
        if self.exp == -1 {
            return Err(CalcError::unsupported(
                "∫ x^-1 dx = ln|x| + C is not a polynomial; only polynomial expressions in one variable are supported",
            ));
        }
        let exp = self.exp.checked_add(1).ok_or_else(exponent_overflow)?;
        Ok(Term::new(self.coef / exp as f64, exp))
    }

    pub fn eval(self, x: f64) -> f64 {
        self.coef * x.powi(self.exp)
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, var: char) -> fmt::Result {
        if self.exp == 0 {
            return write!(f, "{}", fmt(self.coef));
        }
        if self.coef == 1.0 {
            // bare variable
        } else if self.coef == -1.0 {
            write!(f, "-")?;
        } else {
            write!(f, "{}", fmt(self.coef))?;
        }
        write!(f, "{var}")?;
        if self.exp != 1 {
            write!(f, "^{}", self.exp)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    pub var: char,
    pub terms: Vec<Term>,
}

impl Polynomial {
    pub fn parse(expr: &str, var: char) -> CalcResult<Self> {
        if !var.is_ascii_alphabetic() {
            return Err(CalcError::Validation(format!("invalid variable: {var}")));
        }
        if expr.trim().is_empty() {
            return Err(CalcError::validation("Please enter an expression"));
        }
        let terms = expr
            .split('+')
            .map(|raw| parse_term(raw.trim(), var))
            .collect::<CalcResult<Vec<Term>>>()?;
        Ok(Self { var, terms })
    }

    pub fn differentiate(&self) -> CalcResult<Polynomial> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            if let Some(d) = term.derivative()? {
                if d.coef != 0.0 {
                    terms.push(d);
                }
            }
        }
        Ok(Polynomial {
            var: self.var,
            terms,
        })
    }

    /// Antiderivative without the integration constant.
    pub fn integrate(&self) -> CalcResult<Polynomial> {
        let terms = self
            .terms
            .iter()
            .filter(|t| t.coef != 0.0)
            .map(|t| t.antiderivative())
            .collect::<CalcResult<Vec<Term>>>()?;
        Ok(Polynomial {
            var: self.var,
            terms,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.terms.iter().map(|t| t.eval(x)).sum()
    }

    pub fn has_negative_exponent(&self) -> bool {
        self.terms.iter().any(|t| t.exp < 0)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<&Term> = self.terms.iter().filter(|t| t.coef != 0.0).collect();
        if terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            term.write(f, self.var)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Term tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Var,
    Caret,
    Star,
    Minus,
    Word(String),
    Symbol(char),
}

fn tokenize(term: &str, var: char) -> CalcResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = term.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut lit = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        lit.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = lit
                    .parse::<f64>()
                    .map_err(|_| CalcError::Validation(format!("invalid number: {lit}")))?;
                tokens.push(Token::Number(n));
            }
            c if c == var => {
                chars.next();
                // a variable glued to more letters is a word ("xy", "exp")
                if chars.peek().is_some_and(|n| n.is_alphabetic()) {
                    let mut word = c.to_string();
                    while let Some(&l) = chars.peek().filter(|l| l.is_alphabetic()) {
                        word.push(l);
                        chars.next();
                    }
                    tokens.push(Token::Word(word));
                } else {
                    tokens.push(Token::Var);
                }
            }
            c if c.is_alphabetic() => {
                let mut word = String::new();
                while let Some(&l) = chars.peek().filter(|l| l.is_alphabetic()) {
                    word.push(l);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            other => {
                chars.next();
                tokens.push(Token::Symbol(other));
            }
        }
    }
    Ok(tokens)
}

/// Textbook rule for common non-polynomial terms (display only).
fn rule_hint(term: &str) -> Option<&'static str> {
    let t = term.to_lowercase();
    if t.contains("sin") {
        Some("d/dx sin(x) = cos(x), ∫ sin(x) dx = -cos(x) + C")
    } else if t.contains("cos") {
        Some("d/dx cos(x) = -sin(x), ∫ cos(x) dx = sin(x) + C")
    } else if t.contains("tan") {
        Some("d/dx tan(x) = sec²(x)")
    } else if t.contains("ln") || t.contains("log") {
        Some("d/dx ln(x) = 1/x")
    } else if t.starts_with("e^") || t.contains("exp") {
        Some("d/dx eˣ = eˣ, ∫ eˣ dx = eˣ + C")
    } else if t.starts_with("1/") {
        Some("∫ 1/x dx = ln|x| + C")
    } else {
        None
    }
}

fn unsupported(term: &str, why: &str) -> CalcError {
    let mut msg = format!(
        "term `{term}` {why}; only polynomial expressions in one variable are supported"
    );
    if let Some(hint) = rule_hint(term) {
        msg.push_str(&format!(" (rule: {hint})"));
    }
    CalcError::Unsupported(msg)
}

fn parse_term(term: &str, var: char) -> CalcResult<Term> {
    if term.is_empty() {
        return Err(CalcError::validation("expression has an empty term"));
    }
    let tokens = tokenize(term, var)?;
    let mut pos = 0;

    let mut sign = 1.0;
    if tokens.first() == Some(&Token::Minus) {
        sign = -1.0;
        pos += 1;
    }

    let mut coef = None;
    if let Some(Token::Number(n)) = tokens.get(pos) {
        coef = Some(*n);
        pos += 1;
    }

    let mut exp = 0;
    let mut has_var = false;
    if tokens.get(pos) == Some(&Token::Star) && coef.is_some() {
        pos += 1;
        if tokens.get(pos) != Some(&Token::Var) {
            return Err(unsupported(term, "has `*` without a following variable"));
        }
    }
    if tokens.get(pos) == Some(&Token::Var) {
        has_var = true;
        exp = 1;
        pos += 1;
        if tokens.get(pos) == Some(&Token::Caret) {
            pos += 1;
            let neg = tokens.get(pos) == Some(&Token::Minus);
            if neg {
                pos += 1;
            }
            match tokens.get(pos) {
                Some(Token::Number(n)) if n.fract() == 0.0 && *n <= MAX_EXPONENT as f64 => {
                    exp = if neg { -(*n as i32) } else { *n as i32 };
                    pos += 1;
                }
                Some(Token::Number(n)) if n.fract() == 0.0 => {
                    return Err(CalcError::Domain(format!(
                        "exponent in `{}` is larger than {MAX_EXPONENT}",
                        term.trim()
                    )))
                }
                Some(Token::Number(_)) => {
                    return Err(unsupported(term, "has a non-integer exponent"))
                }
                _ => return Err(unsupported(term, "has a malformed exponent")),
            }
        }
    }

    if pos < tokens.len() {
        let why = match &tokens[pos] {
            Token::Minus => "uses `-` between terms (write `a + -b` instead)",
            Token::Var => "multiplies the variable by itself",
            Token::Word(_) => "contains a non-polynomial function",
            Token::Symbol('(') | Token::Symbol(')') => "uses parentheses",
            Token::Symbol('/') => "contains a division",
            _ => "could not be parsed",
        };
        return Err(unsupported(term, why));
    }
    if coef.is_none() && !has_var {
        return Err(unsupported(term, "is not a number or a power of the variable"));
    }

    Ok(Term::new(sign * coef.unwrap_or(1.0), exp))
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Derivative {
    pub original: String,
    pub derivative: String,
    pub terms: Vec<Term>,
}

pub fn derivative(expr: &str, var: char) -> CalcResult<Solution<Derivative>> {
    let poly = Polynomial::parse(expr, var)?;
    let d = poly.differentiate()?;
    let steps = vec![
        Step::new("Original Function", format!("f({var}) = {}", expr.trim())),
        Step::new(
            "Parsed Terms",
            format!("{poly}"),
        ),
        Step::new(
            "Apply Power Rule",
            format!("d/d{var}({var}^n) = n·{var}^(n-1)"),
        ),
        Step::new("Derivative", format!("f'({var}) = {d}")),
    ];
    Ok(Solution::new(
        Derivative {
            original: expr.trim().to_string(),
            derivative: d.to_string(),
            terms: d.terms,
        },
        steps,
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IntegralOutcome {
    #[serde(rename_all = "camelCase")]
    Indefinite { expression: String, integral: String },
    #[serde(rename_all = "camelCase")]
    Definite {
        expression: String,
        antiderivative: String,
        lower: f64,
        upper: f64,
        value: f64,
    },
}

/// Indefinite integral, or `F(upper) - F(lower)` when bounds are given.
pub fn integral(
    expr: &str,
    var: char,
    bounds: Option<(f64, f64)>,
) -> CalcResult<Solution<IntegralOutcome>> {
    let poly = Polynomial::parse(expr, var)?;
    let anti = poly.integrate()?;
    let expression = expr.trim().to_string();
    let mut steps = vec![
        Step::new("Original Expression", format!("∫ {expression} d{var}")),
        Step::new(
            "Apply Integration Rules",
            format!("Using power rule: ∫ {var}^n d{var} = {var}^(n+1)/(n+1) + C"),
        ),
    ];

    let Some((lower, upper)) = bounds else {
        let integral = format!("{anti} + C");
        steps.push(Step::new("Indefinite Integral Result", integral.clone()));
        return Ok(Solution::new(
            IntegralOutcome::Indefinite {
                expression,
                integral,
            },
            steps,
        ));
    };

    require_finite("lower limit", lower)?;
    require_finite("upper limit", upper)?;
    if poly.has_negative_exponent() && lower.min(upper) <= 0.0 && lower.max(upper) >= 0.0 {
        return Err(CalcError::domain(format!(
            "integrand is undefined at {var} = 0, which lies within [{}, {}]",
            fmt(lower.min(upper)),
            fmt(lower.max(upper))
        )));
    }

    let f_upper = anti.eval(upper);
    let f_lower = anti.eval(lower);
    let value = f_upper - f_lower;
    if !value.is_finite() {
        return Err(CalcError::domain("definite integral is too large to represent"));
    }

    steps.push(Step::new(
        "Definite Integral Setup",
        format!("∫ from {} to {} {expression} d{var}", fmt(lower), fmt(upper)),
    ));
    steps.push(Step::new("Antiderivative", format!("F({var}) = {anti}")));
    steps.push(Step::new(
        "Apply Limits",
        format!(
            "F({}) - F({}) = {} - {} = {}",
            fmt(upper),
            fmt(lower),
            fmt(f_upper),
            fmt(f_lower),
            fmt(value)
        ),
    ));

    Ok(Solution::new(
        IntegralOutcome::Definite {
            expression,
            antiderivative: anti.to_string(),
            lower,
            upper,
            value,
        },
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(expr: &str) -> Polynomial {
        Polynomial::parse(expr, 'x').unwrap()
    }

    #[test]
    fn test_parse_term_shapes() {
        assert_eq!(parse("3x^2").terms, vec![Term::new(3.0, 2)]);
        assert_eq!(parse("2*x^3").terms, vec![Term::new(2.0, 3)]);
        assert_eq!(parse("x").terms, vec![Term::new(1.0, 1)]);
        assert_eq!(parse("-x^2").terms, vec![Term::new(-1.0, 2)]);
        assert_eq!(parse("-4.5").terms, vec![Term::new(-4.5, 0)]);
        assert_eq!(parse("x^-2").terms, vec![Term::new(1.0, -2)]);
        assert_eq!(parse("x^2 + 3x + 5").terms.len(), 3);
    }

    #[test]
    fn test_unsupported_terms() {
        for expr in ["sin(x)", "x^2 - 3x", "x*x", "(x+1)", "x^1.5", "e^x", "1/x", "y"] {
            let err = Polynomial::parse(expr, 'x').unwrap_err();
            assert!(
                matches!(err, CalcError::Unsupported(_)),
                "{expr} should be unsupported, got {err}"
            );
        }
    }

    #[test]
    fn test_unsupported_carries_rule_hint() {
        let err = Polynomial::parse("sin(x)", 'x').unwrap_err();
        assert!(err.to_string().contains("-cos(x) + C"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            Polynomial::parse("  ", 'x'),
            Err(CalcError::Validation(_))
        ));
        assert!(matches!(
            Polynomial::parse("x + ", 'x'),
            Err(CalcError::Validation(_))
        ));
    }

    #[test]
    fn test_differentiate() {
        assert_eq!(parse("x^2 + 3x + 5").differentiate().unwrap().to_string(), "2x + 3");
        assert_eq!(parse("4x^3").differentiate().unwrap().to_string(), "12x^2");
        assert_eq!(parse("7").differentiate().unwrap().to_string(), "0");
        assert_eq!(parse("x^-1").differentiate().unwrap().to_string(), "-x^-2");
    }

    #[test]
    fn test_integrate() {
        assert_eq!(parse("3x^2 + 2x + 5").integrate().unwrap().to_string(), "x^3 + x^2 + 5x");
        assert_eq!(parse("x").integrate().unwrap().terms, vec![Term::new(0.5, 2)]);
        assert!(parse("x^-1").integrate().is_err());
    }

    #[test]
    fn test_monomial_round_trip() {
        for (c, n) in [(3.0, 1), (2.0, 2), (5.0, 4), (-1.5, 3)] {
            let mono = Polynomial {
                var: 'x',
                terms: vec![Term::new(c, n)],
            };
            let back = mono.differentiate().unwrap().integrate().unwrap();
            assert_eq!(back.terms, vec![Term::new(c, n)]);
        }
    }

    #[test]
    fn test_indefinite_integral() {
        let sol = integral("x^2 + 3x + 5", 'x', None).unwrap();
        match sol.value {
            IntegralOutcome::Indefinite { integral, .. } => {
                assert_eq!(integral, "0.3333x^3 + 1.5x^2 + 5x + C")
            }
            other => panic!("expected indefinite, got {other:?}"),
        }
    }

    #[test]
    fn test_definite_integral_evaluates_bounds() {
        let sol = integral("3x^2", 'x', Some((0.0, 2.0))).unwrap();
        match sol.value {
            IntegralOutcome::Definite { value, .. } => assert_eq!(value, 8.0),
            other => panic!("expected definite, got {other:?}"),
        }
        let sol = integral("2x + 1", 'x', Some((1.0, 3.0))).unwrap();
        match sol.value {
            IntegralOutcome::Definite { value, .. } => assert_eq!(value, 10.0),
            other => panic!("expected definite, got {other:?}"),
        }
    }

    #[test]
    fn test_definite_integral_reversed_bounds() {
        let sol = integral("1", 'x', Some((2.0, 0.0))).unwrap();
        assert!(matches!(
            sol.value,
            IntegralOutcome::Definite { value, .. } if value == -2.0
        ));
    }

    #[test]
    fn test_definite_integral_singularity() {
        assert!(integral("x^-2", 'x', Some((-1.0, 1.0))).is_err());
        assert!(integral("x^-2", 'x', Some((1.0, 2.0))).is_ok());
    }

    #[test]
    fn test_huge_exponents_rejected() {
        let err = integral("x^2147483647", 'x', None).unwrap_err();
        assert!(matches!(err, CalcError::Domain(_)));
        assert!(derivative("x^-2147483647", 'x').is_err());
        assert!(integral("x^10000", 'x', None).is_ok());
        assert!(Term::new(1.0, i32::MAX).antiderivative().is_err());
        assert!(Term::new(1.0, i32::MIN).derivative().is_err());
    }

    #[test]
    fn test_other_variable() {
        let sol = derivative("t^3", 't').unwrap();
        assert_eq!(sol.value.derivative, "3t^2");
        assert!(Polynomial::parse("x^2", 't').is_err());
    }
}
