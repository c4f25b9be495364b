//! Free-form arithmetic for the basic calculator, evaluated with `meval`.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::format_number;
use crate::step::{Solution, Step};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub expression: String,
    pub value: f64,
}

/// Calculator keypads print `×` and `÷`; meval only knows `*` and `/`.
fn normalize(expr: &str) -> String {
    expr.replace('×', "*").replace('÷', "/").replace('−', "-")
}

pub fn evaluate(expr: &str) -> CalcResult<f64> {
    let normalized = normalize(expr);
    if normalized.trim().is_empty() {
        return Err(CalcError::validation("Please enter an expression"));
    }
    let parsed = normalized
        .parse::<meval::Expr>()
        .map_err(|e| CalcError::Validation(format!("invalid expression: {e}")))?;
    let mut ctx = meval::Context::new();
    ctx.var("tau", std::f64::consts::TAU);
    let value = parsed
        .eval_with_context(ctx)
        .map_err(|e| CalcError::Validation(format!("invalid expression: {e}")))?;
    if !value.is_finite() {
        return Err(CalcError::domain(format!(
            "`{}` does not evaluate to a finite number",
            expr.trim()
        )));
    }
    Ok(value)
}

pub fn evaluation(expr: &str) -> CalcResult<Solution<Evaluation>> {
    let value = evaluate(expr)?;
    let expression = expr.trim().to_string();
    let steps = vec![
        Step::new("Expression", expression.clone()),
        Step::new("Result", format_number(value, 10)),
    ];
    Ok(Solution::new(Evaluation { expression, value }, steps))
}
