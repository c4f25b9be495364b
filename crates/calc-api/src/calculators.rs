use axum::http::StatusCode;
use serde_json::{json, Value};

use calc_core::{CalcError, CalcRequest, CalculatorKind, Computed};

use crate::protocol::ApiError;

/// Catalogue served by `GET /api/calculators`.
pub fn calculator_definitions() -> Value {
    let calculators: Vec<Value> = CalculatorKind::ALL
        .iter()
        .map(|kind| {
            json!({
                "calculatorType": kind.as_str(),
                "description": kind.description(),
            })
        })
        .collect();
    json!({ "success": true, "calculators": calculators })
}

fn compute_failed(e: CalcError) -> ApiError {
    if e.is_user_error() {
        ApiError::new(StatusCode::BAD_REQUEST, "Calculation failed", e)
    } else {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Calculation failed", e)
    }
}

pub fn run_calculator(name: &str, input: Value) -> Result<Computed, ApiError> {
    if name.parse::<CalculatorKind>().is_err() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Unknown calculator",
            format!("unknown calculator: {name}"),
        ));
    }
    let request = CalcRequest::from_parts(name, input).map_err(compute_failed)?;
    request.run().map_err(compute_failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_cover_every_kind() {
        let defs = calculator_definitions();
        let list = defs["calculators"].as_array().unwrap();
        assert_eq!(list.len(), CalculatorKind::ALL.len());
        assert!(list.iter().any(|d| d["calculatorType"] == "lcm-gcd"));
    }

    #[test]
    fn test_run_calculator_statuses() {
        let ok = run_calculator("percentage", json!({"mode": "of", "a": 20, "b": 50})).unwrap();
        assert_eq!(ok.result["value"], json!(10.0));

        let err = run_calculator("matrix", json!({
            "operation": "multiply",
            "a": [[1, 2, 3]],
            "b": [[1, 2]]
        }))
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = run_calculator("astrology", json!({})).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
