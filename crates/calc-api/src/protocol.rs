use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use calc_core::{CalcResult, CalculationRecord, Computed, Step};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/calculate`. Every field is optional here so that a
/// missing one is reported through the normal error envelope.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub calculator_type: Option<String>,
    pub input: Option<Value>,
    pub result: Option<Value>,
    pub steps: Option<Vec<Step>>,
}

impl SaveRequest {
    pub fn into_record(self) -> CalcResult<CalculationRecord> {
        CalculationRecord::new(
            self.calculator_type.unwrap_or_default(),
            self.input.unwrap_or_default(),
            self.result.unwrap_or_default(),
            self.steps.unwrap_or_default(),
        )
    }
}

/// Query of `GET /api/history/{calculatorType}`. `limit` stays a string so a
/// malformed value falls back to the default instead of rejecting the call.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
}

impl HistoryQuery {
    pub fn effective_limit(&self, default: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub calculation_id: String,
    pub message: String,
}

impl SaveResponse {
    pub fn saved(calculation_id: String) -> Self {
        Self {
            success: true,
            calculation_id,
            message: "Calculation saved successfully".into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<CalculationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub computed: Computed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub error: String,
}

/// Error envelope `{success: false, message, error}` with its status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            status,
            message: message.into(),
            error: error.to_string(),
        }
    }

    pub fn save_failed(error: impl ToString) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Error saving calculation", error)
    }

    pub fn history_failed(error: impl ToString) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching history", error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, error = %self.error, "{}", self.message);
        let body = ErrorBody {
            success: false,
            message: self.message,
            error: self.error,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_limit() {
        let q = |s: Option<&str>| HistoryQuery {
            limit: s.map(String::from),
        };
        assert_eq!(q(None).effective_limit(10), 10);
        assert_eq!(q(Some("3")).effective_limit(10), 3);
        assert_eq!(q(Some("0")).effective_limit(10), 10);
        assert_eq!(q(Some("-2")).effective_limit(10), 10);
        assert_eq!(q(Some("abc")).effective_limit(10), 10);
    }

    #[test]
    fn test_save_request_missing_fields() {
        let req: SaveRequest = serde_json::from_value(json!({"input": {"a": 1}})).unwrap();
        assert!(req.into_record().is_err());

        let req: SaveRequest = serde_json::from_value(json!({
            "calculatorType": "percentage",
            "input": {"a": 1},
            "result": 2
        }))
        .unwrap();
        let rec = req.into_record().unwrap();
        assert!(rec.steps.is_empty());
    }

    #[test]
    fn test_save_response_shape() {
        let v = serde_json::to_value(SaveResponse::saved("01J".into())).unwrap();
        assert_eq!(v["calculationId"], "01J");
        assert_eq!(v["success"], true);
    }
}
