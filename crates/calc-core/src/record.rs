use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalcError, CalcResult};
use crate::step::Step;

/// Days a saved calculation stays readable.
pub const DEFAULT_TTL_DAYS: i64 = 30;

/// One logged calculation. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: String,
    pub calculator_type: String,
    pub input: Value,
    pub result: Value,
    #[serde(default)]
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    pub fn new(
        calculator_type: impl Into<String>,
        input: Value,
        result: Value,
        steps: Vec<Step>,
    ) -> CalcResult<Self> {
        let calculator_type = calculator_type.into().trim().to_string();
        if calculator_type.is_empty() {
            return Err(CalcError::validation("calculatorType is required"));
        }
        if input.is_null() {
            return Err(CalcError::validation("input is required"));
        }
        if result.is_null() {
            return Err(CalcError::validation("result is required"));
        }
        Ok(Self {
            id: ulid::Ulid::new().to_string(),
            calculator_type,
            input,
            result,
            steps,
            // stored with microsecond precision
            created_at: Utc::now().trunc_subsecs(6),
        })
    }

    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at + ttl
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at(ttl) <= now
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_records: usize,
    pub total_types: usize,
    pub oldest_record: Option<DateTime<Utc>>,
    pub newest_record: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_record() {
        let rec = CalculationRecord::new(
            " percentage ",
            json!({"a": 20, "b": 50}),
            json!(10),
            vec![Step::new("Result", "10")],
        )
        .unwrap();
        assert_eq!(rec.calculator_type, "percentage");
        assert_eq!(rec.id.len(), 26);
    }

    #[test]
    fn test_required_fields() {
        assert!(CalculationRecord::new("", json!(1), json!(1), vec![]).is_err());
        assert!(CalculationRecord::new("x", Value::Null, json!(1), vec![]).is_err());
        assert!(CalculationRecord::new("x", json!(1), Value::Null, vec![]).is_err());
    }

    #[test]
    fn test_expiry() {
        let rec = CalculationRecord::new("x", json!(1), json!(2), vec![]).unwrap();
        let ttl = Duration::days(DEFAULT_TTL_DAYS);
        assert!(!rec.is_expired(ttl, rec.created_at + Duration::days(29)));
        assert!(rec.is_expired(ttl, rec.created_at + Duration::days(30)));
    }

    #[test]
    fn test_camel_case_json() {
        let rec = CalculationRecord::new("lcm-gcd", json!([4, 6]), json!(12), vec![]).unwrap();
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["calculatorType"], "lcm-gcd");
        assert!(v.get("createdAt").is_some());
    }
}
