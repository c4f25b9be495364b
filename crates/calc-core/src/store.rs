use chrono::{DateTime, Utc};

use crate::error::CalcResult;
use crate::record::{CalculationRecord, HistoryStats};

pub trait HistoryStore {
    // Write
    fn save(&self, record: CalculationRecord) -> CalcResult<String>;

    // Read (expired records are never returned)
    fn get(&self, id: &str) -> CalcResult<Option<CalculationRecord>>;
    fn recent(&self, calculator_type: &str, limit: usize) -> CalcResult<Vec<CalculationRecord>>;
    fn list_types(&self) -> CalcResult<Vec<(String, usize)>>;

    // Lifecycle
    fn purge_expired(&self, now: DateTime<Utc>) -> CalcResult<usize>;

    // Stats
    fn count(&self) -> CalcResult<usize>;
    fn stats(&self) -> CalcResult<HistoryStats>;
}
