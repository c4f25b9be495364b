use std::path::Path;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use calc_core::{
    CalcError, CalcResult, CalculationRecord, HistoryStats, HistoryStore, Step, DEFAULT_TTL_DAYS,
};

use crate::schema::init_db;

pub struct SqliteStore {
    conn: Connection,
    ttl: Duration,
}

impl SqliteStore {
    pub fn new(path: &Path) -> CalcResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CalcError::Database(format!("cannot create db directory: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| CalcError::Database(format!("cannot open database: {e}")))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CalcError::Database(e.to_string()))?;
        init_db(&conn)?;
        Ok(Self {
            conn,
            ttl: Duration::days(DEFAULT_TTL_DAYS),
        })
    }

    pub fn in_memory() -> CalcResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CalcError::Database(format!("cannot open in-memory db: {e}")))?;
        init_db(&conn)?;
        Ok(Self {
            conn,
            ttl: Duration::days(DEFAULT_TTL_DAYS),
        })
    }

    /// Override how long new records stay readable.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fixed-width UTC timestamps so that text comparison orders them correctly.
fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CalculationRecord> {
    let input_json: String = row.get(2)?;
    let result_json: String = row.get(3)?;
    let steps_json: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;

    Ok(CalculationRecord {
        id: row.get(0)?,
        calculator_type: row.get(1)?,
        input: serde_json::from_str(&input_json).unwrap_or_default(),
        result: serde_json::from_str(&result_json).unwrap_or_default(),
        steps: serde_json::from_str::<Vec<Step>>(&steps_json).unwrap_or_default(),
        created_at: parse_dt(&created_at_str),
    })
}

const SELECT_COLS: &str = "id, calculator_type, input, result, steps, created_at";

// ---------------------------------------------------------------------------
// HistoryStore impl
// ---------------------------------------------------------------------------

impl HistoryStore for SqliteStore {
    fn save(&self, record: CalculationRecord) -> CalcResult<String> {
        let input_json = serde_json::to_string(&record.input)?;
        let result_json = serde_json::to_string(&record.result)?;
        let steps_json = serde_json::to_string(&record.steps)?;

        self.conn
            .execute(
                "INSERT INTO calculations (id, calculator_type, input, result, steps,
                 created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.calculator_type,
                    input_json,
                    result_json,
                    steps_json,
                    ts(record.created_at),
                    ts(record.expires_at(self.ttl)),
                ],
            )
            .map_err(|e| CalcError::Database(e.to_string()))?;

        tracing::debug!(id = %record.id, calculator_type = %record.calculator_type, "saved calculation");
        Ok(record.id)
    }

    fn get(&self, id: &str) -> CalcResult<Option<CalculationRecord>> {
        let sql = format!("SELECT {SELECT_COLS} FROM calculations WHERE id = ?1 AND expires_at > ?2");
        self.conn
            .query_row(&sql, params![id, ts(Utc::now())], row_to_record)
            .optional()
            .map_err(|e| CalcError::Database(e.to_string()))
    }

    fn recent(&self, calculator_type: &str, limit: usize) -> CalcResult<Vec<CalculationRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM calculations
             WHERE calculator_type = ?1 AND expires_at > ?2
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?3"
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| CalcError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![calculator_type, ts(Utc::now()), limit as i64],
                row_to_record,
            )
            .map_err(|e| CalcError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| CalcError::Database(e.to_string()))?);
        }
        tracing::debug!(calculator_type, limit, found = results.len(), "history query");
        Ok(results)
    }

    fn list_types(&self) -> CalcResult<Vec<(String, usize)>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT calculator_type, COUNT(*) FROM calculations
                 WHERE expires_at > ?1
                 GROUP BY calculator_type ORDER BY calculator_type",
            )
            .map_err(|e| CalcError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![ts(Utc::now())], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| CalcError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| CalcError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> CalcResult<usize> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM calculations WHERE expires_at <= ?1",
                params![ts(now)],
            )
            .map_err(|e| CalcError::Database(e.to_string()))?;
        if removed > 0 {
            tracing::info!(removed, "purged expired calculations");
        }
        Ok(removed)
    }

    fn count(&self) -> CalcResult<usize> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM calculations WHERE expires_at > ?1",
                params![ts(Utc::now())],
                |row| row.get::<_, usize>(0),
            )
            .map_err(|e| CalcError::Database(e.to_string()))
    }

    fn stats(&self) -> CalcResult<HistoryStats> {
        let now = ts(Utc::now());
        let total_records = self.count()?;

        let (total_types, oldest, newest): (usize, Option<String>, Option<String>) = self
            .conn
            .query_row(
                "SELECT COUNT(DISTINCT calculator_type), MIN(created_at), MAX(created_at)
                 FROM calculations WHERE expires_at > ?1",
                params![now],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| CalcError::Database(e.to_string()))?;

        Ok(HistoryStats {
            total_records,
            total_types,
            oldest_record: oldest.as_deref().map(parse_dt),
            newest_record: newest.as_deref().map(parse_dt),
        })
    }
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_store() -> SqliteStore {
        SqliteStore::in_memory().unwrap()
    }

    fn make_record(calculator_type: &str, result: i64) -> CalculationRecord {
        CalculationRecord::new(
            calculator_type,
            json!({"value": result}),
            json!(result),
            vec![Step::new("Result", result.to_string())],
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_get() {
        let store = test_store();
        let rec = make_record("percentage", 10);
        let id = store.save(rec.clone()).unwrap();

        let got = store.get(&id).unwrap().unwrap();
        assert_eq!(got.calculator_type, "percentage");
        assert_eq!(got.input, json!({"value": 10}));
        assert_eq!(got.steps, rec.steps);
        assert_eq!(got.created_at, rec.created_at);
    }

    #[test]
    fn test_get_not_found() {
        let store = test_store();
        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_recent_newest_first_and_limited() {
        let store = test_store();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.save(make_record("factorial", i)).unwrap());
        }
        store.save(make_record("matrix", 99)).unwrap();

        let recent = store.recent("factorial", 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, ids[4]);
        assert_eq!(recent[1].id, ids[3]);
        assert_eq!(recent[2].id, ids[2]);
        assert!(recent.iter().all(|r| r.calculator_type == "factorial"));
    }

    #[test]
    fn test_recent_ties_use_insertion_order() {
        let store = test_store();
        let first = make_record("ratio", 1);
        let mut second = make_record("ratio", 2);
        second.created_at = first.created_at;
        store.save(first).unwrap();
        let second_id = store.save(second).unwrap();

        let recent = store.recent("ratio", 1).unwrap();
        assert_eq!(recent[0].id, second_id);
    }

    #[test]
    fn test_expired_records_hidden_and_purged() {
        let store = test_store();
        let mut old = make_record("gpa", 3);
        old.created_at = Utc::now() - Duration::days(31);
        let old_id = store.save(old).unwrap();
        store.save(make_record("gpa", 4)).unwrap();

        assert!(store.get(&old_id).unwrap().is_none());
        assert_eq!(store.recent("gpa", 10).unwrap().len(), 1);
        assert_eq!(store.count().unwrap(), 1);

        assert_eq!(store.purge_expired(Utc::now()).unwrap(), 1);
        assert_eq!(store.purge_expired(Utc::now()).unwrap(), 0);
    }

    #[test]
    fn test_custom_ttl() {
        let store = test_store().with_ttl(Duration::seconds(60));
        let id = store.save(make_record("trigonometry", 1)).unwrap();
        assert!(store.get(&id).unwrap().is_some());
        assert_eq!(store.purge_expired(Utc::now() + Duration::seconds(61)).unwrap(), 1);
    }

    #[test]
    fn test_list_types_and_stats() {
        let store = test_store();
        store.save(make_record("fraction", 1)).unwrap();
        store.save(make_record("fraction", 2)).unwrap();
        store.save(make_record("average", 3)).unwrap();

        let types = store.list_types().unwrap();
        assert_eq!(types, vec![("average".to_string(), 1), ("fraction".to_string(), 2)]);

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_types, 2);
        assert!(stats.oldest_record <= stats.newest_record);
    }

    #[test]
    fn test_empty_stats() {
        let stats = test_store().stats().unwrap();
        assert_eq!(stats.total_records, 0);
        assert!(stats.oldest_record.is_none());
    }

    #[test]
    fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        let id = {
            let store = SqliteStore::new(&path).unwrap();
            store.save(make_record("lcm-gcd", 12)).unwrap()
        };
        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().result, json!(12));
    }
}
