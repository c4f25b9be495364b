use rusqlite::Connection;

use calc_core::CalcError;

pub fn init_db(conn: &Connection) -> Result<(), CalcError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS calculations (
            id TEXT PRIMARY KEY,
            calculator_type TEXT NOT NULL,
            input TEXT NOT NULL,  -- JSON
            result TEXT NOT NULL, -- JSON
            steps TEXT NOT NULL DEFAULT '[]', -- JSON array of {description, value}
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_calculations_type_created
            ON calculations(calculator_type, created_at);
        CREATE INDEX IF NOT EXISTS idx_calculations_expires ON calculations(expires_at);
        ",
    )
    .map_err(|e| CalcError::Database(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
        let tables: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='calculations'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }
}
