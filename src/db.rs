use std::path::Path;

use rusqlite::Connection;

use crate::error::{Result, TallyError};

/// Bumped whenever the layout of `transactions` changes.
pub const SCHEMA_VERSION: i64 = 1;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id TEXT PRIMARY KEY,
    datetime INTEGER NOT NULL,
    amount TEXT NOT NULL,
    name TEXT NOT NULL,
    merchant_name TEXT,
    plaid_category TEXT,
    plaid_subcategory TEXT,
    account TEXT NOT NULL,
    is_categorized INTEGER NOT NULL DEFAULT 0,
    my_category TEXT
);

CREATE INDEX IF NOT EXISTS idx_transactions_account_datetime
    ON transactions (account, datetime);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > SCHEMA_VERSION {
        return Err(TallyError::Other(format!(
            "database schema version {version} is newer than this build supports ({SCHEMA_VERSION})"
        )));
    }
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    Ok(())
}

/// Open the store at `db_path`, creating the schema when needed.
pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = get_connection(db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tables, vec!["transactions".to_string()]);
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_init_db_sets_schema_version() {
        let (_dir, conn) = test_db();
        let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let (_dir, conn) = test_db();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        assert!(init_db(&conn).is_err());
    }
}
