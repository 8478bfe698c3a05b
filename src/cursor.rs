use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{read_file, Result, TallyError};
use crate::models::Account;

type Cursors = BTreeMap<String, Option<String>>;

/// Per-account sync cursors kept in one JSON object, keyed by lower-cased
/// account tag. Every write rewrites the whole file; there is no locking, so
/// two processes sharing a data directory can lose each other's updates.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means no account has synced yet. A file that exists but
    /// does not parse is an error.
    fn read_all(&self) -> Result<Cursors> {
        if !self.path.exists() {
            return Ok(Cursors::new());
        }
        let content = read_file(&self.path)?;
        serde_json::from_str(&content).map_err(|e| TallyError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn get_cursor(&self, account: Account) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(&account.cursor_key()).flatten())
    }

    pub fn set_cursor(&self, account: Account, cursor: Option<&str>) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(account.cursor_key(), cursor.map(str::to_string));
        let json = serde_json::to_string_pretty(&all)?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        debug!(account = %account, path = %self.path.display(), "cursor saved");
        Ok(())
    }

    /// Write an empty cursor file unless one is already there.
    pub fn init(&self) -> Result<()> {
        if !self.path.exists() {
            std::fs::write(&self.path, "{}\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CursorStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::new(dir.path().join("cursors.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_has_no_cursor() {
        let (_dir, store) = store();
        assert_eq!(store.get_cursor(Account::Bilt).unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, store) = store();
        store.set_cursor(Account::Bilt, Some("abc")).unwrap();
        assert_eq!(store.get_cursor(Account::Bilt).unwrap().as_deref(), Some("abc"));
        assert_eq!(store.get_cursor(Account::Venmo).unwrap(), None);
    }

    #[test]
    fn test_accounts_are_independent() {
        let (_dir, store) = store();
        store.set_cursor(Account::Bilt, Some("b1")).unwrap();
        store.set_cursor(Account::ChasePrime, Some("c1")).unwrap();
        store.set_cursor(Account::Bilt, Some("b2")).unwrap();
        assert_eq!(store.get_cursor(Account::Bilt).unwrap().as_deref(), Some("b2"));
        assert_eq!(store.get_cursor(Account::ChasePrime).unwrap().as_deref(), Some("c1"));
    }

    #[test]
    fn test_clear_cursor() {
        let (_dir, store) = store();
        store.set_cursor(Account::Venmo, Some("v1")).unwrap();
        store.set_cursor(Account::Venmo, None).unwrap();
        assert_eq!(store.get_cursor(Account::Venmo).unwrap(), None);
    }

    #[test]
    fn test_file_keyed_by_lowercase_tag() {
        let (_dir, store) = store();
        store.set_cursor(Account::ChasePrime, Some("c1")).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["chaseprime"], "c1");
    }

    #[test]
    fn test_reads_null_entries() {
        let (_dir, store) = store();
        std::fs::write(store.path(), r#"{"bilt": null, "venmo": "v9"}"#).unwrap();
        assert_eq!(store.get_cursor(Account::Bilt).unwrap(), None);
        assert_eq!(store.get_cursor(Account::Venmo).unwrap().as_deref(), Some("v9"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "not json").unwrap();
        assert!(store.get_cursor(Account::Bilt).is_err());
        assert!(store.set_cursor(Account::Bilt, Some("x")).is_err());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let (_dir, store) = store();
        store.set_cursor(Account::Bilt, Some("b1")).unwrap();
        store.init().unwrap();
        assert_eq!(store.get_cursor(Account::Bilt).unwrap().as_deref(), Some("b1"));
    }
}
