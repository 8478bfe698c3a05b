use std::path::Path;

use crate::error::{read_file, Result, TallyError};

/// Seeded into `categories.json` by `tally init`.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "groceries",
    "dining",
    "transport",
    "shopping",
    "utilities",
    "rent",
    "entertainment",
    "travel",
    "health",
    "subscriptions",
    "income",
    "transfer",
];

/// The legal user categories, in the order they are numbered for the user.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    labels: Vec<String>,
}

impl Catalog {
    #[cfg(test)]
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        let labels: Vec<String> =
            serde_json::from_str(&content).map_err(|e| TallyError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self { labels })
    }

    /// Label at a 0-based index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(String::as_str).enumerate()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(&path, r#"["dining", "groceries", "rent"]"#).unwrap();
        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(0), Some("dining"));
        assert_eq!(catalog.get(2), Some("rent"));
        assert_eq!(catalog.get(3), None);
    }

    #[test]
    fn test_malformed_catalog_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(&path, r#"{"dining": 1}"#).unwrap();
        assert!(matches!(Catalog::load(&path), Err(TallyError::Malformed { .. })));
    }
}
