use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{read_file, Result, TallyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    /// Day of the month the billing cycle ("this month") starts on.
    #[serde(default = "default_cycle_start_day")]
    pub cycle_start_day: u32,
}

fn default_cycle_start_day() -> u32 {
    3
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            cycle_start_day: default_cycle_start_day(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !(1..=28).contains(&self.cycle_start_day) {
            return Err(TallyError::Settings(format!(
                "cycle_start_day must be between 1 and 28, got {}",
                self.cycle_start_day
            )));
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tally")
}

/// Settings from `path`, or defaults when the file does not exist.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = read_file(path)?;
    let settings: Settings = serde_json::from_str(&content).map_err(|e| TallyError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, format!("{json}\n"))?;
    debug!(path = %path.display(), "settings saved");
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

/// Locations of everything tally keeps in its data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `--data-dir` flag wins over the configured directory.
    pub fn resolve(flag: Option<&Path>, settings: &Settings) -> Self {
        match flag {
            Some(dir) => Self::new(dir),
            None => Self::new(shellexpand_path(&settings.data_dir)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database(&self) -> PathBuf {
        self.root.join("tally.db")
    }

    pub fn cursors(&self) -> PathBuf {
        self.root.join("cursors.json")
    }

    pub fn categories(&self) -> PathBuf {
        self.root.join("categories.json")
    }

    pub fn rules(&self) -> PathBuf {
        self.root.join("rules.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            cycle_start_day: 15,
        };
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(s.cycle_start_day, 3);
        assert!(s.data_dir.ends_with("tally"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.cycle_start_day, 3);
        assert_eq!(s.data_dir, "/tmp/test");
    }

    #[test]
    fn test_unknown_or_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"data_dir": "/tmp", "fiscal_year_start": "01"}"#).unwrap();
        assert!(load_settings_from(&path).is_err());
        std::fs::write(&path, r#"{"cycle_start_day": 31}"#).unwrap();
        assert!(load_settings_from(&path).is_err());
    }

    #[test]
    fn test_flag_overrides_configured_dir() {
        let settings = Settings {
            data_dir: "/srv/tally".to_string(),
            cycle_start_day: 3,
        };
        let paths = DataPaths::resolve(Some(Path::new("/tmp/other")), &settings);
        assert_eq!(paths.database(), PathBuf::from("/tmp/other/tally.db"));
        assert_eq!(paths.cursors(), PathBuf::from("/tmp/other/cursors.json"));
    }
}
