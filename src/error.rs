use std::path::PathBuf;

use thiserror::Error;

use crate::models::Account;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Access token for {account} is not set (expected {var})")]
    MissingCredential { account: Account, var: String },

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Unable to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Invalid stored transaction {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Transaction source returned {status}: {body}")]
    Source { status: u16, body: String },

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;

/// Read a whole file, keeping the path in the error.
pub fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| TallyError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}
