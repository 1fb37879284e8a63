//! Store error types.
//!
//! Store mutations never fail; only the file-backed boundaries (storage
//! file, settings file) produce errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage file is not a JSON object.
    #[error("invalid storage file {path}")]
    InvalidStorage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize storage")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
