//! Error types for tally-core operations.
//!
//! Only storage, configuration and export paths can fail. Sensor reads and the
//! detection loop never produce errors; they degrade to "no observation".

use std::path::PathBuf;

/// All errors that can occur in tally-core operations.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Home directory not found")]
    HomeDirNotFound,

    // ─────────────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Storage backend error: {0}")]
    Backend(String),

    // ─────────────────────────────────────────────────────────────────────
    // Export Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Malformed export at line {line}: {details}")]
    MalformedExport { line: usize, details: String },

    #[error("CSV error: {context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TallyError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TallyError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        TallyError::Json {
            context: context.into(),
            source,
        }
    }
}

/// Convenience type alias for Results using TallyError.
pub type Result<T> = std::result::Result<T, TallyError>;

impl From<TallyError> for String {
    fn from(err: TallyError) -> String {
        err.to_string()
    }
}
