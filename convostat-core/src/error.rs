//! Error types for convostat-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the convostat-core library
#[derive(Error, Debug)]
pub enum Error {
    /// A single input record is missing a required field or carries an
    /// unusable value. Reported alongside partial results.
    #[error("malformed record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// No valid records remained after enrichment
    #[error("dataset contains no valid records")]
    EmptyDataset,

    /// A view that needs a specific number of participants got another count
    #[error("expected exactly {expected} participants, found {actual}")]
    UnsupportedParticipantCount { expected: usize, actual: usize },

    /// Time zone name not found in the tz database
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// Unrecognized name for a bucket kind, metric, view or policy
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Export JSON is neither a message array nor an object holding one
    #[error("unrecognized export layout: {0}")]
    ExportLayout(String),

    /// Export file could not be read or decoded
    #[error("cannot ingest {path:?}: {message}")]
    Ingest { path: PathBuf, message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a [`Error::MalformedRecord`] for the record at `index`.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}

/// Result type alias for convostat-core
pub type Result<T> = std::result::Result<T, Error>;
