//! Error types for layout loading and editor configuration.

use thiserror::Error;

/// Errors that reject a layout document as a whole.
///
/// A load either succeeds completely or leaves the current scene untouched;
/// there is no partial result.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The text is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The root value is valid JSON but not an array of records.
    #[error("layout root must be an array, found {found}")]
    NotAnArray { found: &'static str },

    /// A record with a known `type` is missing required fields or has
    /// fields of the wrong type.
    #[error("record {index} ({kind}): {source}")]
    InvalidRecord {
        index: usize,
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from parsing a host-supplied editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for layout operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
