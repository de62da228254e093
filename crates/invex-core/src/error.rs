//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// The input document could not be processed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised for an unusable page-text document.
///
/// Missing fields never produce these; only a document the engine cannot
/// read at all does. Every variant names the file it came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The page list is empty.
    #[error("{file_name}: document has no pages")]
    NoPages { file_name: String },

    /// Every page is blank.
    #[error("{file_name}: no text found on any of {pages} pages")]
    NoText { file_name: String, pages: usize },

    /// The page list is not an array of strings.
    #[error("{file_name}: malformed page list: {reason}")]
    MalformedPages { file_name: String, reason: String },
}

impl DocumentError {
    /// File name the error is tagged with.
    pub fn file_name(&self) -> &str {
        match self {
            DocumentError::NoPages { file_name }
            | DocumentError::NoText { file_name, .. }
            | DocumentError::MalformedPages { file_name, .. } => file_name,
        }
    }
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
