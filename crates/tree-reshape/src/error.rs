//! Error types for tree reshaping.
//!
//! Only terminal conditions are errors. An all-null leaf (empty branch) and
//! an unrecognised axis name are absorbed by the walker and never surface here.

use thiserror::Error;

/// Errors that abort a conversion call.
#[derive(Error, Debug)]
pub enum ReshapeError {
    /// No parameter was discovered, or nothing survived the walk.
    #[error("no data returned, requested range may be out of bounds")]
    NoData,

    /// A buffer length disagrees with the shape derived from axis cardinalities.
    #[error("shape mismatch in {context}: expected {expected}, found {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// The retrieval tree carries a value that cannot be coerced.
    #[error("invalid retrieval tree: {0}")]
    InvalidTree(String),

    /// A decoded document is missing a required axis or range.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ReshapeError {
    /// Create a NoData error.
    pub fn no_data() -> Self {
        Self::NoData
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create an InvalidTree error.
    pub fn invalid_tree(msg: impl Into<String>) -> Self {
        Self::InvalidTree(msg.into())
    }

    /// Create an InvalidDocument error.
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Whether this error means the request simply matched no data.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

impl From<serde_json::Error> for ReshapeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDocument(err.to_string())
    }
}

/// Result type for reshaping operations.
pub type Result<T> = std::result::Result<T, ReshapeError>;
