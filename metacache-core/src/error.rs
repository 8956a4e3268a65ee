//! Error types for metacache-core

use thiserror::Error;

/// Result type alias using our error
pub type Result<T> = std::result::Result<T, MetaCacheError>;

/// Errors from encoding, decoding, importing or comparing a metadata cache.
///
/// Every variant is fatal for the operation that produced it. Nothing is
/// retried internally and no partial model is ever returned alongside an
/// error.
#[derive(Debug, Error)]
pub enum MetaCacheError {
    /// Cache or JSON version tag is not the one supported version.
    #[error("invalid metadata_version: {0} (expected v2)")]
    InvalidVersion(String),

    /// Stream ended before a declared length was satisfied, or a block is
    /// internally malformed.
    #[error("framing error: {0}")]
    Framing(String),

    /// Declared or cumulative size exceeds the configured bound.
    #[error("size limit exceeded: {requested} bytes requested, limit is {limit}")]
    SizeLimitExceeded { requested: u64, limit: u64 },

    /// A dotted name or dictionary id is absent from the column dictionary.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Primitive type has no statistics mapping.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Statistic variant disagrees with the column's declared primitive type.
    #[error("type mismatch for column '{column}': declared {declared}, statistic is {actual}")]
    TypeMismatch {
        column: String,
        declared: String,
        actual: &'static str,
    },

    /// Two different column descriptors share one dotted name.
    #[error("duplicate column '{0}' with conflicting type information")]
    DuplicateColumn(String),

    /// JSON tree does not have the expected cache shape.
    #[error("invalid JSON metadata: {0}")]
    InvalidJson(String),

    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetaCacheError {
    /// Create a framing error
    pub fn framing(msg: impl Into<String>) -> Self {
        MetaCacheError::Framing(msg.into())
    }

    /// Create a column-not-found error
    pub fn column_not_found(msg: impl Into<String>) -> Self {
        MetaCacheError::ColumnNotFound(msg.into())
    }

    /// Create an unsupported-type error
    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        MetaCacheError::UnsupportedType(msg.into())
    }

    /// Create an invalid-JSON error
    pub fn invalid_json(msg: impl Into<String>) -> Self {
        MetaCacheError::InvalidJson(msg.into())
    }
}
