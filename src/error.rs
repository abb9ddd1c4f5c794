//! Error types for entry serialization.
//!
//! This module provides the [`SerializationError`] type for all codec
//! operations and the [`Result`] convenience type. Field-level problems that
//! do not prevent an entry from being built are *not* errors in this sense;
//! they are recorded as [`ParseError`](crate::ParseError) values on the entry.

use thiserror::Error;

/// Error type for all codec operations.
///
/// A `SerializationError` means a structurally valid document could not be
/// produced or consumed at all. It always aborts the single encode or decode
/// call that raised it.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// The document does not have the expected overall shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A structurally required key is absent.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field holds a value that cannot be interpreted, or a timestamp
    /// that has no RFC 3339 form.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Key of the offending field.
        field: String,
        /// Human-readable cause.
        reason: String,
    },

    /// The availability object carries a tag outside the six known variants.
    #[error("Unknown availability type: {0}")]
    UnknownAvailability(String),

    /// Indirect acquisitions are nested deeper than the configured bound.
    #[error("Indirect acquisitions nested deeper than {max} levels")]
    DepthExceeded {
        /// The configured maximum depth.
        max: usize,
    },

    /// Error from the JSON reader or writer.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SerializationError {
    /// Shorthand for [`SerializationError::InvalidField`].
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SerializationError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`SerializationError`].
pub type Result<T> = std::result::Result<T, SerializationError>;
