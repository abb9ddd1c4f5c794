//! Recovery strategies for malformed fields in cached documents.
//!
//! When a field of a stored entry cannot be interpreted, the decoder either
//! records the problem on the entry and carries on ([`RecoveryMode::Lenient`])
//! or rejects the whole document ([`RecoveryMode::Strict`]). Problems that make
//! the document structurally unusable (missing `id`, unknown availability
//! type, excessive nesting) are hard errors in both modes.

use crate::error::{Result, SerializationError};
use crate::parse_error::ParseError;
use serde::{Deserialize, Serialize};

/// Strategy for handling malformed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    /// Record the problem as a [`ParseError`] and keep decoding (default)
    #[default]
    Lenient,
    /// Fail the decode on the first malformed field
    Strict,
}

/// Recovery context for a single decode call
#[derive(Debug)]
pub struct RecoveryContext {
    /// Current recovery mode
    pub mode: RecoveryMode,
    /// Problems recorded so far
    pub errors: Vec<ParseError>,
}

impl RecoveryContext {
    /// Create a new recovery context with the given mode
    #[must_use]
    pub fn new(mode: RecoveryMode) -> Self {
        RecoveryContext {
            mode,
            errors: Vec::new(),
        }
    }

    /// Whether any problems were recorded
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Try to recover from a malformed field based on the recovery mode
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::InvalidField`] in strict mode, otherwise
    /// records the problem and returns `Ok(None)`.
    pub fn recover<T>(&mut self, error: ParseError) -> Result<Option<T>> {
        match self.mode {
            RecoveryMode::Strict => {
                tracing::warn!(error = %error, "rejecting document in strict mode");
                Err(SerializationError::InvalidField {
                    field: error.location.unwrap_or_default(),
                    reason: error.message,
                })
            },
            RecoveryMode::Lenient => {
                tracing::debug!(error = %error, "field degraded to parse error");
                self.errors.push(error);
                Ok(None)
            },
        }
    }

    /// Recover from a problem that has already been handled by substituting
    /// a best-effort value.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::InvalidField`] in strict mode.
    pub fn note(&mut self, error: ParseError) -> Result<()> {
        self.recover::<()>(error).map(|_| ())
    }

    /// Consume the context, returning the recorded problems
    #[must_use]
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}
