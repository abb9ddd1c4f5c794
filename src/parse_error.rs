//! Recoverable, field-level construction problems.
//!
//! A [`ParseError`] records one sub-element of a catalog entry that could not
//! be interpreted. Entries carry them as diagnostics; they never abort
//! construction.

use std::fmt;

/// One recoverable problem encountered while building an entry field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    /// Human-readable description of the problem
    pub message: String,
    /// Source-document locator (element path, line, key), if known
    pub location: Option<String>,
}

impl ParseError {
    /// Create a parse error without a location.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            location: None,
        }
    }

    /// Create a parse error pointing at a location in the source document.
    #[must_use]
    pub fn at(location: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            location: Some(location.into()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
