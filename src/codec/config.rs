//! Configuration options for the entry codec.
//!
//! This module provides the [`CodecConfig`] struct which controls how strictly
//! cached documents are decoded, how deep acquisition trees may nest, and how
//! output is formatted.

use super::recovery::RecoveryMode;
use serde::{Deserialize, Serialize};

/// Default bound on indirect-acquisition nesting.
pub const DEFAULT_MAX_DEPTH: usize = 12;

/// Configuration for [`EntryCodec`](super::EntryCodec).
///
/// # Examples
///
/// ```ignore
/// use opds_entry::codec::{CodecConfig, RecoveryMode};
///
/// // Defaults: depth 12, lenient recovery, compact output
/// let config = CodecConfig::default();
///
/// // Reject any field-level problem while decoding
/// let config = CodecConfig::new()
///     .with_recovery_mode(RecoveryMode::Strict)
///     .with_pretty(true);
/// ```
///
/// The configuration deserializes from application settings; omitted keys
/// take their default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum nesting of indirect acquisitions below an acquisition link.
    ///
    /// Documents nesting deeper fail with
    /// [`SerializationError::DepthExceeded`](crate::SerializationError::DepthExceeded),
    /// both when encoding and when decoding.
    pub max_depth: usize,

    /// What to do with a field that cannot be interpreted while decoding.
    pub recovery: RecoveryMode,

    /// Pretty-print JSON written to streams.
    pub pretty: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            recovery: RecoveryMode::default(),
            pretty: false,
        }
    }
}

impl CodecConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum indirect-acquisition depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the recovery mode.
    #[must_use]
    pub const fn with_recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.recovery = mode;
        self
    }

    /// Enables pretty-printed stream output.
    #[must_use]
    pub const fn with_pretty(mut self, enabled: bool) -> Self {
        self.pretty = enabled;
        self
    }
}
