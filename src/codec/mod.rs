//! JSON persistence for feed entries.
//!
//! Entries and feeds are cached as JSON documents so that a catalog can be
//! restored offline without re-fetching and re-parsing the OPDS source. The
//! document layout is fixed by the key names in this module; every optional
//! field is omitted when absent, every sequence is always written.
//!
//! Decoding is tolerant: a malformed optional field becomes a
//! [`ParseError`](crate::ParseError) on the restored entry rather than a
//! failure, unless [`RecoveryMode::Strict`] is configured. A missing `id`,
//! `title`, `updated` or `availability`, an unknown availability type, and
//! acquisition trees nested beyond [`CodecConfig::max_depth`] always fail.
//!
//! Timestamps are written as RFC 3339 in UTC, which only has room for the
//! years 0000 through 9999. The encoder refuses timestamps outside that
//! range and the decoder treats them like any other malformed timestamp.
//!
//! # Examples
//!
//! ```ignore
//! use opds_entry::codec::{CodecConfig, EntryCodec};
//!
//! let codec = EntryCodec::new(CodecConfig::new().with_pretty(true));
//! let document = codec.encode_entry(&entry)?;
//! let restored = codec.decode_entry(&document)?;
//! assert_eq!(restored, entry);
//! # Ok::<(), opds_entry::SerializationError>(())
//! ```

mod config;
mod decode;
mod encode;
mod recovery;

pub use config::{CodecConfig, DEFAULT_MAX_DEPTH};
pub use recovery::{RecoveryContext, RecoveryMode};

use crate::acquisition::{AcquisitionLink, IndirectAcquisition, PreviewAcquisition};
use crate::availability::AvailabilityState;
use crate::category::Category;
use crate::entry::FeedEntry;
use crate::error::Result;
use crate::feed::AcquisitionFeed;
use crate::licensor::DrmLicensor;
use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;
use std::io::{Read, Write};

/// Whether `timestamp` has a four-digit RFC 3339 form in UTC.
pub(crate) fn timestamp_in_range(timestamp: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&timestamp.year())
}

/// Key names of the cache document.
pub(crate) mod keys {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const UPDATED: &str = "updated";
    pub const SUMMARY: &str = "summary";
    pub const DISTRIBUTION: &str = "distribution";
    pub const AUTHORS: &str = "authors";
    pub const NARRATORS: &str = "narrators";
    pub const ILLUSTRATORS: &str = "illustrators";
    pub const TRANSLATORS: &str = "translators";
    pub const CATEGORIES: &str = "categories";
    pub const GROUPS: &str = "groups";
    pub const ACQUISITIONS: &str = "acquisitions";
    pub const PREVIEW_ACQUISITIONS: &str = "preview_acquisitions";
    pub const AVAILABILITY: &str = "availability";
    pub const LANGUAGE: &str = "language";
    pub const PUBLISHER: &str = "publisher";
    pub const PUBLISHED: &str = "published";
    pub const SELECTED: &str = "selected";
    pub const DURATION: &str = "duration";
    pub const COVER: &str = "cover";
    pub const THUMBNAIL: &str = "thumbnail";
    pub const ALTERNATE: &str = "alternate";
    pub const ANALYTICS: &str = "analytics";
    pub const ANNOTATIONS: &str = "annotations";
    pub const ISSUES: &str = "issues";
    pub const RELATED: &str = "related";
    pub const TIME_TRACKING: &str = "time_tracking";
    pub const LICENSOR: &str = "licensor";
    pub const ACCESSIBILITY: &str = "accessibility";
    pub const ERRORS: &str = "errors";

    // availability
    pub const TYPE: &str = "type";
    pub const QUEUE_POSITION: &str = "queue_position";
    pub const QUEUE: &str = "queue";
    pub const READY: &str = "ready";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const REVOKE: &str = "revoke";
    pub const COPIES_AVAILABLE: &str = "copies_available";
    pub const COPIES: &str = "copies";

    // links and nested objects
    pub const RELATION: &str = "relation";
    pub const URI: &str = "uri";
    pub const INDIRECT_ACQUISITIONS: &str = "indirect_acquisitions";
    pub const NAME: &str = "name";
    pub const TERM: &str = "term";
    pub const SCHEME: &str = "scheme";
    pub const LABEL: &str = "label";
    pub const VENDOR: &str = "vendor";
    pub const CLIENT_TOKEN: &str = "client_token";
    pub const CLIENT_TOKEN_URL: &str = "client_token_url";
    pub const DEVICE_MANAGER: &str = "device_manager";
    pub const WAYS_OF_READING: &str = "ways_of_reading";
    pub const CONFORMS_TO: &str = "conforms_to";
    pub const MESSAGE: &str = "message";
    pub const LOCATION: &str = "location";

    // feed
    pub const ENTRIES: &str = "entries";
    pub const METADATA: &str = "metadata";
}

/// Encoder/decoder for the entry cache format.
///
/// The codec holds only its [`CodecConfig`]; it is cheap to copy and can be
/// shared between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCodec {
    config: CodecConfig,
}

impl EntryCodec {
    /// Create a codec with the given configuration.
    #[must_use]
    pub const fn new(config: CodecConfig) -> Self {
        EntryCodec { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Convert an entry to a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::DepthExceeded`](crate::SerializationError::DepthExceeded)
    /// if an acquisition tree is nested deeper than the configured bound, or
    /// [`SerializationError::InvalidField`](crate::SerializationError::InvalidField)
    /// if a timestamp falls outside the years 0000 through 9999.
    pub fn encode_entry(&self, entry: &FeedEntry) -> Result<Value> {
        encode::entry_to_json(entry, &self.config)
    }

    /// Restore an entry from a JSON document.
    ///
    /// The restored entry's errors are the persisted errors followed by any
    /// problems found while decoding.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or malformed, the
    /// availability type is unknown, the acquisition tree is too deep, or
    /// (in strict mode) any field cannot be interpreted.
    pub fn decode_entry(&self, document: &Value) -> Result<FeedEntry> {
        decode::json_to_entry(document, &self.config)
    }

    /// Convert a feed to a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry fails to encode.
    pub fn encode_feed(&self, feed: &AcquisitionFeed) -> Result<Value> {
        encode::feed_to_json(feed, &self.config)
    }

    /// Restore a feed from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the `entries` array is missing or any entry fails
    /// to decode.
    pub fn decode_feed(&self, document: &Value) -> Result<AcquisitionFeed> {
        decode::json_to_feed(document, &self.config)
    }

    /// Convert an availability state to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::InvalidField`](crate::SerializationError::InvalidField)
    /// if a hold or loan date falls outside the years 0000 through 9999.
    pub fn encode_availability(&self, availability: &AvailabilityState) -> Result<Value> {
        encode::availability_to_json(availability)
    }

    /// Convert an acquisition link, with its indirect tree, to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the indirect tree is nested too deeply.
    pub fn encode_acquisition(&self, acquisition: &AcquisitionLink) -> Result<Value> {
        encode::acquisition_to_json(acquisition, &self.config)
    }

    /// Convert a preview link to JSON.
    #[must_use]
    pub fn encode_preview_acquisition(&self, preview: &PreviewAcquisition) -> Value {
        encode::preview_to_json(preview)
    }

    /// Convert a category to JSON.
    #[must_use]
    pub fn encode_category(&self, category: &Category) -> Value {
        encode::category_to_json(category)
    }

    /// Convert a DRM licensor to JSON.
    #[must_use]
    pub fn encode_licensor(&self, licensor: &DrmLicensor) -> Value {
        encode::licensor_to_json(licensor)
    }

    /// Convert a list of indirect acquisitions to a JSON array.
    ///
    /// The list is treated as the first level below an acquisition link.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is nested too deeply.
    pub fn encode_indirect_acquisitions(
        &self,
        indirects: &[IndirectAcquisition],
    ) -> Result<Value> {
        encode::indirects_to_json(indirects, 1, &self.config)
    }

    /// Write an entry document to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the writer fails.
    pub fn write_entry<W: Write>(&self, writer: W, entry: &FeedEntry) -> Result<()> {
        let document = self.encode_entry(entry)?;
        self.write_document(writer, &document)
    }

    /// Read an entry document from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not JSON or the document does not
    /// decode.
    pub fn read_entry<R: Read>(&self, reader: R) -> Result<FeedEntry> {
        let document: Value = serde_json::from_reader(reader)?;
        self.decode_entry(&document)
    }

    /// Write a feed document to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the writer fails.
    pub fn write_feed<W: Write>(&self, writer: W, feed: &AcquisitionFeed) -> Result<()> {
        let document = self.encode_feed(feed)?;
        self.write_document(writer, &document)
    }

    /// Read a feed document from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not JSON or the document does not
    /// decode.
    pub fn read_feed<R: Read>(&self, reader: R) -> Result<AcquisitionFeed> {
        let document: Value = serde_json::from_reader(reader)?;
        self.decode_feed(&document)
    }

    fn write_document<W: Write>(&self, mut writer: W, document: &Value) -> Result<()> {
        if self.config.pretty {
            serde_json::to_writer_pretty(&mut writer, document)?;
        } else {
            serde_json::to_writer(&mut writer, document)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Convert an entry to JSON with the default configuration.
///
/// # Errors
///
/// See [`EntryCodec::encode_entry`].
pub fn entry_to_json(entry: &FeedEntry) -> Result<Value> {
    EntryCodec::default().encode_entry(entry)
}

/// Restore an entry from JSON with the default configuration.
///
/// # Errors
///
/// See [`EntryCodec::decode_entry`].
pub fn json_to_entry(document: &Value) -> Result<FeedEntry> {
    EntryCodec::default().decode_entry(document)
}
