//! Acquisition feed entries.
//!
//! A [`FeedEntry`] is the immutable, fully-validated description of one
//! catalog item (book or audiobook). Entries are only created through
//! [`FeedEntryBuilder`](crate::FeedEntryBuilder) and are never mutated
//! afterwards; sharing an entry across threads needs no locking.
//!
//! # Examples
//!
//! ```ignore
//! use opds_entry::{AcquisitionLink, AcquisitionRelation, AvailabilityState, FeedEntryBuilder};
//!
//! let mut builder = FeedEntryBuilder::new("urn:isbn:9780000000001", "Sample Book", updated,
//!     AvailabilityState::loanable());
//! builder.add_author("A. Author");
//! builder.add_acquisition(AcquisitionLink::new(AcquisitionRelation::Borrow, borrow_url,
//!     "application/epub+zip"));
//! let entry = builder.build();
//!
//! assert_eq!(entry.authors_comma_separated(), "A. Author");
//! ```

use crate::accessibility::Accessibility;
use crate::acquisition::{AcquisitionLink, PreviewAcquisition};
use crate::availability::AvailabilityState;
use crate::category::Category;
use crate::entry_builder::FeedEntryBuilder;
use crate::licensor::DrmLicensor;
use crate::parse_error::ParseError;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use url::Url;

/// A named group (lane) an entry belongs to.
///
/// Groups are compared on the full (name, URI) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Group {
    /// Display name of the group
    pub name: String,
    /// Feed URI of the group
    pub uri: Url,
}

impl Group {
    /// Create a group.
    #[must_use]
    pub fn new(name: impl Into<String>, uri: Url) -> Self {
        Group {
            name: name.into(),
            uri,
        }
    }
}

/// One catalog item from an acquisition feed.
///
/// Equality and hashing cover every field except [`errors`](Self::errors),
/// which are diagnostics about the parse that produced the entry rather than
/// part of its identity.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) updated: DateTime<Utc>,
    pub(crate) summary: String,
    pub(crate) authors: Vec<String>,
    pub(crate) narrators: Vec<String>,
    pub(crate) illustrators: Vec<String>,
    pub(crate) translators: Vec<String>,
    pub(crate) categories: Vec<Category>,
    pub(crate) language: Option<String>,
    pub(crate) publisher: Option<String>,
    pub(crate) published: Option<DateTime<Utc>>,
    pub(crate) distribution: String,
    pub(crate) duration_seconds: Option<f64>,
    pub(crate) cover: Option<Url>,
    pub(crate) thumbnail: Option<Url>,
    pub(crate) alternate: Option<Url>,
    pub(crate) analytics: Option<Url>,
    pub(crate) annotations: Option<Url>,
    pub(crate) issues: Option<Url>,
    pub(crate) related: Option<Url>,
    pub(crate) time_tracking: Option<Url>,
    pub(crate) groups: BTreeSet<Group>,
    pub(crate) acquisitions: Vec<AcquisitionLink>,
    pub(crate) preview_acquisitions: Vec<PreviewAcquisition>,
    pub(crate) availability: AvailabilityState,
    pub(crate) licensor: Option<DrmLicensor>,
    pub(crate) selected: Option<DateTime<Utc>>,
    pub(crate) accessibility: Option<Accessibility>,
    pub(crate) errors: Vec<ParseError>,
}

impl FeedEntry {
    /// Create a builder seeded with every field of this entry except its
    /// parse errors.
    ///
    /// See [`FeedEntryBuilder::from_entry`].
    #[must_use]
    pub fn to_builder(&self) -> FeedEntryBuilder {
        FeedEntryBuilder::from_entry(self)
    }

    /// Entry identifier (unique within its feed by caller convention)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Time of the last update
    #[must_use]
    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Summary; empty when the feed supplied none
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Authors in document order
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Narrators in document order
    #[must_use]
    pub fn narrators(&self) -> &[String] {
        &self.narrators
    }

    /// Illustrators in document order
    #[must_use]
    pub fn illustrators(&self) -> &[String] {
        &self.illustrators
    }

    /// Translators in document order
    #[must_use]
    pub fn translators(&self) -> &[String] {
        &self.translators
    }

    /// Categories in document order
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Language tag
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Publisher
    #[must_use]
    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    /// Publication date
    #[must_use]
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    /// Distributor; empty when the feed supplied none
    #[must_use]
    pub fn distribution(&self) -> &str {
        &self.distribution
    }

    /// Playing time in seconds (audiobooks)
    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }

    /// Cover image
    #[must_use]
    pub fn cover(&self) -> Option<&Url> {
        self.cover.as_ref()
    }

    /// Thumbnail image
    #[must_use]
    pub fn thumbnail(&self) -> Option<&Url> {
        self.thumbnail.as_ref()
    }

    /// Alternate (web) representation
    #[must_use]
    pub fn alternate(&self) -> Option<&Url> {
        self.alternate.as_ref()
    }

    /// Circulation analytics endpoint
    #[must_use]
    pub fn analytics(&self) -> Option<&Url> {
        self.analytics.as_ref()
    }

    /// Annotations (bookmarks) endpoint
    #[must_use]
    pub fn annotations(&self) -> Option<&Url> {
        self.annotations.as_ref()
    }

    /// Problem-report endpoint
    #[must_use]
    pub fn issues(&self) -> Option<&Url> {
        self.issues.as_ref()
    }

    /// Related-works feed
    #[must_use]
    pub fn related(&self) -> Option<&Url> {
        self.related.as_ref()
    }

    /// Listening-time tracking endpoint
    #[must_use]
    pub fn time_tracking(&self) -> Option<&Url> {
        self.time_tracking.as_ref()
    }

    /// Groups the entry belongs to
    #[must_use]
    pub fn groups(&self) -> &BTreeSet<Group> {
        &self.groups
    }

    /// Acquisition links in document order
    #[must_use]
    pub fn acquisitions(&self) -> &[AcquisitionLink] {
        &self.acquisitions
    }

    /// Preview links in document order
    #[must_use]
    pub fn preview_acquisitions(&self) -> &[PreviewAcquisition] {
        &self.preview_acquisitions
    }

    /// Lending status
    #[must_use]
    pub fn availability(&self) -> &AvailabilityState {
        &self.availability
    }

    /// DRM licensor
    #[must_use]
    pub fn licensor(&self) -> Option<&DrmLicensor> {
        self.licensor.as_ref()
    }

    /// When the entry was added to the user's selection
    #[must_use]
    pub fn selected(&self) -> Option<DateTime<Utc>> {
        self.selected
    }

    /// Accessibility summary
    #[must_use]
    pub fn accessibility(&self) -> Option<&Accessibility> {
        self.accessibility.as_ref()
    }

    /// Problems recorded while the entry was built
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// True if any parse errors were recorded
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Authors joined with `", "`.
    #[must_use]
    pub fn authors_comma_separated(&self) -> String {
        self.authors.join(", ")
    }
}

impl PartialEq for FeedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.updated == other.updated
            && self.summary == other.summary
            && self.authors == other.authors
            && self.narrators == other.narrators
            && self.illustrators == other.illustrators
            && self.translators == other.translators
            && self.categories == other.categories
            && self.language == other.language
            && self.publisher == other.publisher
            && self.published == other.published
            && self.distribution == other.distribution
            && self.duration_seconds.map(f64::to_bits) == other.duration_seconds.map(f64::to_bits)
            && self.cover == other.cover
            && self.thumbnail == other.thumbnail
            && self.alternate == other.alternate
            && self.analytics == other.analytics
            && self.annotations == other.annotations
            && self.issues == other.issues
            && self.related == other.related
            && self.time_tracking == other.time_tracking
            && self.groups == other.groups
            && self.acquisitions == other.acquisitions
            && self.preview_acquisitions == other.preview_acquisitions
            && self.availability == other.availability
            && self.licensor == other.licensor
            && self.selected == other.selected
            && self.accessibility == other.accessibility
    }
}

impl Eq for FeedEntry {}

impl Hash for FeedEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.title.hash(state);
        self.updated.hash(state);
        self.summary.hash(state);
        self.authors.hash(state);
        self.narrators.hash(state);
        self.illustrators.hash(state);
        self.translators.hash(state);
        self.categories.hash(state);
        self.language.hash(state);
        self.publisher.hash(state);
        self.published.hash(state);
        self.distribution.hash(state);
        self.duration_seconds.map(f64::to_bits).hash(state);
        self.cover.hash(state);
        self.thumbnail.hash(state);
        self.alternate.hash(state);
        self.analytics.hash(state);
        self.annotations.hash(state);
        self.issues.hash(state);
        self.related.hash(state);
        self.time_tracking.hash(state);
        self.groups.hash(state);
        self.acquisitions.hash(state);
        self.preview_acquisitions.hash(state);
        self.availability.hash(state);
        self.licensor.hash(state);
        self.selected.hash(state);
        self.accessibility.hash(state);
    }
}
