//! Incremental construction of [`FeedEntry`] values.
//!
//! A document parser allocates one [`FeedEntryBuilder`] per catalog entry,
//! feeds it fields in whatever order the source document presents them, and
//! finishes with [`FeedEntryBuilder::build`]. Builders are plain owned values:
//! they are not shared and should not be mutated from more than one task.
//!
//! Mutators return `&mut Self`, so calls can be chained:
//!
//! ```ignore
//! use opds_entry::{AvailabilityState, FeedEntryBuilder};
//!
//! let entry = FeedEntryBuilder::new("e1", "Sample Book", updated, AvailabilityState::loanable())
//!     .add_author("A. Author")
//!     .add_narrator("N. Narrator")
//!     .set_publisher_option(Some("Example Press".to_string()))
//!     .build();
//! ```
//!
//! # Ordering and replacement
//!
//! - `add_*` appends; the order of calls is the order consumers observe.
//! - `set_*` replaces the previous value unconditionally.
//! - Groups form a set: adding the same (name, URI) pair twice keeps one.
//!
//! # Validation
//!
//! [`build`](FeedEntryBuilder::build) never fails. The few checks the
//! builder performs itself (availability date ordering, duration range)
//! happen when the value is set, and a failure is appended to the entry's
//! errors as a [`ParseError`] with a best-effort value kept in its place.

use crate::accessibility::Accessibility;
use crate::acquisition::{AcquisitionLink, PreviewAcquisition};
use crate::availability::AvailabilityState;
use crate::category::Category;
use crate::entry::{FeedEntry, Group};
use crate::licensor::DrmLicensor;
use crate::parse_error::ParseError;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use url::Url;

/// Mutable accumulator for a single [`FeedEntry`].
#[derive(Debug, Clone)]
pub struct FeedEntryBuilder {
    id: String,
    title: String,
    updated: DateTime<Utc>,
    summary: String,
    authors: Vec<String>,
    narrators: Vec<String>,
    illustrators: Vec<String>,
    translators: Vec<String>,
    categories: Vec<Category>,
    language: Option<String>,
    publisher: Option<String>,
    published: Option<DateTime<Utc>>,
    distribution: String,
    duration_seconds: Option<f64>,
    cover: Option<Url>,
    thumbnail: Option<Url>,
    alternate: Option<Url>,
    analytics: Option<Url>,
    annotations: Option<Url>,
    issues: Option<Url>,
    related: Option<Url>,
    time_tracking: Option<Url>,
    groups: BTreeSet<Group>,
    acquisitions: Vec<AcquisitionLink>,
    preview_acquisitions: Vec<PreviewAcquisition>,
    availability: AvailabilityState,
    licensor: Option<DrmLicensor>,
    selected: Option<DateTime<Utc>>,
    accessibility: Option<Accessibility>,
    errors: Vec<ParseError>,
}

impl FeedEntryBuilder {
    /// Create a builder from the four required fields.
    ///
    /// Optional fields start absent and sequences start empty.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        updated: DateTime<Utc>,
        availability: AvailabilityState,
    ) -> Self {
        let mut builder = FeedEntryBuilder {
            id: id.into(),
            title: title.into(),
            updated,
            summary: String::new(),
            authors: Vec::with_capacity(4),
            narrators: Vec::new(),
            illustrators: Vec::new(),
            translators: Vec::new(),
            categories: Vec::with_capacity(8),
            language: None,
            publisher: None,
            published: None,
            distribution: String::new(),
            duration_seconds: None,
            cover: None,
            thumbnail: None,
            alternate: None,
            analytics: None,
            annotations: None,
            issues: None,
            related: None,
            time_tracking: None,
            groups: BTreeSet::new(),
            acquisitions: Vec::with_capacity(8),
            preview_acquisitions: Vec::new(),
            availability: AvailabilityState::loanable(),
            licensor: None,
            selected: None,
            accessibility: None,
            errors: Vec::new(),
        };
        builder.set_availability(availability);
        builder
    }

    /// Create a builder seeded with every field of `entry`.
    ///
    /// Groups, acquisitions and previews are re-added one at a time in their
    /// original order, so `from_entry(e).build() == e`.
    ///
    /// The entry's parse errors are deliberately **not** copied: they describe
    /// the parse that produced `entry`, not the derived copy.
    #[must_use]
    pub fn from_entry(entry: &FeedEntry) -> Self {
        let mut builder = FeedEntryBuilder::new(
            entry.id.clone(),
            entry.title.clone(),
            entry.updated,
            entry.availability.clone(),
        );

        for acquisition in &entry.acquisitions {
            builder.add_acquisition(acquisition.clone());
        }
        for group in &entry.groups {
            builder.add_group(group.name.clone(), group.uri.clone());
        }
        for author in &entry.authors {
            builder.add_author(author.clone());
        }
        for narrator in &entry.narrators {
            builder.add_narrator(narrator.clone());
        }
        for illustrator in &entry.illustrators {
            builder.add_illustrator(illustrator.clone());
        }
        for translator in &entry.translators {
            builder.add_translator(translator.clone());
        }
        for category in &entry.categories {
            builder.add_category(category.clone());
        }
        for preview in &entry.preview_acquisitions {
            builder.add_preview_acquisition(preview.clone());
        }

        builder
            .set_cover_option(entry.cover.clone())
            .set_thumbnail_option(entry.thumbnail.clone())
            .set_alternate_option(entry.alternate.clone())
            .set_analytics_option(entry.analytics.clone())
            .set_annotations_option(entry.annotations.clone())
            .set_issues_option(entry.issues.clone())
            .set_related_option(entry.related.clone())
            .set_time_tracking_option(entry.time_tracking.clone())
            .set_published_option(entry.published)
            .set_publisher_option(entry.publisher.clone())
            .set_language_option(entry.language.clone())
            .set_distribution(entry.distribution.clone())
            .set_licensor_option(entry.licensor.clone())
            .set_selected_option(entry.selected)
            .set_duration_option(entry.duration_seconds)
            .set_accessibility_option(entry.accessibility.clone())
            .set_summary_option(Some(entry.summary.clone()));

        builder
    }

    /// Record a field that could not be interpreted.
    pub fn add_parse_error(&mut self, error: ParseError) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Append an acquisition link.
    pub fn add_acquisition(&mut self, acquisition: AcquisitionLink) -> &mut Self {
        self.acquisitions.push(acquisition);
        self
    }

    /// Append a preview link.
    pub fn add_preview_acquisition(&mut self, preview: PreviewAcquisition) -> &mut Self {
        self.preview_acquisitions.push(preview);
        self
    }

    /// Append an author.
    pub fn add_author(&mut self, name: impl Into<String>) -> &mut Self {
        self.authors.push(name.into());
        self
    }

    /// Append a narrator.
    pub fn add_narrator(&mut self, name: impl Into<String>) -> &mut Self {
        self.narrators.push(name.into());
        self
    }

    /// Append an illustrator.
    pub fn add_illustrator(&mut self, name: impl Into<String>) -> &mut Self {
        self.illustrators.push(name.into());
        self
    }

    /// Append a translator.
    pub fn add_translator(&mut self, name: impl Into<String>) -> &mut Self {
        self.translators.push(name.into());
        self
    }

    /// Append a category.
    pub fn add_category(&mut self, category: Category) -> &mut Self {
        self.categories.push(category);
        self
    }

    /// Add the entry to a group. Duplicate (name, URI) pairs are ignored.
    pub fn add_group(&mut self, name: impl Into<String>, uri: Url) -> &mut Self {
        self.groups.insert(Group::new(name, uri));
        self
    }

    /// Replace the availability.
    ///
    /// Date ordering is checked here; see [`AvailabilityState::validated`].
    pub fn set_availability(&mut self, availability: AvailabilityState) -> &mut Self {
        let (availability, problem) = availability.validated();
        if let Some(problem) = problem {
            tracing::trace!(id = %self.id, error = %problem, "availability adjusted");
            self.errors.push(problem);
        }
        self.availability = availability;
        self
    }

    /// Replace the summary. `None` resets it to the empty string.
    pub fn set_summary_option(&mut self, summary: Option<String>) -> &mut Self {
        self.summary = summary.unwrap_or_default();
        self
    }

    /// Replace the distributor.
    pub fn set_distribution(&mut self, distribution: impl Into<String>) -> &mut Self {
        self.distribution = distribution.into();
        self
    }

    /// Replace the language.
    pub fn set_language_option(&mut self, language: Option<String>) -> &mut Self {
        self.language = language;
        self
    }

    /// Replace the publisher.
    pub fn set_publisher_option(&mut self, publisher: Option<String>) -> &mut Self {
        self.publisher = publisher;
        self
    }

    /// Replace the publication date.
    pub fn set_published_option(&mut self, published: Option<DateTime<Utc>>) -> &mut Self {
        self.published = published;
        self
    }

    /// Replace the selection marker.
    pub fn set_selected_option(&mut self, selected: Option<DateTime<Utc>>) -> &mut Self {
        self.selected = selected;
        self
    }

    /// Replace the duration in seconds.
    ///
    /// Negative and non-finite values are reported as a [`ParseError`] and the
    /// duration becomes absent.
    pub fn set_duration_option(&mut self, duration_seconds: Option<f64>) -> &mut Self {
        self.duration_seconds = match duration_seconds {
            Some(seconds) if !seconds.is_finite() || seconds < 0.0 => {
                let problem = ParseError::at(
                    "duration",
                    format!("duration {seconds} is not a non-negative finite number"),
                );
                tracing::trace!(id = %self.id, error = %problem, "duration discarded");
                self.errors.push(problem);
                None
            },
            other => other,
        };
        self
    }

    /// Replace the cover image link.
    pub fn set_cover_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.cover = uri;
        self
    }

    /// Replace the thumbnail link.
    pub fn set_thumbnail_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.thumbnail = uri;
        self
    }

    /// Replace the alternate link.
    pub fn set_alternate_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.alternate = uri;
        self
    }

    /// Replace the analytics link.
    pub fn set_analytics_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.analytics = uri;
        self
    }

    /// Replace the annotations link.
    pub fn set_annotations_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.annotations = uri;
        self
    }

    /// Replace the problem-report link.
    pub fn set_issues_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.issues = uri;
        self
    }

    /// Replace the related-works link.
    pub fn set_related_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.related = uri;
        self
    }

    /// Replace the time-tracking link.
    pub fn set_time_tracking_option(&mut self, uri: Option<Url>) -> &mut Self {
        self.time_tracking = uri;
        self
    }

    /// Replace the DRM licensor.
    pub fn set_licensor_option(&mut self, licensor: Option<DrmLicensor>) -> &mut Self {
        self.licensor = licensor;
        self
    }

    /// Replace the accessibility summary. An empty summary is stored as absent.
    pub fn set_accessibility_option(&mut self, accessibility: Option<Accessibility>) -> &mut Self {
        self.accessibility = accessibility.filter(|summary| !summary.is_empty());
        self
    }

    /// Acquisitions added so far.
    #[must_use]
    pub fn acquisitions(&self) -> &[AcquisitionLink] {
        &self.acquisitions
    }

    /// Parse errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Produce an entry from the current state.
    ///
    /// The builder is left untouched, so building twice without intervening
    /// mutation yields equal entries.
    #[must_use]
    pub fn build(&self) -> FeedEntry {
        FeedEntry {
            id: self.id.clone(),
            title: self.title.clone(),
            updated: self.updated,
            summary: self.summary.clone(),
            authors: self.authors.clone(),
            narrators: self.narrators.clone(),
            illustrators: self.illustrators.clone(),
            translators: self.translators.clone(),
            categories: self.categories.clone(),
            language: self.language.clone(),
            publisher: self.publisher.clone(),
            published: self.published,
            distribution: self.distribution.clone(),
            duration_seconds: self.duration_seconds,
            cover: self.cover.clone(),
            thumbnail: self.thumbnail.clone(),
            alternate: self.alternate.clone(),
            analytics: self.analytics.clone(),
            annotations: self.annotations.clone(),
            issues: self.issues.clone(),
            related: self.related.clone(),
            time_tracking: self.time_tracking.clone(),
            groups: self.groups.clone(),
            acquisitions: self.acquisitions.clone(),
            preview_acquisitions: self.preview_acquisitions.clone(),
            availability: self.availability.clone(),
            licensor: self.licensor.clone(),
            selected: self.selected,
            accessibility: self.accessibility.clone(),
            errors: self.errors.clone(),
        }
    }
}
