//! Acquisition feeds: ordered entries plus pass-through metadata.

use crate::entry::FeedEntry;
use indexmap::IndexMap;
use serde_json::Value;

/// An ordered sequence of entries with feed-level metadata.
///
/// The metadata (feed id, title, facets, pagination links, ...) is not
/// modelled here; it is carried verbatim, in insertion order, so that a
/// cached feed can be restored unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionFeed {
    /// Entries in document order
    pub entries: Vec<FeedEntry>,
    /// Feed-level metadata, passed through untouched
    pub metadata: IndexMap<String, Value>,
}

impl AcquisitionFeed {
    /// Create a feed from entries, with no metadata.
    #[must_use]
    pub fn new(entries: Vec<FeedEntry>) -> Self {
        AcquisitionFeed {
            entries,
            metadata: IndexMap::new(),
        }
    }

    /// Attach a metadata value.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// First entry with the given id.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&FeedEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the feed has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that recorded parse errors.
    pub fn entries_with_errors(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter().filter(|entry| entry.has_errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityState;
    use crate::entry_builder::FeedEntryBuilder;
    use crate::parse_error::ParseError;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn make_entry(id: &str) -> FeedEntry {
        FeedEntryBuilder::new(
            id,
            format!("Title {id}"),
            Utc.with_ymd_and_hms(2022, 11, 5, 0, 0, 0).unwrap(),
            AvailabilityState::open_access(),
        )
        .build()
    }

    #[test]
    fn test_entry_lookup() {
        let feed = AcquisitionFeed::new(vec![make_entry("a"), make_entry("b")]);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.entry("b").map(FeedEntry::title), Some("Title b"));
        assert!(feed.entry("c").is_none());
    }

    #[test]
    fn test_metadata_preserves_insertion_order() {
        let feed = AcquisitionFeed::default()
            .with_metadata("title", json!("Featured"))
            .with_metadata("id", json!("urn:feed:1"));
        let keys: Vec<&String> = feed.metadata.keys().collect();
        assert_eq!(keys, ["title", "id"]);
        assert!(feed.is_empty());
    }

    #[test]
    fn test_entries_with_errors() {
        let mut builder = FeedEntryBuilder::new(
            "bad",
            "Bad",
            Utc.with_ymd_and_hms(2022, 11, 5, 0, 0, 0).unwrap(),
            AvailabilityState::loanable(),
        );
        builder.add_parse_error(ParseError::new("unreadable category"));
        let feed = AcquisitionFeed::new(vec![make_entry("good"), builder.build()]);

        let ids: Vec<&str> = feed.entries_with_errors().map(FeedEntry::id).collect();
        assert_eq!(ids, ["bad"]);
    }
}
