//! Restoration of entries from the cache document format.
//!
//! The reader is tolerant: absent sequences decode as empty, absent optional
//! fields as `None`, and a malformed optional field is handed to the
//! [`RecoveryContext`], which either records it or fails the decode
//! depending on the configured [`RecoveryMode`](super::RecoveryMode).

use super::config::CodecConfig;
use super::recovery::RecoveryContext;
use super::{keys, timestamp_in_range};
use crate::accessibility::Accessibility;
use crate::acquisition::{
    AcquisitionLink, AcquisitionRelation, IndirectAcquisition, PreviewAcquisition,
};
use crate::availability::{AvailabilityKind, AvailabilityState};
use crate::category::Category;
use crate::entry::FeedEntry;
use crate::entry_builder::FeedEntryBuilder;
use crate::error::{Result, SerializationError};
use crate::feed::AcquisitionFeed;
use crate::licensor::DrmLicensor;
use crate::parse_error::ParseError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use url::Url;

type Object = Map<String, Value>;

const EMPTY: &[Value] = &[];

/// RFC 3339 timestamp normalized to UTC. Instants whose UTC year cannot be
/// written back in four digits are rejected.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .filter(timestamp_in_range)
}

fn path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn indexed(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

fn as_object<'v>(value: &'v Value, what: &str) -> Result<&'v Object> {
    value
        .as_object()
        .ok_or_else(|| SerializationError::InvalidDocument(format!("{what} must be a JSON object")))
}

/// Present and non-null value under `key`.
fn field<'v>(map: &'v Object, key: &str) -> Option<&'v Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn required_str<'v>(map: &'v Object, key: &str) -> Result<&'v str> {
    match field(map, key) {
        None => Err(SerializationError::MissingField(key.to_string())),
        Some(value) => value
            .as_str()
            .ok_or_else(|| SerializationError::invalid_field(key, "expected a string")),
    }
}

/// Per-call decoding state.
struct Decoder<'c> {
    config: &'c CodecConfig,
    ctx: RecoveryContext,
}

impl<'c> Decoder<'c> {
    fn new(config: &'c CodecConfig) -> Self {
        Decoder {
            config,
            ctx: RecoveryContext::new(config.recovery),
        }
    }

    fn fail<T>(&mut self, location: String, message: impl Into<String>) -> Result<Option<T>> {
        self.ctx.recover(ParseError::at(location, message))
    }

    fn optional_str(&mut self, map: &Object, key: &str, location: &str) -> Result<Option<String>> {
        match field(map, key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(other) => {
                self.fail(location.to_string(), format!("expected a string, found {other}"))
            },
        }
    }

    fn optional_timestamp(
        &mut self,
        map: &Object,
        key: &str,
        location: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        match field(map, key) {
            None => Ok(None),
            Some(value) => match value.as_str().and_then(parse_timestamp) {
                Some(timestamp) => Ok(Some(timestamp)),
                None => self.fail(
                    location.to_string(),
                    format!("'{}' is not an RFC 3339 timestamp in years 0000-9999", display(value)),
                ),
            },
        }
    }

    fn optional_url(&mut self, map: &Object, key: &str, location: &str) -> Result<Option<Url>> {
        match field(map, key) {
            None => Ok(None),
            Some(value) => self.url(value, location),
        }
    }

    fn url(&mut self, value: &Value, location: &str) -> Result<Option<Url>> {
        let Some(text) = value.as_str() else {
            return self.fail(location.to_string(), format!("expected a URI string, found {value}"));
        };
        match Url::parse(text) {
            Ok(url) => Ok(Some(url)),
            Err(err) => self.fail(location.to_string(), format!("invalid URI '{text}': {err}")),
        }
    }

    fn optional_u32(&mut self, map: &Object, key: &str, location: &str) -> Result<Option<u32>> {
        match field(map, key) {
            None => Ok(None),
            Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(number) => Ok(Some(number)),
                None => self.fail(
                    location.to_string(),
                    format!("expected a non-negative integer, found {value}"),
                ),
            },
        }
    }

    fn optional_duration(&mut self, map: &Object) -> Result<Option<f64>> {
        match field(map, keys::DURATION) {
            None => Ok(None),
            Some(value) => match value.as_f64() {
                Some(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(Some(seconds)),
                _ => self.fail(
                    keys::DURATION.to_string(),
                    format!("duration {value} is not a non-negative finite number"),
                ),
            },
        }
    }

    /// Array under `key`; absent means empty.
    fn array<'v>(&mut self, map: &'v Object, key: &str, location: &str) -> Result<&'v [Value]> {
        match field(map, key) {
            None => Ok(EMPTY),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(other) => {
                self.fail::<()>(location.to_string(), format!("expected an array, found {other}"))?;
                Ok(EMPTY)
            },
        }
    }

    fn strings(&mut self, map: &Object, key: &str, location: &str) -> Result<Vec<String>> {
        let items = self.array(map, key, location)?;
        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(text) => values.push(text.to_string()),
                None => {
                    let message = format!("expected a string, found {item}");
                    self.fail::<()>(indexed(location, index), message)?;
                },
            }
        }
        Ok(values)
    }

    /// Object at `location`, or a recorded problem.
    fn element<'v>(&mut self, value: &'v Value, location: &str) -> Result<Option<&'v Object>> {
        match value.as_object() {
            Some(map) => Ok(Some(map)),
            None => self.fail(location.to_string(), format!("expected an object, found {value}")),
        }
    }

    /// String field that an element cannot do without.
    fn element_str(&mut self, map: &Object, key: &str, location: &str) -> Result<Option<String>> {
        match field(map, key) {
            None => self.fail(path(location, key), "missing"),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(other) => {
                self.fail(path(location, key), format!("expected a string, found {other}"))
            },
        }
    }

    fn element_url(&mut self, map: &Object, key: &str, location: &str) -> Result<Option<Url>> {
        match field(map, key) {
            None => self.fail(path(location, key), "missing"),
            Some(value) => self.url(value, &path(location, key)),
        }
    }

    fn availability(&mut self, map: &Object) -> Result<AvailabilityState> {
        let value = field(map, keys::AVAILABILITY)
            .ok_or_else(|| SerializationError::MissingField(keys::AVAILABILITY.to_string()))?;
        let object = value.as_object().ok_or_else(|| {
            SerializationError::invalid_field(keys::AVAILABILITY, "expected an object")
        })?;
        let tag = required_str(object, keys::TYPE).map_err(|err| match err {
            SerializationError::MissingField(_) => {
                SerializationError::MissingField(path(keys::AVAILABILITY, keys::TYPE))
            },
            other => other,
        })?;
        let kind = AvailabilityKind::from_tag(tag)
            .ok_or_else(|| SerializationError::UnknownAvailability(tag.to_string()))?;

        let at = |key: &str| path(keys::AVAILABILITY, key);
        let state = match kind {
            AvailabilityKind::OpenAccess => AvailabilityState::OpenAccess {
                revoke: self.optional_url(object, keys::REVOKE, &at(keys::REVOKE))?,
            },
            AvailabilityKind::Loanable => AvailabilityState::Loanable {
                copies_available: self.optional_u32(
                    object,
                    keys::COPIES_AVAILABLE,
                    &at(keys::COPIES_AVAILABLE),
                )?,
                copies: self.optional_u32(object, keys::COPIES, &at(keys::COPIES))?,
            },
            AvailabilityKind::Holdable => AvailabilityState::Holdable {
                queue_position: self.optional_u32(
                    object,
                    keys::QUEUE_POSITION,
                    &at(keys::QUEUE_POSITION),
                )?,
                copies_available: self.optional_u32(
                    object,
                    keys::COPIES_AVAILABLE,
                    &at(keys::COPIES_AVAILABLE),
                )?,
                copies: self.optional_u32(object, keys::COPIES, &at(keys::COPIES))?,
            },
            AvailabilityKind::Held => AvailabilityState::Held {
                queue_position: self.optional_u32(
                    object,
                    keys::QUEUE_POSITION,
                    &at(keys::QUEUE_POSITION),
                )?,
                queue: self.optional_u32(object, keys::QUEUE, &at(keys::QUEUE))?,
                copies_available: self.optional_u32(
                    object,
                    keys::COPIES_AVAILABLE,
                    &at(keys::COPIES_AVAILABLE),
                )?,
                copies: self.optional_u32(object, keys::COPIES, &at(keys::COPIES))?,
                start_date: self.optional_timestamp(
                    object,
                    keys::START_DATE,
                    &at(keys::START_DATE),
                )?,
                end_date: self.optional_timestamp(object, keys::END_DATE, &at(keys::END_DATE))?,
                is_ready: self.ready(object)?,
                revoke: self.optional_url(object, keys::REVOKE, &at(keys::REVOKE))?,
            },
            AvailabilityKind::Loaned => AvailabilityState::Loaned {
                start_date: self.optional_timestamp(
                    object,
                    keys::START_DATE,
                    &at(keys::START_DATE),
                )?,
                end_date: self.optional_timestamp(object, keys::END_DATE, &at(keys::END_DATE))?,
                revoke: self.optional_url(object, keys::REVOKE, &at(keys::REVOKE))?,
            },
            AvailabilityKind::Revoked => AvailabilityState::Revoked {
                revoke: self.optional_url(object, keys::REVOKE, &at(keys::REVOKE))?,
            },
        };

        let (state, problem) = state.validated();
        if let Some(problem) = problem {
            self.ctx.note(problem)?;
        }
        Ok(state)
    }

    /// Missing `ready` reads as not ready.
    fn ready(&mut self, object: &Object) -> Result<bool> {
        match field(object, keys::READY) {
            None => Ok(false),
            Some(Value::Bool(ready)) => Ok(*ready),
            Some(other) => {
                let location = path(keys::AVAILABILITY, keys::READY);
                self.fail::<()>(location, format!("expected a boolean, found {other}"))?;
                Ok(false)
            },
        }
    }

    fn indirects(
        &mut self,
        items: &[Value],
        depth: usize,
        location: &str,
    ) -> Result<Vec<IndirectAcquisition>> {
        if !items.is_empty() && depth > self.config.max_depth {
            tracing::warn!(
                max = self.config.max_depth,
                location,
                "refusing to decode over-deep acquisition tree"
            );
            return Err(SerializationError::DepthExceeded {
                max: self.config.max_depth,
            });
        }

        let mut indirects = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let at = indexed(location, index);
            let Some(map) = self.element(item, &at)? else {
                continue;
            };
            let Some(mime_type) = self.element_str(map, keys::TYPE, &at)? else {
                continue;
            };
            let nested_at = path(&at, keys::INDIRECT_ACQUISITIONS);
            let nested = self.array(map, keys::INDIRECT_ACQUISITIONS, &nested_at)?;
            indirects.push(IndirectAcquisition {
                mime_type,
                indirect_acquisitions: self.indirects(nested, depth + 1, &nested_at)?,
            });
        }
        Ok(indirects)
    }

    fn acquisition(&mut self, item: &Value, at: &str) -> Result<Option<AcquisitionLink>> {
        let Some(map) = self.element(item, at)? else {
            return Ok(None);
        };
        let Some(relation_uri) = self.element_str(map, keys::RELATION, at)? else {
            return Ok(None);
        };
        let (relation, problem) = AcquisitionRelation::parse_lenient(&relation_uri);
        if let Some(problem) = problem {
            self.ctx
                .note(ParseError::at(path(at, keys::RELATION), problem.message))?;
        }
        let Some(uri) = self.element_url(map, keys::URI, at)? else {
            return Ok(None);
        };
        let Some(mime_type) = self.element_str(map, keys::TYPE, at)? else {
            return Ok(None);
        };

        let nested_at = path(at, keys::INDIRECT_ACQUISITIONS);
        let nested = self.array(map, keys::INDIRECT_ACQUISITIONS, &nested_at)?;
        Ok(Some(AcquisitionLink {
            relation,
            uri,
            mime_type,
            indirect_acquisitions: self.indirects(nested, 1, &nested_at)?,
        }))
    }

    fn preview(&mut self, item: &Value, at: &str) -> Result<Option<PreviewAcquisition>> {
        let Some(map) = self.element(item, at)? else {
            return Ok(None);
        };
        let Some(uri) = self.element_url(map, keys::URI, at)? else {
            return Ok(None);
        };
        let Some(mime_type) = self.element_str(map, keys::TYPE, at)? else {
            return Ok(None);
        };
        Ok(Some(PreviewAcquisition::new(uri, mime_type)))
    }

    fn category(&mut self, item: &Value, at: &str) -> Result<Option<Category>> {
        let Some(map) = self.element(item, at)? else {
            return Ok(None);
        };
        let Some(term) = self.element_str(map, keys::TERM, at)? else {
            return Ok(None);
        };
        let Some(scheme) = self.element_str(map, keys::SCHEME, at)? else {
            return Ok(None);
        };
        let label = self.optional_str(map, keys::LABEL, &path(at, keys::LABEL))?;
        Ok(Some(Category {
            term,
            scheme,
            label,
        }))
    }

    fn group(&mut self, item: &Value, at: &str) -> Result<Option<(String, Url)>> {
        let Some(map) = self.element(item, at)? else {
            return Ok(None);
        };
        let Some(name) = self.element_str(map, keys::NAME, at)? else {
            return Ok(None);
        };
        let Some(uri) = self.element_url(map, keys::URI, at)? else {
            return Ok(None);
        };
        Ok(Some((name, uri)))
    }

    fn licensor(&mut self, map: &Object) -> Result<Option<DrmLicensor>> {
        let Some(value) = field(map, keys::LICENSOR) else {
            return Ok(None);
        };
        let Some(object) = self.element(value, keys::LICENSOR)? else {
            return Ok(None);
        };
        let Some(vendor) = self.element_str(object, keys::VENDOR, keys::LICENSOR)? else {
            return Ok(None);
        };
        let client_token = self.element_str(object, keys::CLIENT_TOKEN, keys::LICENSOR)?;
        let Some(client_token) = client_token else {
            return Ok(None);
        };
        Ok(Some(DrmLicensor {
            vendor,
            client_token,
            client_token_url: self.optional_url(
                object,
                keys::CLIENT_TOKEN_URL,
                &path(keys::LICENSOR, keys::CLIENT_TOKEN_URL),
            )?,
            device_manager: self.optional_url(
                object,
                keys::DEVICE_MANAGER,
                &path(keys::LICENSOR, keys::DEVICE_MANAGER),
            )?,
        }))
    }

    fn accessibility(&mut self, map: &Object) -> Result<Option<Accessibility>> {
        let Some(value) = field(map, keys::ACCESSIBILITY) else {
            return Ok(None);
        };
        let Some(object) = self.element(value, keys::ACCESSIBILITY)? else {
            return Ok(None);
        };
        Ok(Some(Accessibility {
            ways_of_reading: self.strings(
                object,
                keys::WAYS_OF_READING,
                &path(keys::ACCESSIBILITY, keys::WAYS_OF_READING),
            )?,
            conforms_to: self.strings(
                object,
                keys::CONFORMS_TO,
                &path(keys::ACCESSIBILITY, keys::CONFORMS_TO),
            )?,
        }))
    }

    fn persisted_errors(&mut self, map: &Object) -> Result<Vec<ParseError>> {
        let items = self.array(map, keys::ERRORS, keys::ERRORS)?;
        let mut errors = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let at = indexed(keys::ERRORS, index);
            let Some(object) = self.element(item, &at)? else {
                continue;
            };
            let Some(message) = self.element_str(object, keys::MESSAGE, &at)? else {
                continue;
            };
            let location = self.optional_str(object, keys::LOCATION, &path(&at, keys::LOCATION))?;
            errors.push(ParseError { message, location });
        }
        Ok(errors)
    }

    fn entry(mut self, document: &Value) -> Result<FeedEntry> {
        let map = as_object(document, "entry")?;

        let id = required_str(map, keys::ID)?;
        let title = required_str(map, keys::TITLE)?;
        let updated_text = required_str(map, keys::UPDATED)?;
        let updated = parse_timestamp(updated_text).ok_or_else(|| {
            SerializationError::invalid_field(
                keys::UPDATED,
                format!("'{updated_text}' is not an RFC 3339 timestamp in years 0000-9999"),
            )
        })?;
        tracing::trace!(id, "decoding entry");

        let persisted = self.persisted_errors(map)?;
        let availability = self.availability(map)?;
        let mut builder = FeedEntryBuilder::new(id, title, updated, availability);

        let summary = self.optional_str(map, keys::SUMMARY, keys::SUMMARY)?;
        let distribution = self
            .optional_str(map, keys::DISTRIBUTION, keys::DISTRIBUTION)?
            .unwrap_or_default();
        builder.set_summary_option(summary).set_distribution(distribution);

        for author in self.strings(map, keys::AUTHORS, keys::AUTHORS)? {
            builder.add_author(author);
        }
        for narrator in self.strings(map, keys::NARRATORS, keys::NARRATORS)? {
            builder.add_narrator(narrator);
        }
        for illustrator in self.strings(map, keys::ILLUSTRATORS, keys::ILLUSTRATORS)? {
            builder.add_illustrator(illustrator);
        }
        for translator in self.strings(map, keys::TRANSLATORS, keys::TRANSLATORS)? {
            builder.add_translator(translator);
        }

        let categories = self.array(map, keys::CATEGORIES, keys::CATEGORIES)?;
        for (index, item) in categories.iter().enumerate() {
            if let Some(category) = self.category(item, &indexed(keys::CATEGORIES, index))? {
                builder.add_category(category);
            }
        }
        for (index, item) in self.array(map, keys::GROUPS, keys::GROUPS)?.iter().enumerate() {
            if let Some((name, uri)) = self.group(item, &indexed(keys::GROUPS, index))? {
                builder.add_group(name, uri);
            }
        }
        let acquisitions = self.array(map, keys::ACQUISITIONS, keys::ACQUISITIONS)?;
        for (index, item) in acquisitions.iter().enumerate() {
            let at = indexed(keys::ACQUISITIONS, index);
            if let Some(acquisition) = self.acquisition(item, &at)? {
                builder.add_acquisition(acquisition);
            }
        }
        let previews = self.array(map, keys::PREVIEW_ACQUISITIONS, keys::PREVIEW_ACQUISITIONS)?;
        for (index, item) in previews.iter().enumerate() {
            let at = indexed(keys::PREVIEW_ACQUISITIONS, index);
            if let Some(preview) = self.preview(item, &at)? {
                builder.add_preview_acquisition(preview);
            }
        }

        let language = self.optional_str(map, keys::LANGUAGE, keys::LANGUAGE)?;
        let publisher = self.optional_str(map, keys::PUBLISHER, keys::PUBLISHER)?;
        let published = self.optional_timestamp(map, keys::PUBLISHED, keys::PUBLISHED)?;
        let selected = self.optional_timestamp(map, keys::SELECTED, keys::SELECTED)?;
        let duration = self.optional_duration(map)?;
        builder
            .set_language_option(language)
            .set_publisher_option(publisher)
            .set_published_option(published)
            .set_selected_option(selected)
            .set_duration_option(duration);

        let cover = self.optional_url(map, keys::COVER, keys::COVER)?;
        let thumbnail = self.optional_url(map, keys::THUMBNAIL, keys::THUMBNAIL)?;
        let alternate = self.optional_url(map, keys::ALTERNATE, keys::ALTERNATE)?;
        let analytics = self.optional_url(map, keys::ANALYTICS, keys::ANALYTICS)?;
        let annotations = self.optional_url(map, keys::ANNOTATIONS, keys::ANNOTATIONS)?;
        let issues = self.optional_url(map, keys::ISSUES, keys::ISSUES)?;
        let related = self.optional_url(map, keys::RELATED, keys::RELATED)?;
        let time_tracking = self.optional_url(map, keys::TIME_TRACKING, keys::TIME_TRACKING)?;
        builder
            .set_cover_option(cover)
            .set_thumbnail_option(thumbnail)
            .set_alternate_option(alternate)
            .set_analytics_option(analytics)
            .set_annotations_option(annotations)
            .set_issues_option(issues)
            .set_related_option(related)
            .set_time_tracking_option(time_tracking);

        let licensor = self.licensor(map)?;
        let accessibility = self.accessibility(map)?;
        builder
            .set_licensor_option(licensor)
            .set_accessibility_option(accessibility);

        let mut entry = builder.build();
        let mut errors = persisted;
        errors.append(&mut entry.errors);
        errors.extend(self.ctx.into_errors());
        entry.errors = errors;
        Ok(entry)
    }
}

/// Short rendering of a JSON value for messages: strings without quotes.
fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Restore an entry from its cache document.
pub(crate) fn json_to_entry(document: &Value, config: &CodecConfig) -> Result<FeedEntry> {
    Decoder::new(config).entry(document)
}

/// Restore a feed from its cache document.
pub(crate) fn json_to_feed(document: &Value, config: &CodecConfig) -> Result<AcquisitionFeed> {
    let map = as_object(document, "feed")?;

    let entries = match map.get(keys::ENTRIES) {
        None => return Err(SerializationError::MissingField(keys::ENTRIES.to_string())),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| json_to_entry(item, config))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(SerializationError::invalid_field(keys::ENTRIES, "expected an array"));
        },
    };

    let metadata: IndexMap<String, Value> = match field(map, keys::METADATA) {
        None => IndexMap::new(),
        Some(Value::Object(object)) => object
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        Some(_) => {
            return Err(SerializationError::invalid_field(keys::METADATA, "expected an object"));
        },
    };

    Ok(AcquisitionFeed { entries, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode::entry_to_json;
    use crate::codec::recovery::RecoveryMode;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "id": "urn:entry:1",
            "title": "Minimal",
            "updated": "2023-01-01T00:00:00Z",
            "availability": { "type": "loanable" }
        })
    }

    fn decode(document: &Value) -> Result<FeedEntry> {
        json_to_entry(document, &CodecConfig::default())
    }

    #[test]
    fn test_missing_sequences_decode_as_empty() {
        let entry = decode(&minimal()).unwrap();
        assert!(entry.authors().is_empty());
        assert!(entry.acquisitions().is_empty());
        assert!(entry.groups().is_empty());
        assert_eq!(entry.summary(), "");
        assert!(!entry.has_errors());
    }

    #[test]
    fn test_missing_id_is_hard_error() {
        let mut document = minimal();
        document.as_object_mut().unwrap().remove("id");
        assert!(matches!(decode(&document), Err(SerializationError::MissingField(f)) if f == "id"));
    }

    #[test]
    fn test_bad_updated_is_hard_error() {
        let mut document = minimal();
        document["updated"] = json!("yesterday");
        assert!(matches!(
            decode(&document),
            Err(SerializationError::InvalidField { field, .. }) if field == "updated"
        ));
    }

    #[test]
    fn test_missing_availability_type() {
        let mut document = minimal();
        document["availability"] = json!({});
        assert!(matches!(
            decode(&document),
            Err(SerializationError::MissingField(f)) if f == "availability.type"
        ));
    }

    #[test]
    fn test_bad_optional_timestamp_becomes_parse_error() {
        let mut document = minimal();
        document["published"] = json!("not a date");
        let entry = decode(&document).unwrap();
        assert!(entry.published().is_none());
        assert_eq!(entry.errors().len(), 1);
        assert_eq!(entry.errors()[0].location.as_deref(), Some("published"));
    }

    #[test]
    fn test_non_utc_offset_normalized() {
        let mut document = minimal();
        document["published"] = json!("2023-01-01T02:00:00+02:00");
        let entry = decode(&document).unwrap();
        assert_eq!(entry.published().unwrap().to_rfc3339(), "2023-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_offset_pushing_updated_past_9999_is_hard_error() {
        let mut document = minimal();
        document["updated"] = json!("9999-12-31T23:00:00-02:00");
        assert!(matches!(
            decode(&document),
            Err(SerializationError::InvalidField { field, .. }) if field == "updated"
        ));
    }

    #[test]
    fn test_offset_pulling_published_before_year_zero_is_parse_error() {
        let mut document = minimal();
        document["published"] = json!("0000-01-01T00:30:00+01:00");
        let entry = decode(&document).unwrap();
        assert!(entry.published().is_none());
        assert_eq!(entry.errors().len(), 1);
        assert_eq!(entry.errors()[0].location.as_deref(), Some("published"));

        let config = CodecConfig::default();
        let encoded = entry_to_json(&entry, &config).unwrap();
        let again = json_to_entry(&encoded, &config).unwrap();
        assert_eq!(again, entry);
        assert_eq!(again.errors(), entry.errors());
    }

    #[test]
    fn test_boundary_years_decode() {
        let mut document = minimal();
        document["updated"] = json!("9999-12-31T23:59:59Z");
        document["published"] = json!("0000-01-01T00:00:00Z");
        let entry = decode(&document).unwrap();
        assert!(!entry.has_errors());
        assert!(entry.published().is_some());
    }

    #[test]
    fn test_held_queue_and_copies_decode() {
        let mut document = minimal();
        document["availability"] = json!({
            "type": "held",
            "queue_position": 2,
            "queue": 9,
            "copies_available": 0,
            "copies": 3,
            "ready": false
        });
        let entry = decode(&document).unwrap();
        match entry.availability() {
            AvailabilityState::Held {
                queue_position,
                queue,
                copies_available,
                copies,
                ..
            } => {
                assert_eq!(*queue_position, Some(2));
                assert_eq!(*queue, Some(9));
                assert_eq!(*copies_available, Some(0));
                assert_eq!(*copies, Some(3));
            },
            other => panic!("expected Held, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_acquisition_uri_skips_element() {
        let mut document = minimal();
        document["acquisitions"] = json!([
            {
                "relation": "http://opds-spec.org/acquisition/borrow",
                "uri": "not a uri",
                "type": "application/epub+zip"
            },
            {
                "relation": "http://opds-spec.org/acquisition/borrow",
                "uri": "https://ex/borrow",
                "type": "application/epub+zip"
            }
        ]);
        let entry = decode(&document).unwrap();
        assert_eq!(entry.acquisitions().len(), 1);
        assert_eq!(entry.errors()[0].location.as_deref(), Some("acquisitions[0].uri"));
    }

    #[test]
    fn test_unknown_relation_degrades_to_generic() {
        let mut document = minimal();
        document["acquisitions"] = json!([{
            "relation": "http://example.org/rel/unknown",
            "uri": "https://ex/get",
            "type": "application/pdf"
        }]);
        let entry = decode(&document).unwrap();
        assert_eq!(entry.acquisitions()[0].relation, AcquisitionRelation::Generic);
        assert_eq!(
            entry.errors()[0].location.as_deref(),
            Some("acquisitions[0].relation")
        );
    }

    #[test]
    fn test_negative_duration_becomes_parse_error() {
        let mut document = minimal();
        document["duration"] = json!(-1.5);
        let entry = decode(&document).unwrap();
        assert!(entry.duration_seconds().is_none());
        assert_eq!(entry.errors().len(), 1);
    }

    #[test]
    fn test_inverted_loan_dates_recorded_once() {
        let mut document = minimal();
        document["availability"] = json!({
            "type": "loaned",
            "start_date": "2024-05-10T00:00:00Z",
            "end_date": "2024-05-01T00:00:00Z"
        });
        let entry = decode(&document).unwrap();
        assert!(entry.availability().end_date().is_none());
        assert_eq!(entry.errors().len(), 1);
        assert_eq!(entry.errors()[0].location.as_deref(), Some("availability/loaned"));
    }

    #[test]
    fn test_persisted_errors_come_first() {
        let mut document = minimal();
        document["errors"] = json!([{ "message": "earlier problem" }]);
        document["cover"] = json!(42);
        let entry = decode(&document).unwrap();
        assert_eq!(entry.errors()[0], ParseError::new("earlier problem"));
        assert_eq!(entry.errors()[1].location.as_deref(), Some("cover"));
    }

    #[test]
    fn test_strict_mode_rejects_soft_problem() {
        let mut document = minimal();
        document["cover"] = json!("::bad::");
        let config = CodecConfig::new().with_recovery_mode(RecoveryMode::Strict);
        let result = json_to_entry(&document, &config);
        assert!(matches!(
            result,
            Err(SerializationError::InvalidField { field, .. }) if field == "cover"
        ));
    }

    #[test]
    fn test_depth_guard_on_decode() {
        let mut nested = json!([]);
        for _ in 0..3 {
            nested = json!([{ "type": "application/epub+zip", "indirect_acquisitions": nested }]);
        }
        let mut document = minimal();
        document["acquisitions"] = json!([{
            "relation": "http://opds-spec.org/acquisition/borrow",
            "uri": "https://ex/borrow",
            "type": "application/vnd.adobe.adept+xml",
            "indirect_acquisitions": nested
        }]);

        let tight = CodecConfig::new().with_max_depth(2);
        assert!(matches!(
            json_to_entry(&document, &tight),
            Err(SerializationError::DepthExceeded { max: 2 })
        ));
        let roomy = CodecConfig::new().with_max_depth(3);
        let entry = json_to_entry(&document, &roomy).unwrap();
        assert_eq!(entry.acquisitions()[0].indirect_depth(), 3);
    }

    #[test]
    fn test_feed_requires_entries() {
        let result = json_to_feed(&json!({ "metadata": {} }), &CodecConfig::default());
        assert!(matches!(result, Err(SerializationError::MissingField(f)) if f == "entries"));
    }

    #[test]
    fn test_feed_metadata_order_preserved() {
        let document = json!({
            "entries": [minimal()],
            "metadata": { "title": "Featured", "id": "urn:feed:1" }
        });
        let feed = json_to_feed(&document, &CodecConfig::default()).unwrap();
        assert_eq!(feed.len(), 1);
        let keys: Vec<&String> = feed.metadata.keys().collect();
        assert_eq!(keys, ["title", "id"]);
    }
}
