//! Conversion of entries to the cache document format.

use super::config::CodecConfig;
use super::{keys, timestamp_in_range};
use crate::accessibility::Accessibility;
use crate::acquisition::{AcquisitionLink, IndirectAcquisition, PreviewAcquisition};
use crate::availability::AvailabilityState;
use crate::category::Category;
use crate::entry::FeedEntry;
use crate::error::{Result, SerializationError};
use crate::feed::AcquisitionFeed;
use crate::licensor::DrmLicensor;
use crate::parse_error::ParseError;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde_json::{Map, Value};
use url::Url;

/// Canonical textual form of a timestamp: RFC 3339, UTC, `Z` suffix,
/// fractional seconds only when present.
///
/// Years outside 0000..=9999 have no RFC 3339 form and are refused.
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>, field: &str) -> Result<String> {
    if !timestamp_in_range(timestamp) {
        return Err(SerializationError::invalid_field(
            field,
            format!("year {} cannot be written as RFC 3339", timestamp.year()),
        ));
    }
    Ok(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn object<const N: usize>(pairs: [(&str, Value); N]) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn insert_url(map: &mut Map<String, Value>, key: &str, value: Option<&Url>) {
    insert_str(map, key, value.map(Url::as_str));
}

fn insert_timestamp(
    map: &mut Map<String, Value>,
    key: &str,
    value: Option<&DateTime<Utc>>,
    location: &str,
) -> Result<()> {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(format_timestamp(value, location)?));
    }
    Ok(())
}

fn insert_u32(map: &mut Map<String, Value>, key: &str, value: Option<u32>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::from(value));
    }
}

pub(crate) fn availability_to_json(availability: &AvailabilityState) -> Result<Value> {
    let at = |key: &str| format!("{}.{key}", keys::AVAILABILITY);
    let mut map = Map::new();
    map.insert(
        keys::TYPE.to_string(),
        Value::String(availability.kind().as_str().to_string()),
    );

    match availability {
        AvailabilityState::OpenAccess { revoke } | AvailabilityState::Revoked { revoke } => {
            insert_url(&mut map, keys::REVOKE, revoke.as_ref());
        },
        AvailabilityState::Loanable {
            copies_available,
            copies,
        } => {
            insert_u32(&mut map, keys::COPIES_AVAILABLE, *copies_available);
            insert_u32(&mut map, keys::COPIES, *copies);
        },
        AvailabilityState::Holdable {
            queue_position,
            copies_available,
            copies,
        } => {
            insert_u32(&mut map, keys::QUEUE_POSITION, *queue_position);
            insert_u32(&mut map, keys::COPIES_AVAILABLE, *copies_available);
            insert_u32(&mut map, keys::COPIES, *copies);
        },
        AvailabilityState::Held {
            queue_position,
            queue,
            copies_available,
            copies,
            start_date,
            end_date,
            is_ready,
            revoke,
        } => {
            insert_u32(&mut map, keys::QUEUE_POSITION, *queue_position);
            insert_u32(&mut map, keys::QUEUE, *queue);
            insert_u32(&mut map, keys::COPIES_AVAILABLE, *copies_available);
            insert_u32(&mut map, keys::COPIES, *copies);
            let (start_at, end_at) = (at(keys::START_DATE), at(keys::END_DATE));
            insert_timestamp(&mut map, keys::START_DATE, start_date.as_ref(), &start_at)?;
            insert_timestamp(&mut map, keys::END_DATE, end_date.as_ref(), &end_at)?;
            map.insert(keys::READY.to_string(), Value::Bool(*is_ready));
            insert_url(&mut map, keys::REVOKE, revoke.as_ref());
        },
        AvailabilityState::Loaned {
            start_date,
            end_date,
            revoke,
        } => {
            let (start_at, end_at) = (at(keys::START_DATE), at(keys::END_DATE));
            insert_timestamp(&mut map, keys::START_DATE, start_date.as_ref(), &start_at)?;
            insert_timestamp(&mut map, keys::END_DATE, end_date.as_ref(), &end_at)?;
            insert_url(&mut map, keys::REVOKE, revoke.as_ref());
        },
    }

    Ok(Value::Object(map))
}

fn indirect_to_json(
    indirect: &IndirectAcquisition,
    depth: usize,
    config: &CodecConfig,
) -> Result<Value> {
    if depth > config.max_depth {
        tracing::warn!(max = config.max_depth, "refusing to encode over-deep acquisition tree");
        return Err(SerializationError::DepthExceeded {
            max: config.max_depth,
        });
    }

    Ok(object([
        (keys::TYPE, Value::String(indirect.mime_type.clone())),
        (
            keys::INDIRECT_ACQUISITIONS,
            indirects_to_json(&indirect.indirect_acquisitions, depth + 1, config)?,
        ),
    ]))
}

/// Encode a list of indirect acquisitions whose members sit at `depth`.
pub(crate) fn indirects_to_json(
    indirects: &[IndirectAcquisition],
    depth: usize,
    config: &CodecConfig,
) -> Result<Value> {
    indirects
        .iter()
        .map(|indirect| indirect_to_json(indirect, depth, config))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

pub(crate) fn acquisition_to_json(
    acquisition: &AcquisitionLink,
    config: &CodecConfig,
) -> Result<Value> {
    Ok(object([
        (keys::RELATION, Value::from(acquisition.relation.uri())),
        (keys::URI, Value::from(acquisition.uri.as_str())),
        (keys::TYPE, Value::String(acquisition.mime_type.clone())),
        (
            keys::INDIRECT_ACQUISITIONS,
            indirects_to_json(&acquisition.indirect_acquisitions, 1, config)?,
        ),
    ]))
}

pub(crate) fn preview_to_json(preview: &PreviewAcquisition) -> Value {
    object([
        (keys::URI, Value::from(preview.uri.as_str())),
        (keys::TYPE, Value::String(preview.mime_type.clone())),
    ])
}

pub(crate) fn category_to_json(category: &Category) -> Value {
    let mut map = Map::new();
    map.insert(keys::TERM.to_string(), Value::String(category.term.clone()));
    map.insert(keys::SCHEME.to_string(), Value::String(category.scheme.clone()));
    insert_str(&mut map, keys::LABEL, category.label.as_deref());
    Value::Object(map)
}

pub(crate) fn licensor_to_json(licensor: &DrmLicensor) -> Value {
    let mut map = Map::new();
    map.insert(keys::VENDOR.to_string(), Value::String(licensor.vendor.clone()));
    map.insert(
        keys::CLIENT_TOKEN.to_string(),
        Value::String(licensor.client_token.clone()),
    );
    insert_url(&mut map, keys::CLIENT_TOKEN_URL, licensor.client_token_url.as_ref());
    insert_url(&mut map, keys::DEVICE_MANAGER, licensor.device_manager.as_ref());
    Value::Object(map)
}

fn accessibility_to_json(accessibility: &Accessibility) -> Value {
    object([
        (keys::WAYS_OF_READING, strings(&accessibility.ways_of_reading)),
        (keys::CONFORMS_TO, strings(&accessibility.conforms_to)),
    ])
}

fn parse_error_to_json(error: &ParseError) -> Value {
    let mut map = Map::new();
    map.insert(keys::MESSAGE.to_string(), Value::String(error.message.clone()));
    insert_str(&mut map, keys::LOCATION, error.location.as_deref());
    Value::Object(map)
}

/// Convert an entry to its cache document.
///
/// Absent optional fields are omitted; sequences are always emitted, empty
/// or not.
pub(crate) fn entry_to_json(entry: &FeedEntry, config: &CodecConfig) -> Result<Value> {
    let mut map = Map::new();

    map.insert(keys::ID.to_string(), Value::String(entry.id.clone()));
    map.insert(keys::TITLE.to_string(), Value::String(entry.title.clone()));
    map.insert(
        keys::UPDATED.to_string(),
        Value::String(format_timestamp(&entry.updated, keys::UPDATED)?),
    );
    map.insert(keys::SUMMARY.to_string(), Value::String(entry.summary.clone()));
    map.insert(
        keys::DISTRIBUTION.to_string(),
        Value::String(entry.distribution.clone()),
    );

    map.insert(keys::AUTHORS.to_string(), strings(&entry.authors));
    map.insert(keys::NARRATORS.to_string(), strings(&entry.narrators));
    map.insert(keys::ILLUSTRATORS.to_string(), strings(&entry.illustrators));
    map.insert(keys::TRANSLATORS.to_string(), strings(&entry.translators));
    map.insert(
        keys::CATEGORIES.to_string(),
        Value::Array(entry.categories.iter().map(category_to_json).collect()),
    );
    map.insert(
        keys::GROUPS.to_string(),
        Value::Array(
            entry
                .groups
                .iter()
                .map(|group| {
                    object([
                        (keys::NAME, Value::String(group.name.clone())),
                        (keys::URI, Value::from(group.uri.as_str())),
                    ])
                })
                .collect(),
        ),
    );
    map.insert(
        keys::ACQUISITIONS.to_string(),
        Value::Array(
            entry
                .acquisitions
                .iter()
                .map(|acquisition| acquisition_to_json(acquisition, config))
                .collect::<Result<Vec<_>>>()?,
        ),
    );
    map.insert(
        keys::PREVIEW_ACQUISITIONS.to_string(),
        Value::Array(entry.preview_acquisitions.iter().map(preview_to_json).collect()),
    );
    map.insert(
        keys::AVAILABILITY.to_string(),
        availability_to_json(&entry.availability)?,
    );

    insert_str(&mut map, keys::LANGUAGE, entry.language.as_deref());
    insert_str(&mut map, keys::PUBLISHER, entry.publisher.as_deref());
    insert_timestamp(&mut map, keys::PUBLISHED, entry.published.as_ref(), keys::PUBLISHED)?;
    insert_timestamp(&mut map, keys::SELECTED, entry.selected.as_ref(), keys::SELECTED)?;

    // the builder only admits finite durations
    if let Some(duration) = entry.duration_seconds {
        map.insert(keys::DURATION.to_string(), Value::from(duration));
    }

    insert_url(&mut map, keys::COVER, entry.cover.as_ref());
    insert_url(&mut map, keys::THUMBNAIL, entry.thumbnail.as_ref());
    insert_url(&mut map, keys::ALTERNATE, entry.alternate.as_ref());
    insert_url(&mut map, keys::ANALYTICS, entry.analytics.as_ref());
    insert_url(&mut map, keys::ANNOTATIONS, entry.annotations.as_ref());
    insert_url(&mut map, keys::ISSUES, entry.issues.as_ref());
    insert_url(&mut map, keys::RELATED, entry.related.as_ref());
    insert_url(&mut map, keys::TIME_TRACKING, entry.time_tracking.as_ref());

    if let Some(licensor) = &entry.licensor {
        map.insert(keys::LICENSOR.to_string(), licensor_to_json(licensor));
    }
    if let Some(accessibility) = &entry.accessibility {
        map.insert(keys::ACCESSIBILITY.to_string(), accessibility_to_json(accessibility));
    }

    map.insert(
        keys::ERRORS.to_string(),
        Value::Array(entry.errors.iter().map(parse_error_to_json).collect()),
    );

    Ok(Value::Object(map))
}

/// Convert a feed to its cache document.
pub(crate) fn feed_to_json(feed: &AcquisitionFeed, config: &CodecConfig) -> Result<Value> {
    let entries = feed
        .entries
        .iter()
        .map(|entry| entry_to_json(entry, config))
        .collect::<Result<Vec<_>>>()?;

    let metadata: Map<String, Value> = feed
        .metadata
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(object([
        (keys::ENTRIES, Value::Array(entries)),
        (keys::METADATA, Value::Object(metadata)),
    ]))
}
