//! Property-based tests for the entry model and cache codec.
//!
//! Generators build entries through the public builder only, so every
//! generated value is one a feed parser could have produced.

use chrono::{DateTime, TimeZone, Utc};
use opds_entry::codec::{CodecConfig, EntryCodec};
use opds_entry::{
    AcquisitionLink, AcquisitionRelation, AvailabilityState, Category, FeedEntry, FeedEntryBuilder,
    IndirectAcquisition, ParseError, PreviewAcquisition,
};
use proptest::prelude::*;
use url::Url;

// =============================================================================
// Generators
// =============================================================================

fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    // 1970-01-01 .. 2100-01-01, with sub-second precision
    (0i64..4_102_444_800, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).single().unwrap_or_default())
}

fn arb_url() -> impl Strategy<Value = Url> {
    ("[a-z]{1,10}", "[a-z0-9]{0,12}").prop_map(|(host, path)| {
        Url::parse(&format!("https://{host}.example.org/{path}")).unwrap()
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    "[\\PC]{0,24}"
}

fn arb_mime() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("application/epub+zip".to_string()),
        Just("application/pdf".to_string()),
        Just("application/vnd.adobe.adept+xml".to_string()),
        Just("audio/mpeg".to_string()),
        Just("text/html".to_string()),
    ]
}

fn arb_relation() -> impl Strategy<Value = AcquisitionRelation> {
    prop_oneof![
        Just(AcquisitionRelation::Borrow),
        Just(AcquisitionRelation::Buy),
        Just(AcquisitionRelation::Sample),
        Just(AcquisitionRelation::OpenAccess),
        Just(AcquisitionRelation::Generic),
        Just(AcquisitionRelation::Subscribe),
    ]
}

fn arb_indirect() -> impl Strategy<Value = IndirectAcquisition> {
    let leaf = arb_mime().prop_map(IndirectAcquisition::new);
    leaf.prop_recursive(4, 16, 3, |inner| {
        (arb_mime(), prop::collection::vec(inner, 0..3)).prop_map(|(mime, nested)| {
            IndirectAcquisition {
                mime_type: mime,
                indirect_acquisitions: nested,
            }
        })
    })
}

fn arb_acquisition() -> impl Strategy<Value = AcquisitionLink> {
    (
        arb_relation(),
        arb_url(),
        arb_mime(),
        prop::collection::vec(arb_indirect(), 0..3),
    )
        .prop_map(|(relation, uri, mime, indirects)| AcquisitionLink {
            relation,
            uri,
            mime_type: mime,
            indirect_acquisitions: indirects,
        })
}

fn arb_availability() -> impl Strategy<Value = AvailabilityState> {
    let count = prop::option::of(0u32..1000);
    prop_oneof![
        prop::option::of(arb_url()).prop_map(|revoke| AvailabilityState::OpenAccess { revoke }),
        (count.clone(), count.clone()).prop_map(|(copies_available, copies)| {
            AvailabilityState::Loanable {
                copies_available,
                copies,
            }
        }),
        (count.clone(), count.clone(), count.clone()).prop_map(
            |(queue_position, copies_available, copies)| AvailabilityState::Holdable {
                queue_position,
                copies_available,
                copies,
            }
        ),
        (
            (count.clone(), count.clone(), count.clone(), count),
            (prop::option::of(arb_timestamp()), prop::option::of(arb_timestamp())),
            any::<bool>(),
            prop::option::of(arb_url()),
        )
            .prop_map(|(counts, dates, is_ready, revoke)| {
                let (queue_position, queue, copies_available, copies) = counts;
                let (start_date, end_date) = dates;
                AvailabilityState::Held {
                    queue_position,
                    queue,
                    copies_available,
                    copies,
                    start_date,
                    end_date,
                    is_ready,
                    revoke,
                }
            }),
        (
            prop::option::of(arb_timestamp()),
            prop::option::of(arb_timestamp()),
            prop::option::of(arb_url()),
        )
            .prop_map(|(start_date, end_date, revoke)| AvailabilityState::Loaned {
                start_date,
                end_date,
                revoke,
            }),
        prop::option::of(arb_url()).prop_map(|revoke| AvailabilityState::Revoked { revoke }),
    ]
}

prop_compose! {
    fn arb_contributors()(
        authors in prop::collection::vec(arb_text(), 0..4),
        narrators in prop::collection::vec(arb_text(), 0..2),
        categories in prop::collection::vec(
            (arb_text(), arb_text(), prop::option::of(arb_text())),
            0..3,
        ),
        groups in prop::collection::vec((arb_text(), arb_url()), 0..3),
    ) -> (Vec<String>, Vec<String>, Vec<Category>, Vec<(String, Url)>) {
        let categories = categories
            .into_iter()
            .map(|(term, scheme, label)| Category { term, scheme, label })
            .collect();
        (authors, narrators, categories, groups)
    }
}

prop_compose! {
    fn arb_optionals()(
        summary in prop::option::of(arb_text()),
        language in prop::option::of("[a-z]{2}"),
        published in prop::option::of(arb_timestamp()),
        duration in prop::option::of(0.0f64..1.0e7),
        cover in prop::option::of(arb_url()),
    ) -> (Option<String>, Option<String>, Option<DateTime<Utc>>, Option<f64>, Option<Url>) {
        (summary, language, published, duration, cover)
    }
}

prop_compose! {
    fn arb_entry()(
        id in "[a-z0-9:]{1,20}",
        title in arb_text(),
        updated in arb_timestamp(),
        availability in arb_availability(),
        (authors, narrators, categories, groups) in arb_contributors(),
        acquisitions in prop::collection::vec(arb_acquisition(), 0..3),
        previews in prop::collection::vec((arb_url(), arb_mime()), 0..2),
        (summary, language, published, duration, cover) in arb_optionals(),
        errors in prop::collection::vec((arb_text(), prop::option::of(arb_text())), 0..3),
    ) -> FeedEntry {
        let mut builder = FeedEntryBuilder::new(id, title, updated, availability);
        for author in authors {
            builder.add_author(author);
        }
        for narrator in narrators {
            builder.add_narrator(narrator);
        }
        for category in categories {
            builder.add_category(category);
        }
        for (name, uri) in groups {
            builder.add_group(name, uri);
        }
        for acquisition in acquisitions {
            builder.add_acquisition(acquisition);
        }
        for (uri, mime) in previews {
            builder.add_preview_acquisition(PreviewAcquisition::new(uri, mime));
        }
        for (message, location) in errors {
            builder.add_parse_error(ParseError { message, location });
        }
        builder
            .set_summary_option(summary)
            .set_language_option(language)
            .set_published_option(published)
            .set_duration_option(duration)
            .set_cover_option(cover);
        builder.build()
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_decode_inverts_encode(entry in arb_entry()) {
        let codec = EntryCodec::default();
        let document = codec.encode_entry(&entry).unwrap();
        let restored = codec.decode_entry(&document).unwrap();

        prop_assert_eq!(&restored, &entry);
        prop_assert_eq!(restored.errors(), entry.errors());
    }

    #[test]
    fn prop_text_round_trip(entry in arb_entry()) {
        let codec = EntryCodec::new(CodecConfig::new().with_pretty(true));
        let mut buffer = Vec::new();
        codec.write_entry(&mut buffer, &entry).unwrap();
        let restored = codec.read_entry(buffer.as_slice()).unwrap();

        prop_assert_eq!(&restored, &entry);
        prop_assert_eq!(restored.errors(), entry.errors());
    }

    #[test]
    fn prop_from_entry_rebuilds_equal_without_errors(entry in arb_entry()) {
        let rebuilt = FeedEntryBuilder::from_entry(&entry).build();
        prop_assert_eq!(&rebuilt, &entry);
        prop_assert!(rebuilt.errors().is_empty());
    }

    #[test]
    fn prop_availability_dates_ordered(availability in arb_availability()) {
        let entry = FeedEntryBuilder::new("e", "t", Utc::now(), availability).build();
        if let (Some(start), Some(end)) =
            (entry.availability().start_date(), entry.availability().end_date())
        {
            prop_assert!(start <= end);
        }
    }

    #[test]
    fn prop_decode_never_panics(text in "\\PC{0,256}") {
        if let Ok(document) = serde_json::from_str::<serde_json::Value>(&text) {
            let _ = EntryCodec::default().decode_entry(&document);
        }
    }
}
