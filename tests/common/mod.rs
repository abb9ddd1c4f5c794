//! Common test helpers and fixtures shared across the test suite.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use opds_entry::{
    Accessibility, AcquisitionLink, AcquisitionRelation, AvailabilityState, Category, DrmLicensor,
    FeedEntry, FeedEntryBuilder, IndirectAcquisition, PreviewAcquisition,
};
use url::Url;

/// Install a test-writer subscriber so `tracing` output shows up with
/// `--nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Midnight UTC on the given day.
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Parse a URL fixture.
pub fn url(text: &str) -> Url {
    Url::parse(text).unwrap()
}

/// Builder for the minimal "Sample Book" entry: `e1`, loanable, one author,
/// one borrow link.
pub fn sample_builder() -> FeedEntryBuilder {
    let mut builder = FeedEntryBuilder::new(
        "e1",
        "Sample Book",
        date(2023, 1, 1),
        AvailabilityState::loanable(),
    );
    builder.add_author("A. Author").add_acquisition(AcquisitionLink::new(
        AcquisitionRelation::Borrow,
        url("https://ex/borrow"),
        "application/epub+zip",
    ));
    builder
}

/// The minimal "Sample Book" entry.
pub fn sample_entry() -> FeedEntry {
    sample_builder().build()
}

/// An entry with every optional field populated.
pub fn rich_entry() -> FeedEntry {
    let mut builder = FeedEntryBuilder::new(
        "urn:uuid:2a1f0c5e-7e2b-4b7e-9d4e-3c8f2a1b0c9d",
        "The Complete Audiobook",
        date(2024, 3, 15),
        AvailabilityState::held(
            Some(2),
            Some(date(2024, 3, 1)),
            Some(date(2024, 4, 1)),
            true,
        ),
    );

    let mut licensor = DrmLicensor::new("Example Vendor", "token-123");
    licensor.client_token_url = Some(url("https://library.example.org/drm/token"));
    licensor.device_manager = Some(url("https://library.example.org/drm/devices"));

    let adobe = IndirectAcquisition::new("application/vnd.adobe.adept+xml")
        .with_indirect(IndirectAcquisition::new("application/epub+zip"));

    builder
        .add_author("First Author")
        .add_author("Second Author")
        .add_narrator("A. Narrator")
        .add_illustrator("An Illustrator")
        .add_translator("A. Translator")
        .add_category(
            Category::new("Fiction", "http://librarysimplified.org/terms/genres/Simplified/")
                .with_label("Fiction"),
        )
        .add_category(Category::new("Adult", "http://schema.org/audience"))
        .add_group("Staff Picks", url("https://library.example.org/groups/staff"))
        .add_group("New Arrivals", url("https://library.example.org/groups/new"))
        .add_acquisition(
            AcquisitionLink::new(
                AcquisitionRelation::Borrow,
                url("https://library.example.org/works/1/borrow"),
                "application/atom+xml;type=entry;profile=opds-catalog",
            )
            .with_indirect(adobe),
        )
        .add_acquisition(AcquisitionLink::new(
            AcquisitionRelation::Sample,
            url("https://library.example.org/works/1/sample.mp3"),
            "audio/mpeg",
        ))
        .add_preview_acquisition(PreviewAcquisition::new(
            url("https://library.example.org/works/1/preview"),
            "text/html",
        ))
        .set_summary_option(Some("<p>A long listen.</p>".to_string()))
        .set_distribution("Example Distributor")
        .set_language_option(Some("en".to_string()))
        .set_publisher_option(Some("Example Press".to_string()))
        .set_published_option(Some(date(2019, 6, 1)))
        .set_selected_option(Some(date(2024, 3, 16)))
        .set_duration_option(Some(38_214.5))
        .set_cover_option(Some(url("https://covers.example.org/1.jpg")))
        .set_thumbnail_option(Some(url("https://covers.example.org/1-thumb.jpg")))
        .set_alternate_option(Some(url("https://library.example.org/works/1")))
        .set_analytics_option(Some(url("https://library.example.org/analytics/1")))
        .set_annotations_option(Some(url("https://library.example.org/annotations/1")))
        .set_issues_option(Some(url("https://library.example.org/report/1")))
        .set_related_option(Some(url("https://library.example.org/works/1/related")))
        .set_time_tracking_option(Some(url("https://library.example.org/time/1")))
        .set_licensor_option(Some(licensor))
        .set_accessibility_option(Some(Accessibility {
            ways_of_reading: vec!["Readable in read aloud or dynamic braille".to_string()],
            conforms_to: vec!["EPUB Accessibility 1.1 - WCAG 2.1 Level AA".to_string()],
        }));

    builder.build()
}

/// A chain of `levels` nested indirect acquisitions.
pub fn indirect_chain(levels: usize) -> IndirectAcquisition {
    let mut chain = IndirectAcquisition::new("application/epub+zip");
    for _ in 1..levels {
        chain = IndirectAcquisition::new("application/vnd.adobe.adept+xml").with_indirect(chain);
    }
    chain
}

/// One entry per availability variant.
pub fn entries_for_every_availability() -> Vec<FeedEntry> {
    [
        AvailabilityState::OpenAccess {
            revoke: Some(url("https://ex/revoke/open")),
        },
        AvailabilityState::Loanable {
            copies_available: Some(1),
            copies: Some(5),
        },
        AvailabilityState::Holdable {
            queue_position: Some(7),
            copies_available: Some(0),
            copies: Some(3),
        },
        AvailabilityState::Held {
            queue_position: Some(1),
            queue: Some(6),
            copies_available: Some(0),
            copies: Some(3),
            start_date: Some(date(2024, 1, 1)),
            end_date: None,
            is_ready: false,
            revoke: Some(url("https://ex/hold/cancel")),
        },
        AvailabilityState::Loaned {
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 1, 22)),
            revoke: Some(url("https://ex/return")),
        },
        AvailabilityState::revoked(),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, availability)| {
        FeedEntryBuilder::new(
            format!("e{index}"),
            format!("Book {index}"),
            date(2023, 1, 1),
            availability,
        )
        .build()
    })
    .collect()
}
