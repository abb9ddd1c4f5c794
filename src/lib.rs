#![doc = include_str!("../README.md")]

//! # opds-entry: OPDS feed entries for Rust
//!
//! Data model, builder, and JSON cache codec for the entries of an OPDS
//! acquisition feed as seen by a library-lending reading app.
//!
//! ## Quick Start
//!
//! ### Building an entry while parsing a feed
//!
//! ```ignore
//! use opds_entry::{AcquisitionLink, AcquisitionRelation, AvailabilityState, FeedEntryBuilder};
//! use url::Url;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let updated = "2023-01-01T00:00:00Z".parse()?;
//! let availability = AvailabilityState::loanable();
//! let mut builder = FeedEntryBuilder::new("e1", "Sample Book", updated, availability);
//! builder
//!     .add_author("A. Author")
//!     .add_acquisition(AcquisitionLink::new(
//!         AcquisitionRelation::Borrow,
//!         Url::parse("https://ex/borrow")?,
//!         "application/epub+zip",
//!     ));
//! let entry = builder.build();
//! assert!(!entry.has_errors());
//! # Ok(())
//! # }
//! ```
//!
//! ### Caching entries
//!
//! ```ignore
//! use opds_entry::codec::EntryCodec;
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = EntryCodec::default();
//! codec.write_entry(File::create("entry.json")?, &entry)?;
//! let restored = codec.read_entry(File::open("entry.json")?)?;
//! assert_eq!(restored, entry);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`entry`] - The immutable [`FeedEntry`] and its [`Group`] memberships
//! - [`entry_builder`] - Incremental construction via [`FeedEntryBuilder`]
//! - [`availability`] - Lending state of an entry
//! - [`acquisition`] - Acquisition links and indirect acquisition trees
//! - [`category`], [`licensor`], [`accessibility`] - Entry sub-records
//! - [`feed`] - Ordered entries plus pass-through feed metadata
//! - [`codec`] - JSON cache format with configurable recovery
//! - [`parse_error`] - Soft, per-entry diagnostics
//! - [`error`] - Hard codec errors

pub mod accessibility;
pub mod acquisition;
pub mod availability;
pub mod category;
pub mod codec;
pub mod entry;
pub mod entry_builder;
pub mod error;
pub mod feed;
pub mod licensor;
pub mod parse_error;

pub use accessibility::Accessibility;
pub use acquisition::{
    AcquisitionLink, AcquisitionRelation, IndirectAcquisition, PreviewAcquisition,
};
pub use availability::{AvailabilityKind, AvailabilityState};
pub use category::Category;
pub use codec::{CodecConfig, EntryCodec, RecoveryMode};
pub use entry::{FeedEntry, Group};
pub use entry_builder::FeedEntryBuilder;
pub use error::{Result, SerializationError};
pub use feed::AcquisitionFeed;
pub use licensor::DrmLicensor;
pub use parse_error::ParseError;
