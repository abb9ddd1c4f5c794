//! Acquisition links and content-type negotiation trees.
//!
//! An [`AcquisitionLink`] describes one way to obtain an entry's content. The
//! link's own content type is frequently a wrapper (a DRM license, a
//! fulfillment token) around the file the reader actually wants; that chain is
//! modelled by nested [`IndirectAcquisition`] values. The tree is represented
//! as delivered and never evaluated here.

use crate::parse_error::ParseError;
use std::fmt;
use url::Url;

const REL_ACQUISITION: &str = "http://opds-spec.org/acquisition";
const REL_BORROW: &str = "http://opds-spec.org/acquisition/borrow";
const REL_BUY: &str = "http://opds-spec.org/acquisition/buy";
const REL_SAMPLE: &str = "http://opds-spec.org/acquisition/sample";
const REL_OPEN_ACCESS: &str = "http://opds-spec.org/acquisition/open-access";
const REL_SUBSCRIBE: &str = "http://opds-spec.org/acquisition/subscribe";

/// Relation of an acquisition link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AcquisitionRelation {
    /// Borrow the content (loan)
    Borrow,
    /// Purchase the content
    Buy,
    /// Obtain a free sample
    Sample,
    /// Freely obtainable content
    OpenAccess,
    /// Unqualified acquisition
    Generic,
    /// Obtain via a subscription
    Subscribe,
}

impl AcquisitionRelation {
    /// The OPDS link relation URI for this relation.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::Borrow => REL_BORROW,
            Self::Buy => REL_BUY,
            Self::Sample => REL_SAMPLE,
            Self::OpenAccess => REL_OPEN_ACCESS,
            Self::Generic => REL_ACQUISITION,
            Self::Subscribe => REL_SUBSCRIBE,
        }
    }

    /// Look up a relation by its OPDS link relation URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            REL_BORROW => Some(Self::Borrow),
            REL_BUY => Some(Self::Buy),
            REL_SAMPLE => Some(Self::Sample),
            REL_OPEN_ACCESS => Some(Self::OpenAccess),
            REL_ACQUISITION => Some(Self::Generic),
            REL_SUBSCRIBE => Some(Self::Subscribe),
            _ => None,
        }
    }

    /// Interpret a relation URI, degrading unknown relations to
    /// [`AcquisitionRelation::Generic`] with a [`ParseError`].
    #[must_use]
    pub fn parse_lenient(uri: &str) -> (Self, Option<ParseError>) {
        match Self::from_uri(uri) {
            Some(relation) => (relation, None),
            None => (
                Self::Generic,
                Some(ParseError::at(
                    "acquisition/relation",
                    format!("unrecognized acquisition relation '{uri}', treated as generic"),
                )),
            ),
        }
    }
}

impl fmt::Display for AcquisitionRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

/// One nested content-type negotiation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndirectAcquisition {
    /// Content type produced at this step
    pub mime_type: String,
    /// Steps nested inside this one
    pub indirect_acquisitions: Vec<IndirectAcquisition>,
}

impl IndirectAcquisition {
    /// Create a leaf step.
    #[must_use]
    pub fn new(mime_type: impl Into<String>) -> Self {
        IndirectAcquisition {
            mime_type: mime_type.into(),
            indirect_acquisitions: Vec::new(),
        }
    }

    /// Append a nested step.
    #[must_use]
    pub fn with_indirect(mut self, nested: IndirectAcquisition) -> Self {
        self.indirect_acquisitions.push(nested);
        self
    }

    /// Number of levels in this subtree, counting this step as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .indirect_acquisitions
            .iter()
            .map(IndirectAcquisition::depth)
            .max()
            .unwrap_or(0)
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.indirect_acquisitions.is_empty() {
            out.push(&self.mime_type);
        } else {
            for nested in &self.indirect_acquisitions {
                nested.collect_leaves(out);
            }
        }
    }
}

/// A link describing one way to obtain an entry's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AcquisitionLink {
    /// Relation of the link
    pub relation: AcquisitionRelation,
    /// Target of the link
    pub uri: Url,
    /// Content type served at `uri`
    pub mime_type: String,
    /// Negotiation steps between the link and the deliverable file
    pub indirect_acquisitions: Vec<IndirectAcquisition>,
}

impl AcquisitionLink {
    /// Create a link with no indirect acquisitions.
    #[must_use]
    pub fn new(relation: AcquisitionRelation, uri: Url, mime_type: impl Into<String>) -> Self {
        AcquisitionLink {
            relation,
            uri,
            mime_type: mime_type.into(),
            indirect_acquisitions: Vec::new(),
        }
    }

    /// Append an indirect acquisition.
    #[must_use]
    pub fn with_indirect(mut self, indirect: IndirectAcquisition) -> Self {
        self.indirect_acquisitions.push(indirect);
        self
    }

    /// Depth of the deepest indirect acquisition chain (0 when there is none).
    #[must_use]
    pub fn indirect_depth(&self) -> usize {
        self.indirect_acquisitions
            .iter()
            .map(IndirectAcquisition::depth)
            .max()
            .unwrap_or(0)
    }

    /// Content types at the leaves of the negotiation tree, in document order.
    ///
    /// For a link without indirect acquisitions this is the link's own type.
    #[must_use]
    pub fn final_content_types(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        if self.indirect_acquisitions.is_empty() {
            leaves.push(self.mime_type.as_str());
        } else {
            for indirect in &self.indirect_acquisitions {
                indirect.collect_leaves(&mut leaves);
            }
        }
        leaves
    }
}

/// A link to a preview (sample reader, audio excerpt) of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewAcquisition {
    /// Target of the link
    pub uri: Url,
    /// Content type served at `uri`
    pub mime_type: String,
}

impl PreviewAcquisition {
    /// Create a preview link.
    #[must_use]
    pub fn new(uri: Url, mime_type: impl Into<String>) -> Self {
        PreviewAcquisition {
            uri,
            mime_type: mime_type.into(),
        }
    }
}
