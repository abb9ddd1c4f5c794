//! Lending status of a catalog entry.
//!
//! [`AvailabilityState`] is the closed set of states a library feed can report
//! for an entry at fetch time. Each variant carries only the data meaningful
//! to that state. Consumers are expected to `match` exhaustively; adding a
//! variant is a breaking change.
//!
//! # Examples
//!
//! ```ignore
//! use opds_entry::AvailabilityState;
//!
//! let label = match entry.availability() {
//!     AvailabilityState::OpenAccess { .. } => "Get",
//!     AvailabilityState::Loanable { .. } => "Borrow",
//!     AvailabilityState::Holdable { .. } => "Reserve",
//!     AvailabilityState::Held { is_ready: true, .. } => "Borrow (ready)",
//!     AvailabilityState::Held { .. } => "Reserved",
//!     AvailabilityState::Loaned { .. } => "Read",
//!     AvailabilityState::Revoked { .. } => "Remove",
//! };
//! ```

use crate::parse_error::ParseError;
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;

/// Lending status of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AvailabilityState {
    /// Freely obtainable, no loan semantics
    OpenAccess {
        /// Link for returning/removing the item, if the server offers one
        revoke: Option<Url>,
    },
    /// Can be borrowed now, not currently held by this user
    Loanable {
        /// Number of copies currently available
        copies_available: Option<u32>,
        /// Total number of copies
        copies: Option<u32>,
    },
    /// Can be placed on a hold queue
    Holdable {
        /// Position a new hold would take in the queue
        queue_position: Option<u32>,
        /// Number of copies currently available
        copies_available: Option<u32>,
        /// Total number of copies
        copies: Option<u32>,
    },
    /// The user is in the hold queue
    Held {
        /// The user's position in the queue
        queue_position: Option<u32>,
        /// Total number of holds in the queue
        queue: Option<u32>,
        /// Number of copies currently available
        copies_available: Option<u32>,
        /// Total number of copies
        copies: Option<u32>,
        /// When the hold was placed
        start_date: Option<DateTime<Utc>>,
        /// When the hold lapses
        end_date: Option<DateTime<Utc>>,
        /// The held copy is reserved and ready to borrow
        is_ready: bool,
        /// Link for cancelling the hold
        revoke: Option<Url>,
    },
    /// The user currently holds a loan
    Loaned {
        /// When the loan started
        start_date: Option<DateTime<Utc>>,
        /// When the loan expires
        end_date: Option<DateTime<Utc>>,
        /// Link for returning the loan early
        revoke: Option<Url>,
    },
    /// Entitlement was revoked; local copies must be cleared
    Revoked {
        /// Link the client should call to acknowledge the revocation
        revoke: Option<Url>,
    },
}

/// Fieldless tag identifying an [`AvailabilityState`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityKind {
    /// `open_access`
    OpenAccess,
    /// `loanable`
    Loanable,
    /// `holdable`
    Holdable,
    /// `held`
    Held,
    /// `loaned`
    Loaned,
    /// `revoked`
    Revoked,
}

impl AvailabilityKind {
    /// All six kinds, in declaration order.
    pub const ALL: [AvailabilityKind; 6] = [
        AvailabilityKind::OpenAccess,
        AvailabilityKind::Loanable,
        AvailabilityKind::Holdable,
        AvailabilityKind::Held,
        AvailabilityKind::Loaned,
        AvailabilityKind::Revoked,
    ];

    /// Stable wire name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAccess => "open_access",
            Self::Loanable => "loanable",
            Self::Holdable => "holdable",
            Self::Held => "held",
            Self::Loaned => "loaned",
            Self::Revoked => "revoked",
        }
    }

    /// Look up a kind by its wire name.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for AvailabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AvailabilityState {
    /// Open access with no revocation link.
    #[must_use]
    pub const fn open_access() -> Self {
        AvailabilityState::OpenAccess { revoke: None }
    }

    /// Loanable with unknown copy counts.
    #[must_use]
    pub const fn loanable() -> Self {
        AvailabilityState::Loanable {
            copies_available: None,
            copies: None,
        }
    }

    /// Holdable at the given queue position with unknown copy counts.
    #[must_use]
    pub const fn holdable(queue_position: Option<u32>) -> Self {
        AvailabilityState::Holdable {
            queue_position,
            copies_available: None,
            copies: None,
        }
    }

    /// Held with unknown queue and copy counts and no revocation link.
    #[must_use]
    pub fn held(
        queue_position: Option<u32>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        is_ready: bool,
    ) -> Self {
        AvailabilityState::Held {
            queue_position,
            queue: None,
            copies_available: None,
            copies: None,
            start_date,
            end_date,
            is_ready,
            revoke: None,
        }
    }

    /// Loaned with no revocation link.
    #[must_use]
    pub fn loaned(start_date: Option<DateTime<Utc>>, end_date: Option<DateTime<Utc>>) -> Self {
        AvailabilityState::Loaned {
            start_date,
            end_date,
            revoke: None,
        }
    }

    /// Revoked with no acknowledgement link.
    #[must_use]
    pub const fn revoked() -> Self {
        AvailabilityState::Revoked { revoke: None }
    }

    /// The variant tag.
    #[must_use]
    pub const fn kind(&self) -> AvailabilityKind {
        match self {
            AvailabilityState::OpenAccess { .. } => AvailabilityKind::OpenAccess,
            AvailabilityState::Loanable { .. } => AvailabilityKind::Loanable,
            AvailabilityState::Holdable { .. } => AvailabilityKind::Holdable,
            AvailabilityState::Held { .. } => AvailabilityKind::Held,
            AvailabilityState::Loaned { .. } => AvailabilityKind::Loaned,
            AvailabilityState::Revoked { .. } => AvailabilityKind::Revoked,
        }
    }

    /// Start of the hold or loan, if the variant has one.
    #[must_use]
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        match self {
            AvailabilityState::Held { start_date, .. }
            | AvailabilityState::Loaned { start_date, .. } => *start_date,
            _ => None,
        }
    }

    /// End of the hold or loan, if the variant has one.
    #[must_use]
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        match self {
            AvailabilityState::Held { end_date, .. }
            | AvailabilityState::Loaned { end_date, .. } => *end_date,
            _ => None,
        }
    }

    /// Revocation link, if the variant has one.
    #[must_use]
    pub fn revoke_uri(&self) -> Option<&Url> {
        match self {
            AvailabilityState::OpenAccess { revoke }
            | AvailabilityState::Held { revoke, .. }
            | AvailabilityState::Loaned { revoke, .. }
            | AvailabilityState::Revoked { revoke } => revoke.as_ref(),
            AvailabilityState::Loanable { .. } | AvailabilityState::Holdable { .. } => None,
        }
    }

    /// Check per-variant invariants and return a best-effort state.
    ///
    /// An end date earlier than the start date is reported as a
    /// [`ParseError`]; the returned state keeps the start date and drops the
    /// end date. Valid states are returned unchanged.
    #[must_use]
    pub fn validated(self) -> (Self, Option<ParseError>) {
        match self {
            AvailabilityState::Held {
                queue_position,
                queue,
                copies_available,
                copies,
                start_date: Some(start),
                end_date: Some(end),
                is_ready,
                revoke,
            } if end < start => (
                AvailabilityState::Held {
                    queue_position,
                    queue,
                    copies_available,
                    copies,
                    start_date: Some(start),
                    end_date: None,
                    is_ready,
                    revoke,
                },
                Some(date_order_error(AvailabilityKind::Held, start, end)),
            ),
            AvailabilityState::Loaned {
                start_date: Some(start),
                end_date: Some(end),
                revoke,
            } if end < start => (
                AvailabilityState::Loaned {
                    start_date: Some(start),
                    end_date: None,
                    revoke,
                },
                Some(date_order_error(AvailabilityKind::Loaned, start, end)),
            ),
            other => (other, None),
        }
    }
}

fn date_order_error(
    kind: AvailabilityKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ParseError {
    ParseError::at(
        format!("availability/{kind}"),
        format!(
            "end date {} precedes start date {}; end date discarded",
            end.to_rfc3339(),
            start.to_rfc3339()
        ),
    )
}
