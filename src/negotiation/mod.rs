//! Shift-swap negotiation: the submit/decide state machine.
//!
//! A negotiation is created when an admin's `swap` command resolves
//! cleanly, and ends when the named target approves or rejects it (or when
//! it expires unanswered). The [`store`] module owns the lifecycle rules;
//! the [`engine`] module orchestrates the collaborators around them.
//!
//! # Lifecycle
//!
//! ```text
//! submit ──> Pending ──approve──> Approved ──> calendar swap
//!                │  \──reject───> Rejected
//!                └────(TTL)─────> Expired
//! ```
//!
//! All three non-pending states are terminal. A decision on an already
//! resolved request reports [`DecideError::AlreadyResolved`] for as long
//! as the resolution ledger remembers it, then [`DecideError::NotFound`].

pub mod engine;
pub mod store;

pub use engine::{
    DecisionOutcome, NegotiationEngine, DEFAULT_PENDING_TTL_SECS, DUPLICATE_SUBMISSION_WINDOW_SECS,
};
pub use store::{InMemoryStore, NegotiationStore, RESOLVED_LEDGER_TTL_SECS};

use thiserror::Error;

use crate::types::{InvalidDate, InvalidTime, RequestId};

/// Which side of a proposed swap a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftParty {
    Requester,
    Target,
}

/// Why a `swap` command was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{0} is not a valid YYYYMMDD date")]
    InvalidDate(String),

    #[error("{0} is not a valid HH:MM time")]
    InvalidTime(String),

    /// The target name resolved to nobody. Carries the full membership so
    /// the reply can list who *can* be asked.
    #[error("no staff member is named {name}")]
    UnknownTarget { name: String, known: Vec<String> },

    /// The sender does not carry the admin flag.
    #[error("only administrators can submit swap requests")]
    Forbidden,

    /// An identical request (same requester, slot, and target) is already
    /// pending and was created recently.
    #[error("request {existing} is already pending")]
    DuplicateSubmission { existing: RequestId },

    /// One of the two parties has no shift at the requested slot.
    #[error("{name} has no shift at the requested slot")]
    ShiftNotFound { who: ShiftParty, name: String },
}

impl From<InvalidDate> for SubmitError {
    fn from(error: InvalidDate) -> Self {
        SubmitError::InvalidDate(error.0)
    }
}

impl From<InvalidTime> for SubmitError {
    fn from(error: InvalidTime) -> Self {
        SubmitError::InvalidTime(error.0)
    }
}

/// Why an approve/reject was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecideError {
    /// No active request with that ID (never existed, or expired, or
    /// resolved long enough ago that the ledger has forgotten it).
    #[error("no pending request with that ID")]
    NotFound,

    /// The decider is not the request's target. The record is untouched.
    #[error("only the requested partner can decide this request")]
    Forbidden,

    /// The request was resolved recently; a redelivered or double-tapped
    /// decision lands here instead of re-running side effects.
    #[error("this request has already been resolved")]
    AlreadyResolved,
}
