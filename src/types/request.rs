//! The negotiation record: one proposed shift exchange and its status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{RequestId, ShiftHandle, UserId};
use super::slot::{ShiftDate, ShiftTime};

/// The decision a target user can make on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

/// Status of a negotiation record.
///
/// Legal transitions are `Pending -> Approved`, `Pending -> Rejected`, and
/// `Pending -> Expired` (TTL purge). The three non-pending states are
/// terminal; the store enforces that no further transition is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

impl From<Decision> for RequestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

/// One shift-swap negotiation.
///
/// Created when a requester's parsed message names a known target, mutated
/// exactly once by the target's decision (or by TTL expiry), then removed
/// from the active table. The calendar slot is a weak reference; the two
/// event handles resolved at creation time are what the approval-time swap
/// actually addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub request_id: RequestId,
    pub requester_id: UserId,
    pub requester_name: String,
    pub target_id: UserId,
    pub target_name: String,
    pub date: ShiftDate,
    pub time: ShiftTime,
    /// The requester's calendar event for the slot, resolved at creation.
    pub requester_shift: ShiftHandle,
    /// The target's calendar event for the slot, resolved at creation.
    pub target_shift: ShiftHandle,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    /// Unset while `Pending`; stamped by the decision that resolves the
    /// record. Remains unset for `Expired` records (no decision happened).
    pub responded_at: Option<DateTime<Utc>>,
}

impl SwapRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
