//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID kinds (e.g. passing a
//! reply token where a durable user ID is expected) and make signatures
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A messaging-platform user ID.
///
/// This is the durable identity of a user, as opposed to a display name
/// (which is resolved through the identity collaborator) or a reply token
/// (which expires).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        UserId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// The identifier of one shift-swap negotiation.
///
/// Derived deterministically from the request's semantic fields (see
/// `registry::Fingerprint::swap_request`), so repeated submissions of the
/// identical request collide on the same ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(s: impl Into<String>) -> Self {
        RequestId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId(s)
    }
}

/// A webhook delivery identifier.
///
/// The platform supplies one on redelivery (`x-line-retry-key`); on a first
/// delivery it may be absent, in which case an empty ID is used and the
/// webhook deduplicator keys on the raw body alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeliveryId {
    fn from(s: String) -> Self {
        DeliveryId(s)
    }
}

/// A short-lived handle for replying to the event that triggered processing.
///
/// Reply tokens expire; the outbound messenger falls back to a push via the
/// durable [`UserId`] when the platform rejects one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyToken(pub String);

impl ReplyToken {
    pub fn new(s: impl Into<String>) -> Self {
        ReplyToken(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReplyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReplyToken {
    fn from(s: String) -> Self {
        ReplyToken(s)
    }
}

/// A unique handle for one calendar event.
///
/// Resolved at negotiation-creation time and threaded through to the swap
/// call, so the swap addresses an explicit event rather than re-deriving
/// "first event at that time" (which is ambiguous under multiple same-time
/// events).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftHandle(pub String);

impl ShiftHandle {
    pub fn new(s: impl Into<String>) -> Self {
        ShiftHandle(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ShiftHandle {
    fn from(s: String) -> Self {
        ShiftHandle(s)
    }
}
