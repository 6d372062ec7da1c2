//! Content fingerprints for deduplication keys.
//!
//! A fingerprint is a SHA-256 digest over an explicitly enumerated tuple of
//! semantic fields, not over raw wire text. Fields are length-prefixed
//! before hashing so that field boundaries are unambiguous: `("ab", "c")`
//! and `("a", "bc")` never collide, regardless of the field contents.
//!
//! # Key shapes
//!
//! - webhook delivery: `("webhook", deliveryId, rawBody)`
//! - outbound message: `("message", recipientId, text)`
//! - calendar operation: `(operation, date, time, subjectA, subjectB)` with
//!   the subject pair sorted, so the same logical swap fingerprints
//!   identically no matter which party is named first
//! - swap request identity: `("request", requesterId, date, time, targetName)`

use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::{DeliveryId, RequestId, ShiftDate, ShiftTime, UserId};

/// Number of leading hex characters of a request fingerprint used as the
/// user-visible request ID. 64 bits is plenty for a table that holds at
/// most a handful of concurrently pending negotiations.
const REQUEST_ID_HEX_LEN: usize = 16;

/// A content-derived deduplication key (hex-encoded SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hashes an enumerated field tuple, length-prefixing each field.
    fn of_fields(fields: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for field in fields {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field);
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }

    /// Key for an inbound webhook delivery.
    pub fn webhook_delivery(delivery_id: &DeliveryId, raw_body: &[u8]) -> Self {
        Self::of_fields(&[b"webhook", delivery_id.as_str().as_bytes(), raw_body])
    }

    /// Key for an outbound notification to one recipient.
    pub fn outbound_message(recipient: &UserId, text: &str) -> Self {
        Self::of_fields(&[b"message", recipient.as_str().as_bytes(), text.as_bytes()])
    }

    /// Key for a calendar mutation.
    ///
    /// The subject pair is sorted before hashing: swapping A with B is the
    /// same operation as swapping B with A.
    pub fn calendar_op(
        operation: &str,
        date: &ShiftDate,
        time: &ShiftTime,
        subject_a: &str,
        subject_b: &str,
    ) -> Self {
        let (first, second) = if subject_a <= subject_b {
            (subject_a, subject_b)
        } else {
            (subject_b, subject_a)
        };
        Self::of_fields(&[
            operation.as_bytes(),
            date.compact().as_bytes(),
            format!("{}", time).as_bytes(),
            first.as_bytes(),
            second.as_bytes(),
        ])
    }

    /// Key identifying one logical swap request.
    ///
    /// The same requester asking the same target for the same slot always
    /// produces the same fingerprint; this is what makes repeated taps
    /// collapse onto a single negotiation.
    pub fn swap_request(
        requester: &UserId,
        date: &ShiftDate,
        time: &ShiftTime,
        target_name: &str,
    ) -> Self {
        Self::of_fields(&[
            b"request",
            requester.as_str().as_bytes(),
            date.compact().as_bytes(),
            format!("{}", time).as_bytes(),
            target_name.as_bytes(),
        ])
    }

    /// Truncates a request fingerprint into the user-visible [`RequestId`].
    pub fn into_request_id(self) -> RequestId {
        RequestId::new(&self.0[..REQUEST_ID_HEX_LEN])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
