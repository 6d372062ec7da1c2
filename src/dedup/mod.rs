//! Deduplication layers built on the hash registry.
//!
//! Three windows, three layers:
//!
//! - inbound webhook deliveries (10 seconds): a redelivered payload is
//!   skipped entirely, before parsing
//! - outbound messages (1 hour): the same text is not sent twice to the
//!   same recipient
//! - calendar mutations (24 hours): the same logical mutation is not
//!   re-applied, and a duplicate hit counts as success
//!
//! The calendar window is the longest because calendar writes are costly
//! and visible, and idempotent retries are common when webhook redelivery
//! combines with user double-taps.

pub mod calendar;
pub mod outbound;
pub mod webhook;

pub use calendar::{CalendarGate, CalendarOutcome, CALENDAR_WINDOW_SECS};
pub use outbound::{Messenger, SendOutcome, MESSAGE_WINDOW_SECS};
pub use webhook::{WebhookDeduplicator, WEBHOOK_WINDOW_SECS};
