//! Calendar mutation gate.
//!
//! Prevents re-applying the same logical calendar mutation within 24 hours.
//! The key is the semantic tuple `(operation, date, time, subjectA,
//! subjectB)` with the subject pair sorted, so redelivered approvals and
//! double-taps collapse onto one external write. A duplicate hit is
//! reported as "already applied" and callers must treat it as success; the
//! user is never told the operation failed because it had already
//! happened.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::calendar::CalendarService;
use crate::registry::{Fingerprint, HashRegistry};
use crate::types::{ShiftDate, ShiftHandle, ShiftTime};

/// How long an applied calendar mutation is remembered.
pub const CALENDAR_WINDOW_SECS: i64 = 86_400;

/// Result of a gated calendar mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarOutcome {
    /// The external calendar applied the mutation.
    Applied,
    /// An identical mutation was applied within the window; treated as
    /// success.
    AlreadyApplied,
    /// The external calendar reported failure.
    Failed,
}

impl CalendarOutcome {
    /// Whether the calendar is (or already was) in the requested state.
    pub fn is_success(&self) -> bool {
        !matches!(self, CalendarOutcome::Failed)
    }
}

/// Deduplicating front for the calendar collaborator.
#[derive(Clone)]
pub struct CalendarGate {
    calendar: Arc<dyn CalendarService>,
    registry: Arc<dyn HashRegistry>,
}

impl CalendarGate {
    pub fn new(calendar: Arc<dyn CalendarService>, registry: Arc<dyn HashRegistry>) -> Self {
        CalendarGate { calendar, registry }
    }

    /// Swaps two events, once per key window.
    ///
    /// On failure the key is released so a later retry can reach the
    /// calendar again instead of being reported as already applied.
    pub fn swap(
        &self,
        date: &ShiftDate,
        time: &ShiftTime,
        subject_a: &str,
        subject_b: &str,
        handle_a: &ShiftHandle,
        handle_b: &ShiftHandle,
    ) -> CalendarOutcome {
        let key = Fingerprint::calendar_op("swap", date, time, subject_a, subject_b);
        if !self
            .registry
            .record_if_new(&key, Duration::seconds(CALENDAR_WINDOW_SECS))
        {
            debug!(%date, %time, subject_a, subject_b, "calendar swap already applied");
            return CalendarOutcome::AlreadyApplied;
        }

        if self.calendar.swap_shifts(handle_a, handle_b) {
            CalendarOutcome::Applied
        } else {
            self.registry.forget(&key);
            warn!(%date, %time, subject_a, subject_b, "calendar swap failed");
            CalendarOutcome::Failed
        }
    }

    /// Creates or updates a single shift, once per key window. No engine
    /// path upserts today; this guards the rest of the
    /// [`CalendarService`](crate::calendar::CalendarService) contract for
    /// callers that do.
    pub fn create_or_update(
        &self,
        date: &ShiftDate,
        time: &ShiftTime,
        subject: &str,
        note: &str,
    ) -> CalendarOutcome {
        let key = Fingerprint::calendar_op("upsert", date, time, subject, subject);
        if !self
            .registry
            .record_if_new(&key, Duration::seconds(CALENDAR_WINDOW_SECS))
        {
            debug!(%date, %time, subject, "calendar upsert already applied");
            return CalendarOutcome::AlreadyApplied;
        }

        if self.calendar.create_or_update_shift(date, time, subject, note) {
            CalendarOutcome::Applied
        } else {
            self.registry.forget(&key);
            warn!(%date, %time, subject, "calendar upsert failed");
            CalendarOutcome::Failed
        }
    }
}
