//! Calendar collaborator seam.
//!
//! The external calendar holds the authoritative shift schedule as timed
//! events. The core looks shifts up when a negotiation is created and
//! swaps them (by explicit event handle) when it is approved; it never
//! enumerates or owns the schedule.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

use crate::types::{ShiftDate, ShiftHandle, ShiftTime};

/// One calendar event, as surfaced to the negotiation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftEvent {
    /// Unique handle addressing exactly this event.
    pub handle: ShiftHandle,
    /// Event title, shown in the decision prompt.
    pub summary: String,
}

/// The external calendar's surface.
///
/// `swap_shifts` and `create_or_update_shift` return `true` when the
/// mutation was applied (or the calendar was already consistent) and
/// `false` on failure. Failures never carry detail across this boundary;
/// the negotiation layer only needs applied-or-not.
pub trait CalendarService: Send + Sync {
    /// Finds `subject`'s shift at the given slot, returning a unique event
    /// handle, or `None` if no such shift exists.
    fn find_shift(
        &self,
        date: &ShiftDate,
        time: &ShiftTime,
        subject: &str,
    ) -> Option<ShiftEvent>;

    /// Exchanges the assignees of two events addressed by handle.
    fn swap_shifts(&self, a: &ShiftHandle, b: &ShiftHandle) -> bool;

    /// Creates a shift for `subject` at the slot, or updates the note of an
    /// existing one. Part of the collaborator contract; the negotiation
    /// engine itself only swaps and never upserts.
    fn create_or_update_shift(
        &self,
        date: &ShiftDate,
        time: &ShiftTime,
        subject: &str,
        note: &str,
    ) -> bool;
}

#[derive(Debug, Clone)]
struct ShiftEntry {
    date: ShiftDate,
    time: ShiftTime,
    subject: String,
    note: String,
}

/// Error loading a schedule seed file.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("IO error reading schedule: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid schedule JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("shift date {0} is not a valid YYYYMMDD date")]
    BadDate(String),

    #[error("shift time {0} is not a valid HH:MM time")]
    BadTime(String),
}

#[derive(Debug, Default)]
struct ScheduleInner {
    events: HashMap<ShiftHandle, ShiftEntry>,
    next_id: u64,
}

/// In-process schedule for the single-instance deployment and for tests.
///
/// Performs real handle-addressed swaps: the two events exchange their
/// subjects and each gains a swap note, mirroring what the external
/// calendar does to event summaries and descriptions.
#[derive(Debug, Default)]
pub struct StaticSchedule {
    inner: Mutex<ScheduleInner>,
}

impl StaticSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a schedule seed: a JSON array of
    /// `{date: "YYYYMMDD", time: "HH:MM", subject, note?}`.
    pub fn load(path: &Path) -> Result<Self, ScheduleError> {
        #[derive(Deserialize)]
        struct RawEntry {
            date: String,
            time: String,
            subject: String,
            #[serde(default)]
            note: String,
        }

        let bytes = std::fs::read(path)?;
        let raw: Vec<RawEntry> = serde_json::from_slice(&bytes)?;

        let schedule = StaticSchedule::new();
        for entry in raw {
            let date =
                ShiftDate::parse(&entry.date).map_err(|_| ScheduleError::BadDate(entry.date))?;
            let time =
                ShiftTime::parse(&entry.time).map_err(|_| ScheduleError::BadTime(entry.time))?;
            schedule.add_shift(&date, &time, &entry.subject, &entry.note);
        }
        Ok(schedule)
    }

    /// Inserts a shift and returns its handle.
    pub fn add_shift(
        &self,
        date: &ShiftDate,
        time: &ShiftTime,
        subject: &str,
        note: &str,
    ) -> ShiftHandle {
        let mut inner = self.inner.lock().unwrap();
        let handle = ShiftHandle::new(format!("evt-{}", inner.next_id));
        inner.next_id += 1;
        inner.events.insert(
            handle.clone(),
            ShiftEntry {
                date: *date,
                time: *time,
                subject: subject.to_string(),
                note: note.to_string(),
            },
        );
        handle
    }

    /// Who an event is currently assigned to (test observation point).
    pub fn subject_of(&self, handle: &ShiftHandle) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.events.get(handle).map(|e| e.subject.clone())
    }

    /// An event's note (test observation point).
    pub fn note_of(&self, handle: &ShiftHandle) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.events.get(handle).map(|e| e.note.clone())
    }
}

impl CalendarService for StaticSchedule {
    fn find_shift(
        &self,
        date: &ShiftDate,
        time: &ShiftTime,
        subject: &str,
    ) -> Option<ShiftEvent> {
        let inner = self.inner.lock().unwrap();
        // Handles are allocated in insertion order; take the lowest-numbered
        // match so lookup is deterministic.
        let mut matches: Vec<_> = inner
            .events
            .iter()
            .filter(|(_, e)| e.date == *date && e.time == *time && e.subject == subject)
            .collect();
        matches.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        matches.first().map(|(handle, entry)| ShiftEvent {
            handle: (*handle).clone(),
            summary: format!("{} shift", entry.subject),
        })
    }

    fn swap_shifts(&self, a: &ShiftHandle, b: &ShiftHandle) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.events.contains_key(a) || !inner.events.contains_key(b) {
            return false;
        }
        let subject_a = inner.events[a].subject.clone();
        let subject_b = inner.events[b].subject.clone();
        let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");

        {
            let event_a = inner.events.get_mut(a).expect("checked above");
            event_a.subject = subject_b.clone();
            event_a.note.push_str(&format!("\n[swap] {}: took over from {}", stamp, subject_a));
        }
        {
            let event_b = inner.events.get_mut(b).expect("checked above");
            event_b.subject = subject_a.clone();
            event_b.note.push_str(&format!("\n[swap] {}: took over from {}", stamp, subject_b));
        }
        true
    }

    fn create_or_update_shift(
        &self,
        date: &ShiftDate,
        time: &ShiftTime,
        subject: &str,
        note: &str,
    ) -> bool {
        if let Some(existing) = self.find_shift(date, time, subject) {
            let mut inner = self.inner.lock().unwrap();
            if let Some(entry) = inner.events.get_mut(&existing.handle) {
                entry.note = note.to_string();
                return true;
            }
            return false;
        }
        self.add_shift(date, time, subject, note);
        true
    }
}
