//! Shared test doubles and fixtures.

use chrono::Utc;
use std::sync::Mutex;

use crate::calendar::{CalendarService, ShiftEvent};
use crate::registry::Fingerprint;
use crate::transport::{OutboundTransport, SendError};
use crate::types::{
    ReplyToken, RequestStatus, ShiftDate, ShiftHandle, ShiftTime, SwapRequest, UserId,
};

/// A pending Alice-asks-Bob request for 2025-05-30 08:00, with the real
/// content-derived request ID for those IDs.
pub fn sample_request(requester_id: &str, target_id: &str) -> SwapRequest {
    let date = ShiftDate::parse("20250530").unwrap();
    let time = ShiftTime::parse("08:00").unwrap();
    let requester = UserId::new(requester_id);
    let request_id = Fingerprint::swap_request(&requester, &date, &time, "Bob").into_request_id();
    SwapRequest {
        request_id,
        requester_id: requester,
        requester_name: "Alice".to_string(),
        target_id: UserId::new(target_id),
        target_name: "Bob".to_string(),
        date,
        time,
        requester_shift: ShiftHandle::new("evt-0"),
        target_shift: ShiftHandle::new("evt-1"),
        status: RequestStatus::Pending,
        created_at: Utc::now(),
        responded_at: None,
    }
}

#[derive(Debug, Default)]
struct TransportInner {
    pushes: Vec<(UserId, String)>,
    replies: Vec<(ReplyToken, String)>,
    reply_tokens_expired: bool,
    failures_remaining: usize,
}

/// Transport double that records every send and can be scripted to
/// expire reply tokens or fail outright.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    inner: Mutex<TransportInner>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts pushed to one recipient, in send order.
    pub fn pushes_to(&self, recipient: &UserId) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .pushes
            .iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Texts replied through one token, in send order.
    pub fn replies_to(&self, token: &ReplyToken) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .replies
            .iter()
            .filter(|(t, _)| t == token)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Total successful sends, replies and pushes combined.
    pub fn sent_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.pushes.len() + inner.replies.len()
    }

    /// Makes every subsequent `reply_to` report an expired token.
    pub fn expire_all_reply_tokens(&self) {
        self.inner.lock().unwrap().reply_tokens_expired = true;
    }

    /// Makes the next `count` delivery attempts fail with a transport
    /// error (expired-token bounces do not consume these).
    pub fn fail_next_sends(&self, count: usize) {
        self.inner.lock().unwrap().failures_remaining = count;
    }
}

impl OutboundTransport for RecordingTransport {
    fn reply_to(&self, handle: &ReplyToken, text: &str) -> Result<(), SendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.reply_tokens_expired {
            return Err(SendError::InvalidHandle);
        }
        if inner.failures_remaining > 0 {
            inner.failures_remaining -= 1;
            return Err(SendError::Transport("scripted failure".to_string()));
        }
        inner.replies.push((handle.clone(), text.to_string()));
        Ok(())
    }

    fn push_to(&self, recipient: &UserId, text: &str) -> Result<(), SendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failures_remaining > 0 {
            inner.failures_remaining -= 1;
            return Err(SendError::Transport("scripted failure".to_string()));
        }
        inner.pushes.push((recipient.clone(), text.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ScriptedInner {
    swap_calls: usize,
    upsert_calls: usize,
    swap_failures_remaining: usize,
}

/// Calendar double that finds a shift for any subject and counts
/// mutations. Swaps can be scripted to fail.
#[derive(Debug, Default)]
pub struct ScriptedCalendar {
    inner: Mutex<ScriptedInner>,
}

impl ScriptedCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `swap_shifts` was called (failures included).
    pub fn swap_calls(&self) -> usize {
        self.inner.lock().unwrap().swap_calls
    }

    /// How many times `create_or_update_shift` was called.
    pub fn upsert_calls(&self) -> usize {
        self.inner.lock().unwrap().upsert_calls
    }

    /// Makes the next `count` swap calls report failure.
    pub fn fail_next_swaps(&self, count: usize) {
        self.inner.lock().unwrap().swap_failures_remaining = count;
    }
}

impl CalendarService for ScriptedCalendar {
    fn find_shift(
        &self,
        _date: &ShiftDate,
        _time: &ShiftTime,
        subject: &str,
    ) -> Option<ShiftEvent> {
        Some(ShiftEvent {
            handle: ShiftHandle::new(format!("scripted-{}", subject)),
            summary: format!("{} shift", subject),
        })
    }

    fn swap_shifts(&self, _a: &ShiftHandle, _b: &ShiftHandle) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.swap_calls += 1;
        if inner.swap_failures_remaining > 0 {
            inner.swap_failures_remaining -= 1;
            return false;
        }
        true
    }

    fn create_or_update_shift(
        &self,
        _date: &ShiftDate,
        _time: &ShiftTime,
        _subject: &str,
        _note: &str,
    ) -> bool {
        self.inner.lock().unwrap().upsert_calls += 1;
        true
    }
}
