//! Orchestration of a negotiation's side effects.
//!
//! The engine sits between the webhook layer and the collaborators. It
//! owns the submit and decide flows end to end: validation, identity and
//! shift resolution, the store transition, archiving, the gated calendar
//! write, and the notifications. The ordering invariant on approval is
//! load-bearing: the store transition commits first, so a calendar
//! failure is reported but never rolls the approval back.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::store::NegotiationStore;
use super::{DecideError, ShiftParty, SubmitError};
use crate::calendar::CalendarService;
use crate::dedup::{CalendarGate, CalendarOutcome, Messenger};
use crate::identity::IdentityResolver;
use crate::messages;
use crate::persistence::RequestArchive;
use crate::registry::Fingerprint;
use crate::types::{Decision, RequestId, RequestStatus, ShiftDate, ShiftTime, SwapRequest, UserId};

/// Window within which re-submitting an identical request is refused
/// instead of replacing the pending record.
pub const DUPLICATE_SUBMISSION_WINDOW_SECS: i64 = 300;

/// Default lifetime of an unanswered request: one week.
pub const DEFAULT_PENDING_TTL_SECS: i64 = 604_800;

/// What happened when a decision was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    /// The resolved record, with its final status and `responded_at`.
    pub request: SwapRequest,
    /// `Some` only for approvals; `None` for rejections, which touch no
    /// calendar.
    pub calendar: Option<CalendarOutcome>,
}

/// The negotiation state machine with its collaborators.
pub struct NegotiationEngine {
    store: Arc<dyn NegotiationStore>,
    identity: Arc<dyn IdentityResolver>,
    calendar: Arc<dyn CalendarService>,
    calendar_gate: CalendarGate,
    messenger: Messenger,
    archive: Arc<dyn RequestArchive>,
    pending_ttl: Duration,
}

impl NegotiationEngine {
    pub fn new(
        store: Arc<dyn NegotiationStore>,
        identity: Arc<dyn IdentityResolver>,
        calendar: Arc<dyn CalendarService>,
        calendar_gate: CalendarGate,
        messenger: Messenger,
        archive: Arc<dyn RequestArchive>,
    ) -> Self {
        NegotiationEngine {
            store,
            identity,
            calendar,
            calendar_gate,
            messenger,
            archive,
            pending_ttl: Duration::seconds(DEFAULT_PENDING_TTL_SECS),
        }
    }

    /// Overrides how long an unanswered request stays decidable.
    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }

    /// Handles a `swap` command from `requester`.
    ///
    /// On success the record is pending, archived, and the target has been
    /// prompted (prompt delivery is best-effort). The returned record is
    /// what the caller should confirm back to the requester.
    pub fn submit_request(
        &self,
        requester: &UserId,
        date_raw: &str,
        time_raw: &str,
        target_name: &str,
    ) -> Result<SwapRequest, SubmitError> {
        let now = Utc::now();
        self.expire_stale();

        if !self.identity.is_admin(requester) {
            return Err(SubmitError::Forbidden);
        }
        let requester_name = self
            .identity
            .display_name(requester)
            .unwrap_or_else(|| requester.as_str().to_string());

        let date = ShiftDate::parse(date_raw)?;
        let time = ShiftTime::parse(time_raw)?;

        let target_id = self.identity.resolve_id_by_name(target_name).ok_or_else(|| {
            SubmitError::UnknownTarget {
                name: target_name.to_string(),
                known: self.identity.known_names(),
            }
        })?;
        let target_name = self
            .identity
            .display_name(&target_id)
            .unwrap_or_else(|| target_name.to_string());

        // The ID is content-derived, so an identical submission lands on
        // the same pending record.
        let request_id =
            Fingerprint::swap_request(requester, &date, &time, &target_name).into_request_id();
        if let Some(existing) = self.store.find(&request_id) {
            if now - existing.created_at
                < Duration::seconds(DUPLICATE_SUBMISSION_WINDOW_SECS)
            {
                return Err(SubmitError::DuplicateSubmission {
                    existing: existing.request_id,
                });
            }
            // An older unanswered twin is superseded by the fresh one.
            info!(request_id = %request_id, "replacing stale pending request");
        }

        let requester_shift = self
            .calendar
            .find_shift(&date, &time, &requester_name)
            .ok_or_else(|| SubmitError::ShiftNotFound {
                who: ShiftParty::Requester,
                name: requester_name.clone(),
            })?;
        let target_shift = self
            .calendar
            .find_shift(&date, &time, &target_name)
            .ok_or_else(|| SubmitError::ShiftNotFound {
                who: ShiftParty::Target,
                name: target_name.clone(),
            })?;

        let request = SwapRequest {
            request_id,
            requester_id: requester.clone(),
            requester_name,
            target_id: target_id.clone(),
            target_name,
            date,
            time,
            requester_shift: requester_shift.handle,
            target_shift: target_shift.handle,
            status: RequestStatus::Pending,
            created_at: now,
            responded_at: None,
        };
        self.store.create(request.clone());
        self.archive_quietly(&request);
        info!(
            request_id = %request.request_id,
            requester = %request.requester_id,
            target = %request.target_id,
            "swap request created"
        );

        let prompt =
            messages::swap_prompt(&request, &requester_shift.summary, &target_shift.summary);
        self.messenger.push(&target_id, &prompt);

        Ok(request)
    }

    /// Handles an approve/reject from `decider`.
    ///
    /// The store transition happens first and is final. Approval then
    /// drives the gated calendar swap, and the requester is notified of
    /// the decision with a qualifier describing what the calendar did.
    /// Notification delivery is best-effort.
    pub fn decide(
        &self,
        id: &RequestId,
        decider: &UserId,
        decision: Decision,
    ) -> Result<DecisionOutcome, DecideError> {
        self.expire_stale();

        let request = self.store.resolve(id, decider, decision, Utc::now())?;
        self.archive_quietly(&request);
        info!(
            request_id = %request.request_id,
            status = %request.status,
            "swap request resolved"
        );

        let (calendar, notice) = match decision {
            Decision::Approve => {
                let outcome = self.calendar_gate.swap(
                    &request.date,
                    &request.time,
                    &request.requester_name,
                    &request.target_name,
                    &request.requester_shift,
                    &request.target_shift,
                );
                (Some(outcome), messages::approval_notice(&request, outcome))
            }
            Decision::Reject => (None, messages::rejection_notice(&request)),
        };
        self.messenger.push(&request.requester_id, &notice);

        Ok(DecisionOutcome { request, calendar })
    }

    fn expire_stale(&self) {
        for expired in self.store.expire_older_than(self.pending_ttl, Utc::now()) {
            info!(request_id = %expired.request_id, "swap request expired unanswered");
            self.archive_quietly(&expired);
        }
    }

    fn archive_quietly(&self, request: &SwapRequest) {
        if let Err(error) = self.archive.record(request) {
            warn!(request_id = %request.request_id, %error, "archive write failed");
        }
    }
}
