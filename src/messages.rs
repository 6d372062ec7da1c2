//! Every piece of user-visible text, in one place.
//!
//! The bot speaks plain text. Keeping the wording here (rather than inline
//! at each call site) matters for deduplication: the outbound window keys
//! on exact text, so two code paths that mean the same thing must produce
//! byte-identical messages.

use crate::dedup::CalendarOutcome;
use crate::negotiation::{DecideError, DecisionOutcome, SubmitError};
use crate::types::{RequestStatus, SwapRequest};

/// Reply to `help` and to any unparseable message.
pub fn help_text() -> String {
    [
        "Commands:",
        "  swap <YYYYMMDD> <HH:MM> @<name>  propose a shift swap",
        "  approve <requestId>              accept a swap proposed to you",
        "  reject <requestId>               decline a swap proposed to you",
        "  help                             show this text",
    ]
    .join("\n")
}

/// Sent to the requester once their request is recorded and the target has
/// been prompted.
pub fn submit_confirmation(request: &SwapRequest) -> String {
    format!(
        "Swap request {} sent to {}: {} at {}. You will hear back once they decide.",
        request.request_id, request.target_name, request.date, request.time
    )
}

/// Sent to the target when a request names them. Includes the request ID
/// so the textual fallback works even if the buttons are unavailable.
pub fn swap_prompt(
    request: &SwapRequest,
    requester_shift_summary: &str,
    target_shift_summary: &str,
) -> String {
    format!(
        "{} wants to swap shifts with you on {} at {}.\n\
         Your shift: {}\n\
         Their shift: {}\n\
         Reply \"approve {}\" or \"reject {}\".",
        request.requester_name,
        request.date,
        request.time,
        target_shift_summary,
        requester_shift_summary,
        request.request_id,
        request.request_id
    )
}

/// Sent to the requester when the target approves.
///
/// The qualifier reflects the calendar, not the decision: the approval
/// stands even when the calendar write failed.
pub fn approval_notice(request: &SwapRequest, calendar: CalendarOutcome) -> String {
    let qualifier = match calendar {
        CalendarOutcome::Applied => "The calendar has been updated.",
        CalendarOutcome::AlreadyApplied => "The calendar was already up to date.",
        CalendarOutcome::Failed => {
            "The calendar update failed; please adjust the calendar by hand."
        }
    };
    format!(
        "{} approved your swap request {} for {} at {}. {}",
        request.target_name, request.request_id, request.date, request.time, qualifier
    )
}

/// Reply to the decider confirming what their tap or message did.
pub fn decision_ack(outcome: &DecisionOutcome) -> String {
    let request = &outcome.request;
    match (request.status, outcome.calendar) {
        (RequestStatus::Approved, Some(CalendarOutcome::Failed)) => format!(
            "You approved swap request {}, but the calendar update failed; \
             please adjust the calendar by hand.",
            request.request_id
        ),
        (RequestStatus::Approved, _) => format!(
            "You approved swap request {}. The shifts have been exchanged.",
            request.request_id
        ),
        _ => format!("You declined swap request {}.", request.request_id),
    }
}

/// Sent to the requester when the target rejects.
pub fn rejection_notice(request: &SwapRequest) -> String {
    format!(
        "{} declined your swap request {} for {} at {}.",
        request.target_name, request.request_id, request.date, request.time
    )
}

/// Reply to a `swap` command that could not be accepted.
pub fn submit_error(error: &SubmitError) -> String {
    match error {
        SubmitError::InvalidDate(raw) => {
            format!("\"{}\" is not a date I understand. Use YYYYMMDD, e.g. 20250530.", raw)
        }
        SubmitError::InvalidTime(raw) => {
            format!("\"{}\" is not a time I understand. Use HH:MM, e.g. 08:00.", raw)
        }
        SubmitError::UnknownTarget { name, known } => {
            if known.is_empty() {
                format!("I don't know anyone named {}.", name)
            } else {
                format!(
                    "I don't know anyone named {}. Known staff: {}.",
                    name,
                    known.join(", ")
                )
            }
        }
        SubmitError::Forbidden => {
            "Only administrators can submit swap requests.".to_string()
        }
        SubmitError::DuplicateSubmission { existing } => {
            format!(
                "That request is already pending as {}; no new request was created.",
                existing
            )
        }
        SubmitError::ShiftNotFound { name, .. } => {
            format!("{} has no shift at that date and time.", name)
        }
    }
}

/// Reply to an approve/reject that could not be applied.
pub fn decide_error(error: &DecideError) -> String {
    match error {
        DecideError::NotFound => {
            "I can't find a pending request with that ID.".to_string()
        }
        DecideError::Forbidden => {
            "Only the person the swap was proposed to can decide it.".to_string()
        }
        DecideError::AlreadyResolved => {
            "That request has already been decided.".to_string()
        }
    }
}
