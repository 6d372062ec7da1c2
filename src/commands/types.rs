//! Parsed command types.

use serde::{Deserialize, Serialize};

use crate::types::{Decision, RequestId};

/// A command extracted from an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// New swap request: `swap <YYYYMMDD> <HH:MM> @<target>`
    ///
    /// Date and time are kept as the raw tokens the user typed; the
    /// negotiation layer validates them and reports `InvalidDate` /
    /// `InvalidTime` with the offending input.
    SwapShift {
        date: String,
        time: String,
        target: String,
    },

    /// Decision on an existing request: `approve <id>` / `reject <id>`,
    /// or the equivalent postback button payload.
    Decide {
        decision: Decision,
        request_id: RequestId,
    },

    /// Usage text: `help`
    Help,
}
