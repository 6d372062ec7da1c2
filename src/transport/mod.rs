//! Outbound transport seam for the messaging platform.
//!
//! The bot never talks to the platform API directly; everything goes through
//! [`OutboundTransport`] so the send-deduplicating messenger can wrap it and
//! tests can observe sends without a network.

use thiserror::Error;
use tracing::info;

use crate::types::{ReplyToken, UserId};

/// Errors an outbound send can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The addressing token was rejected (reply tokens are single-use and
    /// expire quickly). The messenger falls back to a push on this.
    #[error("reply handle invalid or expired")]
    InvalidHandle,

    /// Any other transport failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// The messaging platform's outbound surface.
///
/// `reply_to` answers the triggering event through its short-lived handle;
/// `push_to` addresses a user by durable ID. Both are blocking I/O
/// boundaries from the core's perspective.
pub trait OutboundTransport: Send + Sync {
    fn reply_to(&self, handle: &ReplyToken, text: &str) -> Result<(), SendError>;

    fn push_to(&self, recipient: &UserId, text: &str) -> Result<(), SendError>;
}

/// Transport that logs sends instead of delivering them.
///
/// Stands in where no platform client is configured (local runs, dry
/// deployments); a production deployment wires the platform's API client
/// here instead.
#[derive(Debug, Default)]
pub struct LogTransport;

impl OutboundTransport for LogTransport {
    fn reply_to(&self, handle: &ReplyToken, text: &str) -> Result<(), SendError> {
        info!(handle = %handle, text, "reply (log transport)");
        Ok(())
    }

    fn push_to(&self, recipient: &UserId, text: &str) -> Result<(), SendError> {
        info!(recipient = %recipient, text, "push (log transport)");
        Ok(())
    }
}
