//! Send-deduplicating wrapper around the outbound transport.
//!
//! Every notification the bot sends goes through [`Messenger`], which
//! suppresses identical `(recipient, text)` pairs within a one-hour window
//! and absorbs transport failures. Outbound notification failures are never
//! allowed to abort the domain transition that triggered them: the
//! approval, rejection, or calendar write has already happened (or is
//! independent), so a failed send is logged and swallowed.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::registry::{Fingerprint, HashRegistry};
use crate::transport::{OutboundTransport, SendError};
use crate::types::{ReplyToken, UserId};

/// How long an identical message to the same recipient is suppressed.
pub const MESSAGE_WINDOW_SECS: i64 = 3600;

/// Result of an attempted send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Delivered to the transport.
    Sent,
    /// Recent duplicate; nothing was sent.
    Suppressed,
    /// The transport failed; logged and swallowed, key released so a
    /// legitimate retry is not itself suppressed.
    Failed,
}

/// Outbound message deduplicator.
#[derive(Clone)]
pub struct Messenger {
    transport: Arc<dyn OutboundTransport>,
    registry: Arc<dyn HashRegistry>,
}

impl Messenger {
    pub fn new(transport: Arc<dyn OutboundTransport>, registry: Arc<dyn HashRegistry>) -> Self {
        Messenger {
            transport,
            registry,
        }
    }

    /// Pushes `text` to a recipient's durable identity.
    pub fn push(&self, recipient: &UserId, text: &str) -> SendOutcome {
        self.deliver(None, recipient, text)
    }

    /// Replies through a short-lived handle, falling back once to a direct
    /// push if the handle has expired.
    pub fn reply(&self, handle: &ReplyToken, recipient: &UserId, text: &str) -> SendOutcome {
        self.deliver(Some(handle), recipient, text)
    }

    fn deliver(
        &self,
        handle: Option<&ReplyToken>,
        recipient: &UserId,
        text: &str,
    ) -> SendOutcome {
        let key = Fingerprint::outbound_message(recipient, text);
        if !self
            .registry
            .record_if_new(&key, Duration::seconds(MESSAGE_WINDOW_SECS))
        {
            debug!(recipient = %recipient, "duplicate outbound message suppressed");
            return SendOutcome::Suppressed;
        }

        let result = match handle {
            Some(handle) => match self.transport.reply_to(handle, text) {
                Err(SendError::InvalidHandle) => {
                    debug!(
                        recipient = %recipient,
                        "reply handle expired, falling back to push"
                    );
                    self.transport.push_to(recipient, text)
                }
                other => other,
            },
            None => self.transport.push_to(recipient, text),
        };

        match result {
            Ok(()) => SendOutcome::Sent,
            Err(error) => {
                // Release the key so the caller's retry goes through.
                self.registry.forget(&key);
                warn!(recipient = %recipient, %error, "outbound send failed");
                SendOutcome::Failed
            }
        }
    }
}
