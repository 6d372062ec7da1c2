//! Inbound webhook payload types.
//!
//! One delivery carries an envelope with a batch of events. The bot only
//! acts on text messages and postbacks; every other event type (follows,
//! joins, stickers, ...) deserializes into [`EventKind::Other`] and is
//! skipped without failing the batch.

use serde::Deserialize;

use crate::types::{ReplyToken, UserId};

/// Header carrying the base64 HMAC-SHA256 of the request body.
pub const HEADER_SIGNATURE: &str = "x-line-signature";

/// Header carrying the platform's redelivery key. Absent on some
/// deliveries; the body hash still dedups those.
pub const HEADER_RETRY_KEY: &str = "x-line-retry-key";

/// The whole webhook request body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookEnvelope {
    /// Bot user ID the delivery was addressed to.
    #[serde(default)]
    pub destination: String,

    /// Events batched into this delivery. May be empty (the platform
    /// sends an empty batch as a connectivity check).
    #[serde(default)]
    pub events: Vec<InboundEvent>,
}

/// One event inside a delivery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundEvent {
    /// Short-lived handle for replying in-context. Absent on events that
    /// cannot be replied to.
    #[serde(rename = "replyToken")]
    pub reply_token: Option<ReplyToken>,

    /// Who triggered the event. Absent for some system events.
    pub source: Option<EventSource>,

    #[serde(flatten)]
    pub kind: EventKind,
}

/// The sender of an event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId")]
    pub user_id: Option<UserId>,
}

/// Event payload, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Message { message: MessageBody },
    Postback { postback: PostbackBody },
    /// Any event type the bot does not handle.
    #[serde(other)]
    Other,
}

/// The `message` object of a message event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageBody {
    /// Message type (`text`, `image`, `sticker`, ...). Only `text` is
    /// acted on.
    #[serde(rename = "type")]
    pub kind: String,

    /// Text content; absent for non-text messages.
    #[serde(default)]
    pub text: Option<String>,
}

/// The `postback` object of a postback event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostbackBody {
    /// Opaque payload attached to the tapped button.
    pub data: String,
}

/// Parses a raw delivery body into the envelope.
pub fn parse_envelope(body: &[u8]) -> Result<WebhookEnvelope, serde_json::Error> {
    serde_json::from_slice(body)
}
