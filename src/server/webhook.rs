//! Webhook endpoint handler.
//!
//! Accepts platform deliveries, verifies the signature, short-circuits
//! redeliveries, and dispatches each event in the batch. Per-event
//! problems are answered to the user in chat and never fail the HTTP
//! response: the platform retries failed deliveries, and a retry of an
//! already half-processed batch is exactly the duplication this bot
//! exists to prevent.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::commands::{parse_message, parse_postback, Command};
use crate::messages;
use crate::types::{DeliveryId, ReplyToken, UserId};
use crate::webhooks::{
    parse_envelope, verify_signature, EventKind, InboundEvent, HEADER_RETRY_KEY, HEADER_SIGNATURE,
};

/// Errors that reject a whole delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing signature header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Signature did not verify against the channel secret.
    #[error("invalid signature")]
    InvalidSignature,

    /// Body is not a valid webhook envelope.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        // Everything that rejects a delivery is the sender's fault.
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required header: `x-line-signature` (base64 HMAC-SHA256 of the body)
/// - Optional header: `x-line-retry-key` (stable across redeliveries)
/// - Body: JSON envelope with a batch of events
///
/// # Response
///
/// - 200 OK: batch accepted (including redeliveries and batches where
///   individual events failed)
/// - 400 Bad Request: missing/invalid signature or malformed body
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let signature_header = headers
        .get(HEADER_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingHeader(HEADER_SIGNATURE))?;

    // Verify BEFORE any parsing or I/O.
    if !verify_signature(&body, signature_header, app_state.channel_secret()) {
        warn!("invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    // The retry key is absent on first deliveries; the body hash alone
    // still identifies those.
    let retry_key = headers
        .get(HEADER_RETRY_KEY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let delivery_id = DeliveryId::new(retry_key);
    if app_state.webhook_dedup().is_duplicate(&delivery_id, &body) {
        return Ok((StatusCode::OK, "OK (duplicate)"));
    }

    let envelope = parse_envelope(&body)?;
    debug!(events = envelope.events.len(), "webhook delivery accepted");

    for event in &envelope.events {
        dispatch_event(&app_state, event);
    }

    Ok((StatusCode::OK, "OK"))
}

/// Routes one event to the negotiation engine and answers the sender.
fn dispatch_event(app_state: &AppState, event: &InboundEvent) {
    let Some(user_id) = event
        .source
        .as_ref()
        .and_then(|source| source.user_id.clone())
    else {
        debug!("event without a user source, skipping");
        return;
    };

    match &event.kind {
        EventKind::Message { message } if message.kind == "text" => {
            let Some(text) = message.text.as_deref() else {
                return;
            };
            match parse_message(text) {
                Some(command) => {
                    run_command(app_state, &user_id, event.reply_token.as_ref(), command)
                }
                None => {
                    // Anything unparseable gets the usage text.
                    respond(
                        app_state,
                        &user_id,
                        event.reply_token.as_ref(),
                        &messages::help_text(),
                    );
                }
            }
        }
        EventKind::Message { .. } => {
            debug!(user_id = %user_id, "ignoring non-text message");
        }
        EventKind::Postback { postback } => match parse_postback(&postback.data) {
            Some(command) => run_command(app_state, &user_id, event.reply_token.as_ref(), command),
            None => {
                debug!(user_id = %user_id, data = %postback.data, "unrecognized postback payload");
            }
        },
        EventKind::Other => {}
    }
}

fn run_command(
    app_state: &AppState,
    user_id: &UserId,
    reply_token: Option<&ReplyToken>,
    command: Command,
) {
    let engine = app_state.engine();
    let text = match command {
        Command::SwapShift { date, time, target } => {
            match engine.submit_request(user_id, &date, &time, &target) {
                Ok(request) => messages::submit_confirmation(&request),
                Err(error) => messages::submit_error(&error),
            }
        }
        Command::Decide {
            decision,
            request_id,
        } => match engine.decide(&request_id, user_id, decision) {
            Ok(outcome) => messages::decision_ack(&outcome),
            Err(error) => messages::decide_error(&error),
        },
        Command::Help => messages::help_text(),
    };
    respond(app_state, user_id, reply_token, &text);
}

/// Answers the sender in-context when possible, by push otherwise.
fn respond(app_state: &AppState, user_id: &UserId, reply_token: Option<&ReplyToken>, text: &str) {
    let messenger = app_state.messenger();
    match reply_token {
        Some(token) => messenger.reply(token, user_id, text),
        None => messenger.push(user_id, text),
    };
}
