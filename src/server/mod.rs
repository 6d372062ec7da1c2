//! HTTP surface of the bot.
//!
//! # Endpoints
//!
//! - `POST /webhook` - accepts platform deliveries (signature-checked,
//!   deduplicated, then dispatched event by event)
//! - `GET /health` - returns 200 if the server is running

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::dedup::{Messenger, WebhookDeduplicator};
use crate::negotiation::NegotiationEngine;

/// Shared application state, passed to handlers via axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The negotiation state machine with its collaborators.
    engine: NegotiationEngine,

    /// Inbound delivery deduplication.
    webhook_dedup: WebhookDeduplicator,

    /// Outbound sends for direct replies (help text, error messages).
    messenger: Messenger,

    /// Channel secret for HMAC-SHA256 signature verification.
    channel_secret: Vec<u8>,
}

impl AppState {
    pub fn new(
        engine: NegotiationEngine,
        webhook_dedup: WebhookDeduplicator,
        messenger: Messenger,
        channel_secret: impl Into<Vec<u8>>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                engine,
                webhook_dedup,
                messenger,
                channel_secret: channel_secret.into(),
            }),
        }
    }

    pub fn engine(&self) -> &NegotiationEngine {
        &self.inner.engine
    }

    pub fn webhook_dedup(&self) -> &WebhookDeduplicator {
        &self.inner.webhook_dedup
    }

    pub fn messenger(&self) -> &Messenger {
        &self.inner.messenger
    }

    pub fn channel_secret(&self) -> &[u8] {
        &self.inner.channel_secret
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::calendar::{CalendarService, StaticSchedule};
    use crate::dedup::CalendarGate;
    use crate::identity::{StaticDirectory, UserRecord};
    use crate::negotiation::InMemoryStore;
    use crate::persistence::NoArchive;
    use crate::registry::{Fingerprint, InMemoryRegistry};
    use crate::test_utils::RecordingTransport;
    use crate::types::{ReplyToken, ShiftDate, ShiftTime, UserId};
    use crate::webhooks::{compute_signature, format_signature_header};

    const SECRET: &[u8] = b"test-channel-secret";

    struct TestApp {
        state: AppState,
        transport: Arc<RecordingTransport>,
        schedule: Arc<StaticSchedule>,
    }

    /// Full stack against in-memory collaborators: Alice (admin) and Bob
    /// share a shift slot on 2025-05-30 at 08:00.
    fn test_app() -> TestApp {
        let roster = StaticDirectory::new(vec![
            UserRecord {
                id: UserId::new("u1"),
                display_name: "Alice".to_string(),
                is_admin: true,
            },
            UserRecord {
                id: UserId::new("u2"),
                display_name: "Bob".to_string(),
                is_admin: false,
            },
        ]);

        let schedule = Arc::new(StaticSchedule::new());
        let date = ShiftDate::parse("20250530").unwrap();
        let time = ShiftTime::parse("08:00").unwrap();
        schedule.add_shift(&date, &time, "Alice", "");
        schedule.add_shift(&date, &time, "Bob", "");

        // One registry backs all three windows; the key prefixes keep the
        // domains apart.
        let registry = Arc::new(InMemoryRegistry::new());
        let transport = Arc::new(RecordingTransport::new());
        let messenger = Messenger::new(transport.clone(), registry.clone());
        let engine = NegotiationEngine::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(roster),
            schedule.clone(),
            CalendarGate::new(schedule.clone(), registry.clone()),
            messenger.clone(),
            Arc::new(NoArchive),
        );
        let state = AppState::new(
            engine,
            WebhookDeduplicator::new(registry),
            messenger,
            SECRET,
        );
        TestApp {
            state,
            transport,
            schedule,
        }
    }

    fn message_body(user: &str, reply_token: &str, text: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "destination": "bot-1",
            "events": [{
                "type": "message",
                "replyToken": reply_token,
                "source": {"userId": user},
                "message": {"type": "text", "text": text}
            }]
        }))
        .unwrap()
    }

    fn postback_body(user: &str, reply_token: &str, data: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "destination": "bot-1",
            "events": [{
                "type": "postback",
                "replyToken": reply_token,
                "source": {"userId": user},
                "postback": {"data": data}
            }]
        }))
        .unwrap()
    }

    fn signed_request(secret: &[u8], retry_key: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let signature = format_signature_header(&compute_signature(&body, secret));
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("x-line-signature", signature);
        if let Some(key) = retry_key {
            builder = builder.header("x-line-retry-key", key);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn post(app: &TestApp, request: Request<Body>) -> (StatusCode, String) {
        let response = build_router(app.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    /// The deterministic ID of Alice's standing test request.
    fn alice_request_id() -> String {
        Fingerprint::swap_request(
            &UserId::new("u1"),
            &ShiftDate::parse("20250530").unwrap(),
            &ShiftTime::parse("08:00").unwrap(),
            "Bob",
        )
        .into_request_id()
        .as_str()
        .to_string()
    }

    #[tokio::test]
    async fn health_returns_200() {
        let app = test_app();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = build_router(app.state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn missing_signature_returns_400() {
        let app = test_app();
        let body = message_body("u1", "r1", "help");
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let (status, _) = post(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn invalid_signature_returns_400() {
        let app = test_app();
        let body = message_body("u1", "r1", "help");
        let request = signed_request(b"wrong-secret", Some("k1"), body);

        let (status, _) = post(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn malformed_body_returns_400() {
        let app = test_app();
        let request = signed_request(SECRET, Some("k1"), b"not json".to_vec());

        let (status, _) = post(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn swap_command_prompts_target_and_confirms_requester() {
        let app = test_app();
        let body = message_body("u1", "r1", "swap 20250530 08:00 @Bob");
        let (status, _) = post(&app, signed_request(SECRET, Some("k1"), body)).await;
        assert_eq!(status, StatusCode::OK);

        // Requester got an in-context confirmation.
        let replies = app.transport.replies_to(&ReplyToken::new("r1"));
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains(&alice_request_id()));

        // Target got a prompt naming the request.
        let prompts = app.transport.pushes_to(&UserId::new("u2"));
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Alice"));
        assert!(prompts[0].contains(&alice_request_id()));
    }

    #[tokio::test]
    async fn redelivered_batch_is_short_circuited() {
        let app = test_app();
        let body = message_body("u1", "r1", "swap 20250530 08:00 @Bob");

        let (status, text) =
            post(&app, signed_request(SECRET, Some("k1"), body.clone())).await;
        assert_eq!((status, text.as_str()), (StatusCode::OK, "OK"));
        let sends_after_first = app.transport.sent_count();

        let (status, text) = post(&app, signed_request(SECRET, Some("k1"), body)).await;
        assert_eq!((status, text.as_str()), (StatusCode::OK, "OK (duplicate)"));
        // Nothing was re-processed.
        assert_eq!(app.transport.sent_count(), sends_after_first);
    }

    #[tokio::test]
    async fn approval_postback_swaps_shifts_and_notifies() {
        let app = test_app();
        let submit = message_body("u1", "r1", "swap 20250530 08:00 @Bob");
        post(&app, signed_request(SECRET, Some("k1"), submit)).await;

        let data = format!("action=approve&request_id={}", alice_request_id());
        let approve = postback_body("u2", "r2", &data);
        let (status, _) = post(&app, signed_request(SECRET, Some("k2"), approve)).await;
        assert_eq!(status, StatusCode::OK);

        // The calendar really swapped: Alice's old slot now belongs to Bob.
        let date = ShiftDate::parse("20250530").unwrap();
        let time = ShiftTime::parse("08:00").unwrap();
        let alice_slot = app.schedule.find_shift(&date, &time, "Alice").unwrap();
        assert!(app
            .schedule
            .note_of(&alice_slot.handle)
            .unwrap()
            .contains("took over from Bob"));

        // Decider acked in-context, requester notified by push.
        let acks = app.transport.replies_to(&ReplyToken::new("r2"));
        assert_eq!(acks.len(), 1);
        assert!(acks[0].contains("You approved"));
        let notices = app.transport.pushes_to(&UserId::new("u1"));
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("approved"));
    }

    #[tokio::test]
    async fn redelivered_approval_with_fresh_retry_key_swaps_once() {
        let app = test_app();
        let submit = message_body("u1", "r1", "swap 20250530 08:00 @Bob");
        post(&app, signed_request(SECRET, Some("k1"), submit)).await;

        let data = format!("action=approve&request_id={}", alice_request_id());
        post(
            &app,
            signed_request(SECRET, Some("k2"), postback_body("u2", "r2", &data)),
        )
        .await;
        // Same tap redelivered under a new retry key and reply token: the
        // delivery window misses it, the resolution ledger catches it.
        let (status, _) = post(
            &app,
            signed_request(SECRET, Some("k3"), postback_body("u2", "r3", &data)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // A second swap would have swapped the shifts back.
        let date = ShiftDate::parse("20250530").unwrap();
        let time = ShiftTime::parse("08:00").unwrap();
        let bob_now = app.schedule.find_shift(&date, &time, "Bob").unwrap();
        assert!(app
            .schedule
            .note_of(&bob_now.handle)
            .unwrap()
            .contains("took over from Alice"));

        let late_acks = app.transport.replies_to(&ReplyToken::new("r3"));
        assert_eq!(late_acks.len(), 1);
        assert!(late_acks[0].contains("already been decided"));
    }

    #[tokio::test]
    async fn text_approval_works_like_the_postback() {
        let app = test_app();
        let submit = message_body("u1", "r1", "swap 20250530 08:00 @Bob");
        post(&app, signed_request(SECRET, Some("k1"), submit)).await;

        let text = format!("reject {}", alice_request_id());
        let (status, _) = post(
            &app,
            signed_request(SECRET, Some("k2"), message_body("u2", "r2", &text)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let acks = app.transport.replies_to(&ReplyToken::new("r2"));
        assert!(acks[0].contains("You declined"));
        let notices = app.transport.pushes_to(&UserId::new("u1"));
        assert!(notices[0].contains("declined"));
    }

    #[tokio::test]
    async fn non_admin_submission_is_refused_in_chat() {
        let app = test_app();
        let body = message_body("u2", "r1", "swap 20250530 08:00 @Alice");
        let (status, _) = post(&app, signed_request(SECRET, Some("k1"), body)).await;
        // The HTTP answer stays 200; the refusal happens in chat.
        assert_eq!(status, StatusCode::OK);

        let replies = app.transport.replies_to(&ReplyToken::new("r1"));
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("administrators"));
        assert!(app.transport.pushes_to(&UserId::new("u1")).is_empty());
    }

    #[tokio::test]
    async fn wrong_decider_is_refused_in_chat() {
        let app = test_app();
        let submit = message_body("u1", "r1", "swap 20250530 08:00 @Bob");
        post(&app, signed_request(SECRET, Some("k1"), submit)).await;

        // The requester tries to approve their own request.
        let data = format!("action=approve&request_id={}", alice_request_id());
        post(
            &app,
            signed_request(SECRET, Some("k2"), postback_body("u1", "r2", &data)),
        )
        .await;

        let replies = app.transport.replies_to(&ReplyToken::new("r2"));
        assert!(replies[0].contains("proposed to"));

        // Bob can still approve afterwards.
        post(
            &app,
            signed_request(SECRET, Some("k3"), postback_body("u2", "r3", &data)),
        )
        .await;
        let acks = app.transport.replies_to(&ReplyToken::new("r3"));
        assert!(acks[0].contains("You approved"));
    }

    #[tokio::test]
    async fn unparseable_text_gets_usage_help() {
        let app = test_app();
        let body = message_body("u1", "r1", "good morning");
        post(&app, signed_request(SECRET, Some("k1"), body)).await;

        let replies = app.transport.replies_to(&ReplyToken::new("r1"));
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Commands:"));
    }

    #[tokio::test]
    async fn unknown_event_types_are_ignored() {
        let app = test_app();
        let body = serde_json::to_vec(&serde_json::json!({
            "destination": "bot-1",
            "events": [
                {"type": "follow", "source": {"userId": "u1"}},
                {"type": "message", "source": {"userId": "u1"},
                 "message": {"type": "sticker"}}
            ]
        }))
        .unwrap();

        let (status, _) = post(&app, signed_request(SECRET, Some("k1"), body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn empty_batch_is_accepted() {
        let app = test_app();
        let body = br#"{"destination": "bot-1", "events": []}"#.to_vec();
        let (status, text) = post(&app, signed_request(SECRET, None, body)).await;
        assert_eq!((status, text.as_str()), (StatusCode::OK, "OK"));
    }

    #[tokio::test]
    async fn missing_retry_key_still_dedups_on_body() {
        let app = test_app();
        let body = message_body("u1", "r1", "help");

        post(&app, signed_request(SECRET, None, body.clone())).await;
        let (_, text) = post(&app, signed_request(SECRET, None, body)).await;
        assert_eq!(text, "OK (duplicate)");
        assert_eq!(app.transport.sent_count(), 1);
    }
}
