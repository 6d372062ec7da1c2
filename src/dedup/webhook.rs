//! Inbound webhook deduplication.
//!
//! Transport layers deliver at-least-once: the same event may arrive again
//! with the same retry key, or with none. A redelivery within the window
//! must not re-trigger message sends or calendar writes, so the whole
//! request is short-circuited before any parsing happens.

use chrono::Duration;
use std::sync::Arc;
use tracing::debug;

use crate::registry::{Fingerprint, HashRegistry};
use crate::types::DeliveryId;

/// How long a delivery key is remembered.
pub const WEBHOOK_WINDOW_SECS: i64 = 10;

/// Rejects re-delivered inbound webhook payloads.
#[derive(Clone)]
pub struct WebhookDeduplicator {
    registry: Arc<dyn HashRegistry>,
}

impl WebhookDeduplicator {
    pub fn new(registry: Arc<dyn HashRegistry>) -> Self {
        WebhookDeduplicator { registry }
    }

    /// Returns `true` if this `(deliveryId, rawBody)` pair was already seen
    /// within the window. On first sight the delivery is recorded.
    pub fn is_duplicate(&self, delivery_id: &DeliveryId, raw_body: &[u8]) -> bool {
        let key = Fingerprint::webhook_delivery(delivery_id, raw_body);
        let novel = self
            .registry
            .record_if_new(&key, Duration::seconds(WEBHOOK_WINDOW_SECS));
        if !novel {
            debug!(delivery_id = %delivery_id, "duplicate webhook delivery, skipping");
        }
        !novel
    }
}
