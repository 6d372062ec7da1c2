//! Webhook ingestion: signature verification and payload types.

pub mod events;
pub mod signature;

pub use events::{
    parse_envelope, EventKind, EventSource, InboundEvent, MessageBody, PostbackBody,
    WebhookEnvelope, HEADER_RETRY_KEY, HEADER_SIGNATURE,
};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
