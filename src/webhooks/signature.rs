//! Webhook signature verification using HMAC-SHA256.
//!
//! The messaging platform signs each delivery with HMAC-SHA256 over the
//! raw request body, keyed by the channel secret, and sends the digest
//! base64-encoded in the `x-line-signature` header.
//!
//! Verification is the first step in webhook processing; deliveries with
//! a missing or invalid signature are rejected before parsing.

use base64::prelude::{Engine, BASE64_STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parses a signature header (base64) into raw digest bytes.
///
/// Returns `None` for malformed base64. Never panics.
///
/// # Examples
///
/// ```
/// use shift_swap_bot::webhooks::parse_signature_header;
///
/// assert!(parse_signature_header("aGVsbG8=").is_some());
/// assert!(parse_signature_header("not base64 !!!").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    BASE64_STANDARD.decode(header).ok()
}

/// Computes the HMAC-SHA256 signature of a payload using the given secret.
///
/// This is useful for testing purposes (generating expected signatures).
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as the platform's header value (base64).
pub fn format_signature_header(signature: &[u8]) -> String {
    BASE64_STANDARD.encode(signature)
}

/// Verifies a webhook signature against the payload and channel secret.
///
/// Returns `true` if the signature is valid, `false` otherwise.
/// Uses constant-time comparison to prevent timing attacks.
///
/// # Examples
///
/// ```
/// use shift_swap_bot::webhooks::{verify_signature, compute_signature, format_signature_header};
///
/// let payload = b"{\"events\": []}";
/// let secret = b"channel-secret";
///
/// let sig = compute_signature(payload, secret);
/// let header = format_signature_header(&sig);
///
/// assert!(verify_signature(payload, &header, secret));
/// assert!(!verify_signature(payload, &header, b"wrong-secret"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected_signature = match parse_signature_header(signature_header) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    // Constant-time comparison via the HMAC library
    mac.verify_slice(&expected_signature).is_ok()
}
