//! Core domain types for the shift-swap bot.
//!
//! This module contains the fundamental types used throughout the
//! application, designed to encode invariants via the type system.

pub mod ids;
pub mod request;
pub mod slot;

// Re-export commonly used types at the module level
pub use ids::{DeliveryId, ReplyToken, RequestId, ShiftHandle, UserId};
pub use request::{Decision, RequestStatus, SwapRequest};
pub use slot::{InvalidDate, InvalidTime, ShiftDate, ShiftTime};
