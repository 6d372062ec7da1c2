//! Shift Swap Bot - a chat bot that negotiates staff shift swaps and keeps
//! the shared calendar consistent under at-least-once event delivery.
//!
//! The core of the crate is a set of content-addressed deduplication
//! windows (inbound deliveries, outbound messages, calendar mutations)
//! around a small submit/approve/reject state machine.

pub mod calendar;
pub mod commands;
pub mod config;
pub mod dedup;
pub mod identity;
pub mod messages;
pub mod negotiation;
pub mod persistence;
pub mod registry;
pub mod server;
pub mod transport;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;
