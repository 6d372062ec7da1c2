//! Command grammar recognized from inbound events.
//!
//! Free-text messages carry new swap requests; postback payloads (the
//! decision buttons) carry approve/reject decisions. The parser only
//! checks surface shape; semantic validation (is the date real, does the
//! target exist) belongs to the negotiation layer so its errors can be
//! reported verbatim.

pub mod parser;
pub mod types;

pub use parser::{parse_message, parse_postback};
pub use types::Command;
