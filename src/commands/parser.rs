//! Parsers for message text and postback payloads.
//!
//! # Message grammar
//!
//! - `swap <YYYYMMDD> <HH:MM> @<target>` — the keyword is case-insensitive,
//!   whitespace between tokens is flexible, and the target name is
//!   everything after the `@` (display names may contain spaces)
//! - `approve <requestId>` / `reject <requestId>`
//! - `help`
//!
//! The date token must be exactly 8 digits and the time token
//! digit-colon-digit shaped for the message to parse as a command at all;
//! whether they name a real date and a real 24-hour time is checked later.
//!
//! # Postback grammar
//!
//! Decision buttons carry `action=approve&request_id=<id>` (or `reject`).

use crate::types::{Decision, RequestId};

use super::types::Command;

/// Parses a free-text message into a command.
///
/// Returns `None` for anything that is not shaped like a command; the
/// caller decides whether to answer with a usage hint.
///
/// # Examples
///
/// ```
/// use shift_swap_bot::commands::{parse_message, Command};
///
/// assert_eq!(
///     parse_message("swap 20250530 08:00 @Bob"),
///     Some(Command::SwapShift {
///         date: "20250530".to_string(),
///         time: "08:00".to_string(),
///         target: "Bob".to_string(),
///     })
/// );
/// assert_eq!(parse_message("HELP"), Some(Command::Help));
/// assert_eq!(parse_message("good morning"), None);
/// ```
pub fn parse_message(text: &str) -> Option<Command> {
    let text = text.trim();
    let (word, rest) = split_first_word(text);

    match word.to_ascii_lowercase().as_str() {
        "swap" => parse_swap(rest),
        "approve" => parse_decision(Decision::Approve, rest),
        "reject" => parse_decision(Decision::Reject, rest),
        "help" if rest.trim().is_empty() => Some(Command::Help),
        _ => None,
    }
}

/// Parses a postback payload into a command.
///
/// The payload is a flat `key=value&key=value` string as attached to the
/// decision buttons; only `action` and `request_id` are significant,
/// unknown keys are ignored.
pub fn parse_postback(data: &str) -> Option<Command> {
    let mut action = None;
    let mut request_id = None;

    for pair in data.split('&') {
        let (key, value) = pair.split_once('=')?;
        match key {
            "action" => action = Some(value),
            "request_id" => request_id = Some(value),
            _ => {}
        }
    }

    let decision = match action? {
        "approve" => Decision::Approve,
        "reject" => Decision::Reject,
        _ => return None,
    };
    let request_id = request_id.filter(|id| !id.is_empty())?;

    Some(Command::Decide {
        decision,
        request_id: RequestId::new(request_id),
    })
}

/// Parses the swap arguments: `<8 digits> <H:MM|HH:MM> @<target>`.
fn parse_swap(rest: &str) -> Option<Command> {
    let (date, rest) = split_first_word(rest.trim_start());
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (time, rest) = split_first_word(rest.trim_start());
    if !is_time_shaped(time) {
        return None;
    }

    let target = rest.trim_start().strip_prefix('@')?.trim();
    if target.is_empty() {
        return None;
    }

    Some(Command::SwapShift {
        date: date.to_string(),
        time: time.to_string(),
        target: target.to_string(),
    })
}

/// Parses a textual decision: the rest must be exactly one request ID.
fn parse_decision(decision: Decision, rest: &str) -> Option<Command> {
    let (id, tail) = split_first_word(rest.trim_start());
    if id.is_empty() || !tail.trim().is_empty() {
        return None;
    }
    Some(Command::Decide {
        decision,
        request_id: RequestId::new(id),
    })
}

/// `<digits>:<two digits>` with one or two hour digits.
fn is_time_shaped(token: &str) -> bool {
    match token.split_once(':') {
        Some((h, m)) => {
            !h.is_empty()
                && h.len() <= 2
                && m.len() == 2
                && h.bytes().all(|b| b.is_ascii_digit())
                && m.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Splits text at the first whitespace, returning (word, rest).
/// If no whitespace, returns (text, "").
fn split_first_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap(date: &str, time: &str, target: &str) -> Command {
        Command::SwapShift {
            date: date.to_string(),
            time: time.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn parses_basic_swap() {
        assert_eq!(
            parse_message("swap 20250530 08:00 @Bob"),
            Some(swap("20250530", "08:00", "Bob"))
        );
    }

    #[test]
    fn swap_keyword_is_case_insensitive() {
        assert_eq!(
            parse_message("SWAP 20250530 08:00 @Bob"),
            Some(swap("20250530", "08:00", "Bob"))
        );
    }

    #[test]
    fn swap_tolerates_extra_whitespace() {
        assert_eq!(
            parse_message("  swap   20250530\t8:00   @Bob  "),
            Some(swap("20250530", "8:00", "Bob"))
        );
    }

    #[test]
    fn target_name_may_contain_spaces() {
        assert_eq!(
            parse_message("swap 20250530 08:00 @Bob Smith"),
            Some(swap("20250530", "08:00", "Bob Smith"))
        );
    }

    #[test]
    fn swap_passes_through_shape_valid_but_impossible_dates() {
        // 8 digits parse as a command; the negotiation layer rejects the
        // impossible date with a user-visible error.
        assert_eq!(
            parse_message("swap 20259999 08:00 @Bob"),
            Some(swap("20259999", "08:00", "Bob"))
        );
    }

    #[test]
    fn swap_rejects_malformed_tokens() {
        assert_eq!(parse_message("swap 2025053 08:00 @Bob"), None);
        assert_eq!(parse_message("swap 202505301 08:00 @Bob"), None);
        assert_eq!(parse_message("swap 20250530 0800 @Bob"), None);
        assert_eq!(parse_message("swap 20250530 08:0 @Bob"), None);
        assert_eq!(parse_message("swap 20250530 08:00 Bob"), None);
        assert_eq!(parse_message("swap 20250530 08:00 @"), None);
        assert_eq!(parse_message("swap"), None);
    }

    #[test]
    fn parses_textual_decisions() {
        assert_eq!(
            parse_message("approve abc123"),
            Some(Command::Decide {
                decision: Decision::Approve,
                request_id: RequestId::new("abc123"),
            })
        );
        assert_eq!(
            parse_message("reject abc123"),
            Some(Command::Decide {
                decision: Decision::Reject,
                request_id: RequestId::new("abc123"),
            })
        );
    }

    #[test]
    fn decision_requires_exactly_one_argument() {
        assert_eq!(parse_message("approve"), None);
        assert_eq!(parse_message("approve id1 id2"), None);
    }

    #[test]
    fn parses_help() {
        assert_eq!(parse_message("help"), Some(Command::Help));
        assert_eq!(parse_message("  Help  "), Some(Command::Help));
        assert_eq!(parse_message("help me"), None);
    }

    #[test]
    fn non_commands_return_none() {
        assert_eq!(parse_message(""), None);
        assert_eq!(parse_message("good morning"), None);
        assert_eq!(parse_message("swapping shifts is fun"), None);
    }

    #[test]
    fn parses_postback_decisions() {
        assert_eq!(
            parse_postback("action=approve&request_id=abc123"),
            Some(Command::Decide {
                decision: Decision::Approve,
                request_id: RequestId::new("abc123"),
            })
        );
        assert_eq!(
            parse_postback("action=reject&request_id=abc123"),
            Some(Command::Decide {
                decision: Decision::Reject,
                request_id: RequestId::new("abc123"),
            })
        );
    }

    #[test]
    fn postback_key_order_is_irrelevant() {
        assert_eq!(
            parse_postback("request_id=abc123&action=approve"),
            Some(Command::Decide {
                decision: Decision::Approve,
                request_id: RequestId::new("abc123"),
            })
        );
    }

    #[test]
    fn postback_ignores_unknown_keys() {
        assert_eq!(
            parse_postback("action=approve&request_id=abc123&origin=prompt"),
            Some(Command::Decide {
                decision: Decision::Approve,
                request_id: RequestId::new("abc123"),
            })
        );
    }

    #[test]
    fn malformed_postbacks_return_none() {
        assert_eq!(parse_postback(""), None);
        assert_eq!(parse_postback("action=approve"), None);
        assert_eq!(parse_postback("request_id=abc123"), None);
        assert_eq!(parse_postback("action=destroy&request_id=abc123"), None);
        assert_eq!(parse_postback("action=approve&request_id="), None);
        assert_eq!(parse_postback("not-a-query-string"), None);
    }
}
