//! Calendar slot descriptors: the date and time-of-day a swap refers to.
//!
//! Both types parse the surface forms users type (`YYYYMMDD`, `HH:MM`) and
//! reject anything that is not a real calendar date or 24-hour time. These
//! are user-input validation errors, reported back verbatim and never
//! retried.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error for a date string that is not an 8-digit real calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid YYYYMMDD date: {0}")]
pub struct InvalidDate(pub String);

/// Error for a time string that is not a valid 24-hour `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid 24-hour HH:MM time: {0}")]
pub struct InvalidTime(pub String);

/// A calendar date, parsed from the 8-digit `YYYYMMDD` surface form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftDate(pub NaiveDate);

impl ShiftDate {
    /// Parses an 8-digit `YYYYMMDD` string into a date.
    ///
    /// Rejects non-digit input, wrong lengths, and digit strings that do not
    /// name a real calendar date (e.g. `20250230`).
    pub fn parse(s: &str) -> Result<Self, InvalidDate> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidDate(s.to_string()));
        }
        let year: i32 = s[..4].parse().map_err(|_| InvalidDate(s.to_string()))?;
        let month: u32 = s[4..6].parse().map_err(|_| InvalidDate(s.to_string()))?;
        let day: u32 = s[6..].parse().map_err(|_| InvalidDate(s.to_string()))?;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(ShiftDate)
            .ok_or_else(|| InvalidDate(s.to_string()))
    }

    /// The compact `YYYYMMDD` form used in dedup keys.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

impl fmt::Display for ShiftDate {
    /// Human-readable `YYYY/MM/DD`, as shown in notifications.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

/// A 24-hour time of day, parsed from `HH:MM` (one or two hour digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftTime {
    pub hour: u8,
    pub minute: u8,
}

impl ShiftTime {
    /// Parses `HH:MM` (hour 0-23, minute 0-59; a single hour digit is
    /// accepted, as in `8:00`).
    pub fn parse(s: &str) -> Result<Self, InvalidTime> {
        let (h, m) = s.split_once(':').ok_or_else(|| InvalidTime(s.to_string()))?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(InvalidTime(s.to_string()));
        }
        if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTime(s.to_string()));
        }
        let hour: u8 = h.parse().map_err(|_| InvalidTime(s.to_string()))?;
        let minute: u8 = m.parse().map_err(|_| InvalidTime(s.to_string()))?;
        if hour > 23 || minute > 59 {
            return Err(InvalidTime(s.to_string()));
        }
        Ok(ShiftTime { hour, minute })
    }
}

impl fmt::Display for ShiftTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
