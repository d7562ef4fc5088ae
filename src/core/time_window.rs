//! History window derivation from the live quote timestamp.
//!
//! Timestamps are naive calendar times: the trailing `Z` zone marker is
//! accepted and dropped, no timezone conversion happens on either end.

use crate::config::DEFAULT_LOOKBACK_SECONDS;
use crate::error::{BotError, BotResult};
use chrono::{NaiveDateTime, TimeDelta};

/// Output format for window bounds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse `YYYY-MM-DDTHH:MM:SS[.ffffff][Z]`.
pub fn parse_timestamp(raw: &str) -> BotResult<NaiveDateTime> {
    let trimmed = raw.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    if !has_calendar_shape(naive) {
        return Err(BotError::Parse(format!("Malformed timestamp: '{}'", raw)));
    }

    NaiveDateTime::parse_from_str(naive, PARSE_FORMAT)
        .map_err(|e| BotError::Parse(format!("Malformed timestamp '{}': {}", raw, e)))
}

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

// Fixed-width fields only: chrono alone would accept `2022-3-30T...`.
fn has_calendar_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 19 {
        return false;
    }
    bytes[..19].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b'T',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    })
}

/// Fixed lookback ending at a given timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    lookback_seconds: i64,
}

impl TimeWindow {
    pub fn new(lookback_seconds: i64) -> Self {
        Self { lookback_seconds }
    }

    pub fn lookback_seconds(&self) -> i64 {
        self.lookback_seconds
    }

    /// Start of the window ending at `end`: exactly `lookback_seconds` earlier.
    pub fn start_of(&self, end: NaiveDateTime) -> BotResult<NaiveDateTime> {
        TimeDelta::try_seconds(self.lookback_seconds)
            .and_then(|lookback| end.checked_sub_signed(lookback))
            .ok_or_else(|| {
                BotError::Parse(format!(
                    "Lookback of {}s from {} is out of range",
                    self.lookback_seconds, end
                ))
            })
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK_SECONDS)
    }
}

/// Text-in, text-out form of [`TimeWindow::start_of`].
pub fn start_of(end: &str, lookback_seconds: i64) -> BotResult<String> {
    let end = parse_timestamp(end)?;
    let start = TimeWindow::new(lookback_seconds).start_of(end)?;
    Ok(format_timestamp(start))
}
