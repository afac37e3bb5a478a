//! Lap and gap durations
//!
//! Timing values travel as fractional seconds, the way timing feeds
//! publish them, and render in the dashboard as `MM:SS.ffffff`.

use serde::{Deserialize, Serialize};
use std::fmt;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

/// A lap time, sector time or gap, in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LapTime(pub f64);

impl LapTime {
    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(millis as f64 / 1000.0)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Render as `MM:SS.ffffff`, or `H:MM:SS.ffffff` from one hour upwards
    /// (full race times).
    pub fn format_timing(&self) -> String {
        let total = (self.0 * MICROS_PER_SECOND as f64).round() as i64;
        let sign = if total < 0 { "-" } else { "" };
        let total = total.abs();

        let hours = total / MICROS_PER_HOUR;
        let minutes = (total % MICROS_PER_HOUR) / MICROS_PER_MINUTE;
        let seconds = (total % MICROS_PER_MINUTE) / MICROS_PER_SECOND;
        let micros = total % MICROS_PER_SECOND;

        if hours > 0 {
            format!("{sign}{hours}:{minutes:02}:{seconds:02}.{micros:06}")
        } else {
            format!("{sign}{minutes:02}:{seconds:02}.{micros:06}")
        }
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_timing())
    }
}

/// Format an optional timing value, rendering a missing one as empty
pub fn format_optional(time: Option<LapTime>) -> String {
    time.map(|t| t.format_timing()).unwrap_or_default()
}
