//! Suggested time entries.

use serde::{Deserialize, Serialize};

pub const MIN_SUGGESTED_HOURS: f64 = 0.25;
pub const MAX_SUGGESTED_HOURS: f64 = 8.0;

/// Converts minutes to hours rounded to the nearest 0.25, clamped to
/// `[MIN_SUGGESTED_HOURS, MAX_SUGGESTED_HOURS]`. Halfway values round up.
pub fn round_to_quarter_hours(minutes: f64) -> f64 {
    let quarters = (minutes / 15.0).round();
    (quarters / 4.0).clamp(MIN_SUGGESTED_HOURS, MAX_SUGGESTED_HOURS)
}

/// What the tracker proposes the user log.
///
/// Formatters can render their own text from the fields; [`TimeSuggestion::message`]
/// is the default wording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSuggestion {
    pub project_code: String,
    pub task: String,
    pub suggested_hours: f64,
    pub session_minutes: i64,
    pub minutes_since_last_entry: Option<i64>,
    pub tool_call_count: u32,
}

impl TimeSuggestion {
    /// Session length and the age of the last entry are reported separately;
    /// an idle gap restarts the session but not the entry clock.
    pub fn message(&self) -> String {
        let last_entry = match self.minutes_since_last_entry {
            Some(minutes) => format!(
                "Your last entry ({} on {}) was {} ago.",
                self.task,
                self.project_code,
                format_minutes(minutes)
            ),
            None => format!("Your last entry was {} on {}.", self.task, self.project_code),
        };
        format!(
            "You've been working for {} this session. {} Log {}h to {} / {}?",
            format_minutes(self.session_minutes),
            last_entry,
            self.suggested_hours,
            self.project_code,
            self.task
        )
    }
}

fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
