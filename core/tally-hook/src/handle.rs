//! Event handler for tool calls.
//!
//! Runs for the lifetime of the bridge: reads newline-delimited tool-call events
//! as JSON from stdin until EOF, feeds each to one tracker, and prints a
//! time-entry suggestion to stdout when one is due. The snapshot is restored
//! once at startup, so the shown flag holds for the whole process.
//!
//! ## Event Mapping
//!
//! ```text
//! create_time_entry / log_time (with project, task, entry id) → record_time_entry
//! anything else                                               → record_activity
//! ```
//!
//! ## Output
//!
//! Nothing when no suggestion is due; otherwise
//! `{"suggestion": {...}, "message": "..."}` on a single line, flushed per event.
//! Blank lines are ignored and malformed lines are logged and skipped.

use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};

use tally_core::{SessionTracker, TimeSuggestion, TrackerConfig};

use crate::error::HookError;

const TIME_ENTRY_TOOLS: &[&str] = &["create_time_entry", "log_time"];

/// A tool call as reported by the bridge. Field names accept both snake_case and
/// the camelCase the API uses.
#[derive(Debug, Default, Deserialize)]
pub struct ToolCallEvent {
    #[serde(default, alias = "toolName")]
    pub tool_name: Option<String>,
    #[serde(default, alias = "projectCode")]
    pub project_code: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default, alias = "entryId")]
    pub entry_id: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum TrackerEvent {
    Activity,
    TimeEntry {
        project_code: String,
        task: String,
        entry_id: i64,
    },
}

impl ToolCallEvent {
    pub fn to_event(&self) -> TrackerEvent {
        let is_entry_tool = self
            .tool_name
            .as_deref()
            .is_some_and(|name| TIME_ENTRY_TOOLS.iter().any(|t| name.eq_ignore_ascii_case(t)));
        if !is_entry_tool {
            return TrackerEvent::Activity;
        }

        match (&self.project_code, &self.task, self.entry_id) {
            (Some(project_code), Some(task), Some(entry_id)) => TrackerEvent::TimeEntry {
                project_code: project_code.clone(),
                task: task.clone(),
                entry_id,
            },
            _ => {
                tracing::debug!(
                    tool = ?self.tool_name,
                    "Time-entry tool without project/task/entry id; counting as activity"
                );
                TrackerEvent::Activity
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionOutput {
    pub message: String,
    pub suggestion: TimeSuggestion,
}

impl From<TimeSuggestion> for SuggestionOutput {
    fn from(suggestion: TimeSuggestion) -> Self {
        Self {
            message: suggestion.message(),
            suggestion,
        }
    }
}

/// Counts for one pass over an event stream.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub events: usize,
    pub skipped: usize,
    pub suggestions: usize,
}

pub fn run() -> Result<(), HookError> {
    let mut tracker = SessionTracker::restore_or_new(TrackerConfig::load());
    let summary = run_events(&mut tracker, io::stdin().lock(), io::stdout().lock())?;
    tracing::debug!(
        events = summary.events,
        skipped = summary.skipped,
        suggestions = summary.suggestions,
        "Event stream closed"
    );
    Ok(())
}

/// Applies every event line from `reader` to `tracker`, writing due suggestions
/// to `writer`.
pub fn run_events<R: BufRead, W: Write>(
    tracker: &mut SessionTracker,
    reader: R,
    mut writer: W,
) -> Result<StreamSummary, HookError> {
    let mut summary = StreamSummary::default();

    for line in reader.lines() {
        let line = line.map_err(HookError::Stdin)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: ToolCallEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(err) => {
                let err = HookError::InvalidEvent(err);
                tracing::warn!(error = %err, "Skipping tool-call event");
                summary.skipped += 1;
                continue;
            }
        };
        summary.events += 1;

        if let Some(suggestion) = apply_event(tracker, event.to_event()) {
            write_suggestion(&mut writer, suggestion)?;
            summary.suggestions += 1;
        }
    }

    Ok(summary)
}

/// Records one event without offering a suggestion.
pub fn record_event(tracker: &mut SessionTracker, event: TrackerEvent) {
    match event {
        TrackerEvent::Activity => tracker.record_activity(),
        TrackerEvent::TimeEntry {
            project_code,
            task,
            entry_id,
        } => tracker.record_time_entry(project_code, task, entry_id),
    }
}

/// Applies one event and returns the suggestion it made due, marking it shown.
pub fn apply_event(tracker: &mut SessionTracker, event: TrackerEvent) -> Option<TimeSuggestion> {
    record_event(tracker, event);
    tracker.take_suggestion()
}

pub fn write_suggestion<W: Write>(
    writer: &mut W,
    suggestion: TimeSuggestion,
) -> Result<(), HookError> {
    let output = SuggestionOutput::from(suggestion);
    let line = serde_json::to_string(&output).map_err(HookError::Output)?;
    writeln!(writer, "{}", line).map_err(HookError::Write)?;
    writer.flush().map_err(HookError::Write)
}
