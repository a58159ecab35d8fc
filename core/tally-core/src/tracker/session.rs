//! The session tracker: context + clock + thresholds + optional snapshot store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::TrackerConfig;

use super::clock::{Clock, SystemClock};
use super::context::SessionContext;
use super::store::ContextStore;
use super::suggestion::TimeSuggestion;

/// Which state the context's fields currently describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing recorded yet.
    Fresh,
    /// Recent activity, nothing logged to suggest against.
    Active,
    /// Idle longer than the threshold; the next activity starts a new session.
    Idle,
    /// A project/task is known and no suggestion was shown this session.
    SuggestionPending,
    /// A suggestion was shown; further ones wait for the next session.
    SuggestionShown,
}

/// Point-in-time view of the tracker, for status output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerStatus {
    pub phase: SessionPhase,
    pub idle_minutes: i64,
    pub session_minutes: i64,
    pub minutes_since_last_entry: Option<i64>,
    pub unlogged_minutes: i64,
    pub suggested_hours: f64,
    pub tool_call_count: u32,
    pub has_suggestion_context: bool,
    pub last_project_code: Option<String>,
    pub last_task: Option<String>,
    pub last_entry_id: Option<i64>,
    pub suggestion: Option<TimeSuggestion>,
}

/// Tracks activity and decides when to suggest logging time.
///
/// Not internally synchronized. When a [`ContextStore`] is attached, every
/// mutation is written through to it; write failures are logged and the
/// in-memory state stays authoritative.
pub struct SessionTracker {
    context: SessionContext,
    config: TrackerConfig,
    clock: Arc<dyn Clock>,
    store: Option<ContextStore>,
}

impl SessionTracker {
    /// A fresh tracker on the wall clock, without persistence.
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: TrackerConfig, clock: Arc<dyn Clock>) -> Self {
        let context = SessionContext::new(clock.now());
        Self::from_context(context, config, clock)
    }

    pub fn from_context(
        context: SessionContext,
        config: TrackerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            context,
            config,
            clock,
            store: None,
        }
    }

    /// Attaches a snapshot store; subsequent mutations are persisted to it.
    pub fn with_store(mut self, store: ContextStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Restores from the configured snapshot on the wall clock, falling back to a
    /// fresh context.
    pub fn restore_or_new(config: TrackerConfig) -> Self {
        let store = ContextStore::from_config(&config);
        if store.is_none() {
            tracing::warn!("No snapshot path available; tracking in memory only");
        }
        Self::restore_with(config, Arc::new(SystemClock), store)
    }

    /// Restores from `store` if it holds a usable snapshot, otherwise starts fresh.
    pub fn restore_with(
        config: TrackerConfig,
        clock: Arc<dyn Clock>,
        store: Option<ContextStore>,
    ) -> Self {
        let now = clock.now();
        let restored = store.as_ref().and_then(|s| s.load(now));
        let context = match restored {
            Some(context) => {
                tracing::debug!(
                    project = ?context.last_project_code,
                    task = ?context.last_task,
                    "Restored session context"
                );
                context
            }
            None => SessionContext::new(now),
        };

        Self {
            context,
            config,
            clock,
            store,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&ContextStore> {
        self.store.as_ref()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    pub fn record_activity(&mut self) {
        let now = self.now();
        let new_session = self
            .context
            .record_activity(now, self.config.idle_threshold());
        if new_session {
            tracing::debug!(at = %now.to_rfc3339(), "New tracking session");
        }
        self.persist(now);
    }

    pub fn record_time_entry(
        &mut self,
        project_code: impl Into<String>,
        task: impl Into<String>,
        entry_id: i64,
    ) {
        let now = self.now();
        let project_code = project_code.into();
        let task = task.into();
        tracing::info!(
            project = %project_code,
            task = %task,
            entry_id,
            "Time entry recorded"
        );
        self.context
            .record_time_entry(project_code, task, entry_id, now);
        self.persist(now);
    }

    pub fn mark_suggestion_shown(&mut self) {
        self.context.mark_suggestion_shown();
        let now = self.now();
        self.persist(now);
    }

    fn persist(&self, now: DateTime<Utc>) {
        if let Some(store) = &self.store {
            store.save(&self.context, now);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Timers
    // ─────────────────────────────────────────────────────────────────────

    pub fn idle_minutes(&self) -> i64 {
        self.context.idle_minutes(self.now())
    }

    pub fn session_minutes(&self) -> i64 {
        self.context.session_minutes(self.now())
    }

    pub fn minutes_since_last_entry(&self) -> Option<i64> {
        self.context.minutes_since_last_entry(self.now())
    }

    pub fn unlogged_minutes(&self) -> i64 {
        self.context.unlogged_minutes(self.now())
    }

    pub fn suggested_hours(&self) -> f64 {
        self.context.suggested_hours(self.now())
    }

    pub fn has_suggestion_context(&self) -> bool {
        self.context.has_suggestion_context()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Suggestions
    // ─────────────────────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        let now = self.now();
        if self.context.suggestion_shown_for_current_session {
            SessionPhase::SuggestionShown
        } else if self.context.idle_duration(now) > self.config.idle_threshold() {
            SessionPhase::Idle
        } else if self.context.has_suggestion_context() {
            SessionPhase::SuggestionPending
        } else if self.context.tool_call_count == 0 {
            SessionPhase::Fresh
        } else {
            SessionPhase::Active
        }
    }

    /// True once per session, when there is something to suggest and the session
    /// has run at least `suggest_after_minutes`.
    pub fn should_suggest(&self) -> bool {
        !self.context.suggestion_shown_for_current_session
            && self.context.has_suggestion_context()
            && self.session_minutes() >= self.config.suggest_after()
    }

    /// The suggestion due now, if any. Does not mark it shown.
    pub fn suggestion(&self) -> Option<TimeSuggestion> {
        if !self.should_suggest() {
            return None;
        }
        let now = self.now();
        Some(TimeSuggestion {
            project_code: self.context.last_project_code.clone()?,
            task: self.context.last_task.clone()?,
            suggested_hours: self.context.suggested_hours(now),
            session_minutes: self.context.session_minutes(now),
            minutes_since_last_entry: self.context.minutes_since_last_entry(now),
            tool_call_count: self.context.tool_call_count,
        })
    }

    /// Returns the due suggestion and marks it shown for this session.
    pub fn take_suggestion(&mut self) -> Option<TimeSuggestion> {
        let suggestion = self.suggestion()?;
        tracing::info!(
            project = %suggestion.project_code,
            task = %suggestion.task,
            hours = suggestion.suggested_hours,
            "Suggesting time entry"
        );
        self.mark_suggestion_shown();
        Some(suggestion)
    }

    pub fn status(&self) -> TrackerStatus {
        let now = self.now();
        TrackerStatus {
            phase: self.phase(),
            idle_minutes: self.context.idle_minutes(now),
            session_minutes: self.context.session_minutes(now),
            minutes_since_last_entry: self.context.minutes_since_last_entry(now),
            unlogged_minutes: self.context.unlogged_minutes(now),
            suggested_hours: self.context.suggested_hours(now),
            tool_call_count: self.context.tool_call_count,
            has_suggestion_context: self.context.has_suggestion_context(),
            last_project_code: self.context.last_project_code.clone(),
            last_task: self.context.last_task.clone(),
            last_entry_id: self.context.last_entry_id,
            suggestion: self.suggestion(),
        }
    }
}
