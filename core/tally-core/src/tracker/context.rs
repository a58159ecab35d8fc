//! Session context: the fields behind the auto-tracking timers.
//!
//! Transitions take `now` explicitly so the same code serves the live tracker
//! (wall clock) and tests (manual clock).

use chrono::{DateTime, Duration, Utc};

use super::suggestion::round_to_quarter_hours;

/// In-memory tracking state for the current process.
///
/// Plain data with no internal locking; share it across threads behind a `Mutex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub last_project_code: Option<String>,
    pub last_task: Option<String>,
    pub last_entry_created_at: Option<DateTime<Utc>>,
    pub last_entry_id: Option<i64>,
    pub last_activity_at: DateTime<Utc>,
    pub session_started_at: Option<DateTime<Utc>>,
    pub tool_call_count: u32,
    pub suggestion_shown_for_current_session: bool,
}

impl SessionContext {
    /// A fresh context: no entry yet, no session started.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_project_code: None,
            last_task: None,
            last_entry_created_at: None,
            last_entry_id: None,
            last_activity_at: now,
            session_started_at: None,
            tool_call_count: 0,
            suggestion_shown_for_current_session: false,
        }
    }

    /// Records one tool call.
    ///
    /// Starts a new session when none is running or when the gap since the
    /// previous activity exceeds `idle_threshold`. Returns true if it did.
    pub fn record_activity(&mut self, now: DateTime<Utc>, idle_threshold: Duration) -> bool {
        // Gap is measured against the previous activity, before it is overwritten.
        let idle = now.signed_duration_since(self.last_activity_at);

        self.last_activity_at = now;
        self.tool_call_count = self.tool_call_count.saturating_add(1);

        let new_session = self.session_started_at.is_none() || idle > idle_threshold;
        if new_session {
            self.session_started_at = Some(now);
            self.suggestion_shown_for_current_session = false;
        }
        new_session
    }

    /// Records a freshly created time entry and restarts the session baseline.
    pub fn record_time_entry(
        &mut self,
        project_code: String,
        task: String,
        entry_id: i64,
        now: DateTime<Utc>,
    ) {
        self.last_project_code = Some(project_code);
        self.last_task = Some(task);
        self.last_entry_created_at = Some(now);
        self.last_entry_id = Some(entry_id);
        self.last_activity_at = now;
        self.tool_call_count = self.tool_call_count.saturating_add(1);
        self.suggestion_shown_for_current_session = false;
        self.session_started_at = Some(now);
    }

    pub fn mark_suggestion_shown(&mut self) {
        self.suggestion_shown_for_current_session = true;
    }

    pub fn idle_duration(&self, now: DateTime<Utc>) -> Duration {
        non_negative(now.signed_duration_since(self.last_activity_at))
    }

    pub fn session_duration(&self, now: DateTime<Utc>) -> Duration {
        self.session_started_at
            .map(|started| non_negative(now.signed_duration_since(started)))
            .unwrap_or_else(Duration::zero)
    }

    pub fn idle_minutes(&self, now: DateTime<Utc>) -> i64 {
        self.idle_duration(now).num_minutes()
    }

    /// Minutes since the current session started; 0 when no session is running.
    pub fn session_minutes(&self, now: DateTime<Utc>) -> i64 {
        self.session_duration(now).num_minutes()
    }

    /// Minutes since the last time entry; `None` when no entry was ever recorded.
    pub fn minutes_since_last_entry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_entry_created_at
            .map(|created| non_negative(now.signed_duration_since(created)).num_minutes())
    }

    /// Minutes of the current session not yet covered by a time entry.
    pub fn unlogged_minutes(&self, now: DateTime<Utc>) -> i64 {
        let session = self.session_minutes(now);
        match self.minutes_since_last_entry(now) {
            Some(since_entry) => session.min(since_entry),
            None => session,
        }
    }

    /// Session length in hours, rounded to the nearest quarter hour and clamped
    /// to `[0.25, 8.0]`.
    pub fn suggested_hours(&self, now: DateTime<Utc>) -> f64 {
        let minutes = self.session_duration(now).num_seconds() as f64 / 60.0;
        round_to_quarter_hours(minutes)
    }

    /// True when both the last project and task are known and non-empty.
    pub fn has_suggestion_context(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.last_project_code) && present(&self.last_task)
    }
}

fn non_negative(d: Duration) -> Duration {
    if d < Duration::zero() {
        Duration::zero()
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> Duration {
        Duration::minutes(30)
    }

    #[test]
    fn test_new_context_has_no_session() {
        let now = Utc::now();
        let ctx = SessionContext::new(now);
        assert_eq!(ctx.last_activity_at, now);
        assert_eq!(ctx.session_started_at, None);
        assert_eq!(ctx.session_minutes(now + Duration::hours(2)), 0);
        assert_eq!(ctx.minutes_since_last_entry(now), None);
        assert!(!ctx.has_suggestion_context());
    }

    #[test]
    fn test_first_activity_starts_session() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        let t1 = t0 + Duration::minutes(1);

        assert!(ctx.record_activity(t1, idle()));
        assert_eq!(ctx.session_started_at, Some(t1));
        assert_eq!(ctx.tool_call_count, 1);
    }

    #[test]
    fn test_activity_within_threshold_keeps_session() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        ctx.record_activity(t0, idle());
        ctx.mark_suggestion_shown();

        let t1 = t0 + Duration::minutes(29);
        assert!(!ctx.record_activity(t1, idle()));
        assert_eq!(ctx.session_started_at, Some(t0));
        assert!(ctx.suggestion_shown_for_current_session);
        assert_eq!(ctx.tool_call_count, 2);
    }

    #[test]
    fn test_gap_exactly_at_threshold_keeps_session() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        ctx.record_activity(t0, idle());

        assert!(!ctx.record_activity(t0 + Duration::minutes(30), idle()));
        assert_eq!(ctx.session_started_at, Some(t0));
    }

    #[test]
    fn test_idle_gap_starts_new_session_and_rearms_suggestion() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        ctx.record_activity(t0, idle());
        ctx.mark_suggestion_shown();

        let t1 = t0 + Duration::minutes(31);
        assert!(ctx.record_activity(t1, idle()));
        assert_eq!(ctx.session_started_at, Some(t1));
        assert!(!ctx.suggestion_shown_for_current_session);
        assert_eq!(ctx.last_activity_at, t1);
    }

    #[test]
    fn test_record_time_entry_resets_baseline() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        ctx.record_activity(t0, idle());
        ctx.mark_suggestion_shown();

        let t1 = t0 + Duration::minutes(50);
        ctx.record_time_entry("INTERNAL".to_string(), "Task/17".to_string(), 42, t1);

        assert_eq!(ctx.last_project_code.as_deref(), Some("INTERNAL"));
        assert_eq!(ctx.last_task.as_deref(), Some("Task/17"));
        assert_eq!(ctx.last_entry_id, Some(42));
        assert_eq!(ctx.last_entry_created_at, Some(t1));
        assert_eq!(ctx.last_activity_at, t1);
        assert_eq!(ctx.session_started_at, Some(t1));
        assert!(!ctx.suggestion_shown_for_current_session);
        assert_eq!(ctx.tool_call_count, 2);
        assert!(ctx.has_suggestion_context());
    }

    #[test]
    fn test_timers() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        ctx.session_started_at = Some(t0 - Duration::minutes(45));
        ctx.last_activity_at = t0 - Duration::minutes(10);
        ctx.last_entry_created_at = Some(t0 - Duration::minutes(120));

        assert_eq!(ctx.idle_minutes(t0), 10);
        assert_eq!(ctx.session_minutes(t0), 45);
        assert_eq!(ctx.minutes_since_last_entry(t0), Some(120));
        assert_eq!(ctx.unlogged_minutes(t0), 45);
        assert_eq!(ctx.suggested_hours(t0), 0.75);
    }

    #[test]
    fn test_unlogged_minutes_bounded_by_last_entry() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        ctx.session_started_at = Some(t0 - Duration::minutes(90));
        ctx.last_entry_created_at = Some(t0 - Duration::minutes(20));
        assert_eq!(ctx.unlogged_minutes(t0), 20);
    }

    #[test]
    fn test_suggested_hours_rounding_and_clamps() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);

        ctx.session_started_at = Some(t0 - Duration::minutes(90));
        assert_eq!(ctx.suggested_hours(t0), 1.5);

        ctx.session_started_at = Some(t0 - Duration::minutes(5));
        assert_eq!(ctx.suggested_hours(t0), 0.25);

        ctx.session_started_at = Some(t0 - Duration::hours(10));
        assert_eq!(ctx.suggested_hours(t0), 8.0);

        ctx.session_started_at = None;
        assert_eq!(ctx.suggested_hours(t0), 0.25);
    }

    #[test]
    fn test_clock_moving_backwards_is_clamped() {
        let t0 = Utc::now();
        let ctx = SessionContext::new(t0);
        assert_eq!(ctx.idle_minutes(t0 - Duration::minutes(5)), 0);
    }

    #[test]
    fn test_blank_project_or_task_is_not_context() {
        let t0 = Utc::now();
        let mut ctx = SessionContext::new(t0);
        ctx.record_time_entry("INTERNAL".to_string(), "  ".to_string(), 1, t0);
        assert!(!ctx.has_suggestion_context());

        ctx.last_task = Some("Task/1".to_string());
        ctx.last_project_code = None;
        assert!(!ctx.has_suggestion_context());
    }
}
