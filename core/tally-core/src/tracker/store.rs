//! File-backed session-context persistence.
//!
//! The hook runs once per tool call, so the tracker's state lives in
//! `~/.tally/session-context.json` between invocations.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "last_project_code": "INTERNAL",
//!   "last_task": "Task/17",
//!   "last_entry_created_at": "2026-10-18T09:00:00Z",
//!   "last_entry_id": 42,
//!   "last_activity_at": "2026-10-18T09:40:00Z",
//!   "session_started_at": "2026-10-18T09:00:00Z",
//!   "tool_call_count": 12,
//!   "suggestion_shown_for_current_session": false,
//!   "saved_at": "2026-10-18T09:40:00Z"
//! }
//! ```
//!
//! # Defensive Design
//!
//! In-memory state is authoritative; the snapshot is a convenience. So:
//! - Missing, empty or corrupt files load as "no context" (logged)
//! - Unknown versions load as "no context"
//! - Snapshots whose last activity is older than the staleness window are ignored
//! - Save failures are logged and dropped
//!
//! # Atomic Writes
//!
//! Uses temp file + rename so a concurrent reader never sees a half-written file.
//! Writers within one process are serialized by a mutex.

use chrono::{DateTime, Duration, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

use crate::config::TrackerConfig;
use crate::error::{Result, TallyError};

use super::context::SessionContext;

/// Current on-disk format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The on-disk snapshot of a [`SessionContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedContext {
    pub version: u32,
    #[serde(default)]
    pub last_project_code: Option<String>,
    #[serde(default)]
    pub last_task: Option<String>,
    #[serde(default)]
    pub last_entry_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_entry_id: Option<i64>,
    pub last_activity_at: DateTime<Utc>,
    #[serde(default)]
    pub session_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tool_call_count: u32,
    #[serde(default)]
    pub suggestion_shown_for_current_session: bool,
    pub saved_at: DateTime<Utc>,
}

impl PersistedContext {
    pub fn from_context(context: &SessionContext, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            last_project_code: context.last_project_code.clone(),
            last_task: context.last_task.clone(),
            last_entry_created_at: context.last_entry_created_at,
            last_entry_id: context.last_entry_id,
            last_activity_at: context.last_activity_at,
            session_started_at: context.session_started_at,
            tool_call_count: context.tool_call_count,
            suggestion_shown_for_current_session: context.suggestion_shown_for_current_session,
            saved_at,
        }
    }

    /// Returns true if the last activity is older than `window`.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.last_activity_at) > window
    }

    /// Rebuilds the live context. Session-scoped counters start over.
    pub fn into_context(self) -> SessionContext {
        SessionContext {
            last_project_code: self.last_project_code,
            last_task: self.last_task,
            last_entry_created_at: self.last_entry_created_at,
            last_entry_id: self.last_entry_id,
            last_activity_at: self.last_activity_at,
            session_started_at: self.session_started_at,
            tool_call_count: 0,
            suggestion_shown_for_current_session: false,
        }
    }
}

/// Reads and writes the session-context snapshot at a fixed path.
#[derive(Debug)]
pub struct ContextStore {
    path: PathBuf,
    staleness: Duration,
    write_lock: Mutex<()>,
}

impl ContextStore {
    pub fn new(path: impl Into<PathBuf>, staleness: Duration) -> Self {
        Self {
            path: path.into(),
            staleness,
            write_lock: Mutex::new(()),
        }
    }

    /// Store at the configured snapshot path, or `None` if no path can be resolved.
    pub fn from_config(config: &TrackerConfig) -> Option<Self> {
        config
            .resolved_context_path()
            .map(|path| Self::new(path, config.staleness_window()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, treating every failure as "no context".
    pub fn load(&self, now: DateTime<Utc>) -> Option<SessionContext> {
        match self.try_load(now) {
            Ok(context) => context,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    path = %self.path.display(),
                    "Ignoring unreadable session snapshot"
                );
                None
            }
        }
    }

    /// Loads the snapshot.
    ///
    /// `Ok(None)` for a missing or empty file and for a stale snapshot; errors for
    /// I/O failures, corrupt JSON and unsupported versions.
    pub fn try_load(&self, now: DateTime<Utc>) -> Result<Option<SessionContext>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(TallyError::io("Failed to read session snapshot", err)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %self.path.display(), "Empty session snapshot");
            return Ok(None);
        }

        let snapshot: PersistedContext = serde_json::from_str(&content)
            .map_err(|err| TallyError::json("Failed to parse session snapshot", err))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(TallyError::UnsupportedVersion(snapshot.version));
        }

        if snapshot.is_stale(now, self.staleness) {
            tracing::debug!(
                last_activity_at = %snapshot.last_activity_at.to_rfc3339(),
                staleness_minutes = self.staleness.num_minutes(),
                "Discarding stale session snapshot"
            );
            return Ok(None);
        }

        Ok(Some(snapshot.into_context()))
    }

    /// Saves the snapshot, logging and dropping any failure.
    pub fn save(&self, context: &SessionContext, now: DateTime<Utc>) {
        if let Err(err) = self.try_save(context, now) {
            tracing::warn!(
                error = %err,
                path = %self.path.display(),
                "Failed to persist session snapshot"
            );
        }
    }

    /// Replaces the snapshot with `context`, stamped `saved_at = now`.
    pub fn try_save(&self, context: &SessionContext, now: DateTime<Utc>) -> Result<()> {
        let snapshot = PersistedContext::from_context(context, now);
        let content = serde_json::to_string_pretty(&snapshot)
            .map_err(|err| TallyError::json("Failed to serialize session snapshot", err))?;

        let parent_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| TallyError::NoParentDir(self.path.clone()))?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        fs::create_dir_all(parent_dir)
            .map_err(|err| TallyError::io("Failed to create snapshot directory", err))?;
        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .map_err(|err| TallyError::io("Failed to create temp snapshot", err))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|err| TallyError::io("Failed to write temp snapshot", err))?;
        temp_file
            .flush()
            .map_err(|err| TallyError::io("Failed to flush temp snapshot", err))?;
        temp_file
            .persist(&self.path)
            .map_err(|err| TallyError::io("Failed to replace session snapshot", err.error))?;

        Ok(())
    }

    /// Removes the snapshot. A missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(TallyError::io("Failed to remove session snapshot", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn window() -> Duration {
        Duration::minutes(60)
    }

    fn logged_context(now: DateTime<Utc>) -> SessionContext {
        let mut ctx = SessionContext::new(now - Duration::minutes(20));
        ctx.record_time_entry(
            "INTERNAL".to_string(),
            "Task/17".to_string(),
            42,
            now - Duration::minutes(15),
        );
        ctx.record_activity(now - Duration::minutes(5), Duration::minutes(30));
        ctx.mark_suggestion_shown();
        ctx
    }

    #[test]
    fn test_save_then_load_restores_identity_and_resets_counters() {
        let temp = tempdir().unwrap();
        let store = ContextStore::new(temp.path().join("ctx.json"), window());
        let now = Utc::now();
        let ctx = logged_context(now);
        assert_eq!(ctx.tool_call_count, 2);

        store.try_save(&ctx, now).unwrap();
        let loaded = store.load(now).unwrap();

        assert_eq!(loaded.last_project_code.as_deref(), Some("INTERNAL"));
        assert_eq!(loaded.last_task.as_deref(), Some("Task/17"));
        assert_eq!(loaded.last_entry_id, Some(42));
        assert_eq!(loaded.last_entry_created_at, ctx.last_entry_created_at);
        assert_eq!(loaded.last_activity_at, ctx.last_activity_at);
        assert_eq!(loaded.session_started_at, ctx.session_started_at);
        assert_eq!(loaded.tool_call_count, 0);
        assert!(!loaded.suggestion_shown_for_current_session);
    }

    #[test]
    fn test_missing_file_is_no_context() {
        let temp = tempdir().unwrap();
        let store = ContextStore::new(temp.path().join("absent.json"), window());
        assert!(store.try_load(Utc::now()).unwrap().is_none());
    }

    #[test]
    fn test_stale_snapshot_is_rejected() {
        let temp = tempdir().unwrap();
        let store = ContextStore::new(temp.path().join("ctx.json"), window());
        let then = Utc::now() - Duration::hours(3);
        store.try_save(&logged_context(then), then).unwrap();

        assert_eq!(store.load(Utc::now()), None);
    }

    #[test]
    fn test_snapshot_within_window_is_restored() {
        let temp = tempdir().unwrap();
        let store = ContextStore::new(temp.path().join("ctx.json"), window());
        let then = Utc::now();
        let ctx = logged_context(then);
        store.try_save(&ctx, then).unwrap();

        // last activity was 5 minutes before `then`
        assert!(store.load(then + Duration::minutes(55)).is_some());
        assert!(store.load(then + Duration::minutes(56)).is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_no_context() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ctx.json");
        std::fs::write(&path, "{ definitely not json").unwrap();
        let store = ContextStore::new(&path, window());

        assert!(matches!(
            store.try_load(Utc::now()),
            Err(TallyError::Json { .. })
        ));
        assert_eq!(store.load(Utc::now()), None);
    }

    #[test]
    fn test_empty_snapshot_is_no_context() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ctx.json");
        std::fs::write(&path, "").unwrap();
        let store = ContextStore::new(&path, window());
        assert!(store.try_load(Utc::now()).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_version_is_no_context() {
        let temp = tempdir().unwrap();
        let store = ContextStore::new(temp.path().join("ctx.json"), window());
        let now = Utc::now();
        let mut snapshot = PersistedContext::from_context(&SessionContext::new(now), now);
        snapshot.version = 99;
        std::fs::write(store.path(), serde_json::to_string(&snapshot).unwrap()).unwrap();

        assert!(matches!(
            store.try_load(now),
            Err(TallyError::UnsupportedVersion(99))
        ));
        assert_eq!(store.load(now), None);
    }

    #[test]
    fn test_save_creates_parent_directories_and_overwrites() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("dir").join("ctx.json");
        let store = ContextStore::new(&path, window());
        let now = Utc::now();

        store.try_save(&SessionContext::new(now), now).unwrap();
        store.try_save(&logged_context(now), now).unwrap();

        let raw: PersistedContext =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.version, SNAPSHOT_VERSION);
        assert_eq!(raw.last_entry_id, Some(42));
        assert_eq!(raw.tool_call_count, 2);
        assert!(raw.suggestion_shown_for_current_session);
        assert_eq!(raw.saved_at, now);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        // parent is a regular file, so the directory cannot be created
        let store = ContextStore::new(blocker.join("ctx.json"), window());
        let now = Utc::now();

        assert!(store.try_save(&SessionContext::new(now), now).is_err());
        store.save(&SessionContext::new(now), now);
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let temp = tempdir().unwrap();
        let store = ContextStore::new(temp.path().join("ctx.json"), window());
        let now = Utc::now();
        store.try_save(&SessionContext::new(now), now).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }
}
