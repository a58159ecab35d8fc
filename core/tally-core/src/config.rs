//! Configuration loading and path utilities.
//!
//! Handles paths and settings for:
//! - Tracker thresholds (idle, staleness, suggestion delay)
//! - The session-context snapshot
//! - Hook logs
//!
//! Everything lives under `~/.tally/` unless `TALLY_HOME` points elsewhere.

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, TallyError};

/// Overrides the `~/.tally` base directory.
pub const HOME_ENV: &str = "TALLY_HOME";

/// Overrides the snapshot location (takes precedence over `context_path` in config).
pub const CONTEXT_PATH_ENV: &str = "TALLY_CONTEXT_PATH";

/// A gap between activities longer than this starts a new session.
pub const DEFAULT_IDLE_THRESHOLD_MINUTES: i64 = 30;

/// Snapshots whose last activity is older than this are not restored.
pub const DEFAULT_STALENESS_MINUTES: i64 = 60;

/// Minimum session length before a time entry is suggested.
pub const DEFAULT_SUGGEST_AFTER_MINUTES: i64 = 30;

/// Upper bound for every minute setting (one week).
pub const MAX_THRESHOLD_MINUTES: i64 = 7 * 24 * 60;

const CONFIG_FILE: &str = "config.json";
const CONTEXT_FILE: &str = "session-context.json";
const LOGS_DIR: &str = "logs";

/// Tracker settings, read from `~/.tally/config.json`.
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub idle_threshold_minutes: i64,
    pub staleness_minutes: i64,
    pub suggest_after_minutes: i64,
    pub context_path: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            idle_threshold_minutes: DEFAULT_IDLE_THRESHOLD_MINUTES,
            staleness_minutes: DEFAULT_STALENESS_MINUTES,
            suggest_after_minutes: DEFAULT_SUGGEST_AFTER_MINUTES,
            context_path: None,
        }
    }
}

impl TrackerConfig {
    /// Loads the configuration, returning defaults if the file is missing or malformed.
    pub fn load() -> Self {
        let Some(path) = get_config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load tracker config; using defaults");
                Self::default()
            }
        }
    }

    /// Loads the configuration from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(TallyError::io("Failed to read config", err)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self =
            serde_json::from_str(&content).map_err(|err| TallyError::ConfigMalformed {
                path: path.to_path_buf(),
                details: err.to_string(),
            })?;
        config
            .validate()
            .map_err(|details| TallyError::ConfigMalformed {
                path: path.to_path_buf(),
                details,
            })?;
        Ok(config)
    }

    /// Checks that every minute setting lies in `1..=MAX_THRESHOLD_MINUTES`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let fields = [
            ("idle_threshold_minutes", self.idle_threshold_minutes),
            ("staleness_minutes", self.staleness_minutes),
            ("suggest_after_minutes", self.suggest_after_minutes),
        ];
        for (name, value) in fields {
            if !is_valid_minutes(value) {
                return Err(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_THRESHOLD_MINUTES, value
                ));
            }
        }
        Ok(())
    }

    /// Idle gap that starts a new session. Out-of-range values fall back to the default.
    pub fn idle_threshold(&self) -> chrono::Duration {
        bounded_minutes(self.idle_threshold_minutes, DEFAULT_IDLE_THRESHOLD_MINUTES)
    }

    /// Snapshot staleness window. Out-of-range values fall back to the default.
    pub fn staleness_window(&self) -> chrono::Duration {
        bounded_minutes(self.staleness_minutes, DEFAULT_STALENESS_MINUTES)
    }

    /// Session length that makes a suggestion due, clamped like the durations.
    pub fn suggest_after(&self) -> i64 {
        if is_valid_minutes(self.suggest_after_minutes) {
            self.suggest_after_minutes
        } else {
            DEFAULT_SUGGEST_AFTER_MINUTES
        }
    }

    /// Resolves the snapshot path: `TALLY_CONTEXT_PATH`, then `context_path`,
    /// then `~/.tally/session-context.json`.
    pub fn resolved_context_path(&self) -> Option<PathBuf> {
        let env_override = env::var_os(CONTEXT_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.context_path_with(env_override, get_tally_dir())
    }

    fn context_path_with(
        &self,
        env_override: Option<PathBuf>,
        tally_dir: Option<PathBuf>,
    ) -> Option<PathBuf> {
        env_override
            .or_else(|| self.context_path.clone())
            .or_else(|| tally_dir.map(|d| d.join(CONTEXT_FILE)))
    }
}

fn is_valid_minutes(value: i64) -> bool {
    (1..=MAX_THRESHOLD_MINUTES).contains(&value)
}

fn bounded_minutes(value: i64, default: i64) -> chrono::Duration {
    let minutes = if is_valid_minutes(value) { value } else { default };
    chrono::Duration::minutes(minutes)
}

/// Returns the Tally base directory (`$TALLY_HOME` or `~/.tally`).
pub fn get_tally_dir() -> Option<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|h| h.join(".tally"))
}

/// Returns the path to the tracker configuration file.
pub fn get_config_path() -> Option<PathBuf> {
    get_tally_dir().map(|d| d.join(CONFIG_FILE))
}

/// Returns the directory hook logs are written to.
pub fn get_logs_dir() -> Option<PathBuf> {
    get_tally_dir().map(|d| d.join(LOGS_DIR))
}
