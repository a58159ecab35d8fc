//! Auto-tracking: nudging the user to log time they have not logged yet.
//!
//! Tool-call handlers report two kinds of events:
//!
//! ```text
//! any tool call        → record_activity()
//! time entry created   → record_time_entry(project, task, entry_id)
//! ```
//!
//! The tracker keeps idle and session timers over those events and decides when
//! enough unlogged work has accumulated to suggest an entry.
//!
//! # Sessions
//!
//! A session is a streak of activity with no gap longer than the idle threshold
//! (30 minutes by default). The first activity after a longer gap starts a new
//! session and re-arms the suggestion. Logging a time entry also starts a new
//! session, since everything before it is now accounted for.
//!
//! ```text
//! Fresh ──activity──▶ Active ──entry──▶ SuggestionPending ──shown──▶ SuggestionShown
//!                        ▲                                                 │
//!                        └────────── idle gap > threshold, or new entry ───┘
//! ```
//!
//! # Persistence
//!
//! The hook process is short-lived, so the context is written to a JSON snapshot
//! after every mutation and restored on startup. Snapshots whose last activity is
//! older than the staleness window are ignored. Per-session counters never
//! survive a restore.
//!
//! # Module Structure
//!
//! - [`clock`]: Injected time source
//! - [`context`]: [`SessionContext`] fields, transitions and timers
//! - [`suggestion`]: Suggested-hours rounding and the [`TimeSuggestion`] payload
//! - [`store`]: JSON snapshot persistence
//! - [`session`]: [`SessionTracker`], tying the above together

pub mod clock;
mod context;
mod session;
mod store;
mod suggestion;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::SessionContext;
pub use session::{SessionPhase, SessionTracker, TrackerStatus};
pub use store::{ContextStore, PersistedContext, SNAPSHOT_VERSION};
pub use suggestion::{
    round_to_quarter_hours, TimeSuggestion, MAX_SUGGESTED_HOURS, MIN_SUGGESTED_HOURS,
};
