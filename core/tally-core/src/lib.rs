//! # tally-core
//!
//! Core library for Tally, providing the access-control and auto-tracking
//! logic shared by every client (the tool-call bridge, the hook CLI, tests).
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Clients can wrap with async if needed.
//! - **Not thread-safe**: [`SessionTracker`] is plain data plus a clock; clients
//!   that share one across threads provide their own `Mutex`.
//! - **Graceful degradation**: Malformed claims are dropped, missing or corrupt
//!   snapshots load as "no context". Nothing here fails a tool call.
//! - **Injected time**: Every "now" comes from a [`Clock`], so elapsed time can be
//!   simulated without sleeping.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tally_core::{AccessControl, Claims, SessionTracker, TrackerConfig};
//!
//! let claims = Claims::from_acl(["Project/INTERNAL=V,A,M"]);
//! let acl = AccessControl::new(claims);
//! assert!(acl.has_permission("Project/INTERNAL/Task/17", "A"));
//!
//! let mut tracker = SessionTracker::restore_or_new(TrackerConfig::load());
//! tracker.record_activity();
//! if let Some(suggestion) = tracker.take_suggestion() {
//!     println!("{}", suggestion.message());
//! }
//! ```

pub mod acl;
pub mod config;
pub mod error;
pub mod tracker;

pub use acl::{
    has_all_permissions, has_any_permission, has_permission, parse_claims, AccessControl,
    AclEntry, ClaimSource, Claims, ACL_CLAIM_TYPE,
};
pub use config::TrackerConfig;
pub use error::{Result, TallyError};
pub use tracker::{
    Clock, ContextStore, ManualClock, PersistedContext, SessionContext, SessionPhase,
    SessionTracker, SystemClock, TimeSuggestion, TrackerStatus,
};
