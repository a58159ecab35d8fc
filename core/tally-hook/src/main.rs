//! tally-hook: CLI hook handler for Tally auto-tracking.
//!
//! Called by the tool-call bridge after every tool call, and usable by hand to
//! inspect or drive the tracker.
//!
//! ## Subcommands
//!
//! - `handle`: Main hook handler, reads newline-delimited tool-call events from
//!   stdin until EOF and prints each due suggestion
//! - `activity` / `entry`: Record an event from arguments (no suggestion output)
//! - `status`: Print timers, phase and any due suggestion as JSON
//! - `check`: Evaluate an ACL permission check (exit 0 = granted, 1 = denied)
//! - `reset`: Delete the persisted session snapshot

mod check;
mod error;
mod handle;
mod logging;

use clap::{Parser, Subcommand};
use tally_core::{ContextStore, SessionTracker, TrackerConfig};

use crate::error::HookError;

#[derive(Parser)]
#[command(name = "tally-hook")]
#[command(about = "Tally auto-tracking hook and access checks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle tool-call events (reads JSON lines from stdin until EOF)
    Handle,

    /// Record tool-call activity
    Activity,

    /// Record a newly created time entry
    Entry {
        /// Project code (e.g., INTERNAL)
        #[arg(long)]
        project: String,

        /// Task identifier
        #[arg(long)]
        task: String,

        /// ID of the created time entry
        #[arg(long)]
        id: i64,
    },

    /// Print tracker status as JSON
    Status,

    /// Check a permission on a resource path
    Check {
        /// Resource path (e.g., Project/INTERNAL/Task/17)
        #[arg(long)]
        path: String,

        /// Permission code; repeat for several
        #[arg(long = "permission", required = true)]
        permissions: Vec<String>,

        /// ACL claim `Path=Perm1,Perm2`; repeat for several (default: $TALLY_ACL_CLAIMS)
        #[arg(long = "claim")]
        claims: Vec<String>,

        /// Grant if any permission is held (default: all must be held)
        #[arg(long)]
        any: bool,
    },

    /// Delete the persisted session snapshot
    Reset,
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Handle => {
            // Never disrupt the agent: failures are logged and the hook exits 0
            if let Err(e) = handle::run() {
                tracing::warn!(error = %e, "tally-hook handle failed");
            }
        }
        Commands::Activity => record(handle::TrackerEvent::Activity),
        Commands::Entry { project, task, id } => record(handle::TrackerEvent::TimeEntry {
            project_code: project,
            task,
            entry_id: id,
        }),
        Commands::Status => exit_on_error(print_status()),
        Commands::Check {
            path,
            permissions,
            claims,
            any,
        } => {
            let mode = if any { check::Mode::Any } else { check::Mode::All };
            let granted = check::run(check::CliClaims::new(claims), &path, &permissions, mode);
            println!("{}", granted);
            if !granted {
                std::process::exit(1);
            }
        }
        Commands::Reset => exit_on_error(reset()),
    }
}

// Suggestions belong to the `handle` process; a one-off command only records.
fn record(event: handle::TrackerEvent) {
    let mut tracker = SessionTracker::restore_or_new(TrackerConfig::load());
    handle::record_event(&mut tracker, event);
}

fn print_status() -> Result<(), HookError> {
    let tracker = SessionTracker::restore_or_new(TrackerConfig::load());
    let status = tracker.status();
    let json = serde_json::to_string_pretty(&status).map_err(HookError::Output)?;
    println!("{}", json);
    Ok(())
}

fn reset() -> Result<(), HookError> {
    let store =
        ContextStore::from_config(&TrackerConfig::load()).ok_or(HookError::NoSnapshotPath)?;
    store.clear()?;
    tracing::info!(path = %store.path().display(), "Session snapshot cleared");
    Ok(())
}

fn exit_on_error(result: Result<(), HookError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "tally-hook failed");
        eprintln!("tally-hook: {}", e);
        std::process::exit(1);
    }
}
