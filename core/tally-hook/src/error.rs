use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("Failed to parse tool-call event: {0}")]
    InvalidEvent(#[source] serde_json::Error),

    #[error("Failed to serialize output: {0}")]
    Output(#[source] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Write(#[source] std::io::Error),

    #[error("No snapshot path available (set TALLY_HOME or TALLY_CONTEXT_PATH)")]
    NoSnapshotPath,

    #[error(transparent)]
    Core(#[from] tally_core::TallyError),
}
