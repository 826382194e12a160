//! Runtime error types.

use thiserror::Error;

use teleroute_core::{ApiError, TransportError};

/// Errors that end a [`BotRuntime`](crate::BotRuntime) run.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Publishing the command list failed; the loop never started.
    #[error("Failed to register bot commands: {0}")]
    CommandRegistration(#[source] ApiError),

    /// The cancellation token fired while waiting for the next event.
    #[error("Event loop cancelled")]
    Cancelled,

    /// The event feed failed.
    #[error("Event feed failed: {0}")]
    Feed(#[from] TransportError),
}

impl RuntimeError {
    /// Returns `true` if the run ended because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
