//! Error types for the Teleroute framework.

use thiserror::Error;

use teleroute_core::ApiError;

/// Error type returned by handlers.
///
/// Boxed so that business code can use `?` on any error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by terminal and callback handlers.
pub type HandlerResult = Result<(), BoxError>;

/// Errors raised by [`Context`](crate::Context) operations.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// The event is not a (possibly edited) message.
    #[error("no message in {kind} event")]
    NoMessage {
        /// The event kind that was found instead.
        kind: String,
    },

    /// The event carries no chat to reply to.
    #[error("no chat to reply to")]
    NoChat,

    /// The reply could not be sent.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;
