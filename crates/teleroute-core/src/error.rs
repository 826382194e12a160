//! Unified error types for the Teleroute core.
//!
//! Framework-level errors (like `ContextError`) are defined in
//! `teleroute-framework`; runtime errors live in `teleroute-runtime`.

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised while talking to the messaging platform.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be delivered.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The platform answered with something we could not decode.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for platform API calls (send message, set commands, ...).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The platform rejected the call.
    #[error("API error ({code}): {description}")]
    Rejected { code: i64, description: String },

    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
