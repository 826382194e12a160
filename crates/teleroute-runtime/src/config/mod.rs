//! Configuration module for the Teleroute runtime.
//!
//! Layered loading (defaults, files, environment) via figment, the logging
//! schema, and free-form adapter sections that each adapter deserializes into
//! its own type.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig, TelerouteConfig};
