//! Teleroute Runtime - the outer layer of a Teleroute bot.
//!
//! This crate provides:
//! - The event loop (`BotRuntime`): command registration, then pull and
//!   dispatch one event at a time until the feed ends or the run is cancelled
//! - Layered configuration (`ConfigLoader`): files, profiles, `TELEROUTE_*`
//!   environment variables
//! - Logging setup (`LoggingBuilder`) on `tracing-subscriber`
//!
//! ```ignore
//! use teleroute_runtime::{BotRuntime, ConfigLoader, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let runtime = BotRuntime::new(dispatcher, bot);
//!     runtime.run_until_signal(feed).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel, LogOutput, LoggingConfig,
    Profile, TelerouteConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
pub use runtime::{BotRuntime, wait_for_shutdown};

pub use tokio_util::sync::CancellationToken;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros, for `use teleroute_runtime::prelude::*`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
