//! # Teleroute
//!
//! Command and callback routing for chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────────────────────────────────────────────┐
//! │ EventFeed │──▶│ Dispatcher                                               │
//! └───────────┘   │  classify ─▶ middleware ─▶ route ─▶ one terminal chain   │──▶ Bot
//!                 └──────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Core** (`teleroute-core`): the event model, the `Bot` reply capability
//!   and the `EventFeed` event source
//! - **Framework** (`teleroute-framework`): `Context`, handler chains, routing
//!   tables and the `Dispatcher`
//! - **Runtime** (`teleroute-runtime`): the event loop, configuration, logging
//! - **Adapters**: platform implementations of `Bot` and `EventFeed`
//!   (`teleroute-adapter-telegram`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use teleroute::prelude::*;
//!
//! async fn echo(ctx: Arc<Context>, args: CommandArgs) -> HandlerResult {
//!     ctx.reply(args.join(" "), ParseMode::None).await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = Dispatcher::builder()
//!         .command(Command::new("echo").arguments("<message>").description("Echoes the message").handler(echo))
//!         .build();
//!
//!     BotRuntime::new(dispatcher, bot).run_until_signal(feed).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `teleroute.toml` configuration files
//! - `yaml-config`: `teleroute.yaml` configuration files
//! - `json-log`: JSON log output

pub use teleroute_core as core;
pub use teleroute_framework as framework;
pub use teleroute_runtime as runtime;

/// Everything a bot application usually needs.
///
/// ```rust,ignore
/// use teleroute::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Event loop
    pub use teleroute_runtime::{BotRuntime, CancellationToken, ConfigLoader, RuntimeError};

    // Registration
    pub use teleroute_framework::{Callback, Command, Dispatcher, HandlerChain};

    // Handlers
    pub use teleroute_framework::{
        BoxError, CallbackData, CommandArgs, Context, ContextError, HandlerInput, HandlerResult,
    };

    // Events and replies
    pub use teleroute_core::{BoxedBot, Event, Message, ParseMode, User};
}
