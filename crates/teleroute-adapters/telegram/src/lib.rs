//! Telegram Bot API adapter for Teleroute.
//!
//! - [`TelegramBot`]: the [`Bot`](teleroute_core::Bot) capability (`sendMessage`,
//!   `setMyCommands`), with [`ParseMode::Basic`](teleroute_core::ParseMode)
//!   mapped to `Markdown` and `Extended` to `MarkdownV2`
//! - [`TelegramFeed`]: an [`EventFeed`](teleroute_core::EventFeed) over
//!   `getUpdates` long polling
//!
//! ```rust,ignore
//! let telegram: TelegramConfig = config.section("telegram")?.unwrap_or_default();
//! let bot = Arc::new(TelegramBot::new(telegram)?);
//! let feed = bot.feed();
//!
//! BotRuntime::new(dispatcher, bot).run_until_signal(feed).await?;
//! ```

mod api;
pub mod bot;
pub mod config;
pub mod feed;

pub use bot::TelegramBot;
pub use config::{DEFAULT_API_URL, TelegramConfig};
pub use feed::TelegramFeed;
