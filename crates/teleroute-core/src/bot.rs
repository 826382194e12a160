//! Bot trait and related types.
//!
//! A [`Bot`] is the reply capability the dispatch engine hands to handlers.
//! Concrete implementations (e.g. `TelegramBot`) wrap a network client.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// Formatting applied by the platform to an outgoing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Plain text, no markup.
    #[default]
    None,
    /// Basic markup (`*bold*`, `` `code` ``).
    Basic,
    /// Extended markup with stricter escaping rules.
    Extended,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Extended => "extended",
        })
    }
}

/// An entry of the command list shown by the platform's client UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

/// The outbound side of a bot.
///
/// Every call completes (or fails) before returning; no implementation is
/// expected to retry on its own.
#[async_trait]
pub trait Bot: Send + Sync + 'static {
    /// Returns the bot's identifier, used in logs.
    fn id(&self) -> &str;

    /// Sends `text` to `chat_id` and returns the id of the sent message.
    async fn send_message(&self, chat_id: i64, text: &str, mode: ParseMode) -> ApiResult<i64>;

    /// Publishes the command list shown by the platform's clients.
    async fn set_commands(&self, commands: &[BotCommand]) -> ApiResult<()>;

    /// Returns self as an `Arc<dyn Any>` for downcasting to the concrete bot.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A shared Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;
