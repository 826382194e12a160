//! The Telegram implementation of [`Bot`].
//!
//! Handlers only see `BoxedBot`; code that needs Telegram specifics can
//! downcast:
//!
//! ```rust,ignore
//! if let Ok(telegram) = ctx.bot().clone().as_any().downcast::<TelegramBot>() {
//!     telegram.delete_commands().await?;
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use teleroute_core::{ApiResult, Bot, BotCommand, ParseMode, TransportResult};

use crate::api::{ApiClient, SendMessage, SentMessage, SetMyCommands, parse_mode_name};
use crate::config::TelegramConfig;
use crate::feed::TelegramFeed;

/// A bot account on the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramBot {
    id: String,
    client: ApiClient,
}

impl TelegramBot {
    /// Validates `config` and prepares the HTTP client. No request is made.
    pub fn new(config: TelegramConfig) -> TransportResult<Self> {
        config.validate()?;
        let id = format!("telegram:{}", config.bot_id());
        let client = ApiClient::new(Arc::new(config))?;
        info!(bot = %id, api_url = %client.config().api_url, "Telegram bot configured");
        Ok(Self { id, client })
    }

    /// Creates the long-polling feed for this bot.
    pub fn feed(&self) -> TelegramFeed {
        TelegramFeed::new(self.client.clone())
    }

    /// Clears the published command list.
    pub async fn delete_commands(&self) -> ApiResult<()> {
        let _: bool = self
            .client
            .call("deleteMyCommands", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Bot for TelegramBot {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_message(&self, chat_id: i64, text: &str, mode: ParseMode) -> ApiResult<i64> {
        let request = SendMessage {
            chat_id,
            text,
            parse_mode: parse_mode_name(mode),
        };
        let sent: SentMessage = self.client.call("sendMessage", &request).await?;
        debug!(chat_id, message_id = sent.message_id, "Message sent");
        Ok(sent.message_id)
    }

    async fn set_commands(&self, commands: &[BotCommand]) -> ApiResult<()> {
        let _: bool = self
            .client
            .call("setMyCommands", &SetMyCommands { commands })
            .await?;
        info!(bot = %self.id, count = commands.len(), "Published command list");
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("id", &self.id)
            .field("config", self.client.config())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teleroute_core::{BoxedBot, TransportError};

    #[test]
    fn test_new_rejects_empty_token() {
        let result = TelegramBot::new(TelegramConfig::default());
        assert!(matches!(result, Err(TransportError::InvalidConfig(_))));
    }

    #[test]
    fn test_id_and_downcast() {
        let bot = TelegramBot::new(TelegramConfig::new("4242:secret")).unwrap();
        assert_eq!(bot.id(), "telegram:4242");
        assert!(!format!("{bot:?}").contains("secret"));

        let boxed: BoxedBot = Arc::new(bot);
        assert!(boxed.as_any().downcast::<TelegramBot>().is_ok());
    }
}
