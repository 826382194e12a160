//! Configuration for the Telegram adapter.
//!
//! Read from the `[telegram]` section of `teleroute.toml`:
//!
//! ```toml
//! [telegram]
//! token = "123456:ABC-DEF"
//! # api_url = "https://api.telegram.org"
//! poll_timeout_secs = 30
//! request_timeout_secs = 10
//! retry_delay_secs = 3
//! ```
//!
//! The token is usually better kept out of the file:
//! `TELEROUTE_TELEGRAM__TOKEN=123456:ABC-DEF`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use teleroute_core::{TransportError, TransportResult};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram adapter configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token issued by @BotFather.
    pub token: String,

    /// Bot API server; override for a self-hosted server.
    pub api_url: String,

    /// Long-poll duration of `getUpdates`.
    pub poll_timeout_secs: u64,

    /// Timeout of ordinary API calls; long polls get this on top of the poll
    /// duration.
    pub request_timeout_secs: u64,

    /// Pause after a failed poll before the next attempt.
    pub retry_delay_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout_secs: 30,
            request_timeout_secs: 10,
            retry_delay_secs: 3,
        }
    }
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Rejects settings the adapter cannot start with.
    pub fn validate(&self) -> TransportResult<()> {
        if self.token.trim().is_empty() {
            return Err(TransportError::InvalidConfig(
                "telegram.token must not be empty".into(),
            ));
        }
        if self.token.chars().any(char::is_whitespace) {
            return Err(TransportError::InvalidConfig(
                "telegram.token must not contain whitespace".into(),
            ));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(TransportError::InvalidConfig(format!(
                "telegram.api_url must be an http(s) URL, got {:?}",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(TransportError::InvalidConfig(
                "telegram.request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The numeric bot id: the part of the token before the colon.
    pub fn bot_id(&self) -> &str {
        self.token
            .split_once(':')
            .map_or(self.token.as_str(), |(id, _)| id)
    }

    /// `{api_url}/bot{token}/{method}`
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_url.trim_end_matches('/'),
            self.token,
            method
        )
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

// Keeps the token out of logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_id", &self.bot_id())
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_rejected() {
        let err = TelegramConfig::default().validate().unwrap_err();
        assert!(matches!(err, TransportError::InvalidConfig(msg) if msg.contains("token")));
        assert!(TelegramConfig::new("   ").validate().is_err());
    }

    #[test]
    fn test_valid_config() {
        let config = TelegramConfig::new("123456:ABC-DEF");
        assert!(config.validate().is_ok());
        assert_eq!(config.bot_id(), "123456");
        assert_eq!(
            config.method_url("getMe"),
            "https://api.telegram.org/bot123456:ABC-DEF/getMe"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", TelegramConfig::new("123456:secret"));
        assert!(rendered.contains("123456"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: TelegramConfig =
            serde_json::from_str(r#"{ "token": "1:x", "api_url": "http://localhost:8081/" }"#)
                .unwrap();
        assert_eq!(config.poll_timeout_secs, 30);
        assert_eq!(config.method_url("getUpdates"), "http://localhost:8081/bot1:x/getUpdates");
    }
}
