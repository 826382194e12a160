//! Test doubles shared by the framework's unit tests.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use teleroute_core::{
    ApiError, ApiResult, Bot, BotCommand, BoxedBot, CallbackQuery, Chat, ChatKind, Event, Message,
    ParseMode, TransportError, User,
};

pub const CHAT_ID: i64 = 42;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub chat_id: i64,
    pub text: String,
    pub mode: ParseMode,
}

/// A bot that records everything it is asked to send.
#[derive(Default)]
pub struct MockBot {
    sent: Mutex<Vec<Sent>>,
    fail: bool,
}

impl MockBot {
    pub fn boxed() -> BoxedBot {
        Arc::new(Self::default())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|s| s.text.clone()).collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    fn id(&self) -> &str {
        "mock-bot"
    }

    async fn send_message(&self, chat_id: i64, text: &str, mode: ParseMode) -> ApiResult<i64> {
        if self.fail {
            return Err(ApiError::Transport(TransportError::RequestFailed(
                "connection reset".into(),
            )));
        }
        let mut sent = self.sent.lock();
        sent.push(Sent {
            chat_id,
            text: text.to_string(),
            mode,
        });
        Ok(sent.len() as i64)
    }

    async fn set_commands(&self, _commands: &[BotCommand]) -> ApiResult<()> {
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub fn user(username: &str) -> User {
    User {
        id: 1001,
        is_bot: false,
        first_name: username.to_string(),
        last_name: None,
        username: Some(username.to_string()),
        language_code: None,
    }
}

pub fn message(text: &str) -> Message {
    Message {
        message_id: 1,
        from: Some(user("alice")),
        chat: Chat {
            id: CHAT_ID,
            kind: ChatKind::Private,
            title: None,
            username: Some("alice".into()),
            first_name: Some("alice".into()),
        },
        date: 1_700_000_000,
        text: Some(text.to_string()),
    }
}

pub fn message_event(text: &str) -> Event {
    Event::Message(message(text))
}

pub fn callback_event(data: Option<&str>) -> Event {
    Event::CallbackQuery(CallbackQuery {
        id: "cb-1".into(),
        from: user("alice"),
        message: Some(message("choose")),
        data: data.map(str::to_string),
    })
}
