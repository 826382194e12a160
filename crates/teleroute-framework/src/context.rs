//! Per-event context for the Teleroute framework.
//!
//! One [`Context`] is created for every routed event and wrapped in an `Arc`
//! that is cloned into each handler of that event's dispatch. It carries:
//!
//! - the originating [`Event`] and the [`Bot`](teleroute_core::Bot) to reply
//!   through;
//! - a **data bag**: string keys to JSON values, written by middleware and read
//!   by later handlers (e.g. an `isAdmin` flag computed once per event);
//! - the **abort flag**: once set, the dispatcher runs no further handler of
//!   the current chain.
//!
//! Key names and value shapes in the data bag are a convention between the
//! handlers that use them; nothing checks them.
//!
//! ```rust,ignore
//! async fn require_admin(ctx: Arc<Context>, _args: CommandArgs) -> HandlerResult {
//!     if !ctx.flag("isAdmin") {
//!         ctx.reply("You are not an admin", ParseMode::None).await?;
//!         ctx.abort();
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use teleroute_core::{BoxedBot, CallbackQuery, Event, Message, ParseMode, User};

use crate::error::{ContextError, ContextResult};

/// The context object passed to every handler of one event.
pub struct Context {
    event: Event,
    bot: BoxedBot,
    data: Mutex<HashMap<String, Value>>,
    /// Set by [`Context::abort`]; never cleared.
    aborted: AtomicBool,
}

impl Context {
    /// Creates a fresh context with an empty data bag.
    pub fn new(event: Event, bot: BoxedBot) -> Self {
        Self {
            event,
            bot,
            data: Mutex::new(HashMap::new()),
            aborted: AtomicBool::new(false),
        }
    }

    // ─── Event access ─────────────────────────────────────────────────────────

    /// Returns the originating event.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Returns the bot this event arrived on.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// Returns the message of a message or edited-message event.
    ///
    /// Fails with [`ContextError::NoMessage`] for any other event, including
    /// callback queries.
    pub fn message(&self) -> ContextResult<&Message> {
        self.event.message().ok_or_else(|| ContextError::NoMessage {
            kind: self.event.kind_name().to_string(),
        })
    }

    /// Returns the callback query, if this event is one.
    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        self.event.callback_query()
    }

    /// Returns the user who caused the event.
    pub fn sender(&self) -> Option<&User> {
        self.event.sender()
    }

    /// Returns the id of the chat replies go to.
    pub fn chat_id(&self) -> Option<i64> {
        self.event.chat().map(|chat| chat.id)
    }

    pub fn is_edited(&self) -> bool {
        matches!(self.event, Event::EditedMessage(_))
    }

    pub fn is_callback(&self) -> bool {
        matches!(self.event, Event::CallbackQuery(_))
    }

    // ─── Abort ────────────────────────────────────────────────────────────────

    /// Stops the currently executing chain after the running handler returns.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`abort`](Self::abort) has been called.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    // ─── Reply ────────────────────────────────────────────────────────────────

    /// Sends `text` to the chat the event came from.
    ///
    /// Returns the id of the sent message. Transport failures are returned
    /// as-is; the caller decides whether to abort.
    pub async fn reply(&self, text: impl AsRef<str>, mode: ParseMode) -> ContextResult<i64> {
        let chat_id = self.chat_id().ok_or(ContextError::NoChat)?;
        debug!(chat_id, %mode, "Sending reply");

        self.bot
            .send_message(chat_id, text.as_ref(), mode)
            .await
            .map_err(|e| {
                warn!(chat_id, error = %e, "Failed to send reply");
                ContextError::from(e)
            })
    }

    // ─── Data bag ─────────────────────────────────────────────────────────────

    /// Stores a value under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.lock().insert(key.into(), value.into());
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    /// Returns the value under `key` deserialized as `T`.
    ///
    /// `None` if the key is absent or the value has a different shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Returns the boolean stored under `key`; absent or non-boolean is `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.data
            .lock()
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.lock().remove(key)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("event", &self.event.kind_name())
            .field("bot", &self.bot.id())
            .field("aborted", &self.is_aborted())
            .finish_non_exhaustive()
    }
}
