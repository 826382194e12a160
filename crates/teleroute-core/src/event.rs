//! Event model for the Teleroute framework.
//!
//! Events arrive from the transport as one of a small, closed set of variants:
//!
//! - [`Event::Message`] / [`Event::EditedMessage`] carry a [`Message`]
//! - [`Event::CallbackQuery`] carries a [`CallbackQuery`] (inline button press)
//! - [`Event::Unsupported`] names an update kind the engine does not handle
//!
//! All types serialize to the platform's JSON shape, so an adapter can decode
//! them straight from the wire and a handler can dump them back out.
//!
//! # Command syntax
//!
//! ```text
//! /name@botname arg1   arg2
//!  ^^^^         ^^^^^^^^^^^ arguments (whitespace-split, empty tokens dropped)
//!  command token (the @botname suffix is stripped)
//! ```
//!
//! # Callback payload syntax
//!
//! ```text
//! vote:poll:42
//! ^^^^ ^^^^^^^ data (may contain further colons)
//! name
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Participants
// ============================================================================

/// A platform user (or bot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// The kind of conversation a [`Chat`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    /// Any kind introduced by the platform after this crate was written.
    #[serde(other)]
    Unknown,
}

/// A conversation: the target of every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

// ============================================================================
// Messages
// ============================================================================

/// A chat message, new or edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The command token of a message, borrowed from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandToken<'a> {
    /// Command name without the leading `/` and without any `@botname` suffix.
    pub name: &'a str,
    /// Everything after the token, with leading whitespace trimmed.
    pub arguments: &'a str,
}

impl CommandToken<'_> {
    /// Splits the argument tail on whitespace, discarding empty tokens.
    pub fn args(&self) -> Vec<String> {
        self.arguments.split_whitespace().map(str::to_owned).collect()
    }
}

/// Parses `"/name@bot arg1 arg2"` into a [`CommandToken`].
///
/// Returns `None` when the text is not a command or the name is empty.
pub fn parse_command(text: &str) -> Option<CommandToken<'_>> {
    let rest = text.strip_prefix('/')?;
    let (token, arguments) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim_start()),
        None => (rest, ""),
    };
    let name = token.split_once('@').map_or(token, |(name, _)| name);
    if name.is_empty() {
        return None;
    }
    Some(CommandToken { name, arguments })
}

impl Message {
    /// Returns the message text, or `""` for non-text messages.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Returns the command token if the text starts with one.
    pub fn command(&self) -> Option<CommandToken<'_>> {
        self.text.as_deref().and_then(parse_command)
    }

    /// Returns the raw argument tail of a command message, or `""`.
    pub fn command_arguments(&self) -> &str {
        self.command().map_or("", |cmd| cmd.arguments)
    }
}

// ============================================================================
// Callback Queries
// ============================================================================

/// A press on an inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// The message the button was attached to, if still available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Opaque payload set by the bot when it created the button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A well-formed `"<name>:<data>"` callback payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackPayload<'a> {
    pub name: &'a str,
    pub data: &'a str,
}

/// Splits a callback payload at its first colon.
///
/// Both halves must be non-empty; the data half may contain further colons.
pub fn parse_callback_payload(payload: &str) -> Option<CallbackPayload<'_>> {
    let (name, data) = payload.split_once(':')?;
    if name.is_empty() || data.is_empty() {
        return None;
    }
    Some(CallbackPayload { name, data })
}

impl CallbackQuery {
    /// Returns the parsed payload, or `None` if it is missing or malformed.
    pub fn payload(&self) -> Option<CallbackPayload<'_>> {
        self.data.as_deref().and_then(parse_callback_payload)
    }
}

// ============================================================================
// Event
// ============================================================================

/// An inbound event from the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Message(Message),
    EditedMessage(Message),
    CallbackQuery(CallbackQuery),
    /// An update kind the engine does not route (e.g. `channel_post`).
    Unsupported { kind: String },
}

impl Event {
    /// Returns a short, stable name for the variant; used in logs and spans.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Message(_) => "message",
            Self::EditedMessage(_) => "edited_message",
            Self::CallbackQuery(_) => "callback_query",
            Self::Unsupported { kind } => kind,
        }
    }

    /// Returns the message for message-shaped events.
    ///
    /// Callback queries are not message-shaped even though they may carry
    /// the message their button was attached to.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Message(msg) | Self::EditedMessage(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the callback query, if this is one.
    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match self {
            Self::CallbackQuery(query) => Some(query),
            _ => None,
        }
    }

    /// Returns the chat a reply to this event should go to.
    pub fn chat(&self) -> Option<&Chat> {
        match self {
            Self::Message(msg) | Self::EditedMessage(msg) => Some(&msg.chat),
            Self::CallbackQuery(query) => query.message.as_ref().map(|msg| &msg.chat),
            Self::Unsupported { .. } => None,
        }
    }

    /// Returns the user who caused this event.
    pub fn sender(&self) -> Option<&User> {
        match self {
            Self::Message(msg) | Self::EditedMessage(msg) => msg.from.as_ref(),
            Self::CallbackQuery(query) => Some(&query.from),
            Self::Unsupported { .. } => None,
        }
    }

    /// Returns the platform id of the underlying message or query, for logs.
    pub fn id(&self) -> String {
        match self {
            Self::Message(msg) | Self::EditedMessage(msg) => msg.message_id.to_string(),
            Self::CallbackQuery(query) => query.id.clone(),
            Self::Unsupported { .. } => String::new(),
        }
    }
}
