//! # Teleroute Core
//!
//! The event model and the collaborator contracts of the Teleroute bot
//! framework.
//!
//! - **Event model**: [`Event`], [`Message`], [`CallbackQuery`], [`User`],
//!   [`Chat`], plus the command and callback-payload wire formats
//! - **Reply capability**: the [`Bot`] trait and [`ParseMode`]
//! - **Event source**: the pull-based [`EventFeed`] trait
//!
//! Everything that routes events lives in `teleroute-framework`; everything
//! that talks to a real platform lives in an adapter crate.
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌───────────────────┐
//! │  EventFeed   │────▶│ Dispatcher │────▶│  Handler chains   │──▶ Bot::send_message
//! │  (adapter)   │     │ (framework)│     │  (application)    │
//! └──────────────┘     └────────────┘     └───────────────────┘
//! ```

pub mod bot;
pub mod error;
pub mod event;
pub mod feed;

pub use bot::{Bot, BotCommand, BoxedBot, ParseMode};
pub use error::{ApiError, ApiResult, TransportError, TransportResult};
pub use event::{
    CallbackPayload, CallbackQuery, Chat, ChatKind, CommandToken, Event, Message, User,
    parse_callback_payload, parse_command,
};
pub use feed::{BoxedFeed, ChannelFeed, EventFeed};
