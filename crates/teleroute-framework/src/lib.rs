//! # Teleroute Framework
//!
//! The dispatch engine of a Teleroute bot.
//!
//! This layer provides:
//! - Per-event [`Context`] with a data bag, an abort flag and `reply`
//! - Middleware, terminal handlers and the error hook, built from async closures
//! - Command and callback routing tables with generated help text
//! - The [`Dispatcher`] that takes one event from classification to its terminal chain
//!
//! It knows nothing about where events come from or how replies are delivered;
//! those are the `EventFeed` and `Bot` contracts in `teleroute-core`.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod routing;

#[cfg(test)]
mod testing;

pub use context::Context;
pub use dispatcher::{
    DispatchOutcome, Dispatcher, DispatcherBuilder, HELP_COMMAND, Terminal, Unrouted,
    UnroutedObserver,
};
pub use error::{BoxError, ContextError, ContextResult, HandlerResult};
pub use handler::{
    BoxFuture, BoxedErrorHook, BoxedHandler, BoxedMiddleware, CallbackData, ChainOutcome,
    CommandArgs, ErrorHook, Handler, HandlerChain, HandlerInput, Middleware, MiddlewareChain,
};
pub use routing::{Callback, Command, RoutingTable};
