//! Handler system for the Teleroute framework.
//!
//! There are three kinds of handlers, each a trait with a blanket
//! implementation for async functions and closures of the matching shape:
//!
//! | Kind                 | Signature                                                   |
//! |----------------------|-------------------------------------------------------------|
//! | [`Middleware`]       | `async fn(Arc<Context>)`                                    |
//! | [`Handler<I>`]       | `async fn(Arc<Context>, I) -> HandlerResult`                |
//! | [`ErrorHook`]        | `async fn(Arc<Context>, HandlerInput, BoxError)`            |
//!
//! Terminal handlers are `Handler<CommandArgs>` (commands and the default
//! chain) or `Handler<CallbackData>` (callback queries).
//!
//! Handlers are type-erased into `Arc<dyn ...>` and grouped into chains that
//! run in insertion order and stop as soon as the context is aborted.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn echo(ctx: Arc<Context>, args: CommandArgs) -> HandlerResult {
//!     ctx.reply(args.join(" "), ParseMode::None).await?;
//!     Ok(())
//! }
//!
//! let chain = HandlerChain::new().then(require_admin).then(echo);
//! ```

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, trace, warn};

use crate::context::Context;
use crate::error::{BoxError, HandlerResult};

/// A type alias for a boxed, pinned future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ============================================================================
// Handler inputs
// ============================================================================

/// Whitespace-split arguments of a command; empty for the default chain.
///
/// Cheap to clone: every handler of a chain receives the same shared slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs(Arc<[String]>);

impl CommandArgs {
    pub fn new(args: Vec<String>) -> Self {
        Self(args.into())
    }

    /// Joins the arguments with `sep`.
    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }
}

impl Deref for CommandArgs {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for CommandArgs {
    fn from(args: Vec<String>) -> Self {
        Self::new(args)
    }
}

/// The data half of a `"<name>:<data>"` callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData(Arc<str>);

impl CallbackData {
    pub fn new(data: impl Into<Arc<str>>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for CallbackData {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a failing terminal handler was called with, as seen by the [`ErrorHook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerInput {
    Args(CommandArgs),
    Data(CallbackData),
}

impl From<CommandArgs> for HandlerInput {
    fn from(args: CommandArgs) -> Self {
        Self::Args(args)
    }
}

impl From<CallbackData> for HandlerInput {
    fn from(data: CallbackData) -> Self {
        Self::Data(data)
    }
}

// ============================================================================
// Handler traits
// ============================================================================

/// A cross-cutting handler run on every routed event before routing.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, ctx: Arc<Context>) -> BoxFuture<'static, ()>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle(&self, ctx: Arc<Context>) -> BoxFuture<'static, ()> {
        (self)(ctx).boxed()
    }
}

/// A terminal handler taking input `I` (arguments or callback data).
pub trait Handler<I>: Send + Sync + 'static {
    fn handle(&self, ctx: Arc<Context>, input: I) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut, I> Handler<I> for F
where
    F: Fn(Arc<Context>, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
    I: Send + 'static,
{
    fn handle(&self, ctx: Arc<Context>, input: I) -> BoxFuture<'static, HandlerResult> {
        (self)(ctx, input).boxed()
    }
}

/// Receives errors returned by terminal handlers.
///
/// Side effects only: the hook has no way to recover the error, and the chain
/// continues afterwards unless the context is aborted.
pub trait ErrorHook: Send + Sync + 'static {
    fn report(&self, ctx: Arc<Context>, input: HandlerInput, error: BoxError)
    -> BoxFuture<'static, ()>;
}

impl<F, Fut> ErrorHook for F
where
    F: Fn(Arc<Context>, HandlerInput, BoxError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn report(
        &self,
        ctx: Arc<Context>,
        input: HandlerInput,
        error: BoxError,
    ) -> BoxFuture<'static, ()> {
        (self)(ctx, input, error).boxed()
    }
}

/// A type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A type-erased terminal handler.
pub type BoxedHandler<I> = Arc<dyn Handler<I>>;

/// A type-erased error hook.
pub type BoxedErrorHook = Arc<dyn ErrorHook>;

// ============================================================================
// Chains
// ============================================================================

/// How a chain run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every handler ran.
    Completed,
    /// The handler at `index` aborted the context; later handlers were skipped.
    Aborted { index: usize },
}

impl ChainOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// The ordered middleware list.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    handlers: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.handlers.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs every middleware in order, stopping after the first one that aborts.
    pub async fn run(&self, ctx: &Arc<Context>) -> ChainOutcome {
        for (index, middleware) in self.handlers.iter().enumerate() {
            trace!(middleware_index = index, "Executing middleware");
            middleware.handle(Arc::clone(ctx)).await;

            if ctx.is_aborted() {
                debug!(middleware_index = index, "Middleware aborted the event");
                return ChainOutcome::Aborted { index };
            }
        }
        ChainOutcome::Completed
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}

/// An ordered list of terminal handlers sharing one input type.
pub struct HandlerChain<I> {
    handlers: Vec<BoxedHandler<I>>,
}

impl<I> Clone for HandlerChain<I> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<I> Default for HandlerChain<I> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<I> HandlerChain<I>
where
    I: Clone + Into<HandlerInput> + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler; handlers run in the order they are added.
    pub fn then<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<Context>, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.push(Arc::new(f));
        self
    }

    /// Appends a pre-built boxed handler.
    pub fn then_boxed(mut self, handler: BoxedHandler<I>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the chain against `ctx`.
    ///
    /// A handler error goes to `hook` (or the log when there is none) and does
    /// not stop the chain; only an aborted context does.
    pub async fn run(
        &self,
        ctx: &Arc<Context>,
        input: I,
        hook: Option<&BoxedErrorHook>,
    ) -> ChainOutcome {
        for (index, handler) in self.handlers.iter().enumerate() {
            trace!(handler_index = index, "Executing handler");

            if let Err(error) = handler.handle(Arc::clone(ctx), input.clone()).await {
                match hook {
                    Some(hook) => {
                        hook.report(Arc::clone(ctx), input.clone().into(), error)
                            .await;
                    }
                    None => {
                        warn!(handler_index = index, error = %error, "Handler returned an error");
                    }
                }
            }

            if ctx.is_aborted() {
                debug!(handler_index = index, "Handler aborted the chain");
                return ChainOutcome::Aborted { index };
            }
        }
        ChainOutcome::Completed
    }
}

impl<I> fmt::Debug for HandlerChain<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBot, message_event};
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn ctx() -> Arc<Context> {
        Arc::new(Context::new(message_event("/test"), MockBot::boxed()))
    }

    fn recorder(
        log: &Log,
        name: &'static str,
        fail: bool,
        abort: bool,
    ) -> impl Fn(Arc<Context>, CommandArgs) -> BoxFuture<'static, HandlerResult>
    + Send
    + Sync
    + 'static {
        let log = Arc::clone(log);
        move |ctx: Arc<Context>, _args: CommandArgs| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().push(name.to_string());
                if abort {
                    ctx.abort();
                }
                let result: HandlerResult = if fail {
                    Err(format!("{name} failed").into())
                } else {
                    Ok(())
                };
                result
            })
        }
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let log = Log::default();
        let chain = HandlerChain::new()
            .then(recorder(&log, "first", false, false))
            .then(recorder(&log, "second", false, false));

        let outcome = chain.run(&ctx(), CommandArgs::default(), None).await;

        assert_eq!(outcome, ChainOutcome::Completed);
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_error_does_not_stop_chain() {
        let log = Log::default();
        let reported = Log::default();
        let reported_clone = Arc::clone(&reported);
        let hook: BoxedErrorHook = Arc::new(
            move |_ctx: Arc<Context>, input: HandlerInput, error: BoxError| {
                let reported = Arc::clone(&reported_clone);
                async move {
                    reported.lock().push(format!("{error} {input:?}"));
                }
            },
        );

        let chain = HandlerChain::new()
            .then(recorder(&log, "first", true, false))
            .then(recorder(&log, "second", false, false));
        let args = CommandArgs::new(vec!["x".into()]);

        let outcome = chain.run(&ctx(), args.clone(), Some(&hook)).await;

        assert_eq!(outcome, ChainOutcome::Completed);
        assert_eq!(*log.lock(), vec!["first", "second"]);
        assert_eq!(
            *reported.lock(),
            vec![format!("first failed {:?}", HandlerInput::Args(args))]
        );
    }

    #[tokio::test]
    async fn test_abort_stops_chain_even_when_handler_fails() {
        let log = Log::default();
        let chain = HandlerChain::new()
            .then(recorder(&log, "first", true, true))
            .then(recorder(&log, "second", false, false));

        let outcome = chain.run(&ctx(), CommandArgs::default(), None).await;

        assert_eq!(outcome, ChainOutcome::Aborted { index: 0 });
        assert_eq!(*log.lock(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_middleware_chain_stops_on_abort() {
        let log = Log::default();
        let mut chain = MiddlewareChain::new();
        for (name, abort) in [("auth", false), ("gate", true), ("late", false)] {
            let log = Arc::clone(&log);
            chain.push(Arc::new(move |ctx: Arc<Context>| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().push(name.to_string());
                    if abort {
                        ctx.abort();
                    }
                }
            }));
        }

        let outcome = chain.run(&ctx()).await;

        assert_eq!(outcome, ChainOutcome::Aborted { index: 1 });
        assert_eq!(*log.lock(), vec!["auth", "gate"]);
    }

    #[test]
    fn test_command_args() {
        let args = CommandArgs::new(vec!["hello".into(), "world".into()]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.join(" "), "hello world");
        assert!(CommandArgs::default().is_empty());
    }
}
