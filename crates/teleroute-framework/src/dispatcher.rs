//! Event dispatcher for the Teleroute framework.
//!
//! The [`Dispatcher`] takes one [`Event`] at a time through a fixed sequence
//! of states:
//!
//! ```text
//! Classifying ──▶ Middleware ──▶ Routing ──▶ Terminal ──▶ Done
//!      │               │            │
//!      └─ malformed /  └─ aborted   └─ callback miss
//!         unsupported
//! ```
//!
//! 1. **Classifying**: a message with a command token is command-routable, any
//!    other message is a plain message, a callback query is routable only if
//!    its payload is `name:data` with both halves non-empty. Anything else is
//!    dropped before any handler runs.
//! 2. **Middleware**: every middleware runs in registration order; an abort
//!    ends the dispatch.
//! 3. **Routing**: a known command selects its chain, an unknown command or a
//!    plain message selects the default chain (with no arguments), a known
//!    callback selects its chain, an unknown callback ends the dispatch.
//! 4. **Terminal**: exactly one chain runs; see
//!    [`HandlerChain::run`](crate::HandlerChain::run).
//!
//! Registration happens on a [`DispatcherBuilder`]; [`build`](DispatcherBuilder::build)
//! freezes the tables into an immutable, cheaply clonable `Dispatcher`.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::builder()
//!     .middleware(authenticate)
//!     .command(
//!         Command::new("debug")
//!             .description("Prints the message as JSON")
//!             .handler(require_admin)
//!             .handler(debug),
//!     )
//!     .command(Command::new("echo").arguments("<message>").description("Echoes the message").handler(echo))
//!     .build();
//!
//! dispatcher.dispatch(event, bot).await;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, debug, debug_span, warn};

use teleroute_core::{BotCommand, BoxedBot, Event, ParseMode};

use crate::context::Context;
use crate::error::{BoxError, HandlerResult};
use crate::handler::{
    BoxedErrorHook, BoxedHandler, BoxedMiddleware, CallbackData, CommandArgs, HandlerChain,
    HandlerInput, MiddlewareChain,
};
use crate::routing::{Callback, Command, RoutingTable};

/// Name of the synthesized help command.
pub const HELP_COMMAND: &str = "help";

const HELP_DESCRIPTION: &str = "Show available commands";

// ============================================================================
// Outcomes
// ============================================================================

/// Why an event reached no terminal chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unrouted {
    /// A callback query whose payload is missing or not `name:data`.
    MalformedCallback { payload: Option<String> },
    /// An event kind the dispatcher does not route.
    UnsupportedEvent { kind: String },
    /// A well-formed callback whose name has no registered chain.
    CallbackMiss { name: String },
}

impl fmt::Display for Unrouted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCallback { payload: Some(p) } => {
                write!(f, "malformed callback payload {p:?}")
            }
            Self::MalformedCallback { payload: None } => f.write_str("callback without payload"),
            Self::UnsupportedEvent { kind } => write!(f, "unsupported event kind '{kind}'"),
            Self::CallbackMiss { name } => write!(f, "no handler for callback '{name}'"),
        }
    }
}

/// The terminal chain that ran for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Command(String),
    Callback(String),
    Default,
}

/// What [`Dispatcher::dispatch`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No terminal chain ran.
    Unrouted(Unrouted),
    /// A middleware aborted the event before routing.
    Aborted,
    /// Exactly one terminal chain ran, possibly cut short by an abort.
    Handled { terminal: Terminal, aborted: bool },
}

/// Observer called for every [`Unrouted`] event.
pub type UnroutedObserver = Arc<dyn Fn(&Event, &Unrouted) + Send + Sync>;

// ============================================================================
// Classification
// ============================================================================

#[derive(Debug)]
enum Route {
    Command { name: String, args: CommandArgs },
    Plain,
    Callback { name: String, data: CallbackData },
}

fn classify(event: &Event) -> Result<Route, Unrouted> {
    match event {
        Event::Message(msg) | Event::EditedMessage(msg) => Ok(match msg.command() {
            Some(cmd) => Route::Command {
                name: cmd.name.to_string(),
                args: CommandArgs::new(cmd.args()),
            },
            None => Route::Plain,
        }),
        Event::CallbackQuery(query) => match query.payload() {
            Some(payload) => Ok(Route::Callback {
                name: payload.name.to_string(),
                data: CallbackData::new(payload.data),
            }),
            None => Err(Unrouted::MalformedCallback {
                payload: query.data.clone(),
            }),
        },
        Event::Unsupported { kind } => Err(Unrouted::UnsupportedEvent { kind: kind.clone() }),
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects routes and handlers before the event loop starts.
#[derive(Default)]
pub struct DispatcherBuilder {
    middleware: MiddlewareChain,
    routes: RoutingTable,
    default_chain: Option<HandlerChain<CommandArgs>>,
    error_hook: Option<BoxedErrorHook>,
    unrouted: Option<UnroutedObserver>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware; middleware runs in the order it is added.
    pub fn middleware<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.middleware.push(Arc::new(f));
        self
    }

    /// Appends a pre-built boxed middleware.
    pub fn middleware_boxed(mut self, middleware: BoxedMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Registers a command route.
    pub fn command(mut self, command: Command) -> Self {
        self.routes.insert_command(command);
        self
    }

    /// Registers a callback route.
    pub fn callback(mut self, callback: Callback) -> Self {
        self.routes.insert_callback(callback);
        self
    }

    /// Sets the fallback to a single handler.
    pub fn default_handler<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<Context>, CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.default_chain(HandlerChain::new().then(f))
    }

    /// Sets the fallback chain, run for plain messages and unknown commands.
    ///
    /// Without one, the fallback is the help handler.
    pub fn default_chain(mut self, chain: HandlerChain<CommandArgs>) -> Self {
        self.default_chain = Some(chain);
        self
    }

    /// Sets the hook that receives terminal handler errors.
    pub fn error_hook<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<Context>, HandlerInput, BoxError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.error_hook = Some(Arc::new(f));
        self
    }

    /// Sets the observer for dropped and ignored events.
    ///
    /// Dispatch semantics do not change; the observer only gets to see them.
    pub fn on_unrouted<F>(mut self, f: F) -> Self
    where
        F: Fn(&Event, &Unrouted) + Send + Sync + 'static,
    {
        self.unrouted = Some(Arc::new(f));
        self
    }

    /// Freezes the registrations into a [`Dispatcher`].
    ///
    /// Registers the help command unless a `help` route already exists.
    pub fn build(self) -> Dispatcher {
        let Self {
            middleware,
            mut routes,
            default_chain,
            error_hook,
            unrouted,
        } = self;

        // The help text lists the help entry itself: render it after a
        // placeholder is registered, then install the real chain.
        let synthesize_help = !routes.has_command(HELP_COMMAND);
        if synthesize_help {
            routes.insert_command(Command::new(HELP_COMMAND).description(HELP_DESCRIPTION));
        }
        let help_text: Arc<str> = routes.help_text().into();
        let help = help_handler(Arc::clone(&help_text));

        if synthesize_help {
            routes.insert_command(
                Command::new(HELP_COMMAND)
                    .description(HELP_DESCRIPTION)
                    .handler_boxed(Arc::clone(&help)),
            );
        }
        let default_chain = default_chain.unwrap_or_else(|| HandlerChain::new().then_boxed(help));

        let bot_commands = routes.bot_commands();
        debug!(
            commands = routes.command_count(),
            callbacks = routes.callback_count(),
            middleware = middleware.len(),
            "Dispatcher built"
        );

        Dispatcher {
            inner: Arc::new(DispatcherInner {
                middleware,
                routes,
                default_chain,
                error_hook,
                unrouted,
                help_text,
                bot_commands,
            }),
        }
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("middleware", &self.middleware.len())
            .field("commands", &self.routes.command_count())
            .field("callbacks", &self.routes.callback_count())
            .finish_non_exhaustive()
    }
}

/// Replies with the rendered help text and aborts the chain.
fn help_handler(text: Arc<str>) -> BoxedHandler<CommandArgs> {
    Arc::new(move |ctx: Arc<Context>, _args: CommandArgs| {
        let text = Arc::clone(&text);
        async move {
            ctx.abort();
            ctx.reply(&*text, ParseMode::Basic).await?;
            Ok::<(), BoxError>(())
        }
    })
}

// ============================================================================
// Dispatcher
// ============================================================================

struct DispatcherInner {
    middleware: MiddlewareChain,
    routes: RoutingTable,
    default_chain: HandlerChain<CommandArgs>,
    error_hook: Option<BoxedErrorHook>,
    unrouted: Option<UnroutedObserver>,
    help_text: Arc<str>,
    bot_commands: Vec<BotCommand>,
}

/// The central event dispatcher.
///
/// Immutable once built. Cloning shares the same tables.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Starts a new [`DispatcherBuilder`].
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Returns the generated help text.
    pub fn help_text(&self) -> &str {
        &self.inner.help_text
    }

    /// Returns the command list to publish to the platform.
    pub fn bot_commands(&self) -> &[BotCommand] {
        &self.inner.bot_commands
    }

    pub fn command_count(&self) -> usize {
        self.inner.routes.command_count()
    }

    pub fn callback_count(&self) -> usize {
        self.inner.routes.callback_count()
    }

    pub fn middleware_count(&self) -> usize {
        self.inner.middleware.len()
    }

    /// Dispatches one event to completion.
    ///
    /// Never fails: malformed input and routing misses are logged (and shown to
    /// the unrouted observer), handler errors go to the error hook.
    pub async fn dispatch(&self, event: Event, bot: BoxedBot) -> DispatchOutcome {
        let span = debug_span!("dispatch", kind = %event.kind_name(), id = %event.id());
        self.dispatch_inner(event, bot).instrument(span).await
    }

    async fn dispatch_inner(&self, event: Event, bot: BoxedBot) -> DispatchOutcome {
        let route = match classify(&event) {
            Ok(route) => route,
            Err(unrouted) => {
                warn!(reason = %unrouted, "Dropping event");
                return self.unrouted(&event, unrouted);
            }
        };
        debug!(?route, "Event classified");

        let ctx = Arc::new(Context::new(event, bot));

        if self.inner.middleware.run(&ctx).await.is_aborted() {
            return DispatchOutcome::Aborted;
        }

        let hook = self.inner.error_hook.as_ref();
        match route {
            Route::Command { name, args } => match self.inner.routes.command(&name) {
                Some(chain) => {
                    let aborted = chain.run(&ctx, args, hook).await.is_aborted();
                    DispatchOutcome::Handled {
                        terminal: Terminal::Command(name),
                        aborted,
                    }
                }
                None => {
                    debug!(command = %name, "Unknown command, using default chain");
                    self.run_default(&ctx).await
                }
            },
            Route::Plain => self.run_default(&ctx).await,
            Route::Callback { name, data } => match self.inner.routes.callback(&name) {
                Some(chain) => {
                    let aborted = chain.run(&ctx, data, hook).await.is_aborted();
                    DispatchOutcome::Handled {
                        terminal: Terminal::Callback(name),
                        aborted,
                    }
                }
                None => {
                    debug!(callback = %name, "Unknown callback, ignoring");
                    self.unrouted(ctx.event(), Unrouted::CallbackMiss { name })
                }
            },
        }
    }

    async fn run_default(&self, ctx: &Arc<Context>) -> DispatchOutcome {
        let aborted = self
            .inner
            .default_chain
            .run(ctx, CommandArgs::default(), self.inner.error_hook.as_ref())
            .await
            .is_aborted();
        DispatchOutcome::Handled {
            terminal: Terminal::Default,
            aborted,
        }
    }

    fn unrouted(&self, event: &Event, unrouted: Unrouted) -> DispatchOutcome {
        if let Some(observer) = &self.inner.unrouted {
            observer(event, &unrouted);
        }
        DispatchOutcome::Unrouted(unrouted)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("middleware", &self.inner.middleware.len())
            .field("commands", &self.inner.routes.command_count())
            .field("callbacks", &self.inner.routes.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBot, callback_event, message_event};
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    /// A command handler that records its name and arguments.
    fn record(
        log: &Log,
        name: &'static str,
    ) -> impl Fn(Arc<Context>, CommandArgs) -> crate::BoxFuture<'static, HandlerResult>
    + Send
    + Sync
    + 'static {
        let log = Arc::clone(log);
        move |_ctx, args| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().push(format!("{name}{:?}", &*args));
                Ok(())
            })
        }
    }

    fn record_callback(
        log: &Log,
        name: &'static str,
    ) -> impl Fn(Arc<Context>, CallbackData) -> crate::BoxFuture<'static, HandlerResult>
    + Send
    + Sync
    + 'static {
        let log = Arc::clone(log);
        move |_ctx, data| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().push(format!("{name}({data})"));
                Ok(())
            })
        }
    }

    async fn echo(ctx: Arc<Context>, args: CommandArgs) -> HandlerResult {
        let text = if args.is_empty() {
            "You didn't provide any arguments".to_string()
        } else {
            args.join(" ")
        };
        ctx.reply(text, ParseMode::None).await?;
        Ok(())
    }

    async fn require_admin(ctx: Arc<Context>, _args: CommandArgs) -> HandlerResult {
        if !ctx.flag("isAdmin") {
            ctx.reply("You are not an admin", ParseMode::None).await?;
            ctx.abort();
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_registered_command_runs_its_chain_in_order() {
        let log = Log::default();
        let dispatcher = Dispatcher::builder()
            .command(
                Command::new("deploy")
                    .handler(record(&log, "check"))
                    .handler(record(&log, "run")),
            )
            .default_handler(record(&log, "default"))
            .build();

        let outcome = dispatcher
            .dispatch(message_event("/deploy prod  now"), MockBot::boxed())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                terminal: Terminal::Command("deploy".into()),
                aborted: false
            }
        );
        assert_eq!(
            *log.lock(),
            vec![r#"check["prod", "now"]"#, r#"run["prod", "now"]"#]
        );
    }

    #[tokio::test]
    async fn test_unknown_command_falls_back_with_empty_args() {
        let log = Log::default();
        let dispatcher = Dispatcher::builder()
            .command(Command::new("deploy").handler(record(&log, "deploy")))
            .default_handler(record(&log, "default"))
            .build();

        let outcome = dispatcher
            .dispatch(message_event("/unknown a b"), MockBot::boxed())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                terminal: Terminal::Default,
                aborted: false
            }
        );
        assert_eq!(*log.lock(), vec!["default[]"]);
    }

    #[tokio::test]
    async fn test_plain_and_edited_messages_use_default_chain() {
        let log = Log::default();
        let dispatcher = Dispatcher::builder()
            .default_handler(record(&log, "default"))
            .build();

        let edited = match message_event("/default-looking but edited") {
            Event::Message(msg) => Event::EditedMessage(msg),
            other => other,
        };
        dispatcher
            .dispatch(message_event("hello"), MockBot::boxed())
            .await;
        let outcome = dispatcher.dispatch(edited, MockBot::boxed()).await;

        // An edited command message is still command-routable; it just misses.
        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                terminal: Terminal::Default,
                aborted: false
            }
        );
        assert_eq!(*log.lock(), vec!["default[]", "default[]"]);
    }

    #[tokio::test]
    async fn test_callback_receives_everything_after_first_colon() {
        let log = Log::default();
        let dispatcher = Dispatcher::builder()
            .callback(Callback::new("vote").handler(record_callback(&log, "vote")))
            .default_handler(record(&log, "default"))
            .build();

        let outcome = dispatcher
            .dispatch(callback_event(Some("vote:poll:42")), MockBot::boxed())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                terminal: Terminal::Callback("vote".into()),
                aborted: false
            }
        );
        assert_eq!(*log.lock(), vec!["vote(poll:42)"]);
    }

    #[tokio::test]
    async fn test_malformed_callbacks_invoke_nothing() {
        let log = Log::default();
        let middleware_log = Arc::clone(&log);
        let observed = Log::default();
        let observed_clone = Arc::clone(&observed);
        let dispatcher = Dispatcher::builder()
            .middleware(move |_ctx| {
                let log = Arc::clone(&middleware_log);
                async move { log.lock().push("middleware".into()) }
            })
            .callback(Callback::new("vote").handler(record_callback(&log, "vote")))
            .default_handler(record(&log, "default"))
            .on_unrouted(move |_event, reason| observed_clone.lock().push(reason.to_string()))
            .build();

        for payload in [None, Some("vote"), Some(":data"), Some("vote:")] {
            let outcome = dispatcher
                .dispatch(callback_event(payload), MockBot::boxed())
                .await;
            assert!(matches!(
                outcome,
                DispatchOutcome::Unrouted(Unrouted::MalformedCallback { .. })
            ));
        }

        assert!(log.lock().is_empty());
        assert_eq!(observed.lock().len(), 4);
    }

    #[tokio::test]
    async fn test_callback_miss_is_silent_noop() {
        let log = Log::default();
        let observed = Log::default();
        let observed_clone = Arc::clone(&observed);
        let bot = Arc::new(MockBot::default());
        let dispatcher = Dispatcher::builder()
            .default_handler(record(&log, "default"))
            .on_unrouted(move |_event, reason| observed_clone.lock().push(reason.to_string()))
            .build();

        let outcome = dispatcher
            .dispatch(callback_event(Some("stale:1")), bot.clone())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Unrouted(Unrouted::CallbackMiss {
                name: "stale".into()
            })
        );
        assert!(log.lock().is_empty());
        assert!(bot.sent().is_empty());
        assert_eq!(*observed.lock(), vec!["no handler for callback 'stale'"]);
    }

    #[tokio::test]
    async fn test_unsupported_event_is_dropped() {
        let log = Log::default();
        let dispatcher = Dispatcher::builder()
            .default_handler(record(&log, "default"))
            .build();

        let outcome = dispatcher
            .dispatch(
                Event::Unsupported {
                    kind: "channel_post".into(),
                },
                MockBot::boxed(),
            )
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Unrouted(Unrouted::UnsupportedEvent {
                kind: "channel_post".into()
            })
        );
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_middleware_abort_skips_everything_after() {
        let log = Log::default();
        let first = Arc::clone(&log);
        let second = Arc::clone(&log);
        let dispatcher = Dispatcher::builder()
            .middleware(move |ctx: Arc<Context>| {
                let log = Arc::clone(&first);
                async move {
                    log.lock().push("gate".into());
                    ctx.abort();
                }
            })
            .middleware(move |_ctx| {
                let log = Arc::clone(&second);
                async move { log.lock().push("late".into()) }
            })
            .command(Command::new("deploy").handler(record(&log, "deploy")))
            .default_handler(record(&log, "default"))
            .build();

        let outcome = dispatcher
            .dispatch(message_event("/deploy"), MockBot::boxed())
            .await;

        assert_eq!(outcome, DispatchOutcome::Aborted);
        assert_eq!(*log.lock(), vec!["gate"]);
    }

    #[tokio::test]
    async fn test_handler_error_reaches_hook_and_chain_continues() {
        let log = Log::default();
        let hooked = Log::default();
        let hooked_clone = Arc::clone(&hooked);

        async fn failing(_ctx: Arc<Context>, _args: CommandArgs) -> HandlerResult {
            Err("boom".into())
        }

        let dispatcher = Dispatcher::builder()
            .command(
                Command::new("go")
                    .handler(failing)
                    .handler(record(&log, "after")),
            )
            .error_hook(move |_ctx, input, error| {
                let hooked = Arc::clone(&hooked_clone);
                async move { hooked.lock().push(format!("{error}: {input:?}")) }
            })
            .build();

        dispatcher
            .dispatch(message_event("/go fast"), MockBot::boxed())
            .await;

        assert_eq!(*log.lock(), vec![r#"after["fast"]"#]);
        assert_eq!(
            *hooked.lock(),
            vec![format!(
                "boom: {:?}",
                HandlerInput::Args(CommandArgs::new(vec!["fast".into()]))
            )]
        );
    }

    #[tokio::test]
    async fn test_admin_gate_scenario() {
        let ran_debug = Log::default();
        let ran_debug_clone = Arc::clone(&ran_debug);
        let bot = Arc::new(MockBot::default());

        let dispatcher = Dispatcher::builder()
            .middleware(|ctx: Arc<Context>| async move { ctx.set("isAdmin", false) })
            .command(
                Command::new("debug")
                    .description("Prints the message as JSON")
                    .handler(require_admin)
                    .handler(move |_ctx, _args| {
                        let ran = Arc::clone(&ran_debug_clone);
                        async move {
                            ran.lock().push("debug".into());
                            Ok::<(), BoxError>(())
                        }
                    }),
            )
            .build();

        let outcome = dispatcher
            .dispatch(message_event("/debug"), bot.clone())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                terminal: Terminal::Command("debug".into()),
                aborted: true
            }
        );
        assert_eq!(bot.texts(), vec!["You are not an admin"]);
        assert!(ran_debug.lock().is_empty());
    }

    #[tokio::test]
    async fn test_echo_scenarios() {
        let bot = Arc::new(MockBot::default());
        let dispatcher = Dispatcher::builder()
            .command(
                Command::new("echo")
                    .arguments("<message>")
                    .description("Echoes the message")
                    .handler(echo),
            )
            .build();

        dispatcher
            .dispatch(message_event("/echo hello world"), bot.clone())
            .await;
        dispatcher
            .dispatch(message_event("/echo"), bot.clone())
            .await;

        assert_eq!(
            bot.texts(),
            vec!["hello world", "You didn't provide any arguments"]
        );
    }

    #[tokio::test]
    async fn test_help_is_synthesized_last_and_is_default() {
        let bot = Arc::new(MockBot::default());
        let dispatcher = Dispatcher::builder()
            .command(Command::new("a").description("first").handler(echo))
            .command(
                Command::new("echo")
                    .arguments("<message>")
                    .description("Echoes the message")
                    .handler(echo),
            )
            .build();

        let expected = "`/a` - first\n`/echo <message>` - Echoes the message\n`/help` - Show available commands\n";
        assert_eq!(dispatcher.help_text(), expected);
        assert_eq!(
            dispatcher.bot_commands().last(),
            Some(&BotCommand::new("help", "Show available commands"))
        );

        let outcome = dispatcher.dispatch(message_event("/help"), bot.clone()).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                terminal: Terminal::Command("help".into()),
                aborted: true
            }
        );
        dispatcher
            .dispatch(message_event("not a command"), bot.clone())
            .await;

        let sent = bot.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|s| s.text == expected && s.mode == ParseMode::Basic));
    }

    #[tokio::test]
    async fn test_consumer_help_is_kept() {
        let log = Log::default();
        let dispatcher = Dispatcher::builder()
            .command(
                Command::new("help")
                    .description("Custom help")
                    .handler(record(&log, "help")),
            )
            .build();

        dispatcher
            .dispatch(message_event("/help"), MockBot::boxed())
            .await;

        assert_eq!(dispatcher.help_text(), "`/help` - Custom help\n");
        assert_eq!(*log.lock(), vec!["help[]"]);
    }

    #[tokio::test]
    async fn test_consumer_help_keeps_registration_order() {
        let log = Log::default();
        let dispatcher = Dispatcher::builder()
            .command(Command::new("a").description("first").handler(echo))
            .command(
                Command::new("help")
                    .description("mine")
                    .handler(record(&log, "help")),
            )
            .build();

        assert_eq!(dispatcher.help_text(), "`/a` - first\n`/help` - mine\n");
        assert_eq!(
            dispatcher.bot_commands().to_vec(),
            vec![BotCommand::new("a", "first"), BotCommand::new("help", "mine")]
        );
        assert_eq!(dispatcher.command_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_handler_that_aborts_is_reported_once() {
        let log = Log::default();
        let first = Arc::clone(&log);
        let hooked = Arc::clone(&log);

        let dispatcher = Dispatcher::builder()
            .command(
                Command::new("go")
                    .handler(move |ctx: Arc<Context>, _args| {
                        let log = Arc::clone(&first);
                        async move {
                            log.lock().push("h1".into());
                            ctx.abort();
                            Err::<(), BoxError>("bad".into())
                        }
                    })
                    .handler(record(&log, "h2")),
            )
            .error_hook(move |_ctx, _input, error| {
                let log = Arc::clone(&hooked);
                async move { log.lock().push(format!("hook:{error}")) }
            })
            .build();

        let outcome = dispatcher
            .dispatch(message_event("/go"), MockBot::boxed())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                terminal: Terminal::Command("go".into()),
                aborted: true
            }
        );
        assert_eq!(*log.lock(), vec!["h1", "hook:bad"]);
    }
}
