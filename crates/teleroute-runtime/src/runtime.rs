//! The event loop.
//!
//! A [`BotRuntime`] pairs a built [`Dispatcher`] with the [`Bot`] that replies
//! go through. [`BotRuntime::run`] publishes the command list once, then pulls
//! events from a feed and dispatches each one to completion before pulling
//! the next:
//!
//! ```text
//! set_commands ──▶ ┌─▶ next_event ──▶ dispatch ─┐
//!                  └────────────────────────────┘
//! ```
//!
//! Cancellation is only observed while waiting for the next event; a chain
//! that is already running always finishes.
//!
//! ```rust,ignore
//! let runtime = BotRuntime::new(dispatcher, bot.clone());
//! runtime.run_until_signal(TelegramFeed::new(bot, &config)).await?;
//! ```

use std::future::Future;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use teleroute_core::{BoxedBot, EventFeed};
use teleroute_framework::Dispatcher;

use crate::error::{RuntimeError, RuntimeResult};

/// Drives one bot: command registration, then the dispatch loop.
#[derive(Clone)]
pub struct BotRuntime {
    dispatcher: Dispatcher,
    bot: BoxedBot,
}

impl BotRuntime {
    pub fn new(dispatcher: Dispatcher, bot: BoxedBot) -> Self {
        Self { dispatcher, bot }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// Publishes the dispatcher's command list to the platform.
    pub async fn register_commands(&self) -> RuntimeResult<()> {
        let commands = self.dispatcher.bot_commands();
        debug!(count = commands.len(), "Registering bot commands");
        self.bot.set_commands(commands).await.map_err(|e| {
            error!(bot = %self.bot.id(), error = %e, "Command registration failed");
            RuntimeError::CommandRegistration(e)
        })
    }

    /// Registers commands, then dispatches events until the feed ends,
    /// fails, or `cancel` fires.
    ///
    /// - feed exhausted: `Ok(())`
    /// - feed error: [`RuntimeError::Feed`]
    /// - cancelled: [`RuntimeError::Cancelled`]
    /// - registration failure: [`RuntimeError::CommandRegistration`], no event is pulled
    pub async fn run<F>(&self, mut feed: F, cancel: CancellationToken) -> RuntimeResult<()>
    where
        F: EventFeed,
    {
        self.register_commands().await?;
        info!(
            bot = %self.bot.id(),
            commands = self.dispatcher.command_count(),
            callbacks = self.dispatcher.callback_count(),
            "Bot is running"
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Event loop cancelled");
                    return Err(RuntimeError::Cancelled);
                }
                next = feed.next_event() => next,
            };

            match next {
                Ok(Some(event)) => {
                    let outcome = self.dispatcher.dispatch(event, self.bot.clone()).await;
                    debug!(?outcome, "Event dispatched");
                }
                Ok(None) => {
                    info!("Event feed closed, stopping");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "Event feed failed");
                    return Err(RuntimeError::Feed(e));
                }
            }
        }
    }

    /// Runs until `shutdown` completes.
    ///
    /// Shutdown counts as a clean stop: it returns `Ok(())` instead of
    /// [`RuntimeError::Cancelled`].
    pub async fn run_until<F, S>(&self, feed: F, shutdown: S) -> RuntimeResult<()>
    where
        F: EventFeed,
        S: Future<Output = ()>,
    {
        let cancel = CancellationToken::new();
        let run = self.run(feed, cancel.clone());
        tokio::pin!(run, shutdown);

        let mut shutdown_requested = false;
        let result = loop {
            tokio::select! {
                result = &mut run => break result,
                _ = &mut shutdown, if !shutdown_requested => {
                    shutdown_requested = true;
                    cancel.cancel();
                }
            }
        };

        match result {
            Err(RuntimeError::Cancelled) => Ok(()),
            other => other,
        }
    }

    /// Runs until Ctrl+C (or SIGTERM on Unix).
    pub async fn run_until_signal<F>(&self, feed: F) -> RuntimeResult<()>
    where
        F: EventFeed,
    {
        info!("Press Ctrl+C to stop");
        self.run_until(feed, wait_for_shutdown()).await
    }
}

impl std::fmt::Debug for BotRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRuntime")
            .field("bot", &self.bot.id())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

/// Completes on Ctrl+C or SIGTERM.
///
/// If a signal handler cannot be installed, only the remaining one is awaited.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
