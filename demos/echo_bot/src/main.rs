//! Echo Bot
//!
//! A Telegram bot showing the pieces of a Teleroute application:
//!
//! - an authentication middleware run for every event, storing `isAdmin` in the
//!   context data bag
//! - `/debug`: a two-handler chain, `require_admin` then `debug_message`; the first
//!   aborts the chain for non-admins
//! - `/echo <message>`: replies with the arguments
//! - `/help`: generated from the command descriptions, also the reply to any
//!   plain message or unknown command
//!
//! # Usage
//!
//! ```bash
//! TELEROUTE_TELEGRAM__TOKEN=123456:ABC cargo run --package echo-bot -- --admin alice
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use teleroute::prelude::*;
use teleroute::runtime::logging;
use teleroute_adapter_telegram::{TelegramBot, TelegramConfig};
use tracing::{debug, error};

#[derive(Debug, Parser)]
#[command(version, about = "Teleroute echo bot")]
struct Cli {
    /// Configuration file (default: search for teleroute.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Username allowed to run admin commands; may be repeated.
    #[arg(long = "admin", value_name = "USERNAME")]
    admins: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Stops the chain for anyone the authentication middleware did not mark.
async fn require_admin(ctx: Arc<Context>, _args: CommandArgs) -> HandlerResult {
    if !ctx.flag("isAdmin") {
        ctx.abort();
        ctx.reply("You are not an admin", ParseMode::None).await?;
    }
    Ok(())
}

/// Replies with the triggering message as JSON.
async fn debug_message(ctx: Arc<Context>, _args: CommandArgs) -> HandlerResult {
    let dump = match serde_json::to_string_pretty(ctx.message()?) {
        Ok(dump) => dump,
        Err(e) => {
            ctx.abort();
            ctx.reply(format!("error marshaling message: {e}"), ParseMode::None)
                .await?;
            return Ok(());
        }
    };
    ctx.reply(format!("```json\n{dump}\n```"), ParseMode::Extended)
        .await?;
    Ok(())
}

async fn echo(ctx: Arc<Context>, _args: CommandArgs) -> HandlerResult {
    let arguments = ctx.message()?.command_arguments();
    let text = if arguments.is_empty() {
        "You didn't provide any arguments"
    } else {
        arguments
    };
    ctx.reply(text, ParseMode::None).await?;
    Ok(())
}

fn build_dispatcher(admins: HashSet<String>) -> Dispatcher {
    let admins = Arc::new(admins);

    Dispatcher::builder()
        .middleware(move |ctx: Arc<Context>| {
            let admins = Arc::clone(&admins);
            async move {
                let is_admin = ctx
                    .sender()
                    .and_then(|user| user.username.as_deref())
                    .is_some_and(|name| admins.contains(name));
                ctx.set("isAdmin", is_admin);
            }
        })
        .command(
            Command::new("debug")
                .description("Prints the message as JSON")
                .handler(require_admin)
                .handler(debug_message),
        )
        .command(
            Command::new("echo")
                .arguments("<message>")
                .description("Echoes the message")
                .handler(echo),
        )
        .error_hook(|ctx: Arc<Context>, input: HandlerInput, err: BoxError| async move {
            error!(event = %ctx.event().kind_name(), ?input, error = %err, "Handler failed");
        })
        .on_unrouted(|event, reason| {
            debug!(event = %event.kind_name(), %reason, "Ignored event");
        })
        .build()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    let config = loader.load()?;
    logging::init_from_config(&config.logging);

    let telegram: TelegramConfig = config.section("telegram")?.unwrap_or_default();
    let bot = Arc::new(TelegramBot::new(telegram)?);
    let feed = bot.feed();

    let dispatcher = build_dispatcher(cli.admins.into_iter().collect());
    BotRuntime::new(dispatcher, bot).run_until_signal(feed).await?;

    Ok(())
}
