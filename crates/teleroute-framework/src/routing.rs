//! Routing tables: command name → chain, callback name → chain.
//!
//! Routes are declared with [`Command`] and [`Callback`] and handed to the
//! [`DispatcherBuilder`](crate::DispatcherBuilder). Lookups are exact string
//! matches; registering a name twice replaces the earlier chain.
//!
//! Commands that carry a description also feed the generated help text and the
//! command list published to the platform, both in registration order:
//!
//! ```rust,ignore
//! Command::new("echo")
//!     .arguments("<message>")
//!     .description("Echoes the message")
//!     .handler(echo);
//! // help line: `/echo <message>` - Echoes the message
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use teleroute_core::BotCommand;

use crate::context::Context;
use crate::error::HandlerResult;
use crate::handler::{BoxedHandler, CallbackData, CommandArgs, HandlerChain};

// ============================================================================
// Route declarations
// ============================================================================

/// A command route: `/name args...`.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    arguments: String,
    description: Option<String>,
    chain: HandlerChain<CommandArgs>,
}

impl Command {
    /// Creates a command route; `name` is given without the leading `/`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: String::new(),
            description: None,
            chain: HandlerChain::new(),
        }
    }

    /// Sets the argument hint shown in the help text (e.g. `<message>`).
    pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    /// Sets the description; described commands are listed in the help text
    /// and published to the platform.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a handler to this command's chain.
    pub fn handler<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<Context>, CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.chain = self.chain.then(f);
        self
    }

    /// Appends a pre-built boxed handler.
    pub fn handler_boxed(mut self, handler: BoxedHandler<CommandArgs>) -> Self {
        self.chain = self.chain.then_boxed(handler);
        self
    }

    /// Replaces the whole chain.
    pub fn chain(mut self, chain: HandlerChain<CommandArgs>) -> Self {
        self.chain = chain;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A callback route: payloads of the form `name:data`.
#[derive(Debug, Clone)]
pub struct Callback {
    name: String,
    chain: HandlerChain<CallbackData>,
}

impl Callback {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: HandlerChain::new(),
        }
    }

    /// Appends a handler to this callback's chain.
    pub fn handler<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<Context>, CallbackData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.chain = self.chain.then(f);
        self
    }

    /// Appends a pre-built boxed handler.
    pub fn handler_boxed(mut self, handler: BoxedHandler<CallbackData>) -> Self {
        self.chain = self.chain.then_boxed(handler);
        self
    }

    /// Replaces the whole chain.
    pub fn chain(mut self, chain: HandlerChain<CallbackData>) -> Self {
        self.chain = chain;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Routing table
// ============================================================================

/// A described command, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HelpEntry {
    command: String,
    arguments: String,
    description: String,
}

impl HelpEntry {
    fn line(&self) -> String {
        let usage = format!("/{} {}", self.command, self.arguments);
        format!("`{}` - {}\n", usage.trim_end(), self.description)
    }
}

/// The command and callback tables.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    commands: HashMap<String, HandlerChain<CommandArgs>>,
    callbacks: HashMap<String, HandlerChain<CallbackData>>,
    help: Vec<HelpEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command; a previous route with the same name is replaced.
    ///
    /// A replaced command keeps the help position of its first registration.
    pub fn insert_command(&mut self, command: Command) {
        let Command {
            name,
            arguments,
            description,
            chain,
        } = command;

        let existing = self.help.iter().position(|entry| entry.command == name);
        match (description, existing) {
            (Some(description), Some(index)) => {
                self.help[index] = HelpEntry {
                    command: name.clone(),
                    arguments,
                    description,
                };
            }
            (Some(description), None) => self.help.push(HelpEntry {
                command: name.clone(),
                arguments,
                description,
            }),
            (None, Some(index)) => {
                self.help.remove(index);
            }
            (None, None) => {}
        }

        if self.commands.insert(name.clone(), chain).is_some() {
            debug!(command = %name, "Replaced existing command route");
        }
    }

    /// Registers a callback; a previous route with the same name is replaced.
    pub fn insert_callback(&mut self, callback: Callback) {
        let Callback { name, chain } = callback;
        if self.callbacks.insert(name.clone(), chain).is_some() {
            debug!(callback = %name, "Replaced existing callback route");
        }
    }

    pub fn command(&self, name: &str) -> Option<&HandlerChain<CommandArgs>> {
        self.commands.get(name)
    }

    pub fn callback(&self, name: &str) -> Option<&HandlerChain<CallbackData>> {
        self.callbacks.get(name)
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Renders one `` `/name args` - description `` line per described command.
    pub fn help_text(&self) -> String {
        self.help.iter().map(HelpEntry::line).collect()
    }

    /// Returns the `(command, description)` list for the platform.
    pub fn bot_commands(&self) -> Vec<BotCommand> {
        self.help
            .iter()
            .map(|entry| BotCommand::new(&entry.command, &entry.description))
            .collect()
    }
}
