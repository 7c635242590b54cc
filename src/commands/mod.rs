//! Built-in REPL commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry handles dispatch, alias resolution,
//! argument splitting, and help generation.

mod ask;
mod emergency;
mod help;
mod logout;
mod model;
mod quit;
mod reset;
mod retry;
mod show;
mod tokens;
mod whoami;

use async_trait::async_trait;
use std::sync::Arc;

use crate::advisor::TokenUsage;
use crate::advisor::response::Strictness;
use crate::session::Session;

/// Session info available to commands during execution.
pub struct SessionInfo<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub auth_status: &'a str,
    pub usage: TokenUsage,
    pub db_path: &'a str,
    /// How replies that break the policy are treated.
    pub strictness: Strictness,
    /// The live session, for commands that read or change it.
    pub session: Option<&'a Session>,
}

/// A state change the REPL needs to apply after a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// Auth status changed (new status string).
    Auth(String),
    /// Active model changed (new model ID).
    Model(String),
}

/// What the REPL should do after a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Not a command. Treat the input as symptom text.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// The input was amended with a clarifying question; the next line of
    /// text is appended to it instead of replacing it.
    Amended(String),
    /// Submit the current input again.
    Resubmit,
    /// Command produced a state change the REPL must apply.
    StateChanged(StateChange),
    /// Exit the REPL.
    Quit,
}

/// A REPL command. Implement this trait to add new commands.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/whoami"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Argument placeholder for `/help`, e.g. `"N"`.
    fn usage(&self) -> Option<&str> {
        None
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    /// Run the command. `args` is everything after the command name, trimmed.
    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult;
}

/// Holds registered commands.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(ask::AskCommand),
            Arc::new(retry::RetryCommand),
            Arc::new(reset::ResetCommand),
            Arc::new(show::ShowCommand),
            Arc::new(emergency::EmergencyCommand),
            Arc::new(model::ModelCommand),
            Arc::new(tokens::TokensCommand),
            Arc::new(whoami::WhoamiCommand),
            Arc::new(logout::LogoutCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &SessionInfo<'_>) -> CommandResult {
        let input = input.trim();
        let (trigger, args) = match input.split_once(char::is_whitespace) {
            Some((trigger, rest)) => (trigger, rest.trim()),
            None => (input, ""),
        };

        for command in &self.commands {
            if trigger == command.name() || command.aliases().contains(&trigger) {
                // /help needs the registry to list all commands
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(args, info).await;
            }
        }

        if trigger.starts_with('/') {
            println!("unknown command: {trigger}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    /// Generate help text from all registered commands.
    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.usage(), c.aliases()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out
    }

    /// All registered command names.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(name: &str, usage: Option<&str>, aliases: &[&str]) -> String {
    let head = match usage {
        Some(usage) => format!("{name} {usage}"),
        None => name.to_string(),
    };
    if aliases.is_empty() {
        head
    } else {
        format!("{} ({})", head, aliases.join(", "))
    }
}
