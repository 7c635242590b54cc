use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct RetryCommand;

#[async_trait]
impl Command for RetryCommand {
    fn name(&self) -> &str {
        "/retry"
    }

    fn aliases(&self) -> &[&str] {
        &["/r"]
    }

    fn description(&self) -> &str {
        "send the current description again"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(session) = info.session else {
            eprintln!("  ✗ no active session");
            return CommandResult::Handled;
        };
        if session.snapshot().await.input.trim().is_empty() {
            println!("  nothing to send yet, tell me how you're feeling first");
            return CommandResult::Handled;
        }
        CommandResult::Resubmit
    }
}
