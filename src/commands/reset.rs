use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct ResetCommand;

#[async_trait]
impl Command for ResetCommand {
    fn name(&self) -> &str {
        "/reset"
    }

    fn aliases(&self) -> &[&str] {
        &["/start-over", "/new"]
    }

    fn description(&self) -> &str {
        "start over (clear description, result, and error)"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(session) = info.session else {
            eprintln!("  ✗ no active session");
            return CommandResult::Handled;
        };
        session.reset().await;
        println!("  ✓ fresh start");
        CommandResult::Handled
    }
}
