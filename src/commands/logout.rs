use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::auth;

pub struct LogoutCommand;

#[async_trait]
impl Command for LogoutCommand {
    fn name(&self) -> &str {
        "/logout"
    }

    fn description(&self) -> &str {
        "forget the stored API key"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        if let Err(e) = auth::logout(info.db_path, info.provider) {
            eprintln!("  ✗ {e:#}");
            return CommandResult::Handled;
        }
        println!("  ✓ stored key removed for {}", info.provider);
        CommandResult::StateChanged(StateChange::Auth("not authenticated".to_string()))
    }
}
