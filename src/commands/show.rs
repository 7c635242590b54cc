use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::render;

pub struct ShowCommand;

#[async_trait]
impl Command for ShowCommand {
    fn name(&self) -> &str {
        "/show"
    }

    fn description(&self) -> &str {
        "show the current description and the last result or error"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(session) = info.session else {
            eprintln!("  ✗ no active session");
            return CommandResult::Handled;
        };
        let state = session.snapshot().await;

        if state.input.trim().is_empty() {
            println!("  description: (empty)");
        } else {
            println!("  description: {}", state.input.trim_end());
        }

        if let Some(failure) = &state.error {
            print!("{}", render::render_failure(failure));
        } else if let Some(result) = &state.result {
            print!("{}", render::render_result(result));
        } else if state.busy {
            println!("  still checking...");
        } else {
            println!("  no result yet");
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::mock::MockAdvisor;
    use crate::commands::tests::test_info;
    use crate::session::{Session, SessionConfig};
    use std::sync::Arc;

    #[tokio::test]
    async fn handles_empty_session() {
        let session = Session::new(Arc::new(MockAdvisor::new(vec![])), SessionConfig::default());
        let info = SessionInfo {
            session: Some(&session),
            ..test_info()
        };
        assert_eq!(ShowCommand.execute("", &info).await, CommandResult::Handled);
    }
}
