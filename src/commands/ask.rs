use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

/// Append one of the clarifying questions to the description.
pub struct AskCommand;

#[async_trait]
impl Command for AskCommand {
    fn name(&self) -> &str {
        "/ask"
    }

    fn usage(&self) -> Option<&str> {
        Some("N")
    }

    fn description(&self) -> &str {
        "add clarifying question N to your description, then type your answer"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(session) = info.session else {
            eprintln!("  ✗ no active session");
            return CommandResult::Handled;
        };

        let number: usize = match args.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("  ✗ usage: /ask N");
                return CommandResult::Handled;
            }
        };

        if session.pick_question(number).await.is_none() {
            eprintln!("  ✗ no clarifying question {number}");
            return CommandResult::Handled;
        }

        let draft = session.snapshot().await.input;
        println!("  draft: {draft}");
        CommandResult::Amended(draft)
    }
}
