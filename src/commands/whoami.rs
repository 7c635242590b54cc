use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::advisor::response::Strictness;

pub struct WhoamiCommand;

fn strictness_label(strictness: Strictness) -> &'static str {
    match strictness {
        Strictness::Lenient => "lenient (policy slips are logged)",
        Strictness::Strict => "strict (policy slips are rejected)",
    }
}

/// The lines `/whoami` prints.
fn describe(info: &SessionInfo<'_>) -> Vec<String> {
    let mut lines = vec![
        format!("provider  {} ({})", info.provider, info.model),
        format!("auth      {}", info.auth_status),
        format!("replies   {}", strictness_label(info.strictness)),
    ];
    if let Some(session) = info.session {
        let config = session.config();
        lines.push(format!("timeout   {}s", config.timeout.as_secs()));
        lines.push(format!("retries   {}", config.retry.max_retries));
    }
    lines
}

#[async_trait]
impl Command for WhoamiCommand {
    fn name(&self) -> &str {
        "/whoami"
    }

    fn description(&self) -> &str {
        "show model, key status, and how replies are checked"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        for line in describe(info) {
            println!("  {line}");
        }
        CommandResult::Handled
    }
}
