use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::render;

pub struct EmergencyCommand;

#[async_trait]
impl Command for EmergencyCommand {
    fn name(&self) -> &str {
        "/emergency"
    }

    fn aliases(&self) -> &[&str] {
        &["/sos", "/disclaimer"]
    }

    fn description(&self) -> &str {
        "show emergency contacts and the disclaimer"
    }

    async fn execute(&self, _args: &str, _info: &SessionInfo<'_>) -> CommandResult {
        println!("{}", render::emergency_strip());
        println!("{}", render::disclaimer());
        CommandResult::Handled
    }
}
