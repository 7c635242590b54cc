use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::advisor::ModelInfo;

pub struct ModelCommand;

/// Resolve a selection: a 1-based index, a model id, or empty for "keep current".
fn choose<'a>(models: &'a [ModelInfo], input: &str) -> Option<&'a ModelInfo> {
    if let Ok(n) = input.parse::<usize>() {
        return models.get(n.checked_sub(1)?);
    }
    models.iter().find(|m| m.id == input)
}

#[async_trait]
impl Command for ModelCommand {
    fn name(&self) -> &str {
        "/model"
    }

    fn usage(&self) -> Option<&str> {
        Some("[ID]")
    }

    fn description(&self) -> &str {
        "list and switch the active model"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let Some(session) = info.session else {
            eprintln!("  ✗ model selection not available");
            return CommandResult::Handled;
        };

        let models = match session.advisor().await.models().await {
            Ok(m) => m,
            Err(e) => {
                eprintln!("  ✗ failed to fetch models: {e}");
                return CommandResult::Handled;
            }
        };

        if models.is_empty() {
            println!("  no models available for {}", info.provider);
            return CommandResult::Handled;
        }

        let input = if args.is_empty() {
            let current = info.model;
            println!("  Available models for {}:\n", info.provider);
            for (i, model) in models.iter().enumerate() {
                let marker = if model.id == current { " ← current" } else { "" };
                println!("  {}. {}{}", i + 1, model.display_name, marker);
            }
            print!("\n  Select model (enter to keep): ");
            if std::io::Write::flush(&mut std::io::stdout()).is_err() {
                return CommandResult::Handled;
            }
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                eprintln!("  ✗ failed to read input");
                return CommandResult::Handled;
            }
            line.trim().to_string()
        } else {
            args.to_string()
        };

        if input.is_empty() {
            return CommandResult::Handled;
        }

        let Some(selected) = choose(&models, &input) else {
            eprintln!("  ✗ invalid selection: {input}");
            return CommandResult::Handled;
        };

        if selected.id == info.model {
            println!("  already using {}", selected.display_name);
            return CommandResult::Handled;
        }

        println!("  ✓ model changed to {}", selected.display_name);
        CommandResult::StateChanged(StateChange::Model(selected.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::mock::MockAdvisor;
    use crate::commands::tests::test_info;
    use crate::session::{Session, SessionConfig};
    use std::sync::Arc;

    fn models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gemini-3-flash-preview".to_string(),
                display_name: "Gemini 3 Flash".to_string(),
            },
            ModelInfo {
                id: "gemini-2.5-pro".to_string(),
                display_name: "Gemini 2.5 Pro".to_string(),
            },
        ]
    }

    #[test]
    fn choose_by_index_or_id() {
        let models = models();
        assert_eq!(choose(&models, "2").unwrap().id, "gemini-2.5-pro");
        assert_eq!(
            choose(&models, "gemini-3-flash-preview").unwrap().id,
            "gemini-3-flash-preview"
        );
        assert!(choose(&models, "0").is_none());
        assert!(choose(&models, "3").is_none());
        assert!(choose(&models, "gpt").is_none());
    }

    #[tokio::test]
    async fn switch_by_argument() {
        let advisor = Arc::new(MockAdvisor::new(vec![]).with_models(models()));
        let session = Session::new(advisor, SessionConfig::default());
        let info = SessionInfo {
            session: Some(&session),
            ..test_info()
        };
        assert_eq!(
            ModelCommand.execute("2", &info).await,
            CommandResult::StateChanged(StateChange::Model("gemini-2.5-pro".to_string()))
        );
    }

    #[tokio::test]
    async fn selecting_current_model_is_a_no_op() {
        let advisor = Arc::new(MockAdvisor::new(vec![]).with_models(models()));
        let session = Session::new(advisor, SessionConfig::default());
        let info = SessionInfo {
            session: Some(&session),
            ..test_info()
        };
        assert_eq!(
            ModelCommand.execute("gemini-3-flash-preview", &info).await,
            CommandResult::Handled
        );
    }

    #[tokio::test]
    async fn returns_handled_without_session() {
        assert_eq!(
            ModelCommand.execute("", &test_info()).await,
            CommandResult::Handled
        );
    }
}
