//! Turns the model's textual payload into a [`HealthInformationResult`].

use crate::error::AnalysisError;
use crate::health::HealthInformationResult;

/// How to treat replies that parse but break the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Log the issues and accept the reply.
    #[default]
    Lenient,
    /// Reject the reply as malformed.
    Strict,
}

/// Parse the reply text. `None` or blank text is an empty response;
/// anything that does not match the schema is malformed. No partial
/// recovery.
pub fn parse_reply(
    text: Option<&str>,
    strictness: Strictness,
) -> Result<HealthInformationResult, AnalysisError> {
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(AnalysisError::EmptyResponse),
    };

    let result: HealthInformationResult = serde_json::from_str(extract_json(text))?;

    let issues = result.conformance_issues();
    if !issues.is_empty() {
        for issue in &issues {
            tracing::warn!(%issue, "reply does not follow the policy");
        }
        if strictness == Strictness::Strict {
            let reason = issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AnalysisError::MalformedResponse { reason });
        }
    }

    Ok(result)
}

/// Extract JSON from text that may be wrapped in markdown code fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(after) = trimmed.strip_prefix("```json")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }
    if let Some(after) = trimmed.strip_prefix("```")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    const CONFORMING: &str = r#"{
        "summary": "Pole sana bestie. Just so we're clear, this is non-diagnostic and I'm not a medical pro.",
        "isVague": false,
        "generalInformation": ["Tension headaches are common."],
        "homeCareSuggestions": ["Hydrate."],
        "suggestedQuestionsForDoctor": ["Could this be stress related?"],
        "redFlags": []
    }"#;

    #[test]
    fn parses_conforming_reply() {
        let result = parse_reply(Some(CONFORMING), Strictness::Strict).unwrap();
        assert!(!result.is_vague);
        assert_eq!(result.home_care_suggestions, vec!["Hydrate."]);
        assert!(result.red_flags.is_empty());
    }

    #[test]
    fn missing_text_is_empty_response() {
        let err = parse_reply(None, Strictness::Lenient).unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResponse);
    }

    #[test]
    fn blank_text_is_empty_response() {
        let err = parse_reply(Some("  \n"), Strictness::Lenient).unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResponse);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_reply(Some("not json at all"), Strictness::Lenient).unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn schema_mismatch_is_malformed() {
        let err = parse_reply(
            Some(r#"{"summary": "hi", "isVague": "nope"}"#),
            Strictness::Lenient,
        )
        .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn fenced_json_is_accepted() {
        let text = format!("```json\n{CONFORMING}\n```");
        assert!(parse_reply(Some(&text), Strictness::Strict).is_ok());
    }

    #[test]
    fn lenient_accepts_policy_violations() {
        let text = r#"{
            "summary": "You have a cold.",
            "isVague": true,
            "generalInformation": ["Colds pass."],
            "suggestedQuestionsForDoctor": ["Is it a cold?"],
            "redFlags": []
        }"#;
        let result = parse_reply(Some(text), Strictness::Lenient).unwrap();
        assert!(result.is_vague);
        assert!(result.questions_to_user.is_empty());
    }

    #[test]
    fn strict_rejects_policy_violations() {
        let text = r#"{
            "summary": "You have a cold.",
            "isVague": true,
            "generalInformation": ["Colds pass."],
            "suggestedQuestionsForDoctor": ["Is it a cold?"],
            "redFlags": []
        }"#;
        let err = parse_reply(Some(text), Strictness::Strict).unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
        let message = err.to_string();
        assert!(message.contains("no clarifying questions"));
        assert!(message.contains("disclaimer"));
    }

    #[test]
    fn extract_json_plain() {
        assert_eq!(extract_json(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn extract_json_with_plain_fence() {
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
    }

    #[test]
    fn extract_json_no_closing_fence_returns_as_is() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(extract_json(input), input.trim());
    }
}
