//! The structured health-information payload and the query that produces it.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::prompts::policy::{CLARIFYING_QUESTION_COUNT, DISCLAIMER_MARKER};

/// Free text describing how the user feels. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomQuery(String);

impl SymptomQuery {
    /// Returns `None` for empty or whitespace-only text.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymptomQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the model sends back for one query. Replaced wholesale on every
/// submission, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInformationResult {
    pub summary: String,
    pub is_vague: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub questions_to_user: Vec<String>,
    pub general_information: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub home_care_suggestions: Vec<String>,
    pub suggested_questions_for_doctor: Vec<String>,
    pub red_flags: Vec<String>,
}

/// A reply that parsed fine but does not follow the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConformanceIssue {
    /// Flagged as vague but asked nothing.
    VagueWithoutQuestions,
    /// Flagged as vague with a question count other than the policy's.
    UnexpectedQuestionCount { found: usize },
    /// Summary lacks the mandated disclaimer.
    MissingDisclaimer,
    NoGeneralInformation,
    NoDoctorQuestions,
}

impl fmt::Display for ConformanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VagueWithoutQuestions => write!(f, "vague reply carries no clarifying questions"),
            Self::UnexpectedQuestionCount { found } => write!(
                f,
                "vague reply carries {found} clarifying questions, expected {CLARIFYING_QUESTION_COUNT}"
            ),
            Self::MissingDisclaimer => write!(f, "summary is missing the disclaimer"),
            Self::NoGeneralInformation => write!(f, "no general information"),
            Self::NoDoctorQuestions => write!(f, "no suggested questions for a doctor"),
        }
    }
}

impl HealthInformationResult {
    /// Whether the red-flag block should be shown at all.
    pub fn has_red_flags(&self) -> bool {
        !self.red_flags.is_empty()
    }

    /// Clarifying questions worth showing: only when the reply is vague.
    pub fn clarifying_questions(&self) -> &[String] {
        if self.is_vague {
            &self.questions_to_user
        } else {
            &[]
        }
    }

    /// Check the reply against the policy's expectations.
    pub fn conformance_issues(&self) -> Vec<ConformanceIssue> {
        let mut issues = Vec::new();

        if self.is_vague {
            match self.questions_to_user.len() {
                0 => issues.push(ConformanceIssue::VagueWithoutQuestions),
                CLARIFYING_QUESTION_COUNT => {}
                found => issues.push(ConformanceIssue::UnexpectedQuestionCount { found }),
            }
        }

        if !self
            .summary
            .to_lowercase()
            .contains(&DISCLAIMER_MARKER.to_lowercase())
        {
            issues.push(ConformanceIssue::MissingDisclaimer);
        }
        if self.general_information.is_empty() {
            issues.push(ConformanceIssue::NoGeneralInformation);
        }
        if self.suggested_questions_for_doctor.is_empty() {
            issues.push(ConformanceIssue::NoDoctorQuestions);
        }

        issues
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
