pub mod gemini;
pub mod mock;
pub mod response;

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::health::{HealthInformationResult, SymptomQuery};

/// Token usage from a single model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Accumulate another usage into this one.
    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    /// Total tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// A parsed reply plus whatever usage the service reported.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: HealthInformationResult,
    pub usage: Option<TokenUsage>,
}

/// A model the advisor can switch to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
}

/// Turns one symptom description into one structured result.
/// Could be a remote model or a test script.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn analyze(&self, query: &SymptomQuery) -> Result<Analysis, AnalysisError>;

    /// Models available from this advisor's provider.
    async fn models(&self) -> Result<Vec<ModelInfo>, AnalysisError> {
        Ok(Vec::new())
    }
}
