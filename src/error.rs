//! Failure taxonomy for a single analysis.

use std::fmt;
use std::time::Duration;

/// Everything that can go wrong between submitting a query and holding a result.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The request never completed (DNS, connect, TLS, reset).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service error ({status}): {body}")]
    Service { status: u16, body: String },

    /// The service answered but carried no text.
    #[error("empty response from the model")]
    EmptyResponse,

    /// The text did not parse as the declared schema.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("no Gemini API key found. Run `njoki login` or set GEMINI_API_KEY.")]
    MissingCredential,

    #[error("credential lookup failed: {0}")]
    Credentials(String),
}

/// Coarse failure class, kept for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    EmptyResponse,
    MalformedResponse,
    Timeout,
    Cancelled,
    Configuration,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "could not reach the service",
            Self::EmptyResponse => "the service sent nothing back",
            Self::MalformedResponse => "the reply was not in the expected shape",
            Self::Timeout => "the service took too long",
            Self::Cancelled => "cancelled",
            Self::Configuration => "the API key is missing or was not accepted",
        };
        f.write_str(label)
    }
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Service {
                status: 400 | 401 | 403,
                ..
            } => FailureKind::Configuration,
            Self::Transport(_) | Self::Service { .. } => FailureKind::Transport,
            Self::EmptyResponse => FailureKind::EmptyResponse,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Cancelled => FailureKind::Cancelled,
            Self::MissingCredential | Self::Credentials(_) => FailureKind::Configuration,
        }
    }

    /// Worth another attempt. Only transport trouble qualifies; a malformed
    /// reply is a contract violation and will not improve on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Service { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("request timed out: {e}"))
        } else if e.is_decode() {
            Self::MalformedResponse {
                reason: e.to_string(),
            }
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse {
            reason: e.to_string(),
        }
    }
}
