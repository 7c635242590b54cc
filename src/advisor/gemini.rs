use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::AuthStorage;
use crate::consts::{API_KEY_ENV_VARS, DEFAULT_MODEL, EMERGENCY_NUMBER, GEMINI_BASE_URL, PROVIDER};
use crate::error::AnalysisError;
use crate::health::SymptomQuery;
use crate::prompts::policy::build_policy;
use crate::prompts::schema::response_schema;

use super::response::{Strictness, parse_reply};
use super::{Advisor, Analysis, ModelInfo, TokenUsage};

const RESPONSE_MIME_TYPE: &str = "application/json";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const GENERATE_METHOD: &str = "generateContent";

/// An advisor that calls the Gemini `generateContent` API.
pub struct GeminiAdvisor {
    model: String,
    base_url: String,
    strictness: Strictness,
    auth: AuthStorage,
    client: reqwest::Client,
}

impl GeminiAdvisor {
    pub fn new(model: Option<String>, auth: AuthStorage) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: GEMINI_BASE_URL.to_string(),
            strictness: Strictness::default(),
            auth,
            client,
        })
    }

    /// Point at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<String, AnalysisError> {
        self.auth
            .get_api_key(PROVIDER, API_KEY_ENV_VARS)
            .map_err(|e| AnalysisError::Credentials(e.to_string()))?
            .ok_or(AnalysisError::MissingCredential)
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, GENERATE_METHOD)
    }

    fn build_request<'a>(policy: &'a str, query: &'a SymptomQuery) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: policy }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: query.as_str(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE,
                response_schema: response_schema(),
            },
        }
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, AnalysisError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(AnalysisError::Service { status, body })
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    async fn analyze(&self, query: &SymptomQuery) -> Result<Analysis, AnalysisError> {
        let api_key = self.api_key()?;
        let policy = build_policy(EMERGENCY_NUMBER);
        let body = Self::build_request(&policy, query);

        tracing::debug!(model = %self.model, chars = query.as_str().len(), "sending symptom query");

        let resp = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &api_key)
            .json(&body)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let reply: GenerateResponse = resp.json().await?;

        let usage = reply.usage();
        if let Some(usage) = usage {
            tracing::debug!(
                input = usage.input_tokens,
                output = usage.output_tokens,
                "token usage"
            );
        }
        if let Some(reason) = reply.block_reason() {
            tracing::warn!(%reason, "prompt was blocked");
        }

        let text = reply.text();
        let result = parse_reply(text.as_deref(), self.strictness)?;
        Ok(Analysis { result, usage })
    }

    async fn models(&self) -> Result<Vec<ModelInfo>, AnalysisError> {
        let api_key = self.api_key()?;
        let resp = self
            .client
            .get(format!("{}/models?pageSize=1000", self.base_url))
            .header("x-goog-api-key", &api_key)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let list: ModelList = resp.json().await?;
        Ok(list.into_models())
    }
}

// --- API types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if there is any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() { None } else { Some(text) }
    }

    fn usage(&self) -> Option<TokenUsage> {
        self.usage_metadata.as_ref().map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<RemoteModel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl ModelList {
    fn into_models(self) -> Vec<ModelInfo> {
        self.models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == GENERATE_METHOD)
            })
            .map(|m| {
                let id = m
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&m.name)
                    .to_string();
                let display_name = m.display_name.unwrap_or_else(|| id.clone());
                ModelInfo { id, display_name }
            })
            .collect()
    }
}
