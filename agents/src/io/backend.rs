//! Generation backends: one text completion for one prompt.
//!
//! The [`Generator`] trait decouples the pipeline from the actual backend.
//! [`LiveBackend`] calls a Messages-style completion API over HTTP;
//! [`SimulatedBackend`] ignores the prompt text and renders a fixed response
//! for the task's classification, for offline use and tests.

use std::time::Duration;

use async_trait::async_trait;
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::family::{Classification, TaskFamily};
use crate::error::GenerationFailure;
use crate::io::config::LiveConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const SIMULATED_SECURITY: &str = include_str!("simulated/security.md");
const SIMULATED_PERFORMANCE: &str = include_str!("simulated/performance.md");
const SIMULATED_QUESTION: &str = include_str!("simulated/question.md");

/// Which backend variant a task uses. Resolved once, before the task starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Live,
    Simulated,
}

impl BackendMode {
    pub fn from_flag(simulate: bool) -> Self {
        if simulate { Self::Simulated } else { Self::Live }
    }
}

/// Parameters for a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub classification: Classification,
}

/// Abstraction over text-completion backends.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    /// Produce the completion for `request`. No retries are attempted.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure>;
}

/// Build the backend selected by `mode`.
pub fn build_generator(
    mode: BackendMode,
    live: &LiveConfig,
) -> Result<Box<dyn Generator>, GenerationFailure> {
    match mode {
        BackendMode::Live => Ok(Box::new(LiveBackend::from_config(live)?)),
        BackendMode::Simulated => Ok(Box::new(SimulatedBackend::new()?)),
    }
}

/// Deterministic backend returning canned text keyed by classification.
pub struct SimulatedBackend {
    env: Environment<'static>,
}

impl SimulatedBackend {
    pub fn new() -> Result<Self, GenerationFailure> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        for (family, source) in [
            (TaskFamily::Security, SIMULATED_SECURITY),
            (TaskFamily::Performance, SIMULATED_PERFORMANCE),
            (TaskFamily::Question, SIMULATED_QUESTION),
        ] {
            env.add_template(family.as_str(), source)
                .map_err(|err| GenerationFailure::Simulation(err.to_string()))?;
        }
        Ok(Self { env })
    }

    /// The canned response for `classification`.
    pub fn response_for(&self, classification: Classification) -> Result<String, GenerationFailure> {
        let template = self
            .env
            .get_template(classification.family().as_str())
            .map_err(|err| GenerationFailure::Simulation(err.to_string()))?;
        template
            .render(context! { focus => classification.label() })
            .map_err(|err| GenerationFailure::Simulation(err.to_string()))
    }
}

#[async_trait]
impl Generator for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    #[instrument(skip_all, fields(classification = %request.classification))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        debug!(prompt_bytes = request.prompt.len(), "returning simulated response");
        self.response_for(request.classification)
    }
}

/// Backend calling a Messages-style completion endpoint.
pub struct LiveBackend {
    base_url: String,
    model: String,
    max_tokens: u32,
    api_key: String,
    client: reqwest::Client,
}

impl LiveBackend {
    /// Build from config, reading the API key from `api_key_env`.
    pub fn from_config(cfg: &LiveConfig) -> Result<Self, GenerationFailure> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenerationFailure::NotConfigured(format!(
                    "environment variable {} is not set",
                    cfg.api_key_env
                ))
            })?;
        Self::new(cfg, api_key)
    }

    pub fn new(cfg: &LiveConfig, api_key: impl Into<String>) -> Result<Self, GenerationFailure> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|err| GenerationFailure::NotConfigured(format!("http client: {err}")))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl Generator for LiveBackend {
    fn name(&self) -> &str {
        "live"
    }

    #[instrument(skip_all, fields(model = %self.model, classification = %request.classification))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ApiMessage {
                role: "user",
                content: &request.prompt,
            }],
        };
        info!(prompt_bytes = request.prompt.len(), "requesting completion");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_failure)?;
        if !(200..300).contains(&status) {
            let failure = status_failure(status, &text);
            warn!(status, error = %failure, "completion request failed");
            return Err(failure);
        }

        let completion = parse_completion(&text)?;
        debug!(response_bytes = completion.len(), "completion received");
        Ok(completion)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn transport_failure(err: reqwest::Error) -> GenerationFailure {
    if err.is_timeout() {
        GenerationFailure::Network(format!("request timed out: {err}"))
    } else {
        GenerationFailure::Network(err.to_string())
    }
}

/// Map a non-success HTTP status and its body to a failure.
fn status_failure(status: u16, body: &str) -> GenerationFailure {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        401 | 403 => GenerationFailure::Authentication(message),
        429 => GenerationFailure::Quota(message),
        _ => GenerationFailure::Api { status, message },
    }
}

/// Concatenate the text blocks of a successful response body.
fn parse_completion(body: &str) -> Result<String, GenerationFailure> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|err| GenerationFailure::MalformedResponse(err.to_string()))?;
    let texts: Vec<String> = parsed
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .collect();
    if texts.is_empty() {
        return Err(GenerationFailure::MalformedResponse(
            "response contained no text blocks".to_string(),
        ));
    }
    Ok(texts.concat())
}
