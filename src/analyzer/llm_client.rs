use crate::error::LegalMindError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ERROR_BODY_PREVIEW: usize = 300;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Google,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::Google => "GEMINI_API_KEY",
        }
    }

    pub fn base_url_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_BASE_URL",
            ProviderKind::Anthropic => "ANTHROPIC_BASE_URL",
            ProviderKind::Google => "GEMINI_BASE_URL",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Google => "https://generativelanguage.googleapis.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub provider: ProviderKind,
}

pub const AVAILABLE_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-2.0-flash-lite",
        display_name: "Gemini 2.0 Flash Lite",
        provider: ProviderKind::Google,
    },
    ModelInfo {
        id: "gemini-2.0-flash",
        display_name: "Gemini 2.0 Flash",
        provider: ProviderKind::Google,
    },
    ModelInfo {
        id: "gemini-2.5-flash",
        display_name: "Gemini 2.5 Flash",
        provider: ProviderKind::Google,
    },
    ModelInfo {
        id: "gpt-4o-mini",
        display_name: "GPT-4o mini",
        provider: ProviderKind::OpenAi,
    },
    ModelInfo {
        id: "gpt-4o",
        display_name: "GPT-4o",
        provider: ProviderKind::OpenAi,
    },
    ModelInfo {
        id: "claude-3-5-haiku-latest",
        display_name: "Claude 3.5 Haiku",
        provider: ProviderKind::Anthropic,
    },
    ModelInfo {
        id: "claude-sonnet-4-5",
        display_name: "Claude Sonnet 4.5",
        provider: ProviderKind::Anthropic,
    },
];

/// One generation call: prompt text plus sampling budget.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Thin translation layer over one provider's generation endpoint.
///
/// Implementations do not retry, validate or normalize. Errors are returned
/// with their retry class already fixed by the variant.
pub trait LlmProvider: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderResponse, LegalMindError>> + Send + 'a>>;
    fn kind(&self) -> ProviderKind;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    pub fn new<S: Into<String>>(kind: ProviderKind, api_key: S, timeout_seconds: u64) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: kind.default_base_url().to_string(),
            timeout_seconds,
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client, LegalMindError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()?)
}

// ---------------------------------------------------------------------------
// OpenAI chat completions
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    /// Reasoning models only accept their default temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_completion_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LegalMindError> {
        let http = build_http_client(config.timeout_seconds)?;
        Ok(Self { http, config })
    }

    async fn send(&self, request: &GenerationRequest) -> Result<ProviderResponse, LegalMindError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let temperature =
            (!is_openai_reasoning_model(&request.model)).then_some(request.temperature);

        let body = ChatCompletionRequest {
            model: &request.model,
            messages,
            temperature,
            max_completion_tokens: request.max_output_tokens,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatCompletionResponse = read_envelope(ProviderKind::OpenAi, response).await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| missing_output(ProviderKind::OpenAi))?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u
                .total_tokens
                .unwrap_or_else(|| u.prompt_tokens.unwrap_or(0) + u.completion_tokens.unwrap_or(0)),
        });

        Ok(ProviderResponse { text, usage })
    }
}

impl LlmProvider for OpenAiClient {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderResponse, LegalMindError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}

// ---------------------------------------------------------------------------
// Anthropic messages
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<MessagesUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct MessagesUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

pub struct AnthropicClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl AnthropicClient {
    pub fn new(config: LlmConfig) -> Result<Self, LegalMindError> {
        let http = build_http_client(config.timeout_seconds)?;
        Ok(Self { http, config })
    }

    async fn send(&self, request: &GenerationRequest) -> Result<ProviderResponse, LegalMindError> {
        let body = MessagesRequest {
            model: &request.model,
            system: request.system.as_deref(),
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let parsed: MessagesResponse = read_envelope(ProviderKind::Anthropic, response).await?;

        let text = parsed
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(missing_output(ProviderKind::Anthropic));
        }

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens.unwrap_or(0) + u.output_tokens.unwrap_or(0),
        });

        Ok(ProviderResponse { text, usage })
    }
}

impl LlmProvider for AnthropicClient {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderResponse, LegalMindError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}

// ---------------------------------------------------------------------------
// Google Gemini generateContent
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LegalMindError> {
        let http = build_http_client(config.timeout_seconds)?;
        Ok(Self { http, config })
    }

    async fn send(&self, request: &GenerationRequest) -> Result<ProviderResponse, LegalMindError> {
        // Single-prompt envelope: the system preamble rides in front of the user text.
        let prompt = match request.system.as_deref() {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        let body = GenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.config.base_url, request.model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateContentResponse = read_envelope(ProviderKind::Google, response).await?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| missing_output(ProviderKind::Google))?;

        let usage = parsed.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count.unwrap_or_else(|| {
                u.prompt_token_count.unwrap_or(0) + u.candidates_token_count.unwrap_or(0)
            }),
        });

        Ok(ProviderResponse { text, usage })
    }
}

impl LlmProvider for GeminiClient {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderResponse, LegalMindError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }
}

// ---------------------------------------------------------------------------
// Shared response handling
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<serde_json::Value>,
    status: Option<String>,
}

impl ErrorDetail {
    fn signals_quota(&self) -> bool {
        const QUOTA_MARKERS: &[&str] = &[
            "rate_limit_error",
            "rate_limit_exceeded",
            "insufficient_quota",
            "RESOURCE_EXHAUSTED",
        ];

        let code = self.code.as_ref().and_then(|c| c.as_str());
        [self.error_type.as_deref(), self.status.as_deref(), code]
            .into_iter()
            .flatten()
            .any(|marker| QUOTA_MARKERS.contains(&marker))
    }
}

async fn read_envelope<T: for<'de> Deserialize<'de>>(
    provider: ProviderKind,
    response: reqwest::Response,
) -> Result<T, LegalMindError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(classify_error_response(provider, status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| LegalMindError::Provider {
        provider: provider.to_string(),
        status: status.as_u16(),
        message: format!("unexpected response envelope: {}", e),
    })
}

/// Maps a non-success HTTP response to a typed error.
///
/// 429, or a structured quota code in the error body, is `RateLimited`;
/// everything else is a fatal provider error.
pub fn classify_error_response(provider: ProviderKind, status: u16, body: &str) -> LegalMindError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);

    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.chars().take(ERROR_BODY_PREVIEW).collect());

    let quota = detail.as_ref().map(ErrorDetail::signals_quota).unwrap_or(false);

    if status == 429 || quota {
        LegalMindError::RateLimited {
            provider: provider.to_string(),
            message,
        }
    } else {
        LegalMindError::Provider {
            provider: provider.to_string(),
            status,
            message,
        }
    }
}

fn missing_output(provider: ProviderKind) -> LegalMindError {
    LegalMindError::MalformedResponse(format!("{} response contained no output text", provider))
}

// ---------------------------------------------------------------------------
// Model resolution and registry
// ---------------------------------------------------------------------------

pub fn find_model(model: &str) -> Option<&'static ModelInfo> {
    AVAILABLE_MODELS.iter().find(|info| info.id == model.trim())
}

pub fn resolve_provider(model: &str) -> Result<ProviderKind, LegalMindError> {
    let model_name = model.trim();

    if let Some(info) = find_model(model_name) {
        Ok(info.provider)
    } else if is_openai_model(model_name) {
        Ok(ProviderKind::OpenAi)
    } else if is_claude_model(model_name) {
        Ok(ProviderKind::Anthropic)
    } else if is_gemini_model(model_name) {
        Ok(ProviderKind::Google)
    } else {
        Err(LegalMindError::UnsupportedModel(model_name.to_string()))
    }
}

/// Model id as the provider API expects it, without a routing prefix.
pub fn api_model_name(model: &str) -> &str {
    let model = model.trim();
    ["openai/", "anthropic/", "gemini/"]
        .iter()
        .find_map(|prefix| model.strip_prefix(prefix))
        .unwrap_or(model)
}

fn is_openai_model(model: &str) -> bool {
    let candidate = model.strip_prefix("openai/").unwrap_or(model);
    let candidate = candidate.strip_prefix("ft:").unwrap_or(candidate);

    candidate.starts_with("gpt-")
        || candidate.starts_with("chatgpt-")
        || candidate.starts_with("o1")
        || candidate.starts_with("o3")
        || candidate.starts_with("o4")
}

/// o-series models: no sampling temperature, output budget via
/// `max_completion_tokens` only.
fn is_openai_reasoning_model(model: &str) -> bool {
    let candidate = model.trim();
    let candidate = candidate.strip_prefix("openai/").unwrap_or(candidate);
    let candidate = candidate.strip_prefix("ft:").unwrap_or(candidate);

    ["o1", "o3", "o4"].iter().any(|family| {
        candidate == *family || candidate.starts_with(&format!("{}-", family))
    })
}

fn is_claude_model(model: &str) -> bool {
    let candidate = model.strip_prefix("anthropic/").unwrap_or(model);
    candidate.starts_with("claude-")
}

fn is_gemini_model(model: &str) -> bool {
    let candidate = model.strip_prefix("gemini/").unwrap_or(model);
    candidate.starts_with("gemini-")
}

/// Provider clients keyed by provider, resolved once per model request.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one client per provider whose API key is present in the environment.
    pub fn from_env(timeout_seconds: u64) -> Result<Self, LegalMindError> {
        let mut registry = Self::new();

        for kind in ProviderKind::ALL {
            let Some(api_key) = std::env::var(kind.api_key_env())
                .ok()
                .filter(|key| !key.trim().is_empty())
            else {
                tracing::debug!("{} not set, {} models unavailable", kind.api_key_env(), kind);
                continue;
            };

            let mut config = LlmConfig::new(kind, api_key, timeout_seconds);
            if let Ok(base_url) = std::env::var(kind.base_url_env()) {
                config = config.with_base_url(base_url);
            }

            registry.register(create_llm_client(kind, config)?);
        }

        Ok(registry)
    }

    pub fn register(&mut self, client: Arc<dyn LlmProvider>) {
        self.providers.insert(client.kind(), client);
    }

    pub fn with_provider(mut self, client: Arc<dyn LlmProvider>) -> Self {
        self.register(client);
        self
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Client for `model`; fails before any network call when the provider
    /// has no credentials.
    pub fn client_for(
        &self,
        model: &str,
    ) -> Result<(ProviderKind, Arc<dyn LlmProvider>), LegalMindError> {
        let kind = resolve_provider(model)?;
        self.providers
            .get(&kind)
            .cloned()
            .map(|client| (kind, client))
            .ok_or_else(|| {
                LegalMindError::Configuration(format!(
                    "{} is not set; cannot use model '{}'",
                    kind.api_key_env(),
                    model.trim()
                ))
            })
    }

    pub fn available_models(&self) -> Vec<&'static ModelInfo> {
        AVAILABLE_MODELS
            .iter()
            .filter(|info| self.is_configured(info.provider))
            .collect()
    }
}

pub fn create_llm_client(
    kind: ProviderKind,
    config: LlmConfig,
) -> Result<Arc<dyn LlmProvider>, LegalMindError> {
    Ok(match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(config)?),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(config)?),
        ProviderKind::Google => Arc::new(GeminiClient::new(config)?),
    })
}
