//! Text-generation provider adapters

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod parser;
pub mod stub;

pub use anthropic::ClaudeProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use parser::parse_tag_response;
pub use stub::StubProvider;

use note_tagger_domain::{
    GenerateError, GenerationResult, ProviderConfig, ProviderKind, ProviderRegistry,
    TaggingSettings, TagProvider,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// System message sent with chat-style requests
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates relevant tags for \
text content. Return tags as a JSON array of objects with \"tag\" and \"confidence\" fields.";

/// Request tuning shared by the HTTP providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-1.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_output_tokens: 500,
            timeout_secs: 60,
        }
    }
}

/// Provider-independent request options from configuration
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub temperature: f64,
    pub max_output_tokens: u32,
    /// Output token limit for the local-generate protocol
    pub ollama_num_predict: u32,
    pub timeout_secs: u64,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 500,
            ollama_num_predict: 200,
            timeout_secs: 60,
        }
    }
}

impl RequestOptions {
    fn llm_config(&self, kind: ProviderKind, provider: &ProviderConfig) -> LlmConfig {
        let max_output_tokens = match kind {
            ProviderKind::Ollama => self.ollama_num_predict,
            _ => self.max_output_tokens,
        };
        LlmConfig {
            model: provider.model.clone(),
            temperature: self.temperature,
            max_output_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Build the adapter for one provider kind
pub fn build_provider(
    kind: ProviderKind,
    provider: &ProviderConfig,
    options: &RequestOptions,
) -> Arc<dyn TagProvider> {
    let config = options.llm_config(kind, provider);
    match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::with_base_url(
            provider.api_key.clone(),
            provider.base_url.clone(),
            config,
        )),
        ProviderKind::Claude => Arc::new(ClaudeProvider::with_base_url(
            provider.api_key.clone(),
            provider.base_url.clone(),
            config,
        )),
        ProviderKind::Ollama => {
            Arc::new(OllamaProvider::with_base_url(provider.base_url.clone(), config))
        }
        ProviderKind::Stub => Arc::new(StubProvider::keywords()),
    }
}

/// Registry with an adapter for every configured provider
pub fn build_registry(settings: &TaggingSettings, options: &RequestOptions) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for kind in ProviderKind::ALL {
        let provider = settings
            .providers
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::default_for(kind));
        registry.insert(kind, build_provider(kind, &provider, options));
    }
    registry
}

/// Substitute the first `{content}` placeholder
pub fn render_prompt(template: &str, content: &str) -> String {
    template.replacen("{content}", content, 1)
}

pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to build HTTP client")
}

pub(crate) fn send_error(e: reqwest::Error) -> GenerateError {
    if e.is_timeout() {
        GenerateError::Timeout
    } else {
        GenerateError::RequestFailed(e.to_string())
    }
}

/// Reject 429 and other non-success statuses
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, GenerateError> {
    if response.status() == 429 {
        return Err(GenerateError::RateLimited);
    }

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(GenerateError::RequestFailed(format!(
            "API returned {}: {}",
            status, body
        )));
    }

    Ok(response)
}

/// Time a backend call and turn its reply into a result
pub(crate) async fn timed_generation<F>(
    provider_id: &str,
    max_tags: usize,
    call: F,
) -> GenerationResult
where
    F: Future<Output = Result<String, GenerateError>>,
{
    let started = Instant::now();
    let outcome = call.await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(text) => {
            let mut suggestions = parse_tag_response(&text);
            suggestions.truncate(max_tags);
            GenerationResult::success(provider_id, suggestions, elapsed_ms)
        }
        Err(e) => {
            tracing::warn!(provider = provider_id, error = %e, "Provider request failed");
            GenerationResult::failure(provider_id, e, elapsed_ms)
        }
    }
}
