//! Chat-completion protocol adapter (OpenAI and compatible servers)

use async_trait::async_trait;
use note_tagger_domain::{GenerateError, GenerationResult, TagProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{
    LlmConfig, SYSTEM_PROMPT, check_status, http_client, render_prompt, send_error,
    timed_generation,
};

const PROVIDER_ID: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Tag provider speaking the chat-completion protocol
pub struct OpenAiProvider {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<SecretString>, config: LlmConfig) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), config)
    }

    pub fn with_base_url(api_key: Option<SecretString>, base_url: String, config: LlmConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    async fn call_api(&self, api_key: &SecretString, prompt: &str) -> Result<String, GenerateError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let api_response: ChatCompletionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerateError::InvalidResponse("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl TagProvider for OpenAiProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate_tags(
        &self,
        content: &str,
        prompt_template: &str,
        max_tags: usize,
    ) -> GenerationResult {
        let Some(api_key) = &self.api_key else {
            let err = GenerateError::ProviderNotConfigured(PROVIDER_ID.to_string());
            return GenerationResult::failure(PROVIDER_ID, err, 0);
        };

        let prompt = render_prompt(prompt_template, content);
        timed_generation(PROVIDER_ID, max_tags, self.call_api(api_key, &prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> OpenAiProvider {
        OpenAiProvider::with_base_url(
            Some(SecretString::new("test-key".into())),
            base_url,
            LlmConfig::default(),
        )
    }

    fn mock_success_response() -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": r#"[{"tag": "rust", "confidence": 0.9}, {"tag": "ownership", "confidence": 0.7}, "memory"]"#
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 500,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": "Tags for: Borrowing in Rust"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_success_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri())
            .generate_tags("Borrowing in Rust", "Tags for: {content}", 2)
            .await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.provider_id, "openai");
        assert_eq!(result.tags(), vec!["rust", "ownership"]);
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri())
            .generate_tags("content", "{content}", 5)
            .await;

        assert!(result.suggestions.is_empty());
        assert_eq!(result.error.as_deref(), Some("Rate limited"));
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri())
            .generate_tags("content", "{content}", 5)
            .await;

        let error = result.error.unwrap();
        assert!(error.contains("500"));
        assert!(error.contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_generate_empty_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": [{"message": {"content": null}}]})),
            )
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri())
            .generate_tags("content", "{content}", 5)
            .await;

        assert!(result.error.unwrap().contains("Empty response"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let result = provider("http://127.0.0.1:9".to_string())
            .generate_tags("content", "{content}", 5)
            .await;

        assert!(result.suggestions.is_empty());
        assert!(result.error.is_some());
        assert_eq!(result.provider_id, "openai");
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_success_response()))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = OpenAiProvider::with_base_url(None, mock_server.uri(), LlmConfig::default());
        let result = provider.generate_tags("content", "{content}", 5).await;

        assert_eq!(
            result.error.as_deref(),
            Some("API key not configured for provider openai")
        );
        assert_eq!(result.processing_time_ms, 0);
    }
}
