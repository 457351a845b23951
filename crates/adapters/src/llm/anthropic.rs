//! Messages protocol adapter (Claude)

use async_trait::async_trait;
use note_tagger_domain::{GenerateError, GenerationResult, TagProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{LlmConfig, check_status, http_client, render_prompt, send_error, timed_generation};

const PROVIDER_ID: &str = "claude";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Tag provider speaking the messages protocol
pub struct ClaudeProvider {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    config: LlmConfig,
}

impl ClaudeProvider {
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
        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_output_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let api_response: MessagesResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        let text = api_response
            .content
            .into_iter()
            .filter(|block| block.r#type == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(GenerateError::InvalidResponse("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    r#type: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl TagProvider for ClaudeProvider {
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

    fn provider(base_url: String) -> ClaudeProvider {
        ClaudeProvider::with_base_url(
            Some(SecretString::new("test-key".into())),
            base_url,
            LlmConfig {
                model: "claude-4-sonnet".to_string(),
                ..LlmConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-4-sonnet",
                "max_tokens": 500,
                "messages": [{"role": "user", "content": "Tag this: gardening notes"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "[{\"tag\": \"gardening\", "},
                    {"type": "tool_use", "id": "ignored"},
                    {"type": "text", "text": "\"confidence\": 0.85}]"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri())
            .generate_tags("gardening notes", "Tag this: {content}", 10)
            .await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.provider_id, "claude");
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].tag, "gardening");
        assert_eq!(result.suggestions[0].confidence, 0.85);
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri())
            .generate_tags("content", "{content}", 5)
            .await;

        assert!(result.suggestions.is_empty());
        assert!(result.error.unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let result = provider("http://127.0.0.1:9".to_string())
            .generate_tags("content", "{content}", 5)
            .await;

        assert!(result.suggestions.is_empty());
        assert!(result.error.is_some());
        assert_eq!(result.provider_id, "claude");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let provider = ClaudeProvider::new(None, LlmConfig::default());
        let result = provider.generate_tags("content", "{content}", 5).await;
        assert_eq!(
            result.error.as_deref(),
            Some("API key not configured for provider claude")
        );
    }
}
