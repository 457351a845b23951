//! Local-generate protocol adapter (Ollama)

use async_trait::async_trait;
use note_tagger_domain::{GenerateError, GenerationResult, TagProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LlmConfig, check_status, http_client, render_prompt, send_error, timed_generation};

const PROVIDER_ID: &str = "ollama";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Tag provider for a local model server; no credentials
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    config: LlmConfig,
}

impl OllamaProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), config)
    }

    pub fn with_base_url(base_url: String, config: LlmConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    async fn call_api(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_output_tokens,
            },
        };

        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let api_response: GenerateResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        if api_response.response.trim().is_empty() {
            return Err(GenerateError::InvalidResponse("Empty response".to_string()));
        }

        Ok(api_response.response)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl TagProvider for OllamaProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate_tags(
        &self,
        content: &str,
        prompt_template: &str,
        max_tags: usize,
    ) -> GenerationResult {
        let prompt = render_prompt(prompt_template, content);
        timed_generation(PROVIDER_ID, max_tags, self.call_api(&prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> LlmConfig {
        LlmConfig {
            model: "llama2".to_string(),
            max_output_tokens: 200,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama2",
                "prompt": "Suggest tags: sourdough baking",
                "stream": false,
                "options": {"num_predict": 200}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama2",
                "response": "Sure!\nbaking\nsourdough bread\n",
                "done": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OllamaProvider::with_base_url(mock_server.uri(), config());
        let result = provider
            .generate_tags("sourdough baking", "Suggest tags: {content}", 10)
            .await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.provider_id, "ollama");
        assert_eq!(result.tags(), vec!["Sure", "baking", "sourdough"]);
        assert!(result.suggestions.iter().all(|s| s.confidence == 0.7));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&mock_server)
            .await;

        let provider = OllamaProvider::with_base_url(mock_server.uri(), config());
        let result = provider.generate_tags("content", "{content}", 10).await;

        assert!(result.suggestions.is_empty());
        assert!(result.error.unwrap().contains("model not found"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let provider = OllamaProvider::with_base_url("http://127.0.0.1:9".to_string(), config());
        let result = provider.generate_tags("content", "{content}", 10).await;

        assert!(result.suggestions.is_empty());
        assert!(result.error.is_some());
        assert_eq!(result.provider_id, "ollama");
    }
}
