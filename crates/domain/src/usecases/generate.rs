//! Tag generation use case

use std::time::Instant;

use crate::{
    filter::ConfidenceFilter,
    hierarchy::HierarchyClassifier,
    model::{GenerationResult, TagSuggestion, TaggingSettings},
    normalize::{sanitize_tag, truncate_content, ContentNormalizer},
    ports::GenerateError,
    registry::ProviderRegistry,
};

/// Runs the generation pipeline against the active provider
///
/// Settings are passed per call so a caller can change them between calls
/// without touching the generator.
#[derive(Debug, Clone)]
pub struct TagGenerator {
    registry: ProviderRegistry,
}

impl TagGenerator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Generate filtered suggestions for raw document text
    ///
    /// Never fails: every error is reported through the result.
    pub async fn generate(&self, raw_text: &str, settings: &TaggingSettings) -> GenerationResult {
        let provider_id = settings.active_provider.as_str();

        let cleaned = ContentNormalizer::normalize(raw_text);
        let len = cleaned.chars().count();
        if len < settings.min_content_chars {
            tracing::debug!(len, min = settings.min_content_chars, "Content too short");
            let err = GenerateError::ContentTooShort {
                len,
                min: settings.min_content_chars,
            };
            return GenerationResult::failure(provider_id, err, 0);
        }
        let content = truncate_content(&cleaned, settings.max_content_chars);

        let Some(provider) = self.registry.get(settings.active_provider) else {
            let err = GenerateError::ProviderNotFound(provider_id.to_string());
            return GenerationResult::failure(provider_id, err, 0);
        };

        if settings.active_provider.requires_api_key()
            && !settings.active_config().is_some_and(|c| c.has_api_key())
        {
            let err = GenerateError::ProviderNotConfigured(provider_id.to_string());
            return GenerationResult::failure(provider_id, err, 0);
        }

        tracing::info!(
            provider = provider_id,
            content_chars = content.chars().count(),
            max_tags = settings.max_tags,
            "Generating tags"
        );

        let started = Instant::now();
        let mut result = provider
            .generate_tags(&content, &settings.prompt_template, settings.max_tags)
            .await;

        if let Some(error) = &result.error {
            tracing::warn!(provider = provider_id, error = %error, "Tag generation failed");
            return result;
        }

        result.suggestions = self.post_process(result.suggestions, settings);

        tracing::info!(
            provider = provider_id,
            suggestions = result.suggestions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generated tags"
        );

        result
    }

    fn post_process(
        &self,
        suggestions: Vec<TagSuggestion>,
        settings: &TaggingSettings,
    ) -> Vec<TagSuggestion> {
        let mut suggestions = ConfidenceFilter::new(settings.min_confidence).retain(suggestions);

        if settings.sanitize_tags {
            suggestions = suggestions
                .into_iter()
                .filter_map(|s| {
                    let tag = sanitize_tag(&s.tag);
                    (!tag.is_empty()).then_some(TagSuggestion { tag, ..s })
                })
                .collect();
        }

        if settings.enable_hierarchy {
            suggestions = HierarchyClassifier.classify(suggestions);
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderKind;
    use crate::ports::TagProvider;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::{Arc, Mutex};

    struct FakeProvider {
        reply: Vec<TagSuggestion>,
        error: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn replying(reply: Vec<TagSuggestion>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                error: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Vec::new(),
                error: Some(error.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TagProvider for FakeProvider {
        fn id(&self) -> &str {
            "openai"
        }

        async fn generate_tags(
            &self,
            content: &str,
            _prompt_template: &str,
            max_tags: usize,
        ) -> GenerationResult {
            self.calls.lock().unwrap().push(content.to_string());
            match &self.error {
                Some(error) => GenerationResult::failure("openai", error, 5),
                None => {
                    let mut reply = self.reply.clone();
                    reply.truncate(max_tags);
                    GenerationResult::success("openai", reply, 5)
                }
            }
        }
    }

    const LONG_NOTE: &str = "---\ntitle: Notes\n---\n# Ownership in Rust\n\n\
        Borrowing rules keep **memory safety** without a garbage collector. #rust";

    fn settings_with_key() -> TaggingSettings {
        let mut settings = TaggingSettings::default();
        if let Some(config) = settings.providers.get_mut(&ProviderKind::OpenAi) {
            config.api_key = Some(SecretString::new("sk-test".into()));
        }
        settings
    }

    fn generator(provider: Arc<FakeProvider>) -> TagGenerator {
        TagGenerator::new(ProviderRegistry::new().with(ProviderKind::OpenAi, provider))
    }

    #[tokio::test]
    async fn test_generate_filters_by_confidence() {
        let provider = FakeProvider::replying(vec![
            TagSuggestion::llm("rust", 0.9),
            TagSuggestion::llm("noise", 0.2),
            TagSuggestion::llm("memory", 0.5),
        ]);
        let result = generator(provider.clone())
            .generate(LONG_NOTE, &settings_with_key())
            .await;

        assert!(result.is_success());
        assert_eq!(result.tags(), vec!["rust", "memory"]);
        assert_eq!(result.provider_id, "openai");

        let calls = provider.calls.lock().unwrap();
        assert!(!calls[0].contains("title:"));
        assert!(!calls[0].contains("#rust"));
        assert!(calls[0].starts_with("Ownership in Rust"));
    }

    #[tokio::test]
    async fn test_missing_key_rejected_before_call() {
        let provider = FakeProvider::replying(vec![TagSuggestion::llm("rust", 0.9)]);
        let result = generator(provider.clone())
            .generate(LONG_NOTE, &TaggingSettings::default())
            .await;

        assert_eq!(
            result.error.as_deref(),
            Some("API key not configured for provider openai")
        );
        assert!(result.suggestions.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_provider() {
        let provider = FakeProvider::replying(Vec::new());
        let mut settings = settings_with_key();
        settings.active_provider = ProviderKind::Ollama;

        let result = generator(provider).generate(LONG_NOTE, &settings).await;
        assert_eq!(result.error.as_deref(), Some("Provider not found: ollama"));
        assert_eq!(result.provider_id, "ollama");
    }

    #[tokio::test]
    async fn test_short_content_skips_provider() {
        let provider = FakeProvider::replying(vec![TagSuggestion::llm("rust", 0.9)]);
        let result = generator(provider.clone())
            .generate("---\ntitle: x\n---\nTiny #note", &settings_with_key())
            .await;

        assert!(result.error.unwrap().contains("too short"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let provider = FakeProvider::failing("Request failed: connection refused");
        let result = generator(provider).generate(LONG_NOTE, &settings_with_key()).await;

        assert!(result.suggestions.is_empty());
        assert_eq!(
            result.error.as_deref(),
            Some("Request failed: connection refused")
        );
    }

    #[tokio::test]
    async fn test_sanitize_and_hierarchy() {
        let provider = FakeProvider::replying(vec![
            TagSuggestion::llm("Software Design!", 0.8),
            TagSuggestion::llm("Data", 0.6),
            TagSuggestion::llm("???", 0.9),
        ]);
        let mut settings = settings_with_key();
        settings.sanitize_tags = true;
        settings.enable_hierarchy = true;

        let result = generator(provider).generate(LONG_NOTE, &settings).await;
        assert_eq!(
            result.tags(),
            vec!["technology", "technology/software-design", "technology/data"]
        );
    }

    #[tokio::test]
    async fn test_max_tags_forwarded() {
        let provider = FakeProvider::replying(vec![
            TagSuggestion::llm("a1", 0.9),
            TagSuggestion::llm("b2", 0.9),
            TagSuggestion::llm("c3", 0.9),
        ]);
        let mut settings = settings_with_key();
        settings.max_tags = 2;

        let result = generator(provider).generate(LONG_NOTE, &settings).await;
        assert_eq!(result.suggestions.len(), 2);
    }
}
