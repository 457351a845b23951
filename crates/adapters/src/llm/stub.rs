//! Stub provider for testing and offline mode

use async_trait::async_trait;
use note_tagger_domain::analysis::analyze;
use note_tagger_domain::{GenerationResult, TagSource, TagSuggestion, TagProvider};

const PROVIDER_ID: &str = "stub";

enum Mode {
    Keywords,
    Fixed(Vec<TagSuggestion>),
    Failing(String),
}

/// Provider that answers without any network access
pub struct StubProvider {
    mode: Mode,
}

impl StubProvider {
    /// Suggest the content's most frequent keywords and topic phrases
    pub fn keywords() -> Self {
        Self {
            mode: Mode::Keywords,
        }
    }

    /// Always return the given suggestions
    pub fn with_suggestions(suggestions: Vec<TagSuggestion>) -> Self {
        Self {
            mode: Mode::Fixed(suggestions),
        }
    }

    /// Always fail with the given message
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            mode: Mode::Failing(message.into()),
        }
    }
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::keywords()
    }
}

fn keyword_suggestions(content: &str) -> Vec<TagSuggestion> {
    let analysis = analyze(content);

    let mut suggestions: Vec<TagSuggestion> = analysis
        .keywords
        .iter()
        .enumerate()
        .map(|(rank, keyword)| {
            let confidence = (0.9 - rank as f64 * 0.05).max(0.5);
            TagSuggestion::with_source(keyword.as_str(), confidence, TagSource::Keyword)
        })
        .collect();

    for topic in &analysis.topics {
        let tag = topic.replace(' ', "-");
        if !suggestions.iter().any(|s| s.tag == tag) {
            suggestions.push(TagSuggestion::with_source(tag, 0.6, TagSource::Topic));
        }
    }

    suggestions
}

#[async_trait]
impl TagProvider for StubProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate_tags(
        &self,
        content: &str,
        _prompt_template: &str,
        max_tags: usize,
    ) -> GenerationResult {
        let mut suggestions = match &self.mode {
            Mode::Failing(message) => return GenerationResult::failure(PROVIDER_ID, message, 0),
            Mode::Fixed(suggestions) => suggestions.clone(),
            Mode::Keywords => keyword_suggestions(content),
        };

        suggestions.truncate(max_tags);
        GenerationResult::success(PROVIDER_ID, suggestions, 0)
    }
}
