//! Domain models and value objects

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    /// Derived from keyword frequency or a synthesized hierarchy parent
    Keyword,
    /// Derived from topic phrases in the content
    Topic,
    /// Already present on the document
    Existing,
    /// Returned by a text-generation backend
    #[default]
    Llm,
}

/// A single candidate tag with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSuggestion {
    /// Tag text, trimmed and non-empty
    pub tag: String,
    /// Confidence score 0.0-1.0
    pub confidence: f64,
    /// Origin of the suggestion
    #[serde(default)]
    pub source: TagSource,
    /// Category label (`parent` / `child` after hierarchy grouping)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional backend-provided description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TagSuggestion {
    /// Create a backend suggestion with no category or description
    pub fn llm(tag: impl Into<String>, confidence: f64) -> Self {
        Self {
            tag: tag.into(),
            confidence,
            source: TagSource::Llm,
            category: None,
            description: None,
        }
    }

    /// Create a suggestion from a non-backend source
    pub fn with_source(tag: impl Into<String>, confidence: f64, source: TagSource) -> Self {
        Self {
            source,
            ..Self::llm(tag, confidence)
        }
    }
}

/// Outcome of one generation call
///
/// `error` set implies `suggestions` is empty. `processing_time_ms` is always
/// populated, including on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub suggestions: Vec<TagSuggestion>,
    pub processing_time_ms: u64,
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn success(
        provider_id: impl Into<String>,
        suggestions: Vec<TagSuggestion>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            suggestions,
            processing_time_ms,
            provider_id: provider_id.into(),
            error: None,
        }
    }

    pub fn failure(
        provider_id: impl Into<String>,
        error: impl fmt::Display,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            suggestions: Vec::new(),
            processing_time_ms,
            provider_id: provider_id.into(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Tag strings in suggestion order
    pub fn tags(&self) -> Vec<String> {
        self.suggestions.iter().map(|s| s.tag.clone()).collect()
    }
}

/// Supported generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Chat-completion protocol (OpenAI and compatibles)
    #[serde(rename = "openai")]
    OpenAi,
    /// Messages protocol with version header
    Claude,
    /// Local generate protocol
    Ollama,
    /// Offline keyword-based provider
    Stub,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Claude,
        ProviderKind::Ollama,
        ProviderKind::Stub,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Claude => "claude",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Stub => "stub",
        }
    }

    /// Whether a credential must be configured before any request is made
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderKind::OpenAi | ProviderKind::Claude)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

/// Connection settings for one backend
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Display name
    pub name: String,
    /// Base URL without trailing path
    pub base_url: String,
    /// API key, if one is configured
    pub api_key: Option<SecretString>,
    /// Model name/ID
    pub model: String,
    /// Whether the provider is enabled
    pub enabled: bool,
}

impl ProviderConfig {
    /// Default connection settings for a provider kind
    pub fn default_for(kind: ProviderKind) -> Self {
        let (name, base_url, model) = match kind {
            ProviderKind::OpenAi => ("OpenAI", "https://api.openai.com/v1", "gpt-4o-mini"),
            ProviderKind::Claude => ("Claude", "https://api.anthropic.com", "claude-4-sonnet"),
            ProviderKind::Ollama => ("Ollama", "http://localhost:11434", "llama2"),
            ProviderKind::Stub => ("Stub", "", "keywords"),
        };

        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            api_key: None,
            model: model.to_string(),
            enabled: kind == ProviderKind::OpenAi,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// On-document tag syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormatMode {
    /// `#tag` tokens with a trailing tag line
    #[default]
    Hashtag,
    /// `tags: [...]` inside the leading metadata block
    Yaml,
    /// `[[tag]]` tokens with a trailing tag line
    Inline,
    /// YAML first, then hashtag
    Both,
}

impl FormatMode {
    pub const ALL: [FormatMode; 4] = [
        FormatMode::Hashtag,
        FormatMode::Yaml,
        FormatMode::Inline,
        FormatMode::Both,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatMode::Hashtag => "hashtag",
            FormatMode::Yaml => "yaml",
            FormatMode::Inline => "inline",
            FormatMode::Both => "both",
        }
    }
}

impl fmt::Display for FormatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hashtag" => Ok(FormatMode::Hashtag),
            "yaml" => Ok(FormatMode::Yaml),
            "inline" => Ok(FormatMode::Inline),
            "both" => Ok(FormatMode::Both),
            other => Err(format!(
                "Invalid tag format '{}': expected hashtag, yaml, inline or both",
                other
            )),
        }
    }
}

/// Policy for combining new tags with existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Existing followed by new, duplicates allowed
    Append,
    /// Exactly the new tags
    Replace,
    /// Existing followed by new tags not already present (case-insensitive)
    #[default]
    Smart,
}

impl MergeMode {
    pub const ALL: [MergeMode; 3] = [MergeMode::Append, MergeMode::Replace, MergeMode::Smart];

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Append => "append",
            MergeMode::Replace => "replace",
            MergeMode::Smart => "smart",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(MergeMode::Append),
            "replace" => Ok(MergeMode::Replace),
            "smart" => Ok(MergeMode::Smart),
            other => Err(format!(
                "Invalid merge mode '{}': expected append, replace or smart",
                other
            )),
        }
    }
}

/// Default prompt template; `{content}` is replaced with the cleaned note text
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Generate relevant tags for the following content. \
Requirements: 1. Tags must be highly relevant to the content 2. Use the same language as the content \
3. Each tag should not exceed 4 words 4. Each tag must be unique, no duplicates \
5. Return only a JSON array of objects with \"tag\" and \"confidence\" fields, no explanations. \
Content: {content}";

/// Immutable settings snapshot for one generation call
#[derive(Debug, Clone)]
pub struct TaggingSettings {
    /// Provider used for generation
    pub active_provider: ProviderKind,
    /// Connection settings per provider
    pub providers: HashMap<ProviderKind, ProviderConfig>,
    /// Prompt with a `{content}` placeholder
    pub prompt_template: String,
    /// Maximum suggestions kept from a backend reply (>= 1)
    pub max_tags: usize,
    /// Inclusive confidence threshold
    pub min_confidence: f64,
    /// Group suggestions into parent/child pairs
    pub enable_hierarchy: bool,
    /// On-document tag syntax
    pub format: FormatMode,
    /// Merge policy
    pub merge_mode: MergeMode,
    /// Lowercase and slug suggested tags
    pub sanitize_tags: bool,
    /// Content is truncated to this many characters before generation
    pub max_content_chars: usize,
    /// Cleaned content shorter than this is not sent to a backend
    pub min_content_chars: usize,
}

impl TaggingSettings {
    /// Connection settings of the active provider
    pub fn active_config(&self) -> Option<&ProviderConfig> {
        self.providers.get(&self.active_provider)
    }
}

impl Default for TaggingSettings {
    fn default() -> Self {
        let providers = ProviderKind::ALL
            .into_iter()
            .map(|kind| (kind, ProviderConfig::default_for(kind)))
            .collect();

        Self {
            active_provider: ProviderKind::OpenAi,
            providers,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            max_tags: 10,
            min_confidence: 0.5,
            enable_hierarchy: false,
            format: FormatMode::Hashtag,
            merge_mode: MergeMode::Smart,
            sanitize_tags: false,
            max_content_chars: 4000,
            min_content_chars: 50,
        }
    }
}

/// Processing result for a single document in a batch
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Suggestions were generated and merged into the document
    Tagged {
        applied: Vec<TagSuggestion>,
        /// Suggestions that passed filtering but were not auto-applied
        rejected: Vec<TagSuggestion>,
        processing_time_ms: u64,
        written: bool,
    },
    /// Stored tags were removed
    Cleared { removed: Vec<String>, written: bool },
    /// Document was skipped (already tagged, nothing to merge)
    Skipped { reason: String },
    /// Generation, merge or storage failed
    Failed { error: String },
}

impl DocumentOutcome {
    /// Applied tag strings of a `Tagged` outcome
    pub fn applied_tags(&self) -> Vec<String> {
        match self {
            DocumentOutcome::Tagged { applied, .. } => applied.iter().map(|s| s.tag.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Aggregate counts for a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a DocumentOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                DocumentOutcome::Tagged { .. } | DocumentOutcome::Cleared { .. } => {
                    summary.processed += 1
                }
                DocumentOutcome::Skipped { .. } => summary.skipped += 1,
                DocumentOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}
