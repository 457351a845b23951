//! Configuration loading and management

use anyhow::{Context, Result};
use note_tagger_adapters::llm::RequestOptions;
use note_tagger_domain::{
    DEFAULT_PROMPT_TEMPLATE, FormatMode, MergeMode, ProviderConfig, ProviderKind, TaggingSettings,
    usecases::BatchConfig,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub tagging: TaggingConfig,

    #[serde(default)]
    pub batch: BatchSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Root of the note collection
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,

    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub claude: ClaudeConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeConfig {
    #[serde(default = "default_claude_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_claude_base_url")]
    pub base_url: String,

    #[serde(default = "default_claude_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,

    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// Prompt template; must contain `{content}`
    #[serde(default = "default_prompt")]
    pub prompt: String,

    #[serde(default = "default_max_tags")]
    pub max_tags: usize,

    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    #[serde(default)]
    pub enable_hierarchy: bool,

    #[serde(default)]
    pub format: FormatMode,

    #[serde(default)]
    pub merge_mode: MergeMode,

    #[serde(default)]
    pub sanitize_tags: bool,

    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    #[serde(default = "default_true")]
    pub skip_existing: bool,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_auto_apply_limit")]
    pub auto_apply_limit: usize,
}

// Default value functions
fn default_vault_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("./tag-history.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    500
}

fn default_timeout() -> u64 {
    60
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    ProviderConfig::default_for(ProviderKind::OpenAi).base_url
}

fn default_openai_model() -> String {
    ProviderConfig::default_for(ProviderKind::OpenAi).model
}

fn default_claude_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_claude_base_url() -> String {
    ProviderConfig::default_for(ProviderKind::Claude).base_url
}

fn default_claude_model() -> String {
    ProviderConfig::default_for(ProviderKind::Claude).model
}

fn default_ollama_base_url() -> String {
    ProviderConfig::default_for(ProviderKind::Ollama).base_url
}

fn default_ollama_model() -> String {
    ProviderConfig::default_for(ProviderKind::Ollama).model
}

fn default_num_predict() -> u32 {
    200
}

fn default_prompt() -> String {
    DEFAULT_PROMPT_TEMPLATE.to_string()
}

fn default_max_tags() -> usize {
    10
}

fn default_min_confidence() -> f64 {
    0.5
}

fn default_max_content_chars() -> usize {
    4000
}

fn default_min_content_chars() -> usize {
    50
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_auto_apply_limit() -> usize {
    3
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            history_path: default_history_path(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout(),
            openai: OpenAiConfig::default(),
            claude: ClaudeConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_api_key_env(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
        }
    }
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_claude_api_key_env(),
            base_url: default_claude_base_url(),
            model: default_claude_model(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            num_predict: default_num_predict(),
        }
    }
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            max_tags: default_max_tags(),
            min_confidence: default_min_confidence(),
            enable_hierarchy: false,
            format: FormatMode::default(),
            merge_mode: MergeMode::default(),
            sanitize_tags: false,
            max_content_chars: default_max_content_chars(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            skip_existing: default_true(),
            delay_ms: default_delay_ms(),
            auto_apply_limit: default_auto_apply_limit(),
        }
    }
}

/// Read an API key from the named environment variable
///
/// Unset and empty variables both mean "no key configured".
pub fn load_api_key(env_var: &str) -> Option<SecretString> {
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Some(SecretString::new(key.into())),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("NOTE_TAGGER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Reject values the tagging pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        self.provider_kind()?;

        if !self.tagging.prompt.contains("{content}") {
            anyhow::bail!("tagging.prompt must contain a {{content}} placeholder");
        }
        if self.tagging.max_tags == 0 {
            anyhow::bail!("tagging.max_tags must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.tagging.min_confidence) {
            anyhow::bail!(
                "tagging.min_confidence must be between 0.0 and 1.0 (got {})",
                self.tagging.min_confidence
            );
        }
        Ok(())
    }

    pub fn provider_kind(&self) -> Result<ProviderKind> {
        self.llm
            .provider
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
    }

    /// Immutable settings snapshot for the generator, keys read from the environment
    pub fn tagging_settings(&self) -> Result<TaggingSettings> {
        self.validate()?;
        let active_provider = self.provider_kind()?;

        let mut providers = HashMap::new();
        for kind in ProviderKind::ALL {
            let mut provider = ProviderConfig::default_for(kind);
            match kind {
                ProviderKind::OpenAi => {
                    provider.base_url = self.llm.openai.base_url.clone();
                    provider.model = self.llm.openai.model.clone();
                    provider.api_key = load_api_key(&self.llm.openai.api_key_env);
                }
                ProviderKind::Claude => {
                    provider.base_url = self.llm.claude.base_url.clone();
                    provider.model = self.llm.claude.model.clone();
                    provider.api_key = load_api_key(&self.llm.claude.api_key_env);
                }
                ProviderKind::Ollama => {
                    provider.base_url = self.llm.ollama.base_url.clone();
                    provider.model = self.llm.ollama.model.clone();
                }
                ProviderKind::Stub => {}
            }
            provider.enabled = kind == active_provider;
            providers.insert(kind, provider);
        }

        Ok(TaggingSettings {
            active_provider,
            providers,
            prompt_template: self.tagging.prompt.clone(),
            max_tags: self.tagging.max_tags,
            min_confidence: self.tagging.min_confidence,
            enable_hierarchy: self.tagging.enable_hierarchy,
            format: self.tagging.format,
            merge_mode: self.tagging.merge_mode,
            sanitize_tags: self.tagging.sanitize_tags,
            max_content_chars: self.tagging.max_content_chars,
            min_content_chars: self.tagging.min_content_chars,
        })
    }

    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            temperature: self.llm.temperature,
            max_output_tokens: self.llm.max_output_tokens,
            ollama_num_predict: self.llm.ollama.num_predict,
            timeout_secs: self.llm.timeout_secs,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            skip_existing: self.batch.skip_existing,
            delay: Duration::from_millis(self.batch.delay_ms),
            auto_apply_limit: self.batch.auto_apply_limit,
            dry_run: false,
        }
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# note-tagger configuration

[general]
vault_dir = "."
history_path = "./tag-history.json"
log_level = "info"

[llm]
provider = "openai"  # openai, claude, ollama, stub
temperature = 0.3
max_output_tokens = 500
timeout_secs = 60

[llm.openai]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"

[llm.claude]
api_key_env = "ANTHROPIC_API_KEY"
base_url = "https://api.anthropic.com"
model = "claude-4-sonnet"

[llm.ollama]
base_url = "http://localhost:11434"
model = "llama2"
num_predict = 200

[tagging]
# prompt = "Generate tags for: {content}"
max_tags = 10
min_confidence = 0.5
enable_hierarchy = false
format = "hashtag"  # hashtag, yaml, inline, both
merge_mode = "smart"  # append, replace, smart
sanitize_tags = false
max_content_chars = 4000
min_content_chars = 50

[batch]
skip_existing = true
delay_ms = 1000
auto_apply_limit = 3
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_toml_parses_to_defaults() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(parsed.llm.provider, defaults.llm.provider);
        assert_eq!(parsed.llm.openai.model, defaults.llm.openai.model);
        assert_eq!(parsed.llm.claude.base_url, defaults.llm.claude.base_url);
        assert_eq!(parsed.llm.ollama.num_predict, 200);
        assert_eq!(parsed.tagging.format, FormatMode::Hashtag);
        assert_eq!(parsed.tagging.merge_mode, MergeMode::Smart);
        assert_eq!(parsed.tagging.prompt, DEFAULT_PROMPT_TEMPLATE);
        assert_eq!(parsed.batch.delay_ms, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[llm]\nprovider = \"ollama\"\n\n[tagging]\nformat = \"yaml\"\nmax_tags = 4\n"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.provider_kind().unwrap(), ProviderKind::Ollama);
        assert_eq!(config.tagging.format, FormatMode::Yaml);
        assert_eq!(config.tagging.max_tags, 4);
        assert_eq!(config.tagging.min_content_chars, 50);
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/note-tagger.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.llm.provider = "gemini".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.tagging.prompt = "no placeholder".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.tagging.min_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.tagging.max_tags = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tagging_settings_mapping() {
        let mut config = AppConfig::default();
        config.llm.provider = "stub".to_string();
        config.llm.ollama.model = "mistral".to_string();
        config.llm.openai.api_key_env = "NOTE_TAGGER_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        config.tagging.enable_hierarchy = true;

        let settings = config.tagging_settings().unwrap();
        assert_eq!(settings.active_provider, ProviderKind::Stub);
        assert!(settings.enable_hierarchy);
        assert_eq!(settings.providers[&ProviderKind::Ollama].model, "mistral");
        assert!(!settings.providers[&ProviderKind::OpenAi].has_api_key());
        assert!(settings.providers[&ProviderKind::Stub].enabled);
        assert!(!settings.providers[&ProviderKind::OpenAi].enabled);
    }

    #[test]
    fn test_request_options_and_batch_config() {
        let mut config = AppConfig::default();
        config.llm.ollama.num_predict = 64;
        config.batch.delay_ms = 250;

        let options = config.request_options();
        assert_eq!(options.ollama_num_predict, 64);
        assert_eq!(options.max_output_tokens, 500);

        let batch = config.batch_config();
        assert_eq!(batch.delay, Duration::from_millis(250));
        assert!(batch.skip_existing);
        assert!(!batch.dry_run);
    }
}
