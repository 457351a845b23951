//! Subcommand implementations

use anyhow::{Context, Result};
use note_tagger_adapters::{history::JsonHistoryFile, llm::build_registry};
use note_tagger_domain::{
    Clock, ProviderKind, SystemClock, TagSuggestion, TaggingSettings, usecases::TagGenerator,
};
use std::io::{self, Read};

use crate::args::InputArgs;
use crate::config::AppConfig;

pub mod analyze;
pub mod batch;
pub mod clear;
pub mod config;
pub mod doctor;
pub mod generate;
pub mod history;
pub mod merge;

/// Read note text from `--text`, `--file` (`-` is stdin) or stdin
pub(crate) fn read_input(input: &InputArgs) -> Result<String> {
    if let Some(ref text) = input.text {
        return Ok(text.clone());
    }

    if let Some(ref path) = input.file {
        if path.as_os_str() == "-" {
            return read_stdin();
        }

        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()));
    }

    read_stdin()
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read from stdin")?;
    Ok(text)
}

/// Generator wired with every provider plus the settings snapshot it runs with
pub(crate) fn build_generator(
    config: &AppConfig,
    provider_override: Option<&str>,
) -> Result<(TagGenerator, TaggingSettings)> {
    let mut settings = config
        .tagging_settings()
        .context("Invalid tagging configuration")?;

    if let Some(provider) = provider_override {
        let kind: ProviderKind = provider.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        settings.active_provider = kind;
    }

    let registry = build_registry(&settings, &config.request_options());
    Ok((TagGenerator::new(registry), settings))
}

/// Applied and rejected suggestions for one document
pub(crate) struct Decision {
    pub document: String,
    pub applied: Vec<TagSuggestion>,
    pub rejected: Vec<TagSuggestion>,
}

/// Append decisions to the history file
pub(crate) async fn record_history(config: &AppConfig, decisions: &[Decision]) -> Result<()> {
    if decisions.is_empty() {
        return Ok(());
    }

    let file = JsonHistoryFile::new(&config.general.history_path);
    let mut history = file.load().await?;
    let now = SystemClock.now();
    for decision in decisions {
        history.record(
            decision.document.clone(),
            &decision.applied,
            &decision.rejected,
            now,
        );
    }
    file.save(&history).await?;

    tracing::debug!(
        path = %file.path().display(),
        entries = history.len(),
        "Saved tag history"
    );
    Ok(())
}
