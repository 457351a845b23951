//! Merge command - merge explicit tags into a note

use anyhow::{Context, Result, bail};
use note_tagger_domain::usecases::TagMergeEngine;
use std::path::PathBuf;

use crate::args::MergeArgs;
use crate::config::AppConfig;

pub async fn execute(args: MergeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let format = args.format.unwrap_or(config.tagging.format);
    let mode = args.mode.unwrap_or(config.tagging.merge_mode);

    let tags: Vec<String> = args
        .tags
        .iter()
        .map(|t| t.trim().trim_start_matches('#').to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read file: {}", args.file.display()))?;

    let outcome = match TagMergeEngine.merge(&text, &tags, format, mode) {
        Ok(outcome) => outcome,
        Err(e) => bail!("{}: {}", args.file.display(), e),
    };

    tracing::info!(
        file = %args.file.display(),
        format = %format,
        mode = %mode,
        existing = outcome.existing.len(),
        final_tags = outcome.final_tags.len(),
        "Merged tags"
    );

    if outcome.changed && !args.dry_run {
        std::fs::write(&args.file, &outcome.text)
            .with_context(|| format!("Failed to write file: {}", args.file.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("Existing: {}", display_tags(&outcome.existing));
    println!("Final:    {}", display_tags(&outcome.final_tags));

    if !outcome.changed {
        println!("No changes.");
    } else if args.dry_run {
        println!();
        println!("{}", outcome.text);
    } else {
        println!("Updated {}", args.file.display());
    }

    Ok(())
}

pub(crate) fn display_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "(none)".to_string()
    } else {
        tags.join(", ")
    }
}
