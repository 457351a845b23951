//! Clear command - remove tags from notes

use anyhow::{Context, Result};
use note_tagger_domain::usecases::TagMergeEngine;
use std::path::PathBuf;

use super::merge::display_tags;
use crate::args::ClearArgs;
use crate::config::AppConfig;

pub async fn execute(args: ClearArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let format = args.format.unwrap_or(config.tagging.format);

    let mut failed = 0usize;
    for path in &args.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let outcome = match TagMergeEngine.clear(&text, format) {
            Ok(outcome) => outcome,
            Err(e) => {
                // Malformed notes are left untouched; keep going with the rest
                eprintln!("✗ {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        if !outcome.changed {
            println!("- {}: no tags", path.display());
            continue;
        }

        if !args.dry_run {
            std::fs::write(path, &outcome.text)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }

        let verb = if args.dry_run { "would remove" } else { "removed" };
        println!(
            "✓ {}: {} {}",
            path.display(),
            verb,
            display_tags(&outcome.existing)
        );
    }

    if failed > 0 {
        anyhow::bail!("{} file(s) could not be cleared", failed);
    }

    Ok(())
}
