//! Generate command - suggest tags for one note and optionally apply them

use anyhow::{Context, Result, bail};
use note_tagger_domain::{
    GenerationResult,
    usecases::{MergeOutcome, TagMergeEngine},
};
use serde::Serialize;
use std::path::PathBuf;

use super::{Decision, build_generator, read_input, record_history};
use crate::args::GenerateArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct GenerateReport {
    #[serde(flatten)]
    result: GenerationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    merge: Option<MergeOutcome>,
}

pub async fn execute(args: GenerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let text = read_input(&args.input)?;
    if text.trim().is_empty() {
        bail!("No text provided for tag generation");
    }

    let (generator, settings) = build_generator(&config, args.provider.as_deref())?;

    tracing::info!(
        provider = %settings.active_provider,
        text_length = text.len(),
        "Generating tags"
    );

    let result = generator.generate(&text, &settings).await;

    if let Some(ref error) = result.error {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        bail!("Tag generation failed: {}", error);
    }

    let mut merge = None;
    if args.apply {
        // clap guarantees --file with --apply
        let path = args.input.file.as_ref().context("--apply requires --file")?;
        if path.as_os_str() == "-" {
            bail!("--apply needs a note file, not stdin");
        }

        let limit = args.limit.unwrap_or(settings.max_tags);
        let mut applied = result.suggestions.clone();
        let rejected = applied.split_off(limit.min(applied.len()));
        let tags: Vec<String> = applied.iter().map(|s| s.tag.clone()).collect();

        let outcome = TagMergeEngine
            .merge(&text, &tags, settings.format, settings.merge_mode)
            .with_context(|| format!("Failed to merge tags into {}", path.display()))?;

        if outcome.changed && !args.dry_run {
            std::fs::write(path, &outcome.text)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;

            let decision = Decision {
                document: path.display().to_string(),
                applied,
                rejected,
            };
            if let Err(e) = record_history(&config, &[decision]).await {
                tracing::warn!(error = %e, "Failed to record tag history");
            }
        }

        merge = Some(outcome);
    }

    if args.json {
        let report = GenerateReport { result, merge };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(());
    }

    print_suggestions(&result);

    if let Some(outcome) = merge {
        println!();
        if !outcome.changed {
            println!("Nothing to apply: all tags already present.");
        } else if args.dry_run {
            println!("Merged note (dry run, not written):");
            println!();
            println!("{}", outcome.text);
        } else {
            println!("Applied tags: {}", outcome.final_tags.join(", "));
        }
    }

    Ok(())
}

fn print_suggestions(result: &GenerationResult) {
    println!("Tag Suggestions ({})", result.provider_id);
    println!("=====================");
    println!();

    if result.suggestions.is_empty() {
        println!("No tags above the confidence threshold.");
    } else {
        for suggestion in &result.suggestions {
            print!(
                "  - {} (confidence: {:.2})",
                suggestion.tag, suggestion.confidence
            );
            if let Some(ref category) = suggestion.category {
                print!(" [{}]", category);
            }
            println!();
            if let Some(ref description) = suggestion.description {
                println!("    {}", description);
            }
        }
    }

    println!();
    println!("Processed in {} ms", result.processing_time_ms);
}
