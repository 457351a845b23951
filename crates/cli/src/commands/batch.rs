//! Batch command - tag every note in a folder

use anyhow::{Context, Result};
use note_tagger_adapters::documents::FsDocumentStore;
use note_tagger_domain::{
    BatchSummary, DocumentFilter, DocumentOutcome, DocumentStore, usecases::BatchTagger,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{Decision, build_generator, record_history};
use crate::args::BatchArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct BatchReport {
    documents: Vec<DocumentReport>,
    summary: BatchSummary,
}

#[derive(Debug, Serialize)]
struct DocumentReport {
    id: String,
    #[serde(flatten)]
    outcome: DocumentOutcome,
}

pub async fn execute(args: BatchArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let vault = args.vault.clone().unwrap_or_else(|| config.general.vault_dir.clone());

    let store = Arc::new(
        FsDocumentStore::new(&vault)
            .with_context(|| format!("Failed to open vault: {}", vault.display()))?,
    );

    let filter = match args.folder {
        Some(ref folder) => DocumentFilter::in_folder(folder.clone()),
        None => DocumentFilter::default(),
    };
    let ids = store
        .list_documents(&filter)
        .await
        .context("Failed to list notes")?;

    if ids.is_empty() {
        println!("No notes found in {}", vault.display());
        return Ok(());
    }

    let (generator, settings) = build_generator(&config, None)?;

    let mut batch_config = config.batch_config();
    batch_config.dry_run = args.dry_run;
    if args.no_skip_existing {
        batch_config.skip_existing = false;
    }
    if let Some(delay_ms) = args.delay_ms {
        batch_config.delay = Duration::from_millis(delay_ms);
    }

    tracing::info!(
        vault = %vault.display(),
        notes = ids.len(),
        provider = %settings.active_provider,
        dry_run = batch_config.dry_run,
        "Starting batch"
    );

    let tagger = BatchTagger::new(store, Arc::new(generator), settings, batch_config);
    let outcomes = tagger.run(&ids).await;
    let summary = BatchSummary::from_outcomes(outcomes.iter().map(|(_, o)| o));

    let decisions: Vec<Decision> = outcomes
        .iter()
        .filter_map(|(id, outcome)| match outcome {
            DocumentOutcome::Tagged {
                applied,
                rejected,
                written: true,
                ..
            } => Some(Decision {
                document: id.clone(),
                applied: applied.clone(),
                rejected: rejected.clone(),
            }),
            _ => None,
        })
        .collect();
    if let Err(e) = record_history(&config, &decisions).await {
        tracing::warn!(error = %e, "Failed to record tag history");
    }

    if args.json {
        let report = BatchReport {
            documents: outcomes
                .into_iter()
                .map(|(id, outcome)| DocumentReport { id, outcome })
                .collect(),
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (id, outcome) in &outcomes {
        match outcome {
            DocumentOutcome::Tagged { written, .. } => {
                let suffix = if *written { "" } else { " (dry run)" };
                println!("✓ {}: {}{}", id, outcome.applied_tags().join(", "), suffix);
            }
            DocumentOutcome::Cleared { removed, .. } => {
                println!("✓ {}: cleared {}", id, removed.join(", "));
            }
            DocumentOutcome::Skipped { reason } => println!("- {}: {}", id, reason),
            DocumentOutcome::Failed { error } => println!("✗ {}: {}", id, error),
        }
    }

    println!();
    println!(
        "Processed: {}, Skipped: {}, Failed: {}",
        summary.processed, summary.skipped, summary.failed
    );

    Ok(())
}
