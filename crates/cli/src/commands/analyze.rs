//! Analyze command - keyword and topic analysis of a note

use anyhow::{Result, bail};
use note_tagger_adapters::history::JsonHistoryFile;
use note_tagger_domain::{
    analysis::{ContentAnalysis, analyze},
    format::collect_known_tags,
    normalize::ContentNormalizer,
};
use serde::Serialize;
use std::path::PathBuf;

use super::{merge::display_tags, read_input};
use crate::args::AnalyzeArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct AnalyzeReport {
    #[serde(flatten)]
    analysis: ContentAnalysis,
    existing_tags: Vec<String>,
    recommended_tags: Vec<String>,
}

pub async fn execute(args: AnalyzeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let text = read_input(&args.input)?;
    if text.trim().is_empty() {
        bail!("No text provided for analysis");
    }

    let analysis = analyze(&ContentNormalizer::normalize(&text));

    // History recommendations are keyed by document path
    let recommended_tags = match args.input.file.as_ref().filter(|p| p.as_os_str() != "-") {
        Some(path) => match JsonHistoryFile::new(&config.general.history_path).load().await {
            Ok(history) => history.recommendations(&path.display().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load tag history");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let report = AnalyzeReport {
        analysis,
        existing_tags: collect_known_tags(&text),
        recommended_tags,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Content Analysis");
    println!("================");
    println!();
    println!("Words:      {}", report.analysis.word_count);
    println!("Complexity: {:.2}", report.analysis.complexity);
    println!("Keywords:   {}", display_tags(&report.analysis.keywords));
    println!("Topics:     {}", display_tags(&report.analysis.topics));
    println!("Existing:   {}", display_tags(&report.existing_tags));
    if !report.recommended_tags.is_empty() {
        println!("From history: {}", report.recommended_tags.join(", "));
    }

    Ok(())
}
