//! History command - inspect or manage the tagging history

use anyhow::{Context, Result};
use note_tagger_adapters::history::JsonHistoryFile;
use std::path::PathBuf;

use crate::args::{HistoryArgs, HistoryCommands};
use crate::config::AppConfig;

pub async fn execute(args: HistoryArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let file = JsonHistoryFile::new(&config.general.history_path);
    let mut history = file.load().await?;

    match args.command {
        HistoryCommands::Popular { limit, json } => {
            let popular = history.popular_tags(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&popular)?);
            } else if popular.is_empty() {
                println!("No tags recorded yet.");
            } else {
                for entry in popular {
                    println!("{:>5}  {}", entry.count, entry.tag);
                }
            }
        }
        HistoryCommands::Performance { json } => {
            let performance = history.tag_performance();
            if json {
                println!("{}", serde_json::to_string_pretty(&performance)?);
            } else if performance.is_empty() {
                println!("No tags recorded yet.");
            } else {
                for entry in performance {
                    println!("{:>5.1}%  {}", entry.success_rate * 100.0, entry.tag);
                }
            }
        }
        HistoryCommands::Export { output } => {
            let data = history.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, data)
                        .with_context(|| format!("Failed to write file: {}", path.display()))?;
                    println!("Exported {} entries to {}", history.len(), path.display());
                }
                None => println!("{}", data),
            }
        }
        HistoryCommands::Import { path } => {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let count = history
                .import_json(&data)
                .with_context(|| format!("Invalid history file: {}", path.display()))?;
            file.save(&history).await?;
            println!("Imported {} entries", count);
        }
        HistoryCommands::Clear => {
            let count = history.len();
            history.clear();
            file.save(&history).await?;
            println!("Cleared {} entries", count);
        }
    }

    Ok(())
}
