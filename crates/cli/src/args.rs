//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use note_tagger_domain::{FormatMode, MergeMode};
use std::path::PathBuf;

/// note-tagger: LLM-assisted tag generation and merging for markdown notes
#[derive(Parser, Debug)]
#[command(name = "note-tagger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest tags for one note
    Generate(GenerateArgs),

    /// Merge explicit tags into a note
    Merge(MergeArgs),

    /// Remove tags from notes
    Clear(ClearArgs),

    /// Tag every note in a folder
    Batch(BatchArgs),

    /// Show keyword and topic analysis of a note
    Analyze(AnalyzeArgs),

    /// Inspect or manage the tagging history
    History(HistoryArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Text to process
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Note file to process (use - for stdin)
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Override the configured provider (openai, claude, ollama, stub)
    #[arg(long)]
    pub provider: Option<String>,

    /// Merge the suggestions into the note file
    #[arg(long, requires = "file")]
    pub apply: bool,

    /// Apply at most this many suggestions
    #[arg(long, requires = "apply")]
    pub limit: Option<usize>,

    /// Show the merged note without writing it
    #[arg(long, requires = "apply")]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Note file to update
    #[arg(long)]
    pub file: PathBuf,

    /// Tag to merge (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Tag syntax (defaults to the configured format)
    #[arg(long)]
    pub format: Option<FormatMode>,

    /// Merge policy (defaults to the configured mode)
    #[arg(long)]
    pub mode: Option<MergeMode>,

    /// Print the merged note instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Note files to clear
    #[arg(long = "file", value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Tag syntax (defaults to the configured format)
    #[arg(long)]
    pub format: Option<FormatMode>,

    /// Report what would be removed without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Only notes under this folder, relative to the vault
    #[arg(long)]
    pub folder: Option<String>,

    /// Override the configured vault directory
    #[arg(long)]
    pub vault: Option<PathBuf>,

    /// Also process notes that already carry tags
    #[arg(long)]
    pub no_skip_existing: bool,

    /// Override the delay between notes in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Compute merges without writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Most frequently applied tags
    Popular {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Accept rate per tag
    Performance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the history as JSON (stdout by default)
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the history with entries from a JSON export
    Import { path: PathBuf },

    /// Delete all history entries
    Clear,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
