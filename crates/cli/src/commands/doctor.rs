//! Doctor command - validate configuration and show status

use anyhow::Result;
use note_tagger_adapters::{documents::FsDocumentStore, history::JsonHistoryFile};
use note_tagger_domain::{DocumentFilter, DocumentStore, ProviderKind};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    vault: CheckResult,
    llm: CheckResult,
    history: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        vault: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        history: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => match c.validate() {
            Ok(()) => {
                report.config = CheckResult::ok("Configuration loaded successfully");
                Some(c)
            }
            Err(e) => {
                report.config = CheckResult::error(format!("Invalid config: {}", e));
                None
            }
        },
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.vault = check_vault(&config.general.vault_dir).await;
        report.llm = check_llm(config);
        report.history = check_history(&config.general.history_path).await;
    }

    let checks = [&report.config, &report.vault, &report.llm, &report.history];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_vault(vault_dir: &Path) -> CheckResult {
    let store = match FsDocumentStore::new(vault_dir) {
        Ok(store) => store,
        Err(e) => return CheckResult::error(format!("{}: {}", vault_dir.display(), e)),
    };

    match store.list_documents(&DocumentFilter::default()).await {
        Ok(ids) if ids.is_empty() => {
            CheckResult::warn(format!("No markdown notes in {}", vault_dir.display()))
        }
        Ok(ids) => CheckResult::ok(format!("{} notes in {}", ids.len(), vault_dir.display()))
            .with_details(serde_json::json!({ "notes": ids.len() })),
        Err(e) => CheckResult::error(format!("Failed to list notes: {}", e)),
    }
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let kind = match config.provider_kind() {
        Ok(kind) => kind,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    match kind {
        ProviderKind::OpenAi => check_api_key_provider(
            kind,
            &config.llm.openai.model,
            &config.llm.openai.api_key_env,
        ),
        ProviderKind::Claude => check_api_key_provider(
            kind,
            &config.llm.claude.model,
            &config.llm.claude.api_key_env,
        ),
        ProviderKind::Ollama => {
            let base_url = config.llm.ollama.base_url.trim();
            if base_url.is_empty() {
                return CheckResult::error("Ollama base_url is empty");
            }
            CheckResult::ok(format!(
                "Provider: ollama, Model: {}, base_url: {}",
                config.llm.ollama.model, base_url
            ))
        }
        ProviderKind::Stub => CheckResult::warn("Provider: stub (offline keyword suggestions)"),
    }
}

fn check_api_key_provider(kind: ProviderKind, model: &str, api_key_env: &str) -> CheckResult {
    if api_key_env.is_empty() {
        return CheckResult::error(format!("No API key env var configured for {}", kind));
    }

    match std::env::var(api_key_env) {
        Ok(val) if !val.trim().is_empty() => CheckResult::ok(format!(
            "Provider: {}, Model: {}, API key: {} (set)",
            kind, model, api_key_env
        )),
        _ => CheckResult::error(format!(
            "Provider: {}, Model: {}, API key: {} (not set)",
            kind, model, api_key_env
        )),
    }
}

async fn check_history(path: &Path) -> CheckResult {
    match JsonHistoryFile::new(path).load().await {
        Ok(history) if history.is_empty() => {
            CheckResult::ok(format!("No history yet ({})", path.display()))
        }
        Ok(history) => CheckResult::ok(format!(
            "{} entries in {}",
            history.len(),
            path.display()
        )),
        Err(e) => CheckResult::warn(format!("History unreadable: {}", e)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("note-tagger Doctor Report");
    println!("=========================");
    println!();

    print_check("Config", &report.config);
    print_check("Vault", &report.vault);
    print_check("LLM Provider", &report.llm);
    print_check("History", &report.history);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to tag! Try: note-tagger batch --dry-run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
