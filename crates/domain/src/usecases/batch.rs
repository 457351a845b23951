//! Sequential tagging of many documents

use std::sync::Arc;
use tokio::time::{Duration, sleep};

use crate::{
    format::collect_known_tags,
    model::{DocumentOutcome, MergeMode, TaggingSettings},
    ports::DocumentStore,
    usecases::{generate::TagGenerator, merge::TagMergeEngine},
};

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Skip documents that already carry tags
    pub skip_existing: bool,
    /// Pause between consecutive documents
    pub delay: Duration,
    /// Number of top suggestions applied per document (capped by `max_tags`)
    pub auto_apply_limit: usize,
    /// Compute merges without writing them
    pub dry_run: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            skip_existing: true,
            delay: Duration::from_millis(1000),
            auto_apply_limit: 3,
            dry_run: false,
        }
    }
}

/// Generates and applies tags to documents one at a time
pub struct BatchTagger<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    generator: Arc<TagGenerator>,
    settings: TaggingSettings,
    config: BatchConfig,
}

impl<S: DocumentStore + ?Sized> BatchTagger<S> {
    pub fn new(
        store: Arc<S>,
        generator: Arc<TagGenerator>,
        settings: TaggingSettings,
        config: BatchConfig,
    ) -> Self {
        Self {
            store,
            generator,
            settings,
            config,
        }
    }

    /// Tag each document in order; failures are recorded and the batch continues
    pub async fn run(&self, ids: &[String]) -> Vec<(String, DocumentOutcome)> {
        let mut outcomes = Vec::with_capacity(ids.len());

        for (index, id) in ids.iter().enumerate() {
            if index > 0 && !self.config.delay.is_zero() {
                sleep(self.config.delay).await;
            }

            let outcome = self.tag_document(id).await;
            match &outcome {
                DocumentOutcome::Tagged { written, .. } => {
                    let tags = outcome.applied_tags();
                    tracing::info!(document = %id, tags = ?tags, written, "Tagged document");
                }
                DocumentOutcome::Cleared { .. } => {}
                DocumentOutcome::Skipped { reason } => {
                    tracing::debug!(document = %id, reason = %reason, "Skipped document");
                }
                DocumentOutcome::Failed { error } => {
                    tracing::warn!(document = %id, error = %error, "Failed to tag document");
                }
            }
            outcomes.push((id.clone(), outcome));
        }

        outcomes
    }

    async fn tag_document(&self, id: &str) -> DocumentOutcome {
        let text = match self.store.read_document(id).await {
            Ok(text) => text,
            Err(e) => return DocumentOutcome::Failed { error: e.to_string() },
        };

        if self.config.skip_existing {
            let known = match self.store.known_tags(id).await {
                Ok(tags) => tags,
                Err(e) => {
                    tracing::debug!(
                        document = %id,
                        error = %e,
                        "Store could not list tags, scanning text instead"
                    );
                    collect_known_tags(&text)
                }
            };
            if !known.is_empty() {
                return DocumentOutcome::Skipped {
                    reason: format!("already has {} tag(s)", known.len()),
                };
            }
        }

        let result = self.generator.generate(&text, &self.settings).await;
        if let Some(error) = result.error {
            return DocumentOutcome::Failed { error };
        }

        let limit = self.config.auto_apply_limit.min(self.settings.max_tags);
        let mut applied = result.suggestions;
        let rejected = applied.split_off(limit.min(applied.len()));
        if applied.is_empty() {
            return DocumentOutcome::Skipped {
                reason: "no suggestions above threshold".to_string(),
            };
        }

        let tags: Vec<String> = applied.iter().map(|s| s.tag.clone()).collect();
        let outcome = match TagMergeEngine.merge(
            &text,
            &tags,
            self.settings.format,
            self.settings.merge_mode,
        ) {
            Ok(outcome) => outcome,
            Err(e) => return DocumentOutcome::Failed { error: e.to_string() },
        };

        if !outcome.changed {
            return DocumentOutcome::Skipped {
                reason: "tags already present".to_string(),
            };
        }

        let written = !self.config.dry_run;
        if written {
            if let Err(e) = self.store.write_document(id, &outcome.text).await {
                return DocumentOutcome::Failed { error: e.to_string() };
            }
        }

        DocumentOutcome::Tagged {
            applied,
            rejected,
            processing_time_ms: result.processing_time_ms,
            written,
        }
    }

    /// Remove stored tags from each document in the configured syntax
    pub async fn clear(&self, ids: &[String]) -> Vec<(String, DocumentOutcome)> {
        let mut outcomes = Vec::with_capacity(ids.len());

        for id in ids {
            let outcome = self.clear_document(id).await;
            if let DocumentOutcome::Failed { error } = &outcome {
                tracing::warn!(document = %id, error = %error, "Failed to clear tags");
            }
            outcomes.push((id.clone(), outcome));
        }

        outcomes
    }

    async fn clear_document(&self, id: &str) -> DocumentOutcome {
        let text = match self.store.read_document(id).await {
            Ok(text) => text,
            Err(e) => return DocumentOutcome::Failed { error: e.to_string() },
        };

        let outcome = match TagMergeEngine.merge(&text, &[], self.settings.format, MergeMode::Replace)
        {
            Ok(outcome) => outcome,
            Err(e) => return DocumentOutcome::Failed { error: e.to_string() },
        };

        if !outcome.changed {
            return DocumentOutcome::Skipped {
                reason: "no tags to clear".to_string(),
            };
        }

        let written = !self.config.dry_run;
        if written {
            if let Err(e) = self.store.write_document(id, &outcome.text).await {
                return DocumentOutcome::Failed { error: e.to_string() };
            }
        }

        DocumentOutcome::Cleared {
            removed: outcome.existing,
            written,
        }
    }
}
