//! Record of tags applied to and rejected from documents
//!
//! Owned by the caller; the generation pipeline never reads it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::TagSuggestion;

/// Maximum number of retained entries; the oldest are dropped first
pub const MAX_HISTORY_ENTRIES: usize = 1000;

const MAX_RECOMMENDATIONS: usize = 10;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Invalid history data: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Document id the tags were applied to
    pub document: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub applied_tags: Vec<String>,
    pub rejected_tags: Vec<String>,
    /// Mean confidence of the applied suggestions, 0 when none were applied
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagPerformance {
    pub tag: String,
    /// applied / (applied + rejected)
    pub success_rate: f64,
}

/// Bounded list of entries, newest first
#[derive(Debug, Clone, Default)]
pub struct TagHistory {
    entries: Vec<HistoryEntry>,
}

impl TagHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(
        &mut self,
        document: impl Into<String>,
        applied: &[TagSuggestion],
        rejected: &[TagSuggestion],
        now: OffsetDateTime,
    ) -> &HistoryEntry {
        let confidence = if applied.is_empty() {
            0.0
        } else {
            applied.iter().map(|s| s.confidence).sum::<f64>() / applied.len() as f64
        };

        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            document: document.into(),
            timestamp: now,
            applied_tags: applied.iter().map(|s| s.tag.clone()).collect(),
            rejected_tags: rejected.iter().map(|s| s.tag.clone()).collect(),
            confidence,
        };

        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        &self.entries[0]
    }

    /// Most frequently applied tags; ties keep first-seen order
    pub fn popular_tags(&self, limit: usize) -> Vec<TagCount> {
        let mut counts: Vec<TagCount> = Vec::new();
        for tag in self.entries.iter().flat_map(|e| &e.applied_tags) {
            match counts.iter_mut().find(|c| &c.tag == tag) {
                Some(count) => count.count += 1,
                None => counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                }),
            }
        }

        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        counts
    }

    /// Share of suggestions for each tag that were applied, best first
    ///
    /// Tags that were only ever rejected are omitted.
    pub fn tag_performance(&self) -> Vec<TagPerformance> {
        let mut order: Vec<&str> = Vec::new();
        let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();

        for entry in &self.entries {
            let applied = entry.applied_tags.iter().map(|t| (t, true));
            let rejected = entry.rejected_tags.iter().map(|t| (t, false));
            for (tag, was_applied) in applied.chain(rejected) {
                let slot = stats.entry(tag.as_str()).or_insert_with(|| {
                    order.push(tag.as_str());
                    (0, 0)
                });
                if was_applied {
                    slot.0 += 1;
                } else {
                    slot.1 += 1;
                }
            }
        }

        let mut performance: Vec<TagPerformance> = order
            .into_iter()
            .filter_map(|tag| {
                let (applied, rejected) = stats[tag];
                let success_rate = applied as f64 / (applied + rejected) as f64;
                (success_rate > 0.0).then(|| TagPerformance {
                    tag: tag.to_string(),
                    success_rate,
                })
            })
            .collect();

        performance.sort_by(|a, b| b.success_rate.total_cmp(&a.success_rate));
        performance
    }

    /// Tags applied to documents whose path shares words with `text`
    pub fn recommendations(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let keywords: Vec<&str> = lowered.split_whitespace().collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        let mut scores: Vec<(String, f64)> = Vec::new();
        for entry in &self.entries {
            let path = entry.document.to_lowercase();
            let path_words: Vec<&str> = path
                .split(|c: char| c.is_whitespace() || matches!(c, '/' | '-' | '.'))
                .filter(|w| !w.is_empty())
                .collect();

            let common = keywords
                .iter()
                .filter(|k| path_words.iter().any(|w| w.contains(**k) || k.contains(w)))
                .count();
            if common == 0 {
                continue;
            }

            let similarity = common as f64 / keywords.len().max(path_words.len()) as f64;
            for tag in &entry.applied_tags {
                let weight = similarity * entry.confidence;
                match scores.iter_mut().find(|(t, _)| t == tag) {
                    Some((_, score)) => *score += weight,
                    None => scores.push((tag.clone(), weight)),
                }
            }
        }

        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|(tag, _)| tag)
            .collect()
    }

    pub fn export_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Replace all entries with a previously exported list
    pub fn import_json(&mut self, data: &str) -> Result<usize, HistoryError> {
        let mut entries: Vec<HistoryEntry> = serde_json::from_str(data)?;
        entries.truncate(MAX_HISTORY_ENTRIES);
        self.entries = entries;
        Ok(self.entries.len())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
