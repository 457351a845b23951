//! Reconciling new tags with the ones already stored in a document

use serde::Serialize;

use crate::format::{codec_for, FormatError};
use crate::model::{FormatMode, MergeMode};

/// Result of merging tags into a document snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Updated document text
    pub text: String,
    /// Tags found in the document before merging
    pub existing: Vec<String>,
    /// Tags stored in the document after merging
    pub final_tags: Vec<String>,
    /// Whether `text` differs from the input
    pub changed: bool,
}

/// Stateless merge of tag lists into document text
#[derive(Debug, Clone, Copy, Default)]
pub struct TagMergeEngine;

impl TagMergeEngine {
    /// Merge `new_tags` into `text` using the given syntax and policy
    ///
    /// New tags are first respelled so the chosen syntax reads them back
    /// unchanged. A document whose metadata block is never closed is
    /// rejected instead of being rewritten.
    pub fn merge(
        &self,
        text: &str,
        new_tags: &[String],
        format: FormatMode,
        mode: MergeMode,
    ) -> Result<MergeOutcome, FormatError> {
        let codec = codec_for(format);
        let existing = codec.extract_existing(text);
        let encoded: Vec<String> = new_tags
            .iter()
            .filter_map(|tag| codec.encode_tag(tag))
            .collect();
        let final_tags = final_tags(&existing, &encoded, mode);
        let updated = codec.inject(text, &final_tags)?;

        tracing::debug!(
            format = %format,
            mode = %mode,
            existing = existing.len(),
            final_tags = final_tags.len(),
            "Merged tags"
        );

        Ok(MergeOutcome {
            changed: updated != text,
            text: updated,
            existing,
            final_tags,
        })
    }

    /// Like [`merge`](Self::merge), but returns `text` unchanged on failure
    pub fn merge_text(
        &self,
        text: &str,
        new_tags: &[String],
        format: FormatMode,
        mode: MergeMode,
    ) -> String {
        match self.merge(text, new_tags, format, mode) {
            Ok(outcome) => outcome.text,
            Err(err) => {
                tracing::warn!(error = %err, "Leaving document unchanged");
                text.to_string()
            }
        }
    }

    /// Remove every stored tag in the given syntax
    pub fn clear(&self, text: &str, format: FormatMode) -> Result<MergeOutcome, FormatError> {
        self.merge(text, &[], format, MergeMode::Replace)
    }
}

/// Combine existing and new tags according to `mode`
pub fn final_tags(existing: &[String], new_tags: &[String], mode: MergeMode) -> Vec<String> {
    match mode {
        MergeMode::Append => existing.iter().chain(new_tags).cloned().collect(),
        MergeMode::Replace => new_tags.to_vec(),
        MergeMode::Smart => {
            let mut merged = existing.to_vec();
            let mut seen: Vec<String> = existing.iter().map(|t| t.to_lowercase()).collect();
            for tag in new_tags {
                let lowered = tag.to_lowercase();
                if !seen.contains(&lowered) {
                    seen.push(lowered);
                    merged.push(tag.clone());
                }
            }
            merged
        }
    }
}
