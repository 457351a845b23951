//! Confidence threshold applied to generated suggestions

use crate::model::TagSuggestion;

/// Keeps suggestions at or above a minimum confidence
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceFilter {
    min_confidence: f64,
}

impl ConfidenceFilter {
    pub fn new(min_confidence: f64) -> Self {
        Self {
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Drop suggestions below the threshold; order is preserved
    pub fn retain(&self, mut suggestions: Vec<TagSuggestion>) -> Vec<TagSuggestion> {
        suggestions.retain(|s| s.confidence >= self.min_confidence);
        suggestions
    }
}
