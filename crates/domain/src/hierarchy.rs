//! Parent/child grouping of suggestions by inferred category

use crate::model::{TagSource, TagSuggestion};

/// Category used when no keyword matches
pub const GENERAL_CATEGORY: &str = "general";

const PARENT_CONFIDENCE_FACTOR: f64 = 0.9;

/// Category table; the first category with a matching keyword wins
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "technology",
        &["programming", "software", "computer", "tech", "digital", "ai", "ml", "data"],
    ),
    (
        "science",
        &["research", "study", "analysis", "experiment", "theory", "hypothesis"],
    ),
    (
        "business",
        &["management", "strategy", "marketing", "finance", "economics", "startup"],
    ),
    (
        "personal",
        &["life", "health", "fitness", "hobby", "travel", "family", "relationship"],
    ),
    (
        "education",
        &["learning", "course", "tutorial", "knowledge", "skill", "training"],
    ),
    (
        "creative",
        &["art", "design", "music", "writing", "photography", "creative"],
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyClassifier;

impl HierarchyClassifier {
    /// Category whose keyword occurs in the tag, case-insensitively
    pub fn infer_category(tag: &str) -> &'static str {
        let lowered = tag.to_lowercase();
        CATEGORIES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(GENERAL_CATEGORY)
    }

    /// Regroup suggestions by category, in order of first appearance
    ///
    /// A category with several members gains a parent suggestion and its
    /// members become `category/tag` children. Single members pass through.
    pub fn classify(&self, suggestions: Vec<TagSuggestion>) -> Vec<TagSuggestion> {
        let mut groups: Vec<(&'static str, Vec<TagSuggestion>)> = Vec::new();

        for suggestion in suggestions {
            let category = Self::infer_category(&suggestion.tag);
            match groups.iter_mut().find(|(name, _)| *name == category) {
                Some((_, members)) => members.push(suggestion),
                None => groups.push((category, vec![suggestion])),
            }
        }

        let mut out = Vec::new();
        for (category, members) in groups {
            if members.len() == 1 {
                out.extend(members);
                continue;
            }

            let max_confidence = members
                .iter()
                .map(|s| s.confidence)
                .fold(0.0_f64, f64::max);

            let mut parent = TagSuggestion::with_source(
                category,
                max_confidence * PARENT_CONFIDENCE_FACTOR,
                TagSource::Keyword,
            );
            parent.category = Some("parent".to_string());
            out.push(parent);

            out.extend(members.into_iter().map(|member| TagSuggestion {
                tag: format!("{}/{}", category, member.tag),
                category: Some("child".to_string()),
                ..member
            }));
        }

        out
    }
}
