//! Parsing of free-form backend replies into suggestions

use note_tagger_domain::TagSuggestion;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Confidence for list items that carry none
pub const DEFAULT_CONFIDENCE: f64 = 0.8;
/// Confidence for tags recovered line by line
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

static LINE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)([A-Za-z][A-Za-z0-9_/-]*)").expect("Valid regex"));

/// Parse a reply; never fails, worst case returns nothing
///
/// The span from the first `[` to the last `]` is read as a JSON list of
/// strings or `{tag|name, confidence, category, description}` records.
/// Otherwise the first word-like token of each line becomes a tag.
pub fn parse_tag_response(raw: &str) -> Vec<TagSuggestion> {
    if let Some(items) = json_list(raw) {
        return items.iter().filter_map(suggestion_from_value).collect();
    }

    tracing::debug!("Reply has no JSON list, scanning lines");
    raw.lines().filter_map(suggestion_from_line).collect()
}

fn json_list(raw: &str) -> Option<Vec<Value>> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn suggestion_from_value(value: &Value) -> Option<TagSuggestion> {
    match value {
        Value::String(tag) => {
            let tag = tag.trim();
            (!tag.is_empty()).then(|| TagSuggestion::llm(tag, DEFAULT_CONFIDENCE))
        }
        Value::Object(fields) => {
            let tag = fields
                .get("tag")
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty())
                .or_else(|| fields.get("name").and_then(Value::as_str))?
                .trim();
            if tag.is_empty() {
                return None;
            }

            let confidence = match fields.get("confidence").and_then(Value::as_f64) {
                Some(c) if c != 0.0 && c.is_finite() => c.clamp(0.0, 1.0),
                _ => DEFAULT_CONFIDENCE,
            };

            let text_field = |key: &str| {
                fields
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };

            Some(TagSuggestion {
                category: text_field("category"),
                description: text_field("description"),
                ..TagSuggestion::llm(tag, confidence)
            })
        }
        _ => None,
    }
}

fn suggestion_from_line(line: &str) -> Option<TagSuggestion> {
    let token = LINE_TOKEN.captures(line)?.get(1)?.as_str();
    (token.len() > 1).then(|| TagSuggestion::llm(token, FALLBACK_CONFIDENCE))
}
