//! `#tag` tokens anywhere in the body

use regex::Regex;
use std::sync::LazyLock;

use super::{encode_all, rewrite_body, FormatError, TagCodec};
use crate::frontmatter::{self, Frontmatter};

/// `#` followed by word characters (CJK included), hyphen, underscore or slash
pub static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[\w/-]+").expect("Valid regex"));

static HASHTAG_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w/-]+").expect("Valid regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct HashtagCodec;

impl TagCodec for HashtagCodec {
    fn extract_existing(&self, text: &str) -> Vec<String> {
        let body = frontmatter::split(text).body_or(text);
        HASHTAG_PATTERN
            .find_iter(body)
            .map(|m| m.as_str()[1..].to_string())
            .collect()
    }

    /// Whitespace runs become `-`; anything else outside `[\w/-]` is dropped
    fn encode_tag(&self, tag: &str) -> Option<String> {
        let hyphenated = tag.split_whitespace().collect::<Vec<_>>().join("-");
        let encoded = HASHTAG_DISALLOWED.replace_all(&hyphenated, "");
        (!encoded.is_empty()).then(|| encoded.into_owned())
    }

    fn inject(&self, text: &str, tags: &[String]) -> Result<String, FormatError> {
        let tags = encode_all(self, tags);
        let tag_line = (!tags.is_empty()).then(|| {
            tags.iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" ")
        });

        match frontmatter::split(text) {
            Frontmatter::Malformed => Err(FormatError::MalformedFrontmatter),
            Frontmatter::Absent => {
                let stripped = HASHTAG_PATTERN.replace_all(text, "");
                Ok(rewrite_body(&stripped, tag_line))
            }
            Frontmatter::Present { yaml, body } => {
                let stripped = HASHTAG_PATTERN.replace_all(body, "");
                Ok(frontmatter::join(yaml, &rewrite_body(&stripped, tag_line)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_keeps_order_and_repeats() {
        let text = "Notes on #rust and #async/await, then #rust again.";
        assert_eq!(
            HashtagCodec.extract_existing(text),
            tags(&["rust", "async/await", "rust"])
        );
    }

    #[test]
    fn test_extract_cjk_and_hyphens() {
        let text = "読書 #日本語 #long-form #snake_case";
        assert_eq!(
            HashtagCodec.extract_existing(text),
            tags(&["日本語", "long-form", "snake_case"])
        );
    }

    #[test]
    fn test_headings_are_not_tags() {
        assert!(HashtagCodec.extract_existing("# Heading\n\n## Sub").is_empty());
    }

    #[test]
    fn test_inject_strips_and_appends() {
        let out = HashtagCodec
            .inject("Hello #old\n\nBody text.", &tags(&["old", "new"]))
            .unwrap();
        assert_eq!(out, "Hello Body text.\n\n#old #new");
    }

    #[test]
    fn test_inject_empty_leaves_no_tag_line() {
        let out = HashtagCodec.inject("Body  #gone here\n", &[]).unwrap();
        assert_eq!(out, "Body here");
    }

    #[test]
    fn test_round_trip_from_empty_text() {
        let list = tags(&["alpha", "beta/gamma", "δ-tag", "漢字"]);
        let out = HashtagCodec.inject("", &list).unwrap();
        assert_eq!(HashtagCodec.extract_existing(&out), list);
    }

    #[test]
    fn test_encode_tag() {
        assert_eq!(HashtagCodec.encode_tag("machine learning").as_deref(), Some("machine-learning"));
        assert_eq!(HashtagCodec.encode_tag("node.js").as_deref(), Some("nodejs"));
        assert_eq!(HashtagCodec.encode_tag("#rust").as_deref(), Some("rust"));
        assert_eq!(HashtagCodec.encode_tag(" 日本語  メモ ").as_deref(), Some("日本語-メモ"));
        assert_eq!(HashtagCodec.encode_tag("lang/rust").as_deref(), Some("lang/rust"));
        assert_eq!(HashtagCodec.encode_tag("..."), None);
    }

    #[test]
    fn test_inject_writes_readable_tokens() {
        let out = HashtagCodec
            .inject("Body text.", &tags(&["machine learning", "node.js", "!!"]))
            .unwrap();
        assert_eq!(out, "Body text.\n\n#machine-learning #nodejs");
        assert_eq!(
            HashtagCodec.extract_existing(&out),
            tags(&["machine-learning", "nodejs"])
        );
    }

    #[test]
    fn test_frontmatter_is_left_intact() {
        let text = "---\ntitle: Trip\nauthor: me\n---\nDay one #travel";
        let out = HashtagCodec.inject(text, &tags(&["travel", "log"])).unwrap();
        assert_eq!(out, "---\ntitle: Trip\nauthor: me\n---\n\nDay one\n\n#travel #log");
    }
}
