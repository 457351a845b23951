//! `[[tag]]` tokens anywhere in the body

use regex::Regex;
use std::sync::LazyLock;

use super::{collapse_whitespace, encode_all, rewrite_body, FormatError, TagCodec};
use crate::frontmatter::{self, Frontmatter};

static INLINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("Valid regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCodec;

impl TagCodec for InlineCodec {
    fn extract_existing(&self, text: &str) -> Vec<String> {
        let body = frontmatter::split(text).body_or(text);
        INLINE_PATTERN
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    /// Brackets cannot appear inside a token
    fn encode_tag(&self, tag: &str) -> Option<String> {
        collapse_whitespace(&tag.replace(['[', ']'], " "))
    }

    fn inject(&self, text: &str, tags: &[String]) -> Result<String, FormatError> {
        let tags = encode_all(self, tags);
        let tag_line = (!tags.is_empty()).then(|| {
            tags.iter()
                .map(|tag| format!("[[{}]]", tag))
                .collect::<Vec<_>>()
                .join(" ")
        });

        match frontmatter::split(text) {
            Frontmatter::Malformed => Err(FormatError::MalformedFrontmatter),
            Frontmatter::Absent => {
                let stripped = INLINE_PATTERN.replace_all(text, "");
                Ok(rewrite_body(&stripped, tag_line))
            }
            Frontmatter::Present { yaml, body } => {
                let stripped = INLINE_PATTERN.replace_all(body, "");
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
    fn test_extract_tokens() {
        let text = "Read [[Rust Book]] and [[ tokio ]] today. [[]] is ignored.";
        assert_eq!(InlineCodec.extract_existing(text), tags(&["Rust Book", "tokio"]));
    }

    #[test]
    fn test_inject_replaces_tokens() {
        let out = InlineCodec
            .inject("Read [[old]] notes.\n\nMore.", &tags(&["a", "b"]))
            .unwrap();
        assert_eq!(out, "Read notes. More.\n\n[[a]] [[b]]");
        assert_eq!(InlineCodec.extract_existing(&out), tags(&["a", "b"]));
    }

    #[test]
    fn test_encode_tag() {
        assert_eq!(InlineCodec.encode_tag("[[nested]]").as_deref(), Some("nested"));
        assert_eq!(InlineCodec.encode_tag(" Rust \n Book ").as_deref(), Some("Rust Book"));
        assert_eq!(InlineCodec.encode_tag("[]"), None);
    }

    #[test]
    fn test_inject_empty_strips_all() {
        let out = InlineCodec.inject("Body\n\n[[a]] [[b]]", &[]).unwrap();
        assert_eq!(out, "Body");
    }
}
