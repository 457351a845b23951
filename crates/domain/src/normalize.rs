//! Content cleanup before a note is sent to a generation backend

use regex::Regex;
use std::sync::LazyLock;

use crate::format::hashtag::HASHTAG_PATTERN;
use crate::frontmatter;

static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\([^)\n]*\)").expect("Valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]\([^)\n]*\)").expect("Valid regex"));
static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("Valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]*`").expect("Valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("Valid regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*\n]*?)\*").expect("Valid regex"));
static STRIKETHROUGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^\n]*?)~~").expect("Valid regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("Valid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").expect("Valid regex"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+").expect("Valid regex"));
static BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("Valid regex"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Valid regex"));

static TAG_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s/-]").expect("Valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Valid regex"));

/// Maximum length of a sanitized tag, in characters
pub const MAX_TAG_CHARS: usize = 50;

/// Strips markup and metadata noise from raw note text
pub struct ContentNormalizer;

impl ContentNormalizer {
    /// Produce plain prose from a markdown note
    ///
    /// Removes, in order: the leading metadata block, hashtag tokens, images,
    /// link syntax (keeping the label), fenced and inline code, emphasis
    /// markers (keeping the inner text), heading markers, list and blockquote
    /// prefixes. Runs of three or more newlines collapse to two and the result
    /// is trimmed. An unterminated metadata block is left in place.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        let text = frontmatter::split(raw).body_or(raw);

        let text = HASHTAG_PATTERN.replace_all(text, "");
        let text = IMAGE.replace_all(&text, "");
        let text = LINK.replace_all(&text, "$1");
        let text = FENCED_CODE.replace_all(&text, "");
        let text = INLINE_CODE.replace_all(&text, "");
        let text = BOLD.replace_all(&text, "$1");
        let text = ITALIC.replace_all(&text, "$1");
        let text = STRIKETHROUGH.replace_all(&text, "$1");
        let text = HEADING.replace_all(&text, "");
        let text = LIST_ITEM.replace_all(&text, "");
        let text = NUMBERED_ITEM.replace_all(&text, "");
        let text = BLOCKQUOTE.replace_all(&text, "");
        let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");

        text.trim().to_string()
    }
}

/// Shorten content to at most `max_chars` characters
///
/// Cuts at the last sentence end when it falls in the final fifth of the
/// window, otherwise cuts hard and appends `...`.
#[must_use]
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    let Some((cut, _)) = content.char_indices().nth(max_chars) else {
        return content.to_string();
    };

    let truncated = &content[..cut];
    if let Some(dot) = truncated.rfind('.') {
        let dot_chars = truncated[..dot].chars().count();
        if dot_chars as f64 > max_chars as f64 * 0.8 {
            return truncated[..=dot].to_string();
        }
    }

    format!("{}...", truncated)
}

/// Turn free-form text into a tag slug
///
/// Lowercases, drops characters other than word characters, whitespace, `-`
/// and `/`, joins words with `-`, trims edge hyphens and caps the length.
#[must_use]
pub fn sanitize_tag(tag: &str) -> String {
    let lowered = tag.to_lowercase();
    let cleaned = TAG_DISALLOWED.replace_all(&lowered, "");
    let hyphenated = WHITESPACE.replace_all(cleaned.trim(), "-");
    hyphenated
        .trim_matches('-')
        .chars()
        .take(MAX_TAG_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_frontmatter_and_hashtags() {
        let raw = "---\ntitle: Note\ntags: [a]\n---\nSome text about #rust and #async/await.";
        assert_eq!(ContentNormalizer::normalize(raw), "Some text about  and .");
    }

    #[test]
    fn test_keeps_malformed_frontmatter() {
        let raw = "---\ntitle: Note\nbody without closing";
        assert_eq!(ContentNormalizer::normalize(raw), raw);
    }

    #[test]
    fn test_links_and_images() {
        let raw = "See ![diagram](img.png) and [the docs](https://example.com) here.";
        assert_eq!(ContentNormalizer::normalize(raw), "See  and the docs here.");
    }

    #[test]
    fn test_code_removed() {
        let raw = "Intro\n```rust\nfn main() {}\n```\nUse `cargo` daily.";
        assert_eq!(ContentNormalizer::normalize(raw), "Intro\n\nUse  daily.");
    }

    #[test]
    fn test_emphasis_keeps_inner_text() {
        let raw = "This is **bold**, *italic* and ~~gone~~ text.";
        assert_eq!(
            ContentNormalizer::normalize(raw),
            "This is bold, italic and gone text."
        );
    }

    #[test]
    fn test_block_prefixes_removed() {
        let raw = "# Title\n## Section\n- first\n* second\n1. third\n> quoted";
        assert_eq!(
            ContentNormalizer::normalize(raw),
            "Title\nSection\nfirst\nsecond\nthird\nquoted"
        );
    }

    #[test]
    fn test_collapses_newlines_and_trims() {
        let raw = "\n\nOne\n\n\n\n\nTwo\n\n";
        assert_eq!(ContentNormalizer::normalize(raw), "One\n\nTwo");
    }

    #[test]
    fn test_is_deterministic() {
        let raw = "# Heading\nSome **text** with #tag and [link](x).";
        assert_eq!(
            ContentNormalizer::normalize(raw),
            ContentNormalizer::normalize(raw)
        );
    }

    #[test]
    fn test_truncate_short_content_unchanged() {
        assert_eq!(truncate_content("short", 100), "short");
    }

    #[test]
    fn test_truncate_at_sentence_boundary() {
        let content = format!("{}. tail text goes on", "a".repeat(90));
        assert_eq!(truncate_content(&content, 100), format!("{}.", "a".repeat(90)));
    }

    #[test]
    fn test_truncate_hard_cut() {
        let content = "b".repeat(120);
        assert_eq!(truncate_content(&content, 100), format!("{}...", "b".repeat(100)));
    }

    #[test]
    fn test_truncate_counts_characters() {
        let content = "日本語のテキスト".repeat(10);
        let truncated = truncate_content(&content, 10);
        assert_eq!(truncated.chars().count(), 13);
    }

    #[test]
    fn test_sanitize_tag() {
        assert_eq!(sanitize_tag("Machine Learning!"), "machine-learning");
        assert_eq!(sanitize_tag("  --Rust--  "), "rust");
        assert_eq!(sanitize_tag("lang/Rust"), "lang/rust");
        assert_eq!(sanitize_tag("C++"), "c");
        assert_eq!(sanitize_tag(&"x".repeat(80)).len(), MAX_TAG_CHARS);
    }
}
