//! On-document tag syntaxes
//!
//! Each codec reads the tags already stored in a document and rewrites the
//! document so that it stores exactly a given list.

pub mod hashtag;
pub mod inline;
pub mod yaml;

pub use hashtag::HashtagCodec;
pub use inline::InlineCodec;
pub use yaml::YamlCodec;

use crate::model::FormatMode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Document starts a metadata block that is never closed; left untouched")]
    MalformedFrontmatter,
}

/// Reads and writes one tag syntax
pub trait TagCodec: Send + Sync {
    /// Tags currently stored in `text`, in document order
    fn extract_existing(&self, text: &str) -> Vec<String>;

    /// Spelling of `tag` that reads back unchanged, or `None` if nothing survives
    fn encode_tag(&self, tag: &str) -> Option<String>;

    /// Rewrite `text` so it stores exactly `tags`; an empty list removes them
    fn inject(&self, text: &str, tags: &[String]) -> Result<String, FormatError>;
}

/// Metadata block first, then hashtags in the body
#[derive(Debug, Clone, Copy, Default)]
pub struct BothCodec;

impl TagCodec for BothCodec {
    fn extract_existing(&self, text: &str) -> Vec<String> {
        let mut tags = YamlCodec.extract_existing(text);
        tags.extend(HashtagCodec.extract_existing(text));
        dedup_in_order(tags)
    }

    fn encode_tag(&self, tag: &str) -> Option<String> {
        HashtagCodec.encode_tag(tag)
    }

    fn inject(&self, text: &str, tags: &[String]) -> Result<String, FormatError> {
        let tags = encode_all(self, tags);
        let with_yaml = YamlCodec.inject(text, &tags)?;
        HashtagCodec.inject(&with_yaml, &tags)
    }
}

pub fn codec_for(format: FormatMode) -> &'static dyn TagCodec {
    match format {
        FormatMode::Hashtag => &HashtagCodec,
        FormatMode::Yaml => &YamlCodec,
        FormatMode::Inline => &InlineCodec,
        FormatMode::Both => &BothCodec,
    }
}

/// Every tag stored in the metadata block or as a hashtag, without repeats
pub fn collect_known_tags(text: &str) -> Vec<String> {
    BothCodec.extract_existing(text)
}

fn dedup_in_order(tags: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

fn encode_all(codec: &dyn TagCodec, tags: &[String]) -> Vec<String> {
    tags.iter().filter_map(|tag| codec.encode_tag(tag)).collect()
}

/// Trim and collapse inner whitespace runs to single spaces
fn collapse_whitespace(tag: &str) -> Option<String> {
    let collapsed = tag.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Collapse whitespace runs to single spaces, trim, and append a tag line
fn rewrite_body(body: &str, tag_line: Option<String>) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match tag_line {
        Some(line) => format!("{}\n\n{}", collapsed, line),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_both_reads_yaml_then_hashtags() {
        let text = "---\ntags: [\"a\", \"b\"]\n---\n\nBody #b #c";
        assert_eq!(BothCodec.extract_existing(text), tags(&["a", "b", "c"]));
    }

    #[test]
    fn test_both_writes_both_syntaxes() {
        let out = BothCodec.inject("Body text", &tags(&["x", "y"])).unwrap();
        assert_eq!(out, "---\ntags: [\"x\", \"y\"]\n---\n\nBody text\n\n#x #y");
        assert_eq!(BothCodec.extract_existing(&out), tags(&["x", "y"]));
    }

    #[test]
    fn test_both_empty_removes_everything() {
        let text = "---\ntags: [\"x\"]\n---\n\nBody text\n\n#x";
        assert_eq!(BothCodec.inject(text, &[]).unwrap(), "Body text");
    }

    #[test]
    fn test_both_encodes_for_the_stricter_syntax() {
        assert_eq!(BothCodec.encode_tag("rust, async").as_deref(), Some("rust-async"));
        let out = BothCodec.inject("", &tags(&["web dev"])).unwrap();
        assert_eq!(BothCodec.extract_existing(&out), tags(&["web-dev"]));
    }

    #[test]
    fn test_codec_for_every_mode() {
        let text = "---\ntags: [\"meta\"]\n---\n\nSee [[link]] and #hash";
        assert_eq!(codec_for(FormatMode::Hashtag).extract_existing(text), tags(&["hash"]));
        assert_eq!(codec_for(FormatMode::Yaml).extract_existing(text), tags(&["meta"]));
        assert_eq!(codec_for(FormatMode::Inline).extract_existing(text), tags(&["link"]));
        assert_eq!(
            codec_for(FormatMode::Both).extract_existing(text),
            tags(&["meta", "hash"])
        );
    }

    #[test]
    fn test_malformed_block_is_rejected_by_every_codec() {
        let text = "---\ntitle: open\nno closing delimiter";
        for format in FormatMode::ALL {
            let result = codec_for(format).inject(text, &tags(&["a"]));
            assert_eq!(result, Err(FormatError::MalformedFrontmatter), "{format}");
        }
    }

    #[test]
    fn test_collect_known_tags() {
        let text = "---\ntags:\n  - rust\n  - notes\n---\n\nMore on #rust and #async";
        assert_eq!(collect_known_tags(text), tags(&["rust", "notes", "async"]));
    }
}
