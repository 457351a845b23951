//! `tags:` field inside the leading metadata block

use super::{collapse_whitespace, encode_all, FormatError, TagCodec};
use crate::frontmatter::{self, Frontmatter};

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

/// Location of the `tags:` field as a half-open range of block lines
struct TagsField {
    start: usize,
    end: usize,
    tags: Vec<String>,
}

impl TagCodec for YamlCodec {
    fn extract_existing(&self, text: &str) -> Vec<String> {
        match frontmatter::split(text) {
            Frontmatter::Present { yaml, .. } => {
                let lines: Vec<&str> = yaml.lines().collect();
                find_tags_field(&lines).map(|f| f.tags).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// Items are quoted on write, so only line breaks need folding
    fn encode_tag(&self, tag: &str) -> Option<String> {
        collapse_whitespace(tag)
    }

    fn inject(&self, text: &str, tags: &[String]) -> Result<String, FormatError> {
        let encoded = encode_all(self, tags);
        let tags = encoded.as_slice();
        let (yaml, body) = match frontmatter::split(text) {
            Frontmatter::Malformed => return Err(FormatError::MalformedFrontmatter),
            Frontmatter::Absent if tags.is_empty() => return Ok(text.to_string()),
            Frontmatter::Absent => return Ok(frontmatter::join(&tags_line(tags), text)),
            Frontmatter::Present { yaml, body } => (yaml, body),
        };

        let mut lines: Vec<String> = yaml.lines().map(str::to_string).collect();
        let borrowed: Vec<&str> = lines.iter().map(String::as_str).collect();
        let field = find_tags_field(&borrowed).map(|f| (f.start, f.end));

        if tags.is_empty() {
            if let Some((start, end)) = field {
                lines.drain(start..end);
            }
            if lines.iter().all(|line| line.trim().is_empty()) {
                return Ok(body.trim_start_matches(['\n', '\r']).to_string());
            }
        } else {
            match field {
                Some((start, end)) => {
                    lines.drain(start..end);
                    lines.insert(start, tags_line(tags));
                }
                None => lines.push(tags_line(tags)),
            }
        }

        Ok(format!("---\n{}\n---\n{}", lines.join("\n"), body))
    }
}

/// `tags: ["a", "b"]`
fn tags_line(tags: &[String]) -> String {
    let items = tags
        .iter()
        .map(|tag| format!("\"{}\"", tag.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("tags: [{}]", items)
}

fn find_tags_field(lines: &[&str]) -> Option<TagsField> {
    let start = lines.iter().position(|line| line.starts_with("tags:"))?;
    let value = lines[start]["tags:".len()..].trim();

    if let Some(inner) = value.strip_prefix('[') {
        let inner = inner.trim_end().strip_suffix(']').unwrap_or(inner);
        return Some(TagsField {
            start,
            end: start + 1,
            tags: split_items(inner),
        });
    }

    if !value.is_empty() {
        return Some(TagsField {
            start,
            end: start + 1,
            tags: split_items(value),
        });
    }

    let mut end = start + 1;
    let mut tags = Vec::new();
    while end < lines.len() {
        let Some(item) = lines[end].trim_start().strip_prefix('-') else {
            break;
        };
        let item = unquote(item);
        if !item.is_empty() {
            tags.push(item);
        }
        end += 1;
    }

    Some(TagsField { start, end, tags })
}

/// Split a flow list on commas that sit outside quoted items
fn split_items(list: &str) -> Vec<String> {
    let mut raw = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = list.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        match (quote, c) {
            (Some('"'), '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (Some('\''), '\'') if chars.peek() == Some(&'\'') => {
                current.push('\'');
                chars.next();
            }
            (Some(open), c) if c == open => quote = None,
            (None, '"' | '\'') if current.trim() == c.to_string() => quote = Some(c),
            (None, ',') => {
                current.pop();
                raw.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }
    raw.push(current);

    raw.iter()
        .map(|item| unquote(item))
        .filter(|item| !item.is_empty())
        .collect()
}

fn unquote(item: &str) -> String {
    let item = item.trim();
    if let Some(inner) = strip_quotes(item, '"') {
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.extend(chars.next()),
                _ => out.push(c),
            }
        }
        return out.trim().to_string();
    }
    if let Some(inner) = strip_quotes(item, '\'') {
        return inner.replace("''", "'").trim().to_string();
    }
    item.to_string()
}

fn strip_quotes(item: &str, quote: char) -> Option<&str> {
    if item.len() < 2 {
        return None;
    }
    item.strip_prefix(quote)?.strip_suffix(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_bracket_list() {
        let text = "---\ntitle: x\ntags: [\"a\", 'b', c]\n---\nBody";
        assert_eq!(YamlCodec.extract_existing(text), tags(&["a", "b", "c"]));
    }

    #[test]
    fn test_extract_list_form() {
        let text = "---\ntags:\n  - one\n  - \"two\"\n-three\nauthor: me\n---\n";
        assert_eq!(YamlCodec.extract_existing(text), tags(&["one", "two", "three"]));
    }

    #[test]
    fn test_extract_scalar() {
        let text = "---\ntags: solo, duo\n---\n";
        assert_eq!(YamlCodec.extract_existing(text), tags(&["solo", "duo"]));
    }

    #[test]
    fn test_extract_without_block_or_field() {
        assert!(YamlCodec.extract_existing("tags: [a]").is_empty());
        assert!(YamlCodec.extract_existing("---\ntitle: x\n---\n").is_empty());
        assert!(YamlCodec.extract_existing("---\ntags: [a]\nunterminated").is_empty());
        assert!(YamlCodec.extract_existing("---\n  tags: [nested]\n---\n").is_empty());
    }

    #[test]
    fn test_inject_creates_block() {
        let out = YamlCodec.inject("", &tags(&["a", "b"])).unwrap();
        assert_eq!(out, "---\ntags: [\"a\", \"b\"]\n---\n\n");
    }

    #[test]
    fn test_inject_rewrites_field_in_place() {
        let text = "---\ntitle: x\ntags:\n  - old\n  - older\ndate: today\n---\nBody\n";
        let out = YamlCodec.inject(text, &tags(&["new"])).unwrap();
        assert_eq!(out, "---\ntitle: x\ntags: [\"new\"]\ndate: today\n---\nBody\n");
    }

    #[test]
    fn test_inject_appends_field() {
        let text = "---\ntitle: x\n---\n\nBody";
        let out = YamlCodec.inject(text, &tags(&["t"])).unwrap();
        assert_eq!(out, "---\ntitle: x\ntags: [\"t\"]\n---\n\nBody");
    }

    #[test]
    fn test_inject_empty_removes_field_only() {
        let text = "---\ntitle: x\ntags: [\"a\"]\n---\nBody";
        let out = YamlCodec.inject(text, &[]).unwrap();
        assert_eq!(out, "---\ntitle: x\n---\nBody");
    }

    #[test]
    fn test_inject_empty_removes_emptied_block() {
        let text = "---\ntags: [\"a\"]\n---\n\nBody";
        assert_eq!(YamlCodec.inject(text, &[]).unwrap(), "Body");
    }

    #[test]
    fn test_inject_empty_without_block_is_noop() {
        let text = "Plain body #kept";
        assert_eq!(YamlCodec.inject(text, &[]).unwrap(), text);
    }

    #[test]
    fn test_commas_and_quotes_inside_items() {
        let list = tags(&["rust, async", "say \"hi\"", r"back\slash"]);
        let out = YamlCodec.inject("", &list).unwrap();
        assert_eq!(
            out,
            "---\ntags: [\"rust, async\", \"say \\\"hi\\\"\", \"back\\\\slash\"]\n---\n\n"
        );
        assert_eq!(YamlCodec.extract_existing(&out), list);
    }

    #[test]
    fn test_extract_single_quoted_items() {
        let text = "---\ntags: ['it''s, fine', b]\n---\n";
        assert_eq!(YamlCodec.extract_existing(text), tags(&["it's, fine", "b"]));
    }

    #[test]
    fn test_inject_folds_line_breaks() {
        let out = YamlCodec.inject("", &tags(&["two\nlines", "  "])).unwrap();
        assert_eq!(out, "---\ntags: [\"two lines\"]\n---\n\n");
    }

    #[test]
    fn test_crlf_block() {
        let text = "---\r\ntags: [a]\r\n---\r\nBody";
        assert_eq!(YamlCodec.extract_existing(text), tags(&["a"]));
        let out = YamlCodec.inject(text, &tags(&["a", "b"])).unwrap();
        assert_eq!(out, "---\ntags: [\"a\", \"b\"]\n---\nBody");
    }
}
