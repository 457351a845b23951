//! Leading metadata block detection
//!
//! A block is a first line `---`, any number of lines, and a closing line
//! `---`. Trailing whitespace on delimiter lines and `\r\n` endings are
//! accepted. Output always uses `\n`.

/// Result of looking for a leading metadata block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontmatter<'a> {
    /// Text does not start with a delimiter line
    Absent,
    /// A complete block; `yaml` excludes both delimiters, `body` is everything
    /// after the closing delimiter line
    Present { yaml: &'a str, body: &'a str },
    /// Opening delimiter without a closing one
    Malformed,
}

impl<'a> Frontmatter<'a> {
    /// Body text, treating absent and malformed blocks as part of the body
    pub fn body_or(&self, text: &'a str) -> &'a str {
        match self {
            Frontmatter::Present { body, .. } => body,
            _ => text,
        }
    }
}

/// Split a document into its leading metadata block and body
pub fn split(text: &str) -> Frontmatter<'_> {
    let Some(first_newline) = text.find('\n') else {
        return if text.trim_end() == "---" {
            Frontmatter::Malformed
        } else {
            Frontmatter::Absent
        };
    };

    if text[..first_newline].trim_end() != "---" {
        return Frontmatter::Absent;
    }

    let yaml_start = first_newline + 1;
    let mut offset = yaml_start;

    while offset < text.len() {
        let line_end = text[offset..].find('\n').map(|i| offset + i);
        let line = &text[offset..line_end.unwrap_or(text.len())];

        if line.trim_end() == "---" {
            let yaml = &text[yaml_start..offset];
            let yaml = yaml.strip_suffix('\n').unwrap_or(yaml);
            let yaml = yaml.strip_suffix('\r').unwrap_or(yaml);
            let body = line_end.map_or("", |end| &text[end + 1..]);
            return Frontmatter::Present { yaml, body };
        }

        match line_end {
            Some(end) => offset = end + 1,
            None => break,
        }
    }

    Frontmatter::Malformed
}

/// Reassemble a block and a body, separated by one blank line
pub fn join(yaml: &str, body: &str) -> String {
    format!("---\n{}\n---\n\n{}", yaml, body)
}
