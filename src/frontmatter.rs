//! YAML front matter at the top of markdown files.
//!
//! ```text
//! ---
//! title: Hello World
//! description: A first post
//! date: 2024-05-01
//! author: Jane
//! tags: [intro, meta]
//! ---
//! # Hello World
//! ...
//! ```
//!
//! A file that does not start with a `---` line has no front matter; its
//! whole text is the body. Keys other than the ones below are ignored so
//! content written for other tools still loads.

use serde::Deserialize;
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("front matter is not closed by a '---' line")]
    Unterminated,
    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Recognized front-matter keys. All optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Kept as written; ISO dates sort correctly as strings.
    pub date: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
}

/// Split a document into its front matter and body.
pub fn parse(source: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = strip_delimiter_line(source) else {
        return Ok((FrontMatter::default(), source));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let front = if yaml.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(yaml)?
            };
            return Ok((front, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

/// Return the text after an opening `---` line, if the document has one.
fn strip_delimiter_line(source: &str) -> Option<&str> {
    let rest = source.strip_prefix(DELIMITER)?;
    let (first_line, after) = match rest.find('\n') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };
    first_line.trim().is_empty().then_some(after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_front_matter_returns_whole_body() {
        let (front, body) = parse("# Title\n\nText").unwrap();
        assert_eq!(front, FrontMatter::default());
        assert_eq!(body, "# Title\n\nText");
    }

    #[test]
    fn parses_known_keys() {
        let src = "---\ntitle: Hello\ndescription: First post\ndate: 2024-05-01\nauthor: Jane\ntags: [a, b]\ndraft: true\n---\nBody\n";
        let (front, body) = parse(src).unwrap();
        assert_eq!(front.title.as_deref(), Some("Hello"));
        assert_eq!(front.description.as_deref(), Some("First post"));
        assert_eq!(front.date.as_deref(), Some("2024-05-01"));
        assert_eq!(front.author.as_deref(), Some("Jane"));
        assert_eq!(front.tags, vec!["a", "b"]);
        assert!(front.draft);
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (front, _) = parse("---\ntitle: X\nlayout: wide\n---\n").unwrap();
        assert_eq!(front.title.as_deref(), Some("X"));
    }

    #[test]
    fn empty_block_is_default() {
        let (front, body) = parse("---\n---\ntext").unwrap();
        assert_eq!(front, FrontMatter::default());
        assert_eq!(body, "text");
    }

    #[test]
    fn crlf_line_endings() {
        let (front, body) = parse("---\r\ntitle: Win\r\n---\r\nBody").unwrap();
        assert_eq!(front.title.as_deref(), Some("Win"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let (front, _) = parse("\u{feff}---\ntitle: Bom\n---\n").unwrap();
        assert_eq!(front.title.as_deref(), Some("Bom"));
    }

    #[test]
    fn thematic_break_with_text_is_not_front_matter() {
        let (front, body) = parse("--- not yaml\ntext").unwrap();
        assert_eq!(front, FrontMatter::default());
        assert_eq!(body, "--- not yaml\ntext");
    }

    #[test]
    fn unterminated_block_is_error() {
        let result = parse("---\ntitle: Open\nno close");
        assert!(matches!(result, Err(FrontMatterError::Unterminated)));
    }

    #[test]
    fn invalid_yaml_is_error() {
        let result = parse("---\ntitle: [unclosed\n---\n");
        assert!(matches!(result, Err(FrontMatterError::Yaml(_))));
    }
}
