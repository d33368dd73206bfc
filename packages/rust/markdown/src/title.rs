//! Title resolution.
//!
//! Precedence: front matter `title` > ATX h1 on the first line > setext h1 > none.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use mdjson_shared::TITLE_KEY;

/// Where a resolved title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    FrontMatter,
    AtxHeading,
    SetextHeading,
}

/// Resolve the title for a document.
///
/// A front matter `title` is returned verbatim, whatever its type, even when
/// the body carries its own heading.
pub fn resolve_title(
    front_matter: &Map<String, Value>,
    body: &str,
) -> Option<(Value, TitleSource)> {
    if let Some(title) = front_matter.get(TITLE_KEY) {
        debug!("title taken from front matter");
        return Some((title.clone(), TitleSource::FrontMatter));
    }

    let (title, source) = extract_title(body)?;
    debug!(?source, %title, "title extracted from body");
    Some((Value::String(title), source))
}

/// Derive a title from the first non-blank line of a Markdown body.
///
/// Only level-1 headings count. Inline markup in the heading text is kept
/// literally.
pub fn extract_title(body: &str) -> Option<(String, TitleSource)> {
    static ATX_H1_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^#[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("valid regex")
    });
    static SETEXT_H1_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^=+[ \t]*$").expect("valid regex"));

    let mut lines = body.lines().skip_while(|line| line.trim().is_empty());
    let first = lines.next()?;

    if let Some(caps) = ATX_H1_RE.captures(first) {
        // A text made only of `#` is a closing sequence on an empty heading.
        let text = caps[1].trim();
        if text.chars().all(|c| c == '#') {
            return None;
        }
        return Some((text.to_string(), TitleSource::AtxHeading));
    }

    if !opens_paragraph(first) {
        return None;
    }

    let underline = lines.next()?;
    if SETEXT_H1_RE.is_match(underline) {
        let text = first.trim();
        if !text.is_empty() {
            return Some((text.to_string(), TitleSource::SetextHeading));
        }
    }

    None
}

/// Whether a line starts paragraph text rather than another block.
///
/// Only a paragraph line can be underlined into a setext heading.
fn opens_paragraph(line: &str) -> bool {
    static BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(concat!(
            r"^(?: {4}|\t",
            r"| {0,3}(?:#|>|```|~~~|[-*+](?:[ \t]|$)|\d{1,9}[.)](?:[ \t]|$)))",
        ))
        .expect("valid regex")
    });

    !BLOCK_START_RE.is_match(line)
}
