//! Markdown parsing for mdjson: front matter, titles, and HTML rendering.
//!
//! [`process`] runs the three steps over one document's text. Title
//! resolution and rendering both work from the split body and do not depend
//! on each other.

pub mod frontmatter;
pub mod render;
pub mod title;

use serde_json::{Map, Value};
use tracing::instrument;

use mdjson_shared::{RenderOptions, Result};

pub use frontmatter::{Split, split_front_matter};
pub use render::{parser_options, render};
pub use title::{TitleSource, extract_title, resolve_title};

/// The parts of a processed Markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    /// Front matter keys in source order.
    pub front_matter: Map<String, Value>,
    /// Resolved title, if any.
    pub title: Option<Value>,
    /// Where the title came from.
    pub title_source: Option<TitleSource>,
    /// Rendered HTML markup of the body.
    pub html: String,
}

/// Split front matter, resolve the title, and render the body.
#[instrument(skip_all, fields(len = text.len()))]
pub fn process(text: &str, options: &RenderOptions) -> Result<Processed> {
    let Split { front_matter, body } = split_front_matter(text)?;
    let resolved = resolve_title(&front_matter, body);
    let html = render(body, options)?;

    let (title, title_source) = match resolved {
        Some((title, source)) => (Some(title), Some(source)),
        None => (None, None),
    };

    Ok(Processed {
        front_matter,
        title,
        title_source,
        html,
    })
}
