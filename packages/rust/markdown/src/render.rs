//! Markdown → HTML rendering via `pulldown-cmark`.

use pulldown_cmark::{Event, Options, Parser, html};
use tracing::{debug, trace};

use mdjson_shared::{MdJsonError, RenderOptions, Result};

/// Render a Markdown body to an HTML string.
pub fn render(body: &str, options: &RenderOptions) -> Result<String> {
    let parser = Parser::new_ext(body, parser_options(options));
    let mut out = String::with_capacity(body.len() + body.len() / 2);

    let written = if options.breaks {
        html::write_html_fmt(&mut out, parser.map(soft_to_hard_break))
    } else {
        html::write_html_fmt(&mut out, parser)
    };
    written.map_err(|e| MdJsonError::Render(format!("failed to write HTML: {e}")))?;

    trace!(in_len = body.len(), out_len = out.len(), "rendered markdown");
    Ok(out)
}

fn soft_to_hard_break(event: Event<'_>) -> Event<'_> {
    match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    }
}

/// Translate [`RenderOptions`] into parser extension flags.
///
/// Boolean passthrough entries that name a parser extension toggle it after
/// the typed options are applied; anything else is left alone.
pub fn parser_options(options: &RenderOptions) -> Options {
    let mut flags = Options::empty();

    if options.gfm {
        flags |= Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_GFM;
    }
    if options.smartypants {
        flags |= Options::ENABLE_SMART_PUNCTUATION;
    }

    for (name, value) in &options.extra {
        match (extension_flag(name), value.as_bool()) {
            (Some(flag), Some(true)) => flags.insert(flag),
            (Some(flag), Some(false)) => flags.remove(flag),
            _ => debug!(option = %name, "renderer option has no parser equivalent"),
        }
    }

    flags
}

fn extension_flag(name: &str) -> Option<Options> {
    let flag = match name {
        "tables" => Options::ENABLE_TABLES,
        "footnotes" => Options::ENABLE_FOOTNOTES,
        "strikethrough" => Options::ENABLE_STRIKETHROUGH,
        "tasklists" => Options::ENABLE_TASKLISTS,
        "smart_punctuation" => Options::ENABLE_SMART_PUNCTUATION,
        "heading_attributes" => Options::ENABLE_HEADING_ATTRIBUTES,
        "math" => Options::ENABLE_MATH,
        "definition_list" => Options::ENABLE_DEFINITION_LIST,
        _ => return None,
    };
    Some(flag)
}
