//! Record building: front matter + title + rendered markup → one flat record.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use mdjson_shared::{
    CONTENT_KEY, Document, MdJsonError, Record, RenderOptions, Result, TITLE_KEY,
};

/// Merge front matter, the resolved title, and rendered HTML into a record.
///
/// Front matter keys come first in source order. A front matter `title`
/// keeps its slot; the derived title is only added when there is none.
/// Front matter may not use the reserved content key.
pub fn build_record(
    front_matter: Map<String, Value>,
    title: Option<Value>,
    html: String,
) -> Result<Record> {
    if front_matter.contains_key(CONTENT_KEY) {
        return Err(MdJsonError::ReservedKey {
            key: CONTENT_KEY.to_string(),
        });
    }

    let mut record = Record::from(front_matter);
    if let Some(title) = title {
        if !record.contains_key(TITLE_KEY) {
            record.insert(TITLE_KEY, title);
        }
    }
    record.insert(CONTENT_KEY, Value::String(html));

    Ok(record)
}

/// Convert one Markdown document into its record.
#[instrument(skip_all, fields(path = %doc.path))]
pub fn convert_document(doc: &Document, options: &RenderOptions) -> Result<Record> {
    let text = doc.text()?;
    let processed = mdjson_markdown::process(text, options)?;
    debug!(
        keys = processed.front_matter.len(),
        title_source = ?processed.title_source,
        "document processed"
    );
    build_record(processed.front_matter, processed.title, processed.html)
}
