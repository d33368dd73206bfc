//! Core domain types for the Markdown-to-JSON transform.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MdJsonError, Result};

/// Record key holding the rendered HTML markup.
pub const CONTENT_KEY: &str = "body";

/// Record key holding the resolved title.
pub const TITLE_KEY: &str = "title";

/// Default path of the consolidated output document.
pub const DEFAULT_OUTPUT_NAME: &str = "content.json";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A unit flowing through the pipeline: a relative path plus raw content.
///
/// Inputs carry Markdown, outputs carry serialized JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Slash-delimited relative path, no leading slash (e.g. `blog/posts/intro.md`).
    pub path: String,
    /// Raw content bytes.
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Borrow the content as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.content).map_err(|_| MdJsonError::Encoding {
            path: self.path.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A flat, insertion-ordered JSON object produced per document.
///
/// Holds every front matter key, the resolved `title` (when there is one),
/// and the rendered markup under [`CONTENT_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning the previous value if one was present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The resolved title, if any.
    pub fn title(&self) -> Option<&Value> {
        self.0.get(TITLE_KEY)
    }

    /// The rendered HTML markup, if present.
    pub fn body(&self) -> Option<&str> {
        self.0.get(CONTENT_KEY).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to JSON bytes, compact or pretty-printed.
    pub fn to_json_vec(&self, pretty: bool) -> Result<Vec<u8>> {
        let bytes = if pretty {
            serde_json::to_vec_pretty(self)?
        } else {
            serde_json::to_vec(self)?
        };
        Ok(bytes)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// How a batch of documents is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One `.json` document per input.
    #[default]
    PerFile,
    /// One document holding a tree keyed by directory structure.
    Consolidated,
}

/// What happens when two documents land on the same tree key path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Last write wins.
    #[default]
    Overwrite,
    /// Fail with [`MdJsonError::PathCollision`].
    Reject,
}
