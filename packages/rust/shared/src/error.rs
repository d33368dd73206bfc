//! Error types for mdjson.
//!
//! Library crates use [`MdJsonError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all mdjson operations.
#[derive(Debug, thiserror::Error)]
pub enum MdJsonError {
    /// Malformed YAML between the `---` delimiters, or a block that is not a mapping.
    #[error("front matter error: {message}")]
    FrontMatter { message: String },

    /// The Markdown renderer could not produce output.
    #[error("render error: {0}")]
    Render(String),

    /// Two documents resolve to the same key path in a consolidated tree.
    #[error("path collision at `{key}`")]
    PathCollision { key: String },

    /// Front matter uses a key reserved for rendered markup.
    #[error("front matter key `{key}` is reserved for rendered markup")]
    ReservedKey { key: String },

    /// A document path yields no usable tree key.
    #[error("invalid document path: {path:?}")]
    InvalidPath { path: String },

    /// Document content is not valid UTF-8.
    #[error("document {path} is not valid UTF-8")]
    Encoding { path: String },

    /// JSON encoding failure.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MdJsonError>;

impl MdJsonError {
    /// Create a front matter error from any displayable message.
    pub fn front_matter(msg: impl Into<String>) -> Self {
        Self::FrontMatter {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for MdJsonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MdJsonError::front_matter("did not find expected key");
        assert_eq!(
            err.to_string(),
            "front matter error: did not find expected key"
        );

        let err = MdJsonError::PathCollision {
            key: "blog.posts.intro".into(),
        };
        assert!(err.to_string().contains("blog.posts.intro"));
    }

    #[test]
    fn reserved_key_names_the_key() {
        let err = MdJsonError::ReservedKey { key: "body".into() };
        assert!(err.to_string().contains("`body`"));
    }
}
