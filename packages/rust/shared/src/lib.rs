//! Shared types, error model, and configuration for mdjson.
//!
//! This crate is the foundation depended on by all other mdjson crates.
//! It provides:
//! - [`MdJsonError`] — the unified error type
//! - Domain types ([`Document`], [`Record`], [`OutputMode`], [`CollisionPolicy`])
//! - Configuration ([`AppConfig`], [`RenderOptions`], [`TransformConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, OutputConfig, RenderOptions, TransformConfig, config_dir,
    init_config, load_config, load_config_from, parse_config, resolve_config_path,
};
pub use error::{MdJsonError, Result};
pub use types::{
    CONTENT_KEY, CollisionPolicy, DEFAULT_OUTPUT_NAME, Document, OutputMode, Record, TITLE_KEY,
};
