//! Core transform logic for mdjson.
//!
//! Ties front matter parsing, title resolution and rendering into records,
//! then emits them per file or folded into a consolidated tree. The
//! [`driver`] module is the filesystem side used by the CLI.

pub mod driver;
pub mod pipeline;
pub mod record;
pub mod tree;

pub use pipeline::{BatchOutcome, Failure, Pipeline, ProgressReporter, SilentProgress, json_path};
pub use record::{build_record, convert_document};
pub use tree::{Node, Tree, key_path};
