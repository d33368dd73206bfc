//! Filesystem driver: reads Markdown documents from a directory tree and
//! writes transformed documents back out.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use mdjson_shared::{Document, MdJsonError, Result};

/// File extensions treated as Markdown input.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Recursively collect Markdown documents under `root`.
///
/// Paths are relative to `root`, `/`-separated, and sorted so batches are
/// processed in a stable order. Symlinks are followed; a link cycle is an
/// I/O error.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn collect_documents(root: &Path) -> Result<Vec<Document>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            MdJsonError::io(path, std::io::Error::from(e))
        })?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    let mut docs = Vec::with_capacity(files.len());
    for file in files {
        let rel = relative_path(root, &file)?;
        let content = std::fs::read(&file).map_err(|e| MdJsonError::io(&file, e))?;
        debug!(path = %rel, bytes = content.len(), "read document");
        docs.push(Document::new(rel, content));
    }

    info!(count = docs.len(), "collected markdown documents");
    Ok(docs)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// `root/blog/posts/a.md` → `blog/posts/a.md`.
fn relative_path(root: &Path, file: &Path) -> Result<String> {
    let rel = file.strip_prefix(root).map_err(|_| MdJsonError::InvalidPath {
        path: file.display().to_string(),
    })?;

    let segments: Vec<&str> = rel
        .components()
        .map(|c| {
            c.as_os_str().to_str().ok_or_else(|| MdJsonError::InvalidPath {
                path: file.display().to_string(),
            })
        })
        .collect::<Result<_>>()?;

    Ok(segments.join("/"))
}

/// Write output documents under `out_dir`, creating directories as needed.
///
/// Returns the written file paths. Output paths must stay inside `out_dir`.
#[instrument(skip_all, fields(out_dir = %out_dir.display(), count = outputs.len()))]
pub fn write_outputs(out_dir: &Path, outputs: &[Document]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(outputs.len());

    for doc in outputs {
        let target = out_dir.join(contained_path(&doc.path)?);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MdJsonError::io(parent, e))?;
        }
        std::fs::write(&target, &doc.content).map_err(|e| MdJsonError::io(&target, e))?;
        debug!(path = %target.display(), bytes = doc.content.len(), "wrote output");
        written.push(target);
    }

    info!(count = written.len(), "outputs written");
    Ok(written)
}

/// Reject absolute paths and `..` so outputs cannot escape the output directory.
fn contained_path(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    let safe = candidate
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if !safe || path.is_empty() {
        return Err(MdJsonError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(candidate.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/markdown")
    }

    #[test]
    fn collects_fixture_tree_in_order() {
        let docs = collect_documents(&fixtures_root()).unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "about.md",
                "blog/posts/oakland-activist.md",
                "blog/posts/other.md",
            ]
        );
        assert!(docs[1].text().unwrap().contains("Oakland"));
    }

    #[test]
    fn fixture_tree_consolidates() {
        use mdjson_shared::{OutputMode, TransformConfig};
        use serde_json::Value;

        use crate::pipeline::{Pipeline, SilentProgress};

        let docs = collect_documents(&fixtures_root()).unwrap();
        let pipeline = Pipeline::new(TransformConfig {
            mode: OutputMode::Consolidated,
            ..TransformConfig::default()
        });
        let outcome = pipeline.process_batch(&docs, &SilentProgress).unwrap();
        assert!(outcome.is_success());

        let dir = tempfile::tempdir().unwrap();
        let written = write_outputs(dir.path(), &outcome.outputs).unwrap();
        assert_eq!(written, [dir.path().join("content.json")]);

        let tree: Value =
            serde_json::from_slice(&std::fs::read(&written[0]).unwrap()).unwrap();
        let post = &tree["blog"]["posts"]["oakland-activist"];
        assert_eq!(post["title"], "An Oakland Activist");
        assert_eq!(post["tags"], serde_json::json!(["oakland", "profile"]));
        assert_eq!(tree["blog"]["posts"]["other"]["title"], "Another Post");
        assert_eq!(tree["about"]["layout"], "page");
    }

    #[test]
    fn skips_non_markdown_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/keep.MD"), "# Keep").unwrap();
        std::fs::write(dir.path().join("notes.markdown"), "text").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        std::fs::write(dir.path().join("README"), "no extension").unwrap();

        let docs = collect_documents(dir.path()).unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["nested/keep.MD", "notes.markdown"]);
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_documents(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, MdJsonError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_directories() {
        let shared = tempfile::tempdir().unwrap();
        std::fs::write(shared.path().join("linked.md"), "# Linked").unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.md"), "local").unwrap();
        std::os::unix::fs::symlink(shared.path(), dir.path().join("shared")).unwrap();

        let docs = collect_documents(dir.path()).unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["local.md", "shared/linked.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a/page.md"), "page").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("a/loop")).unwrap();

        let err = collect_documents(dir.path()).unwrap_err();
        assert!(matches!(err, MdJsonError::Io { .. }), "{err}");
    }

    #[test]
    fn writes_nested_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = vec![
            Document::new("blog/posts/a.json", "{}"),
            Document::new("content.json", "{\"a\":1}"),
        ];

        let written = write_outputs(dir.path(), &outputs).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("blog/posts/a.json")).unwrap(),
            "{}"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("content.json")).unwrap(),
            "{\"a\":1}"
        );
    }

    #[test]
    fn refuses_to_escape_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        for path in ["../escape.json", "/abs.json", ""] {
            let err = write_outputs(dir.path(), &[Document::new(path, "{}")]).unwrap_err();
            assert!(matches!(err, MdJsonError::InvalidPath { .. }), "{path}");
        }
    }
}
