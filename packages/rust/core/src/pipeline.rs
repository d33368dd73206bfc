//! Transform pipeline: Markdown documents → JSON documents.
//!
//! A single streamed document always yields one `.json` document. A batch is
//! emitted per file or folded into one consolidated tree, depending on the
//! configured [`OutputMode`].

use std::time::Instant;

use tracing::{debug, info, instrument};

use mdjson_shared::{Document, MdJsonError, OutputMode, Result, TransformConfig};

use crate::record::convert_document;
use crate::tree::{Tree, strip_extension};

/// A document that could not be converted.
#[derive(Debug)]
pub struct Failure {
    /// Input path of the failed document.
    pub path: String,
    /// Why it failed.
    pub error: MdJsonError,
}

/// Result of transforming a batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Output documents: one per successful input, or exactly one when consolidated.
    pub outputs: Vec<Document>,
    /// Per-document failures, in input order.
    pub failures: Vec<Failure>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called after each document is handled, successfully or not.
    fn document_converted(&self, path: &str, current: usize, total: usize);
    /// Called when the batch completes.
    fn done(&self, outcome: &BatchOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn document_converted(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &BatchOutcome) {}
}

/// Converts Markdown documents to JSON documents.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: TransformConfig,
}

impl Pipeline {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Convert a single streamed document.
    ///
    /// Always produces a per-file output, whatever the configured mode.
    pub fn process(&self, doc: &Document) -> Result<Document> {
        let record = convert_document(doc, &self.config.renderer)?;
        let content = record.to_json_vec(self.config.pretty)?;
        Ok(Document::new(json_path(&doc.path), content))
    }

    /// Convert a batch according to the configured mode.
    ///
    /// Per-document failures are collected. They stop the rest of the batch
    /// only when `fail_fast` is set. In consolidated mode exactly one output is produced, holding
    /// every successfully converted record.
    #[instrument(skip_all, fields(mode = ?self.config.mode, documents = docs.len()))]
    pub fn process_batch(
        &self,
        docs: &[Document],
        progress: &dyn ProgressReporter,
    ) -> Result<BatchOutcome> {
        let start = Instant::now();

        let outcome = match self.config.mode {
            OutputMode::PerFile => self.per_file(docs, progress),
            OutputMode::Consolidated => self.consolidated(docs, progress)?,
        };

        info!(
            outputs = outcome.outputs.len(),
            failures = outcome.failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch complete"
        );
        progress.done(&outcome);

        Ok(outcome)
    }

    fn per_file(&self, docs: &[Document], progress: &dyn ProgressReporter) -> BatchOutcome {
        let total = docs.len();
        let mut outcome = BatchOutcome::default();

        for (idx, doc) in docs.iter().enumerate() {
            match self.process(doc) {
                Ok(output) => outcome.outputs.push(output),
                Err(error) => record_failure(&mut outcome, doc, error),
            }
            progress.document_converted(&doc.path, idx + 1, total);
            if self.stop_early(&outcome) {
                break;
            }
        }

        outcome
    }

    fn consolidated(
        &self,
        docs: &[Document],
        progress: &dyn ProgressReporter,
    ) -> Result<BatchOutcome> {
        let total = docs.len();
        let mut outcome = BatchOutcome::default();
        let mut tree = Tree::new();

        for (idx, doc) in docs.iter().enumerate() {
            let folded = convert_document(doc, &self.config.renderer)
                .and_then(|record| tree.insert(&doc.path, record, self.config.collisions));
            if let Err(error) = folded {
                record_failure(&mut outcome, doc, error);
            }
            progress.document_converted(&doc.path, idx + 1, total);
            if self.stop_early(&outcome) {
                break;
            }
        }

        let content = tree.to_json_vec(self.config.pretty)?;
        outcome
            .outputs
            .push(Document::new(self.config.output_name.clone(), content));

        Ok(outcome)
    }

    fn stop_early(&self, outcome: &BatchOutcome) -> bool {
        if self.config.fail_fast && !outcome.is_success() {
            debug!("fail-fast: skipping remaining documents");
            return true;
        }
        false
    }
}

fn record_failure(outcome: &mut BatchOutcome, doc: &Document, error: MdJsonError) {
    debug!(path = %doc.path, %error, "document failed");
    outcome.failures.push(Failure {
        path: doc.path.clone(),
        error,
    });
}

/// Output path for a per-file document: the input path with a `.json` extension.
pub fn json_path(path: &str) -> String {
    let (dir, name) = match path.rfind('/') {
        Some(idx) => path.split_at(idx + 1),
        None => ("", path),
    };
    format!("{dir}{}.json", strip_extension(name))
}
