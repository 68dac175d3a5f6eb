use std::fs;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::config::{Config, OutputFormat};
use crate::error::EngineError;
use crate::miner::SchemaMiner;
use crate::model::source::SourceRecord;
use crate::serialize::{to_jsonld, to_void_turtle};

/// Outcome of one batch run: dataset names grouped by what happened, with row
/// order preserved in every list.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedRow>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FailedRow {
    pub dataset: String,
    pub error: String,
}

/// Row-level progress, fired exactly once per row after it is processed.
#[derive(Debug, Clone)]
pub enum RowStatus {
    Succeeded,
    Skipped,
    Failed(String),
}

pub type ProgressCallback<'a> = dyn FnMut(&str, usize, usize, &RowStatus) + Send + 'a;

/// Drives the schema miner over a list of source rows, writing per-dataset
/// output files and aggregating a [`BatchResult`].
pub struct BatchOrchestrator {
    config: Config,
    cancel: CancellationToken,
}

impl BatchOrchestrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Wire up an external cancellation signal; honored between rows and at
    /// every suspension point inside the miner (requests, backoff, delays).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn run(
        &self,
        sources: &[SourceRecord],
        output_dir: impl AsRef<Path>,
        mut on_progress: impl FnMut(&str, usize, usize, &RowStatus),
    ) -> Result<BatchResult, EngineError> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)
            .map_err(|e| EngineError::Other(format!("failed to create output dir: {e}")))?;

        let total = sources.len();
        let mut result = BatchResult::default();

        for (idx, row) in sources.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!("batch run cancelled, stopping before row {idx}");
                break;
            }

            if !row.has_endpoint() {
                result.skipped.push(row.dataset_name.clone());
                on_progress(&row.dataset_name, idx, total, &RowStatus::Skipped);
                continue;
            }

            match self.mine_row(row, output_dir).await {
                Ok(()) => {
                    result.succeeded.push(row.dataset_name.clone());
                    on_progress(&row.dataset_name, idx, total, &RowStatus::Succeeded);
                }
                Err(err) => {
                    let message = err.to_string();
                    result.failed.push(FailedRow {
                        dataset: row.dataset_name.clone(),
                        error: message.clone(),
                    });
                    on_progress(&row.dataset_name, idx, total, &RowStatus::Failed(message));
                }
            }
        }

        Ok(result)
    }

    async fn mine_row(&self, row: &SourceRecord, output_dir: &Path) -> Result<(), EngineError> {
        let miner = SchemaMiner {
            endpoint_url: row.endpoint_url.clone(),
            graph_uris: row.graph_uris(),
            chunk_size: self.config.chunk_size,
            delay: self.config.delay,
            timeout: self.config.timeout,
            max_retries: self.config.max_retries,
            initial_backoff: self.config.initial_backoff,
            max_backoff: self.config.max_backoff,
            counts: self.config.counts,
            cancel: self.cancel.clone(),
        };

        let schema = miner.mine(&row.dataset_name).await?;
        self.write_outputs(output_dir, &row.dataset_name, &schema)?;
        Ok(())
    }

    fn write_outputs(&self, dir: &Path, dataset: &str, schema: &crate::model::MinedSchema) -> Result<(), EngineError> {
        let write_jsonld = matches!(self.config.format, OutputFormat::JsonLd | OutputFormat::All);
        let write_void = matches!(self.config.format, OutputFormat::Void | OutputFormat::All);
        let dataset = sanitize_dataset_name(dataset);

        if write_jsonld {
            let path = dir.join(format!("{dataset}_schema.jsonld"));
            let body = serde_json::to_string_pretty(&to_jsonld(schema))
                .map_err(|e| EngineError::Other(format!("failed to serialize JSON-LD: {e}")))?;
            fs::write(&path, body).map_err(|e| EngineError::Other(format!("failed to write {}: {e}", path.display())))?;
        }

        if write_void {
            let path = dir.join(format!("{dataset}_void.ttl"));
            let body = to_void_turtle(schema);
            fs::write(&path, body).map_err(|e| EngineError::Other(format!("failed to write {}: {e}", path.display())))?;
        }

        Ok(())
    }
}

/// Keep a CSV-supplied dataset name confined to a single path component so it
/// can't escape `output_dir` via a path separator or a `..` segment.
fn sanitize_dataset_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

/// Exit code per the documented contract: zero unless any row failed.
pub fn exit_code(result: &BatchResult) -> i32 {
    if result.failed.is_empty() {
        0
    } else {
        1
    }
}
