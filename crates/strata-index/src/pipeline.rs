//! Indexing orchestrator: provision → scan → strategy → pass → report.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use strata_embed::Embedder;
use strata_store::{Record, VectorStore};

use crate::chunker::TokenCodec;
use crate::config::PipelineConfig;
use crate::error::{IndexError, Result};
use crate::filter::{PathFilter, tree_size_bytes};
use crate::processor::{ChunkParams, ProcessedFile, process_file};

/// Worker cap per group in the grouped strategy; lower than the direct
/// pass to keep in-flight memory bounded to one group's worth of work.
const GROUP_WORKER_CAP: usize = 4;

/// Strategy selected from total tree size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One worker pool and batch across the whole file set.
    Direct,
    /// Fixed-size file groups processed to completion one at a time.
    Grouped,
}

/// Derive the worker pool size from the file count unless overridden.
#[must_use]
pub fn auto_workers(file_count: usize, override_workers: usize) -> usize {
    if override_workers > 0 {
        override_workers
    } else {
        (file_count / 10).clamp(2, 8)
    }
}

/// Pick the pass strategy from the tree's total byte size.
#[must_use]
pub fn select_strategy(total_bytes: u64, threshold_mb: f64) -> Strategy {
    #[allow(clippy::cast_precision_loss)]
    let total_mb = total_bytes as f64 / (1024.0 * 1024.0);
    if total_mb > threshold_mb {
        Strategy::Grouped
    } else {
        Strategy::Direct
    }
}

/// Summary of an indexing run.
///
/// `chunks_indexed` counts chunks at id assignment; a dropped batch means
/// fewer records actually persisted, surfaced via `batches_dropped`.
#[derive(Debug, Default)]
pub struct IndexReport {
    pub files_processed: usize,
    pub chunks_indexed: usize,
    pub batches_dropped: usize,
    pub duration_ms: u64,
}

/// Orchestrates indexing of a work root into the vector store.
pub struct IndexPipeline<E, C> {
    store: Arc<dyn VectorStore>,
    embedder: Arc<E>,
    codec: Arc<C>,
    config: PipelineConfig,
}

impl<E, C> IndexPipeline<E, C>
where
    E: Embedder + 'static,
    C: TokenCodec + 'static,
{
    #[must_use]
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<E>,
        codec: Arc<C>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            codec,
            config,
        }
    }

    /// Run the full pipeline against `root`.
    ///
    /// Per-file and per-batch failures are absorbed and reflected in the
    /// report; a run with zero matching files returns early with zero
    /// counts.
    ///
    /// # Errors
    ///
    /// Returns an error only if the work root cannot be scanned, the glob
    /// patterns do not compile, or collection provisioning fails.
    pub async fn run(&self, root: &Path) -> Result<IndexReport> {
        let start = Instant::now();
        let mut report = IndexReport::default();

        let meta = std::fs::metadata(root)
            .map_err(|e| IndexError::Scan(format!("{}: {e}", root.display())))?;
        if !meta.is_dir() {
            return Err(IndexError::Scan(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let dimension = u64::try_from(self.embedder.dimension())?;
        self.store
            .ensure_collection(&self.config.collection, dimension)
            .await?;

        let filter = PathFilter::new(&self.config.include, &self.config.exclude)?;
        let files: Vec<String> = filter.files(root).collect();
        tracing::info!(total = files.len(), "scan complete");

        if files.is_empty() {
            tracing::warn!("no files matched the include/exclude patterns");
            report.duration_ms = elapsed_ms(start);
            return Ok(report);
        }

        let workers = auto_workers(files.len(), self.config.workers);
        let total_bytes = tree_size_bytes(root);
        let strategy = select_strategy(total_bytes, self.config.size_threshold_mb);
        tracing::info!(
            workers,
            total_bytes,
            ?strategy,
            collection = %self.config.collection,
            "indexing started"
        );

        let mut progress = ProgressLog::create(&self.config.collection, files.len());
        let mut next_id: u64 = 1;

        match strategy {
            Strategy::Direct => {
                self.process_group(root, &files, workers, &mut next_id, &mut report, &mut progress)
                    .await;
            }
            Strategy::Grouped => {
                let group_workers = workers.min(GROUP_WORKER_CAP);
                let group_count = files.len().div_ceil(self.config.group_size.max(1));
                for (i, group) in files.chunks(self.config.group_size.max(1)).enumerate() {
                    tracing::info!(
                        group = i + 1,
                        groups = group_count,
                        files = group.len(),
                        "processing file group"
                    );
                    self.process_group(
                        root,
                        group,
                        group_workers,
                        &mut next_id,
                        &mut report,
                        &mut progress,
                    )
                    .await;
                }
            }
        }

        report.duration_ms = elapsed_ms(start);
        tracing::info!(
            files = report.files_processed,
            chunks = report.chunks_indexed,
            dropped = report.batches_dropped,
            "indexing complete"
        );
        Ok(report)
    }

    /// Run one bounded pool over `files` and drain completions.
    ///
    /// Id assignment and batch mutation happen only here, on the single
    /// consumer path, so neither needs a lock.
    async fn process_group(
        &self,
        root: &Path,
        files: &[String],
        workers: usize,
        next_id: &mut u64,
        report: &mut IndexReport,
        progress: &mut ProgressLog,
    ) {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks: JoinSet<ProcessedFile> = JoinSet::new();

        let params = ChunkParams {
            max_tokens: self.config.max_tokens,
            overlap_tokens: self.config.overlap_tokens,
            min_chars: self.config.min_chars,
        };
        let max_bytes = self.config.max_file_size_mb * 1024 * 1024;

        for rel in files {
            let semaphore = Arc::clone(&semaphore);
            let embedder = Arc::clone(&self.embedder);
            let codec = Arc::clone(&self.codec);
            let root = root.to_path_buf();
            let rel = rel.clone();
            let collection = self.config.collection.clone();

            tasks.spawn(async move {
                // Pool bound: at most `workers` files in flight.
                let _permit = semaphore.acquire_owned().await.ok();
                process_file(
                    codec.as_ref(),
                    embedder.as_ref(),
                    &root,
                    &rel,
                    params,
                    max_bytes,
                    &collection,
                )
                .await
            });
        }

        let mut batch: Vec<Record> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(processed) => {
                    progress.completed(&processed.rel_path, processed.chunk_count);
                    for mut record in processed.records {
                        record.id = *next_id;
                        *next_id += 1;
                        report.chunks_indexed += 1;
                        batch.push(record);
                    }
                    if batch.len() >= self.config.batch_size {
                        self.flush(&mut batch, report).await;
                    }
                }
                Err(e) => {
                    tracing::error!("file task failed: {e}");
                    progress.failed(&e.to_string());
                }
            }

            report.files_processed += 1;
            if self.config.memory_cleanup_interval > 0
                && report.files_processed % self.config.memory_cleanup_interval == 0
            {
                batch.shrink_to_fit();
                tracing::debug!(files = report.files_processed, "batch storage compacted");
            }
        }

        self.flush(&mut batch, report).await;
        batch.shrink_to_fit();
    }

    /// Submit the batch and clear it. A failed flush drops the batch:
    /// those records are lost for this run and counted in the report.
    async fn flush(&self, batch: &mut Vec<Record>, report: &mut IndexReport) {
        if batch.is_empty() {
            return;
        }
        let records = std::mem::take(batch);
        let count = records.len();
        match self.store.upsert(&self.config.collection, records).await {
            Ok(()) => tracing::debug!(count, "batch upserted"),
            Err(e) => {
                tracing::error!(count, "failed to upsert batch: {e}");
                report.batches_dropped += 1;
            }
        }
    }
}

/// Best-effort human-readable progress log in the scratch directory.
/// Never read back by the pipeline; write failures are ignored.
struct ProgressLog {
    file: Option<std::fs::File>,
}

impl ProgressLog {
    fn create(collection: &str, total: usize) -> Self {
        let path = std::env::temp_dir().join("strata_indexing_progress.log");
        let file = std::fs::File::create(&path)
            .map(|mut f| {
                let _ = writeln!(f, "=== INDEXING STARTED: {collection} ===");
                let _ = writeln!(f, "Total files to process: {total}");
                f
            })
            .ok();
        if file.is_some() {
            tracing::info!(path = %path.display(), "progress log enabled");
        }
        Self { file }
    }

    fn completed(&mut self, rel: &str, chunks: usize) {
        if let Some(f) = &mut self.file {
            let _ = writeln!(f, "COMPLETED: {rel} -> {chunks} chunks");
        }
    }

    fn failed(&mut self, message: &str) {
        if let Some(f) = &mut self.file {
            let _ = writeln!(f, "ERROR: {message}");
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_workers_clamps_low() {
        assert_eq!(auto_workers(5, 0), 2);
        assert_eq!(auto_workers(0, 0), 2);
    }

    #[test]
    fn auto_workers_clamps_high() {
        assert_eq!(auto_workers(1000, 0), 8);
    }

    #[test]
    fn auto_workers_scales_between() {
        assert_eq!(auto_workers(50, 0), 5);
    }

    #[test]
    fn auto_workers_override_wins() {
        assert_eq!(auto_workers(1000, 3), 3);
    }

    #[test]
    fn strategy_below_threshold_is_direct() {
        assert_eq!(select_strategy(10 * 1024 * 1024, 50.0), Strategy::Direct);
    }

    #[test]
    fn strategy_above_threshold_is_grouped() {
        assert_eq!(select_strategy(60 * 1024 * 1024, 50.0), Strategy::Grouped);
    }

    #[test]
    fn strategy_at_threshold_is_direct() {
        assert_eq!(select_strategy(50 * 1024 * 1024, 50.0), Strategy::Direct);
    }

    #[test]
    fn report_defaults_to_zero() {
        let report = IndexReport::default();
        assert_eq!(report.files_processed, 0);
        assert_eq!(report.chunks_indexed, 0);
        assert_eq!(report.batches_dropped, 0);
    }
}
