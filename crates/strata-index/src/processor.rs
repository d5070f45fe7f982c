//! Per-file unit of work: read, chunk, embed, package into records.

use std::path::Path;

use strata_embed::{Embedder, normalize_all};
use strata_store::{Record, RecordPayload};

use crate::chunker::{self, TokenCodec};
use crate::languages;

/// Chunking parameters handed to every file task.
#[derive(Debug, Clone, Copy)]
pub struct ChunkParams {
    pub max_tokens: usize,
    pub overlap_tokens: usize,
    pub min_chars: usize,
}

/// Outcome of processing one file.
///
/// Record ids are left at 0; the orchestrator's consumer path assigns them
/// so ids stay strictly increasing regardless of worker interleaving.
#[derive(Debug)]
pub struct ProcessedFile {
    pub rel_path: String,
    pub records: Vec<Record>,
    pub chunk_count: usize,
}

impl ProcessedFile {
    fn empty(rel_path: &str) -> Self {
        Self {
            rel_path: rel_path.to_string(),
            records: Vec::new(),
            chunk_count: 0,
        }
    }
}

/// Process a single file into store-ready records.
///
/// Every failure is absorbed at file granularity: oversize files, unreadable
/// content, chunking problems, and embedding errors all degrade to an empty
/// result with a log line, never an error.
pub async fn process_file<E: Embedder>(
    codec: &dyn TokenCodec,
    embedder: &E,
    root: &Path,
    rel: &str,
    params: ChunkParams,
    max_file_size_bytes: u64,
    collection: &str,
) -> ProcessedFile {
    let abs = root.join(rel);

    match tokio::fs::metadata(&abs).await {
        Ok(meta) if meta.len() > max_file_size_bytes => {
            tracing::warn!(
                file = rel,
                size = meta.len(),
                limit = max_file_size_bytes,
                "skipping oversize file"
            );
            return ProcessedFile::empty(rel);
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(file = rel, "could not stat file: {e}");
            return ProcessedFile::empty(rel);
        }
    }

    // Invalid UTF-8 is tolerated, not fatal.
    let text = match tokio::fs::read(&abs).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!(file = rel, "failed to read: {e}");
            return ProcessedFile::empty(rel);
        }
    };

    let ext = languages::extension_of(rel);
    let sections = if chunker::is_markup(&ext) {
        chunker::markup_sections(&text)
    } else {
        vec![text]
    };

    let mut pieces = Vec::new();
    for section in &sections {
        match chunker::chunk(codec, section, params.max_tokens, params.overlap_tokens) {
            Ok(chunks) => pieces.extend(chunks),
            Err(e) => {
                tracing::warn!(file = rel, "chunking failed: {e}");
                return ProcessedFile::empty(rel);
            }
        }
    }
    pieces.retain(|p| p.chars().count() >= params.min_chars);

    if pieces.is_empty() {
        tracing::debug!(file = rel, "no chunks above minimum length");
        return ProcessedFile::empty(rel);
    }

    // One call for the whole file: either every chunk embeds or none do.
    let vectors = match embedder.embed_batch(&pieces).await {
        Ok(vectors) => normalize_all(vectors),
        Err(e) => {
            tracing::error!(file = rel, "embedding failed: {e}");
            return ProcessedFile::empty(rel);
        }
    };

    let language = languages::language_for(&ext).to_string();
    let path_prefix = languages::path_prefix(rel);
    let title = languages::title_of(rel);
    let header =
        format!("[repo: {collection}] [file: {rel}] [ext: {ext}] [title: {title}]\n---\n");

    let records = pieces
        .into_iter()
        .zip(vectors)
        .map(|(piece, vector)| {
            let annotated = format!("{header}{piece}");
            Record {
                id: 0,
                vector,
                payload: RecordPayload {
                    path: rel.to_string(),
                    repo: collection.to_string(),
                    ext: ext.clone(),
                    title: title.clone(),
                    language: language.clone(),
                    path_prefix: path_prefix.clone(),
                    content: annotated.clone(),
                    document: annotated,
                    raw_content: piece,
                },
            }
        })
        .collect::<Vec<_>>();

    let chunk_count = records.len();
    tracing::debug!(file = rel, chunks = chunk_count, "file processed");
    ProcessedFile {
        rel_path: rel.to_string(),
        records,
        chunk_count,
    }
}
