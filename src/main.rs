use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use strata_embed::{HttpEmbedder, suffixed_collection};
use strata_index::chunker::HuggingFaceCodec;
use strata_index::{IndexPipeline, PipelineConfig};
use strata_store::{QdrantStore, VectorStore};

mod config;

use config::Config;

/// Index a repository tree into a vector store for retrieval.
#[derive(Debug, Parser)]
#[command(name = "strata", version)]
struct Cli {
    /// Directory tree to index.
    workdir: PathBuf,

    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Override the collection base name from the config.
    #[arg(long)]
    collection: Option<String>,

    /// Override the worker pool size (0 derives it from the file count).
    #[arg(long)]
    workers: Option<usize>,

    /// Override the upsert batch size.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber(cli.debug);

    let config = Config::load(&cli.config)?;

    let base = cli
        .collection
        .clone()
        .unwrap_or_else(|| config.store.collection.clone());
    let collection = suffixed_collection(&base, &config.embedding.model);

    let embedder = HttpEmbedder::new(
        config.embedding.base_url.clone(),
        config.embedding.api_key.clone(),
        config.embedding.model.clone(),
    );
    let codec = HuggingFaceCodec::from_file(Path::new(&config.chunking.tokenizer_path))
        .with_context(|| {
            format!("failed to load tokenizer from {}", config.chunking.tokenizer_path)
        })?;
    let store =
        QdrantStore::new(&config.store.url, config.embedding.model.clone()).with_context(
            || format!("failed to connect to vector store at {}", config.store.url),
        )?;

    let pipeline_config = PipelineConfig {
        collection,
        include: config.pipeline.include.clone(),
        exclude: config.pipeline.exclude.clone(),
        max_tokens: config.chunking.max_tokens,
        min_chars: config.chunking.min_chars,
        overlap_tokens: config.chunking.overlap_tokens,
        workers: cli.workers.unwrap_or(config.pipeline.workers),
        batch_size: cli.batch_size.unwrap_or(config.pipeline.batch_size),
        max_file_size_mb: config.pipeline.max_file_size_mb,
        group_size: config.pipeline.group_size,
        size_threshold_mb: config.pipeline.size_threshold_mb,
        memory_cleanup_interval: config.pipeline.memory_cleanup_interval,
    };

    tracing::info!(
        workdir = %cli.workdir.display(),
        collection = %pipeline_config.collection,
        model = %config.embedding.model,
        "strata v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pipeline = IndexPipeline::new(
        Arc::new(store) as Arc<dyn VectorStore>,
        Arc::new(embedder),
        Arc::new(codec),
        pipeline_config,
    );

    let report = pipeline.run(&cli.workdir).await?;

    #[allow(clippy::cast_precision_loss)]
    let seconds = report.duration_ms as f64 / 1000.0;
    println!(
        "indexed {} file(s), {} chunk(s) in {seconds:.1}s",
        report.files_processed, report.chunks_indexed
    );
    if report.batches_dropped > 0 {
        eprintln!(
            "warning: {} batch(es) failed to upsert and were dropped",
            report.batches_dropped
        );
    }

    Ok(())
}

fn init_subscriber(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
