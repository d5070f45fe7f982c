/// Pipeline configuration.
///
/// Defaults match the knobs a typical documentation or code repository
/// needs; `workers = 0` derives the pool size from the file count.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target collection name, also written into every record as the repo tag.
    pub collection: String,
    /// Comma-separated gitignore-style include patterns. Empty matches nothing.
    pub include: String,
    /// Comma-separated gitignore-style exclude patterns. Exclude wins.
    pub exclude: String,
    /// Maximum tokens per chunk.
    pub max_tokens: usize,
    /// Chunks shorter than this many characters are discarded.
    pub min_chars: usize,
    /// Token overlap between consecutive chunks of one section.
    pub overlap_tokens: usize,
    /// Worker pool size; 0 derives from file count.
    pub workers: usize,
    /// Records accumulated before a store flush.
    pub batch_size: usize,
    /// Files larger than this are skipped outright.
    pub max_file_size_mb: u64,
    /// Files per group when the grouped strategy is selected.
    pub group_size: usize,
    /// Tree size above which the grouped strategy is selected.
    pub size_threshold_mb: f64,
    /// Completed files between batch-storage compactions.
    pub memory_cleanup_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection: "strata".into(),
            include: String::new(),
            exclude: String::new(),
            max_tokens: 300,
            min_chars: 200,
            overlap_tokens: 40,
            workers: 0,
            batch_size: 256,
            max_file_size_mb: 5,
            group_size: 100,
            size_threshold_mb: 50.0,
            memory_cleanup_interval: 50,
        }
    }
}
