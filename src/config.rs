use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
    pub chunking: ChunkingConfig,
    pub pipeline: PipelineSection,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    /// Usually supplied via `STRATA_EMBED_API_KEY` rather than the file.
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub collection: String,
}

#[derive(Debug, Deserialize)]
pub struct ChunkingConfig {
    pub tokenizer_path: String,
    pub max_tokens: usize,
    pub min_chars: usize,
    pub overlap_tokens: usize,
}

#[derive(Debug, Deserialize)]
pub struct PipelineSection {
    pub include: String,
    pub exclude: String,
    pub workers: usize,
    pub batch_size: usize,
    pub max_file_size_mb: u64,
    pub group_size: usize,
    pub size_threshold_mb: f64,
    pub memory_cleanup_interval: usize,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to sensible defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        env_override("STRATA_EMBED_BASE_URL", &mut self.embedding.base_url);
        env_override("STRATA_EMBED_MODEL", &mut self.embedding.model);
        env_override("STRATA_EMBED_API_KEY", &mut self.embedding.api_key);
        env_override("STRATA_QDRANT_URL", &mut self.store.url);
        env_override("STRATA_COLLECTION", &mut self.store.collection);
        env_override("STRATA_TOKENIZER_PATH", &mut self.chunking.tokenizer_path);
        env_override("STRATA_MAX_TOKENS", &mut self.chunking.max_tokens);
        env_override("STRATA_MIN_CHARS", &mut self.chunking.min_chars);
        env_override("STRATA_OVERLAP_TOKENS", &mut self.chunking.overlap_tokens);
        env_override("STRATA_INCLUDE", &mut self.pipeline.include);
        env_override("STRATA_EXCLUDE", &mut self.pipeline.exclude);
        env_override("STRATA_WORKERS", &mut self.pipeline.workers);
        env_override("STRATA_BATCH_SIZE", &mut self.pipeline.batch_size);
        env_override("STRATA_MAX_FILE_SIZE_MB", &mut self.pipeline.max_file_size_mb);
        env_override("STRATA_GROUP_SIZE", &mut self.pipeline.group_size);
        env_override("STRATA_SIZE_THRESHOLD_MB", &mut self.pipeline.size_threshold_mb);
        env_override(
            "STRATA_MEMORY_CLEANUP_INTERVAL",
            &mut self.pipeline.memory_cleanup_interval,
        );
    }

    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig {
                base_url: "http://localhost:8080/v1".into(),
                model: "paraphrase-multilingual-mpnet-base-v2".into(),
                api_key: String::new(),
            },
            store: StoreConfig {
                url: "http://localhost:6334".into(),
                collection: "repo".into(),
            },
            chunking: ChunkingConfig {
                tokenizer_path: "./tokenizer.json".into(),
                max_tokens: 300,
                min_chars: 200,
                overlap_tokens: 40,
            },
            pipeline: PipelineSection {
                include: "*.rs,*.py,*.md,*.toml,*.txt".into(),
                exclude: "target/,.git/,node_modules/".into(),
                workers: 0,
                batch_size: 256,
                max_file_size_mb: 5,
                group_size: 100,
                size_threshold_mb: 50.0,
                memory_cleanup_interval: 50,
            },
        }
    }
}

/// Replace `slot` with the parsed value of `key` when the variable is set.
/// Unparsable values keep the existing setting and log a warning, so a typo
/// in the environment never aborts startup.
fn env_override<T: FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparsable env override"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;

    // Env vars are process-global; tests that set them (or load a config,
    // which reads them) must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_when_file_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config::load(Path::new("/does/not/exist.toml")).unwrap();
        assert_eq!(config.store.url, "http://localhost:6334");
        assert_eq!(config.chunking.max_tokens, 300);
        assert_eq!(config.chunking.overlap_tokens, 40);
        assert_eq!(config.pipeline.batch_size, 256);
        assert_eq!(config.pipeline.workers, 0);
    }

    #[test]
    fn parse_valid_toml() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"
[embedding]
base_url = "http://embed:9000/v1"
model = "bge-small-en-v1.5"

[store]
url = "http://qdrant:6334"
collection = "myrepo"

[chunking]
tokenizer_path = "./tok.json"
max_tokens = 200
min_chars = 100
overlap_tokens = 20

[pipeline]
include = "*.rs"
exclude = "target/"
workers = 4
batch_size = 64
max_file_size_mb = 2
group_size = 50
size_threshold_mb = 25.0
memory_cleanup_interval = 10
"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.embedding.model, "bge-small-en-v1.5");
        assert_eq!(config.store.collection, "myrepo");
        assert_eq!(config.chunking.max_tokens, 200);
        assert_eq!(config.pipeline.workers, 4);
        assert!(config.embedding.api_key.is_empty());
    }

    #[test]
    fn env_override_wins() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe { std::env::set_var("STRATA_COLLECTION", "from-env") };
        let config = Config::load(Path::new("/does/not/exist.toml")).unwrap();
        unsafe { std::env::remove_var("STRATA_COLLECTION") };
        assert_eq!(config.store.collection, "from-env");
    }

    #[test]
    fn numeric_env_overrides_parsed() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("STRATA_BATCH_SIZE", "64");
            std::env::set_var("STRATA_SIZE_THRESHOLD_MB", "12.5");
            std::env::set_var("STRATA_MAX_TOKENS", "150");
        }
        let config = Config::load(Path::new("/does/not/exist.toml")).unwrap();
        unsafe {
            std::env::remove_var("STRATA_BATCH_SIZE");
            std::env::remove_var("STRATA_SIZE_THRESHOLD_MB");
            std::env::remove_var("STRATA_MAX_TOKENS");
        }
        assert_eq!(config.pipeline.batch_size, 64);
        assert!((config.pipeline.size_threshold_mb - 12.5).abs() < f64::EPSILON);
        assert_eq!(config.chunking.max_tokens, 150);
    }

    #[test]
    fn unparsable_env_override_keeps_existing_value() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe { std::env::set_var("STRATA_WORKERS", "not-a-number") };
        let config = Config::load(Path::new("/does/not/exist.toml")).unwrap();
        unsafe { std::env::remove_var("STRATA_WORKERS") };
        assert_eq!(config.pipeline.workers, 0);
    }
}
