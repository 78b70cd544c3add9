use std::env;
use std::path::PathBuf;

pub const VOCAB_ENV: &str = "GPT3_TOKENIZER_VOCAB";
pub const MERGES_ENV: &str = "GPT3_TOKENIZER_MERGES";
pub const CACHE_SIZE_ENV: &str = "GPT3_TOKENIZER_CACHE_SIZE";

const VOCAB_FILE: &str = "encoder.json";
const MERGES_FILE: &str = "vocab.bpe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub vocab_path: PathBuf,
    pub merges_path: PathBuf,
    /// Merge-cache bound; 0 means unbounded.
    pub cache_size: usize,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str, file: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .map(|v| expand_home(&v))
                .unwrap_or_else(|| assets_dir().join(file))
        };

        Self {
            vocab_path: path(VOCAB_ENV, VOCAB_FILE),
            merges_path: path(MERGES_ENV, MERGES_FILE),
            cache_size: lookup(CACHE_SIZE_ENV)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Where the vocabulary and merge files live unless overridden.
pub fn assets_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gpt3-tokenizer")
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
