pub mod core;
pub mod envconfig;

pub use crate::core::{
    AssetLoadError, CacheConfig, CacheStats, DecodeOptions, EncodeOptions, Encoder, Result,
    TokenBudget, TokenId, Tokenizer, TokenizerError,
};

pub use crate::envconfig::EnvConfig;
