pub mod budget;
pub mod cache;
pub mod error;
pub mod tokenizer;

pub use budget::TokenBudget;
pub use cache::{CacheConfig, CacheStats, MergeCache};
pub use error::{AssetLoadError, TokenizerError};
pub use tokenizer::{DecodeOptions, EncodeOptions, Encoder, TokenId, Tokenizer};

pub type Result<T> = std::result::Result<T, TokenizerError>;
