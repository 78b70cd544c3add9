pub mod bpe;
pub mod byte_level;
pub mod encoder;
pub mod pretokenize;
pub mod traits;
pub mod vocab;

pub use byte_level::ByteLevel;
pub use encoder::Encoder;
pub use pretokenize::pretokenize;
pub use traits::{DecodeOptions, EncodeOptions, Tokenizer};
pub use vocab::{MergeRanks, Vocabulary, END_OF_TEXT};

pub type TokenId = u32;
