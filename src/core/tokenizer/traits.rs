use super::TokenId;
use crate::core::Result;

pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>>;
    fn encode_with_options(&self, text: &str, options: &EncodeOptions) -> Result<Vec<TokenId>>;

    fn decode(&self, tokens: &[TokenId]) -> Result<String>;
    fn decode_with_options(&self, tokens: &[TokenId], options: &DecodeOptions) -> Result<String>;

    fn vocab_size(&self) -> usize;
    fn eot_token(&self) -> TokenId;

    fn token_to_id(&self, token: &str) -> Option<TokenId>;
    fn id_to_token(&self, id: TokenId) -> Option<&str>;

    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub append_eot: bool,
    pub truncate: Option<usize>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eot(mut self) -> Self {
        self.append_eot = true;
        self
    }

    /// Keeps the first `max_len` ids. Applied after the end-of-text id is
    /// appended, so a truncated sequence may lose it.
    pub fn truncate(mut self, max_len: usize) -> Self {
        self.truncate = Some(max_len);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub skip_special_tokens: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_special(mut self) -> Self {
        self.skip_special_tokens = true;
        self
    }
}
