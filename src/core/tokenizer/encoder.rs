use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use super::bpe::bpe;
use super::byte_level::ByteLevel;
use super::pretokenize::pretokenize;
use super::traits::{DecodeOptions, EncodeOptions, Tokenizer};
use super::vocab::{MergeRanks, Vocabulary};
use super::TokenId;
use crate::core::cache::{CacheConfig, CacheStats, MergeCache};
use crate::core::error::AssetLoadError;
use crate::core::{Result, TokenizerError};
use crate::envconfig::EnvConfig;

/// Byte-level BPE encoder over a fixed vocabulary and merge table.
///
/// Everything except the merge cache is immutable after construction, so a
/// single instance can be shared across threads (e.g. behind an `Arc`).
pub struct Encoder {
    vocab: Vocabulary,
    ranks: MergeRanks,
    bytes: ByteLevel,
    cache: MergeCache,
}

impl Encoder {
    /// Builds an encoder from the raw vocabulary JSON and merge-rule text,
    /// with an unbounded merge cache.
    pub fn new(vocab_data: &[u8], merges_data: &[u8]) -> std::result::Result<Self, AssetLoadError> {
        Self::with_cache(vocab_data, merges_data, CacheConfig::default())
    }

    pub fn with_cache(
        vocab_data: &[u8],
        merges_data: &[u8],
        cache: CacheConfig,
    ) -> std::result::Result<Self, AssetLoadError> {
        let bytes = ByteLevel::new();
        let vocab = Vocabulary::from_json(vocab_data, &bytes)?;
        let ranks = MergeRanks::parse(merges_data)?;

        tracing::debug!(
            vocab_size = vocab.len(),
            merges = ranks.len(),
            ?cache,
            "loaded BPE encoder"
        );

        Ok(Self {
            vocab,
            ranks,
            bytes,
            cache: MergeCache::new(cache),
        })
    }

    pub fn from_files<P, Q>(
        vocab_path: P,
        merges_path: Q,
        cache: CacheConfig,
    ) -> std::result::Result<Self, AssetLoadError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let vocab_data = read_asset(vocab_path.as_ref())?;
        let merges_data = read_asset(merges_path.as_ref())?;
        Self::with_cache(&vocab_data, &merges_data, cache)
    }

    pub fn from_config(config: &EnvConfig) -> std::result::Result<Self, AssetLoadError> {
        Self::from_files(
            &config.vocab_path,
            &config.merges_path,
            CacheConfig::from_capacity(config.cache_size),
        )
    }

    fn merge_piece(&self, remapped: &str) -> Arc<str> {
        self.cache
            .get_or_insert_with(remapped, || bpe(remapped, &self.ranks))
    }

    pub fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        let mut tokens = Vec::new();

        for piece in pretokenize(text)? {
            let remapped = self.bytes.encode(piece);
            let merged = self.merge_piece(&remapped);

            for sub in merged.split(' ') {
                let id = self
                    .vocab
                    .id(sub)
                    .ok_or_else(|| TokenizerError::UnknownToken(sub.to_string()))?;
                tokens.push(id);
            }
        }

        Ok(tokens)
    }

    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }

    /// Encodes each text independently on the rayon pool. Results keep the
    /// input order; the first error wins.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Result<Vec<Vec<TokenId>>>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|t| self.encode(t.as_ref())).collect()
    }

    /// Reconstructs the raw bytes behind `tokens`.
    pub fn decode_bytes(&self, tokens: &[TokenId]) -> Result<Vec<u8>> {
        self.decode_bytes_filtered(tokens, |_| true)
    }

    fn decode_bytes_filtered<F>(&self, tokens: &[TokenId], keep: F) -> Result<Vec<u8>>
    where
        F: Fn(TokenId) -> bool,
    {
        let mut out = Vec::with_capacity(tokens.len() * 4);

        for &id in tokens.iter().filter(|&&id| keep(id)) {
            let token = self
                .vocab
                .token(id)
                .ok_or(TokenizerError::UnknownTokenId(id))?;
            let bytes = self
                .bytes
                .decode(token)
                .map_err(|symbol| TokenizerError::InvalidSymbol { id, symbol })?;
            out.extend_from_slice(&bytes);
        }

        Ok(out)
    }

    /// Decodes `tokens` to text. Byte runs that are not valid UTF-8 (only
    /// possible when the ids split a code point) become U+FFFD.
    pub fn decode(&self, tokens: &[TokenId]) -> Result<String> {
        Ok(bytes_to_text(self.decode_bytes(tokens)?))
    }

    pub fn merge_rank(&self, left: &str, right: &str) -> Option<u32> {
        self.ranks.rank(left, right)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Tokenizer for Encoder {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        Encoder::encode(self, text)
    }

    fn encode_with_options(&self, text: &str, options: &EncodeOptions) -> Result<Vec<TokenId>> {
        let mut tokens = Encoder::encode(self, text)?;

        if options.append_eot {
            tokens.push(self.vocab.eot_token());
        }

        if let Some(max_len) = options.truncate {
            tokens.truncate(max_len);
        }

        Ok(tokens)
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String> {
        Encoder::decode(self, tokens)
    }

    fn decode_with_options(&self, tokens: &[TokenId], options: &DecodeOptions) -> Result<String> {
        let eot = self.vocab.eot_token();
        let bytes = if options.skip_special_tokens {
            self.decode_bytes_filtered(tokens, |id| id != eot)?
        } else {
            self.decode_bytes(tokens)?
        };
        Ok(bytes_to_text(bytes))
    }

    fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    fn eot_token(&self) -> TokenId {
        self.vocab.eot_token()
    }

    fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.vocab.id(token)
    }

    fn id_to_token(&self, id: TokenId) -> Option<&str> {
        self.vocab.token(id)
    }
}

fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn read_asset(path: &Path) -> std::result::Result<Vec<u8>, AssetLoadError> {
    std::fs::read(path).map_err(|source| AssetLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
