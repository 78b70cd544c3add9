use std::path::PathBuf;

use thiserror::Error;

use super::tokenizer::TokenId;

/// Failures while turning the vocabulary and merge-rule assets into tables.
///
/// All of these are fatal at construction time.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("malformed vocabulary: {0}")]
    MalformedVocabulary(#[source] serde_json::Error),

    #[error("malformed merge rule on line {line}: {content:?}")]
    MalformedMergeRules { line: usize, content: String },

    #[error("token id {id} is assigned to both {first:?} and {second:?}")]
    DuplicateTokenId {
        id: TokenId,
        first: String,
        second: String,
    },

    #[error("vocabulary has no base token for byte {byte:#04x} ({symbol:?})")]
    MissingByteToken { byte: u8, symbol: char },

    #[error("vocabulary has no {0:?} token")]
    MissingEndOfText(&'static str),

    #[error("{token:?} has id {id} but the largest id in the vocabulary is {max}")]
    EndOfTextNotLast {
        token: &'static str,
        id: TokenId,
        max: TokenId,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),

    #[error("pre-tokenization stalled at byte offset {offset}: {reason}")]
    Pretokenize { offset: usize, reason: String },

    #[error("merged sub-token {0:?} is not in the vocabulary")]
    UnknownToken(String),

    #[error("token id {0} is not in the vocabulary")]
    UnknownTokenId(TokenId),

    #[error("token id {id} contains {symbol:?}, which is outside the byte alphabet")]
    InvalidSymbol { id: TokenId, symbol: char },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TokenizerError::UnknownTokenId(99);
        assert_eq!(err.to_string(), "token id 99 is not in the vocabulary");

        let err: TokenizerError = AssetLoadError::MalformedMergeRules {
            line: 3,
            content: "a".into(),
        }
        .into();
        assert_eq!(err.to_string(), "malformed merge rule on line 3: \"a\"");
    }
}
