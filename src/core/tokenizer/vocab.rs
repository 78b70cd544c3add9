use std::collections::HashMap;

use super::byte_level::ByteLevel;
use super::TokenId;
use crate::core::error::AssetLoadError;

/// Sentinel appended after every document during training.
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Bijection between token strings and ids.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    encoder: HashMap<String, TokenId>,
    decoder: HashMap<TokenId, String>,
    eot_token: TokenId,
}

impl Vocabulary {
    /// Parses the JSON `token -> id` object and checks that it covers the
    /// byte alphabet and ends with the end-of-text sentinel.
    pub fn from_json(data: &[u8], bytes: &ByteLevel) -> Result<Self, AssetLoadError> {
        let encoder: HashMap<String, TokenId> =
            serde_json::from_slice(data).map_err(AssetLoadError::MalformedVocabulary)?;

        let mut decoder = HashMap::with_capacity(encoder.len());
        for (token, &id) in &encoder {
            if let Some(first) = decoder.insert(id, token.clone()) {
                let (first, second) = if first < *token {
                    (first, token.clone())
                } else {
                    (token.clone(), first)
                };
                return Err(AssetLoadError::DuplicateTokenId { id, first, second });
            }
        }

        for (byte, symbol) in bytes.symbols() {
            let mut buf = [0u8; 4];
            if !encoder.contains_key(&*symbol.encode_utf8(&mut buf)) {
                return Err(AssetLoadError::MissingByteToken { byte, symbol });
            }
        }

        let eot_token = *encoder
            .get(END_OF_TEXT)
            .ok_or(AssetLoadError::MissingEndOfText(END_OF_TEXT))?;
        let max = decoder.keys().copied().max().unwrap_or(eot_token);
        if eot_token != max {
            return Err(AssetLoadError::EndOfTextNotLast {
                token: END_OF_TEXT,
                id: eot_token,
                max,
            });
        }

        Ok(Self {
            encoder,
            decoder,
            eot_token,
        })
    }

    pub fn len(&self) -> usize {
        self.encoder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoder.is_empty()
    }

    pub fn id(&self, token: &str) -> Option<TokenId> {
        self.encoder.get(token).copied()
    }

    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.decoder.get(&id).map(String::as_str)
    }

    pub fn eot_token(&self) -> TokenId {
        self.eot_token
    }
}

/// Priority of each adjacent-symbol merge; lower ranks merge first.
#[derive(Debug, Clone, Default)]
pub struct MergeRanks {
    // left -> right -> rank, so lookups borrow instead of building tuple keys
    ranks: HashMap<String, HashMap<String, u32>>,
    len: usize,
}

impl MergeRanks {
    /// Parses a merge file: a version header, then one `left right` rule per
    /// line in priority order. Blank lines are ignored and do not consume a
    /// rank.
    pub fn parse(data: &[u8]) -> Result<Self, AssetLoadError> {
        let text = std::str::from_utf8(data).map_err(|e| AssetLoadError::MalformedMergeRules {
            line: line_of_offset(data, e.valid_up_to()),
            content: String::from_utf8_lossy(&data[..e.valid_up_to()])
                .lines()
                .last()
                .unwrap_or_default()
                .to_string(),
        })?;

        let mut merges = Self::default();
        let rules = text
            .lines()
            .enumerate()
            .skip(1)
            .filter(|(_, line)| !line.trim().is_empty());

        for (idx, line) in rules {
            let malformed = || AssetLoadError::MalformedMergeRules {
                line: idx + 1,
                content: line.to_string(),
            };

            let mut parts = line.split(' ');
            let (left, right) = match (parts.next(), parts.next(), parts.next()) {
                (Some(l), Some(r), None) if !l.is_empty() && !r.is_empty() => (l, r),
                _ => return Err(malformed()),
            };

            merges.insert(left, right);
        }

        Ok(merges)
    }

    /// Appends a rule at the next rank. A repeated rule moves to the new rank.
    pub fn insert(&mut self, left: &str, right: &str) {
        let rank = self.len as u32;
        self.ranks
            .entry(left.to_string())
            .or_default()
            .insert(right.to_string(), rank);
        self.len += 1;
    }

    pub fn rank(&self, left: &str, right: &str) -> Option<u32> {
        self.ranks.get(left)?.get(right).copied()
    }

    /// Number of rules read, including repeats.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn line_of_offset(data: &[u8], offset: usize) -> usize {
    data[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vocab() -> serde_json::Map<String, serde_json::Value> {
        let bl = ByteLevel::new();
        let mut map = serde_json::Map::new();
        for (i, (_, c)) in bl.symbols().enumerate() {
            map.insert(c.to_string(), (i as u32).into());
        }
        map
    }

    fn load(map: serde_json::Map<String, serde_json::Value>) -> Result<Vocabulary, AssetLoadError> {
        let data = serde_json::to_vec(&map).unwrap();
        Vocabulary::from_json(&data, &ByteLevel::new())
    }

    #[test]
    fn test_vocabulary_roundtrip_lookup() {
        let mut map = base_vocab();
        map.insert("he".into(), 256.into());
        map.insert(END_OF_TEXT.into(), 257.into());

        let vocab = load(map).unwrap();
        assert_eq!(vocab.len(), 258);
        assert_eq!(vocab.id("he"), Some(256));
        assert_eq!(vocab.token(256), Some("he"));
        assert_eq!(vocab.eot_token(), 257);
        assert_eq!(vocab.token(9999), None);
    }

    #[test]
    fn test_vocabulary_rejects_bad_json() {
        let err = Vocabulary::from_json(b"[1, 2, 3]", &ByteLevel::new()).unwrap_err();
        assert!(matches!(err, AssetLoadError::MalformedVocabulary(_)));

        let err = Vocabulary::from_json(br#"{"a": -1}"#, &ByteLevel::new()).unwrap_err();
        assert!(matches!(err, AssetLoadError::MalformedVocabulary(_)));
    }

    #[test]
    fn test_vocabulary_rejects_duplicate_ids() {
        let mut map = base_vocab();
        map.insert("he".into(), 5.into());
        map.insert(END_OF_TEXT.into(), 256.into());

        let err = load(map).unwrap_err();
        assert!(matches!(err, AssetLoadError::DuplicateTokenId { id: 5, .. }));
    }

    #[test]
    fn test_vocabulary_requires_byte_tokens() {
        let mut map = base_vocab();
        map.remove("Ġ");
        map.insert(END_OF_TEXT.into(), 256.into());

        let err = load(map).unwrap_err();
        assert!(matches!(err, AssetLoadError::MissingByteToken { byte: b' ', .. }));
    }

    #[test]
    fn test_vocabulary_requires_end_of_text_last() {
        let err = load(base_vocab()).unwrap_err();
        assert!(matches!(err, AssetLoadError::MissingEndOfText(_)));

        let mut map = base_vocab();
        map.insert(END_OF_TEXT.into(), 256.into());
        map.insert("he".into(), 300.into());
        let err = load(map).unwrap_err();
        assert!(matches!(
            err,
            AssetLoadError::EndOfTextNotLast { id: 256, max: 300, .. }
        ));
    }

    #[test]
    fn test_merge_ranks_parse() {
        let merges = MergeRanks::parse(b"#version: 0.2\nh e\nl l\nhe ll\n").unwrap();
        assert_eq!(merges.len(), 3);
        assert_eq!(merges.rank("h", "e"), Some(0));
        assert_eq!(merges.rank("l", "l"), Some(1));
        assert_eq!(merges.rank("he", "ll"), Some(2));
        assert_eq!(merges.rank("e", "h"), None);
    }

    #[test]
    fn test_merge_ranks_skip_header_and_blanks() {
        let merges = MergeRanks::parse(b"a b\r\nc d\r\n\r\ne f").unwrap();
        assert_eq!(merges.rank("a", "b"), None);
        assert_eq!(merges.rank("c", "d"), Some(0));
        assert_eq!(merges.rank("e", "f"), Some(1));

        assert!(MergeRanks::parse(b"").unwrap().is_empty());
        assert!(MergeRanks::parse(b"#version: 0.2\n").unwrap().is_empty());
    }

    #[test]
    fn test_merge_ranks_malformed() {
        for data in [
            &b"#version\nh e\nabc\n"[..],
            b"#version\nh e\na b c\n",
            b"#version\nh e\nh  e\n",
            b"#version\nh e\n a\n",
        ] {
            match MergeRanks::parse(data) {
                Err(AssetLoadError::MalformedMergeRules { line, .. }) => assert_eq!(line, 3, "{data:?}"),
                other => panic!("expected malformed rule, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_merge_ranks_later_duplicate_wins() {
        let merges = MergeRanks::parse(b"#v\na b\nc d\na b\n").unwrap();
        assert_eq!(merges.rank("a", "b"), Some(2));
    }
}
