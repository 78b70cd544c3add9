//! Reversible mapping between raw bytes and printable characters.
//!
//! The merge table is trained over this alphabet rather than over raw bytes,
//! so every byte (including control characters and UTF-8 continuation bytes)
//! becomes exactly one visible "character" before merging.

use std::collections::HashMap;

/// First code point handed out to bytes that are not printable on their own.
const REMAP_OFFSET: u32 = 256;

#[derive(Debug, Clone)]
pub struct ByteLevel {
    byte_encoder: [char; 256],
    byte_decoder: HashMap<char, u8>,
}

impl ByteLevel {
    pub fn new() -> Self {
        let byte_encoder = bytes_to_unicode();
        let byte_decoder = byte_encoder
            .iter()
            .enumerate()
            .map(|(b, &c)| (c, b as u8))
            .collect();

        Self {
            byte_encoder,
            byte_decoder,
        }
    }

    pub fn symbol(&self, byte: u8) -> char {
        self.byte_encoder[byte as usize]
    }

    pub fn byte(&self, symbol: char) -> Option<u8> {
        self.byte_decoder.get(&symbol).copied()
    }

    /// Remaps every UTF-8 byte of `text` to its symbol.
    pub fn encode(&self, text: &str) -> String {
        text.bytes().map(|b| self.symbol(b)).collect()
    }

    /// Maps a symbol stream back to bytes. Returns the first symbol outside
    /// the alphabet as the error.
    pub fn decode(&self, symbols: &str) -> Result<Vec<u8>, char> {
        symbols.chars().map(|c| self.byte(c).ok_or(c)).collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (u8, char)> + '_ {
        self.byte_encoder
            .iter()
            .enumerate()
            .map(|(b, &c)| (b as u8, c))
    }
}

impl Default for ByteLevel {
    fn default() -> Self {
        Self::new()
    }
}

fn is_printable(b: u8) -> bool {
    matches!(b, b'!'..=b'~' | 0xA1..=0xAC | 0xAE..=0xFF)
}

fn bytes_to_unicode() -> [char; 256] {
    let mut mapping = ['\0'; 256];
    let mut offset = REMAP_OFFSET;

    for b in 0..=255u8 {
        mapping[b as usize] = if is_printable(b) {
            char::from(b)
        } else {
            // 256..=323 never hits the surrogate range.
            let c = char::from_u32(offset).unwrap_or(char::REPLACEMENT_CHARACTER);
            offset += 1;
            c
        };
    }

    mapping
}
