use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{Result, TokenizerError};

/// Contractions, then optionally space-led runs of letters, digits or
/// punctuation, then whitespace. The automaton has no lookahead, so the
/// `\s+(?!\S)` rule is applied in [`pretokenize`]: a whitespace run that
/// stops before a non-space hands its last character to the next piece.
const PATTERN: &str = r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+";

static SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(PATTERN).expect("pre-tokenizer pattern is valid"));

/// Splits `text` into contiguous pieces that together cover it exactly once.
pub fn pretokenize(text: &str) -> Result<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let m = SPLIT
            .find_at(text, pos)
            .filter(|m| m.start() == pos && m.end() > pos)
            .ok_or_else(|| TokenizerError::Pretokenize {
                offset: pos,
                reason: "no rule matches here".to_string(),
            })?;

        let mut end = m.end();
        if end < text.len() {
            // `\s+` is maximal, so a run ending before the input does is
            // followed by a non-space.
            let mut chars = m.as_str().chars();
            if let Some(last) = chars.next_back().filter(|c| c.is_whitespace()) {
                if chars.next().is_some() {
                    end -= last.len_utf8();
                }
            }
        }

        pieces.push(&text[pos..end]);
        pos = end;
    }

    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_and_spaces() {
        assert_eq!(pretokenize("hello world").unwrap(), vec!["hello", " world"]);
        assert_eq!(
            pretokenize("This is some text").unwrap(),
            vec!["This", " is", " some", " text"]
        );
    }

    #[test]
    fn test_contractions() {
        assert_eq!(
            pretokenize("I'll say they've won't").unwrap(),
            vec!["I", "'ll", " say", " they", "'ve", " won", "'t"]
        );
        // only the listed suffixes split; others fall through to punctuation
        assert_eq!(pretokenize("o'x").unwrap(), vec!["o", "'", "x"]);
    }

    #[test]
    fn test_digits_and_punctuation() {
        assert_eq!(
            pretokenize("costs $1234.50!!").unwrap(),
            vec!["costs", " $", "1234", ".", "50", "!!"]
        );
    }

    #[test]
    fn test_whitespace_runs() {
        assert_eq!(pretokenize("a   b").unwrap(), vec!["a", "  ", " b"]);
        assert_eq!(pretokenize("a\nb").unwrap(), vec!["a", "\n", "b"]);
        assert_eq!(pretokenize("end  ").unwrap(), vec!["end", "  "]);
        assert_eq!(pretokenize(" ").unwrap(), vec![" "]);
        assert_eq!(pretokenize("\t").unwrap(), vec!["\t"]);
    }

    #[test]
    fn test_non_latin() {
        assert_eq!(
            pretokenize("hello 👋 world 🌍!").unwrap(),
            vec!["hello", " 👋", " world", " 🌍!"]
        );
        assert_eq!(pretokenize("héllo мир").unwrap(), vec!["héllo", " мир"]);
    }

    #[test]
    fn test_covers_input() {
        let text = "  Mixed\tinput, with 42 numbers\r\n and 'quotes' ...\n\n";
        let pieces = pretokenize(text).unwrap();
        assert_eq!(pieces.concat(), text);
        assert!(pieces.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_whitespace_before_word() {
        assert_eq!(pretokenize("a \t\nb").unwrap(), vec!["a", " \t", "\n", "b"]);
        assert_eq!(
            pretokenize("a\u{3000}\u{3000}b").unwrap(),
            vec!["a", "\u{3000}", "\u{3000}", "b"]
        );
        assert_eq!(pretokenize("  \n").unwrap(), vec!["  \n"]);
    }

    #[test]
    fn test_long_runs() {
        for unit in ["a", " ", "!", "7"] {
            let text = unit.repeat(1_000_000);
            let pieces = pretokenize(&text).unwrap();
            assert_eq!(pieces.concat(), text, "{unit:?}");
        }

        let text = " \t".repeat(500_000) + "x";
        let pieces = pretokenize(&text).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].len(), 999_999);
        assert_eq!(&pieces[1..], ["\t", "x"]);
    }

    #[test]
    fn test_empty() {
        assert!(pretokenize("").unwrap().is_empty());
    }
}
