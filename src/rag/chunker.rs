//! Whitespace word chunking.
//!
//! Words are accumulated into a running chunk while a size counter grows by
//! `chars(word) + 1` per word. Once the counter reaches the limit the chunk
//! is closed. The `+ 1` stands in for a separating space, so the counter is
//! a size heuristic and not the joined chunk's exact length. Words are never
//! split, so a single word longer than the limit becomes its own chunk.
//!
//! Word separators are Unicode whitespace plus the ASCII information
//! separators U+001C..=U+001F.

use crate::types::{AppError, Result};

/// Default chunk size limit.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    max_size: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TextChunker {
    /// Create a chunker closing chunks once their size counter reaches `max_size`.
    pub fn new(max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(AppError::InvalidArgument(
                "chunk size must be a positive integer".to_string(),
            ));
        }
        Ok(Self { max_size })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Split `text` into ordered chunks of single-space-joined words.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut size = 0usize;

        for word in text.split(is_separator).filter(|w| !w.is_empty()) {
            current.push(word);
            size += word.chars().count() + 1;

            if size >= self.max_size {
                chunks.push(current.join(" "));
                current.clear();
                size = 0;
            }
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Chunk `text` with a one-off chunker.
pub fn chunk_text(text: &str, max_size: usize) -> Result<Vec<String>> {
    Ok(TextChunker::new(max_size)?.chunk(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "The mitochondria is the powerhouse of the cell.\n\n\
        Cellular respiration  converts glucose\tinto ATP, releasing carbon dioxide \
        and water as by-products. Photosynthesis runs the reverse reaction.";

    #[test]
    fn test_one_word_per_chunk_at_small_limit() {
        let chunks = chunk_text("alpha beta gamma delta", 5).unwrap();
        assert_eq!(chunks, vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn test_boundary_uses_word_plus_one_heuristic() {
        // "ab"(3) + "cd"(3) = 6 >= 6 closes after the second word
        let chunks = chunk_text("ab cd ef gh ij", 6).unwrap();
        assert_eq!(chunks, vec!["ab cd", "ef gh", "ij"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk_text("", 10).unwrap().is_empty());
        assert!(chunk_text(" \n\t  ", 10).unwrap().is_empty());
    }

    #[test]
    fn test_information_separators_split_words() {
        let chunks = chunk_text("alpha\u{1f}beta\u{1c}gamma\u{1e}\u{1d}delta", 1000).unwrap();
        assert_eq!(chunks, vec!["alpha beta gamma delta"]);

        assert!(chunk_text("\u{1c}\u{1f} ", 10).unwrap().is_empty());
    }

    #[test]
    fn test_long_word_is_not_split() {
        let word = "a".repeat(50);
        let text = format!("short {} tail", word);
        let chunks = chunk_text(&text, 10).unwrap();
        assert_eq!(chunks, vec![format!("short {}", word), "tail".to_string()]);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            chunk_text("anything", 0),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(TextChunker::new(0).is_err());
    }

    #[test]
    fn test_size_counts_characters_not_bytes() {
        // Four characters, eight bytes each side of the boundary
        let chunks = chunk_text("éééé éééé", 5).unwrap();
        assert_eq!(chunks, vec!["éééé", "éééé"]);
    }

    #[test]
    fn test_default_limit() {
        let chunker = TextChunker::default();
        assert_eq!(chunker.max_size(), DEFAULT_CHUNK_SIZE);

        let text = "word ".repeat(1000);
        let chunks = chunker.chunk(&text);
        // 5 per word, so 200 words close each chunk
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.split(' ').count() == 200));
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(17)]
    #[case(64)]
    #[case(1000)]
    fn test_round_trip_preserves_words(#[case] max_size: usize) {
        let chunks = chunk_text(SAMPLE, max_size).unwrap();

        let rejoined = chunks.join(" ");
        let original: Vec<&str> = SAMPLE.split_whitespace().collect();
        let restored: Vec<&str> = rejoined.split_whitespace().collect();
        assert_eq!(restored, original);
        assert_eq!(rejoined, original.join(" "));

        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[rstest]
    #[case(3)]
    #[case(20)]
    fn test_deterministic(#[case] max_size: usize) {
        let first = chunk_text(SAMPLE, max_size).unwrap();
        let second = chunk_text(SAMPLE, max_size).unwrap();
        assert_eq!(first, second);
    }
}
