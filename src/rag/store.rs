use crate::types::{AppError, Result};
use docent_vector::Position;

/// Append-only sequence of chunk texts.
///
/// Positions line up 1:1 with the vectors of the corpus index; the corpus is
/// the only writer and always extends both together.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<String>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return its position.
    pub fn append(&mut self, text: impl Into<String>) -> Position {
        self.chunks.push(text.into());
        self.chunks.len() - 1
    }

    /// Get the chunk at `position`.
    pub fn get(&self, position: Position) -> Result<&str> {
        self.chunks
            .get(position)
            .map(String::as_str)
            .ok_or(AppError::OutOfRange {
                position,
                len: self.chunks.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(String::as_str)
    }
}
