//! Common types for docent-vector.

/// Zero-based insertion position of a vector in an index.
///
/// Positions are assigned in insertion order and never reused.
pub type Position = usize;

/// One nearest-neighbor hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neighbor {
    /// Position of the matched vector.
    pub position: Position,
    /// Euclidean distance to the query (lower = more similar).
    pub distance: f32,
}

impl Neighbor {
    /// Create a new neighbor.
    pub fn new(position: Position, distance: f32) -> Self {
        Self { position, distance }
    }
}
