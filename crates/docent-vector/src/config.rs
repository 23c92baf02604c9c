//! Configuration for a flat index.

/// Configuration for a [`FlatIndex`](crate::FlatIndex).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexConfig {
    /// Dimensionality every stored and query vector must have.
    pub dimensions: usize,

    /// Maximum number of vectors the index accepts (0 = unlimited).
    pub max_vectors: usize,
}

impl IndexConfig {
    /// Create an unbounded configuration for vectors of `dimensions` length.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            max_vectors: 0,
        }
    }

    /// Set the maximum number of vectors.
    pub fn with_max_vectors(mut self, max: usize) -> Self {
        self.max_vectors = max;
        self
    }

    /// Returns the vector limit, if one is configured.
    pub fn limit(&self) -> Option<usize> {
        (self.max_vectors > 0).then_some(self.max_vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_by_default() {
        let config = IndexConfig::new(1536);
        assert_eq!(config.dimensions, 1536);
        assert_eq!(config.limit(), None);
    }

    #[test]
    fn test_with_max_vectors() {
        let config = IndexConfig::new(4).with_max_vectors(10);
        assert_eq!(config.limit(), Some(10));
    }
}
