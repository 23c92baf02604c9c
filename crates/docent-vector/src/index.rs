//! Exact flat index over Euclidean distance.
//!
//! Vectors are stored row-major in one contiguous buffer and searched by a
//! full linear scan. There is no randomness anywhere in the search, so equal
//! inputs always produce equal outputs.

use crate::config::IndexConfig;
use crate::distance::squared_euclidean;
use crate::error::{Error, Result};
use crate::types::{Neighbor, Position};
use std::cmp::Ordering;
use tracing::trace;

/// Append-only exact nearest-neighbor index.
///
/// The index is not internally synchronized: mutation requires `&mut self`.
/// Callers that share an index across tasks wrap it in their own lock.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    config: IndexConfig,
    /// Row-major vector storage, `len() * dimensions` floats.
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `config.dimensions` is zero.
    pub fn new(config: IndexConfig) -> Result<Self> {
        if config.dimensions == 0 {
            return Err(Error::InvalidArgument(
                "Dimensions must be > 0".to_string(),
            ));
        }

        Ok(Self {
            config,
            data: Vec::new(),
        })
    }

    /// Create an unbounded index for vectors of `dimensions` length.
    pub fn with_dimensions(dimensions: usize) -> Result<Self> {
        Self::new(IndexConfig::new(dimensions))
    }

    /// Get the vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Get the index configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of vectors inserted so far.
    pub fn len(&self) -> usize {
        self.data.len() / self.config.dimensions
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Approximate memory held by stored vectors, in bytes.
    pub fn memory_usage(&self) -> usize {
        self.data.capacity() * std::mem::size_of::<f32>()
    }

    /// Get the vector stored at `position`.
    pub fn get(&self, position: Position) -> Option<&[f32]> {
        let dim = self.config.dimensions;
        let start = position.checked_mul(dim)?;
        let end = start.checked_add(dim)?;
        self.data.get(start..end)
    }

    /// Append a vector and return its position.
    ///
    /// The returned position equals the number of vectors inserted before
    /// this call. On error the index is left unchanged.
    pub fn insert(&mut self, vector: &[f32]) -> Result<Position> {
        self.validate(vector)?;

        if let Some(limit) = self.config.limit() {
            if self.len() >= limit {
                return Err(Error::CapacityExceeded { limit });
            }
        }

        let position = self.len();
        self.data.extend_from_slice(vector);
        trace!(position, "Inserted vector");
        Ok(position)
    }

    /// Check that a batch of vectors would be accepted by [`insert`](Self::insert).
    ///
    /// Lets a caller validate a whole batch before mutating anything.
    pub fn check_batch<'a, I>(&self, vectors: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut count = 0usize;
        for vector in vectors {
            self.validate(vector)?;
            count += 1;
        }

        if let Some(limit) = self.config.limit() {
            if self.len() + count > limit {
                return Err(Error::CapacityExceeded { limit });
            }
        }

        Ok(())
    }

    /// Find the `k` stored vectors closest to `query`.
    ///
    /// Results are ordered by ascending distance; equal distances keep
    /// insertion order. Returns at most `min(k, len())` neighbors and an
    /// empty vector when nothing has been inserted.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `k` is zero.
    /// - [`Error::DimensionMismatch`] / [`Error::InvalidVector`] for a bad query.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be > 0".to_string()));
        }
        self.validate(query)?;

        let mut scored: Vec<(Position, f32)> = self
            .data
            .chunks_exact(self.config.dimensions)
            .enumerate()
            .map(|(position, row)| (position, squared_euclidean(query, row)))
            .collect();

        let limit = k.min(scored.len());
        if limit == 0 {
            return Ok(Vec::new());
        }

        if limit < scored.len() {
            scored.select_nth_unstable_by(limit - 1, rank);
            scored.truncate(limit);
        }
        scored.sort_by(rank);

        trace!(candidates = self.len(), returned = limit, "Flat search");

        Ok(scored
            .into_iter()
            .map(|(position, squared)| Neighbor::new(position, squared.sqrt()))
            .collect())
    }

    fn validate(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.config.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimensions,
                actual: vector.len(),
            });
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(
                "Vector contains NaN or Inf".to_string(),
            ));
        }

        Ok(())
    }
}

/// Total order used for ranking: distance first, then insertion position.
fn rank(a: &(Position, f32), b: &(Position, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let result = FlatIndex::with_dimensions(0);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_insert_returns_sequential_positions() {
        let mut index = FlatIndex::with_dimensions(3).unwrap();

        assert_eq!(index.insert(&[1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(index.insert(&[0.0, 1.0, 0.0]).unwrap(), 1);
        assert_eq!(index.insert(&[0.0, 0.0, 1.0]).unwrap(), 2);
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(1), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(index.get(3), None);
    }

    #[test]
    fn test_get_far_out_of_range_is_none() {
        let mut index = FlatIndex::with_dimensions(3).unwrap();
        index.insert(&[1.0, 2.0, 3.0]).unwrap();

        assert_eq!(index.get(usize::MAX / 3), None);
        assert_eq!(index.get(usize::MAX), None);
    }

    #[test]
    fn test_dimension_mismatch_does_not_advance_count() {
        let mut index = FlatIndex::with_dimensions(3).unwrap();
        index.insert(&[1.0, 0.0, 0.0]).unwrap();

        let result = index.insert(&[1.0, 0.0]);
        assert_eq!(
            result,
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_nan_rejected() {
        let mut index = FlatIndex::with_dimensions(2).unwrap();
        let result = index.insert(&[f32::NAN, 0.0]);
        assert!(matches!(result, Err(Error::InvalidVector(_))));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_empty_index() {
        let index = FlatIndex::with_dimensions(3).unwrap();
        let results = index.search(&[1.0, 0.0, 0.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_k_zero_rejected() {
        let index = FlatIndex::with_dimensions(3).unwrap();
        let result = index.search(&[1.0, 0.0, 0.0], 0);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_search_orders_by_distance() {
        let mut index = FlatIndex::with_dimensions(2).unwrap();
        index.insert(&[10.0, 0.0]).unwrap();
        index.insert(&[1.0, 0.0]).unwrap();
        index.insert(&[3.0, 0.0]).unwrap();

        let results = index.search(&[0.0, 0.0], 3).unwrap();
        let positions: Vec<_> = results.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert!((results[0].distance - 1.0).abs() < 1e-6);
        assert!((results[1].distance - 3.0).abs() < 1e-6);
        assert!((results[2].distance - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let mut index = FlatIndex::with_dimensions(4).unwrap();
        for axis in 0..4 {
            index.insert(&unit(4, axis)).unwrap();
        }

        // The origin is equidistant from every unit vector.
        let results = index.search(&[0.0; 4], 3).unwrap();
        let positions: Vec<_> = results.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_truncates_to_len() {
        let mut index = FlatIndex::with_dimensions(2).unwrap();
        index.insert(&[0.0, 1.0]).unwrap();
        index.insert(&[1.0, 0.0]).unwrap();

        let results = index.search(&[0.0, 1.0], 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].position, 0);
        assert!(results[0].distance.abs() < 1e-6);
    }

    #[test]
    fn test_search_query_dimension_mismatch() {
        let mut index = FlatIndex::with_dimensions(3).unwrap();
        index.insert(&[1.0, 0.0, 0.0]).unwrap();
        let result = index.search(&[1.0, 0.0], 1);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_capacity_limit() {
        let mut index = FlatIndex::new(IndexConfig::new(2).with_max_vectors(1)).unwrap();
        index.insert(&[1.0, 0.0]).unwrap();

        let result = index.insert(&[0.0, 1.0]);
        assert_eq!(result, Err(Error::CapacityExceeded { limit: 1 }));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_check_batch() {
        let mut index = FlatIndex::new(IndexConfig::new(2).with_max_vectors(2)).unwrap();
        index.insert(&[1.0, 0.0]).unwrap();

        let ok: Vec<&[f32]> = vec![&[0.0, 1.0]];
        assert!(index.check_batch(ok).is_ok());

        let too_many: Vec<&[f32]> = vec![&[0.0, 1.0], &[1.0, 1.0]];
        assert!(matches!(
            index.check_batch(too_many),
            Err(Error::CapacityExceeded { limit: 2 })
        ));

        let bad_dim: Vec<&[f32]> = vec![&[0.0, 1.0, 2.0]];
        assert!(matches!(
            index.check_batch(bad_dim),
            Err(Error::DimensionMismatch { .. })
        ));
        assert_eq!(index.len(), 1);
    }
}
