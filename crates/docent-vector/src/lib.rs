//! # docent-vector
//!
//! Exact nearest-neighbor search over Euclidean (L2) distance for small,
//! single-document corpora.
//!
//! ## Features
//!
//! - **Exact**: full linear scan, no recall/speed tuning
//! - **Deterministic**: ties are broken by insertion order
//! - **Append-only**: positions are assigned sequentially and never reused
//! - **Atomic batches**: [`FlatIndex::check_batch`] validates before any write
//!
//! ## Quick Start
//!
//! ```rust
//! use docent_vector::FlatIndex;
//!
//! let mut index = FlatIndex::with_dimensions(3)?;
//! index.insert(&[1.0, 0.0, 0.0])?;
//! index.insert(&[0.0, 1.0, 0.0])?;
//!
//! let hits = index.search(&[0.9, 0.1, 0.0], 1)?;
//! assert_eq!(hits[0].position, 0);
//! # Ok::<(), docent_vector::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod distance;
pub mod error;
pub mod index;
pub mod types;

// Re-exports for convenience
pub use config::IndexConfig;
pub use error::{Error, Result};
pub use index::FlatIndex;
pub use types::{Neighbor, Position};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::rstest;

    fn random_vectors(count: usize, dim: usize) -> Vec<Vec<f32>> {
        let mut rng = rand::rng();
        (0..count)
            .map(|_| (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect())
            .collect()
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(50)]
    #[case(200)]
    fn test_search_matches_brute_force(#[case] k: usize) {
        let dim = 16;
        let vectors = random_vectors(100, dim);
        let query = random_vectors(1, dim).remove(0);

        let mut index = FlatIndex::with_dimensions(dim).unwrap();
        for v in &vectors {
            index.insert(v).unwrap();
        }

        let mut expected: Vec<(usize, f32)> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, distance::euclidean(&query, v)))
            .collect();
        expected.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        expected.truncate(k);

        let results = index.search(&query, k).unwrap();
        assert_eq!(results.len(), k.min(vectors.len()));

        for (hit, (position, dist)) in results.iter().zip(expected) {
            assert_eq!(hit.position, position);
            assert!((hit.distance - dist).abs() < 1e-4);
        }

        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_exact_match_is_nearest() {
        let dim = 8;
        let vectors = random_vectors(20, dim);

        let mut index = FlatIndex::with_dimensions(dim).unwrap();
        for v in &vectors {
            index.insert(v).unwrap();
        }

        let hits = index.search(&vectors[13], 1).unwrap();
        assert_eq!(hits[0].position, 13);
        assert!(hits[0].distance.abs() < 1e-6);
    }
}
