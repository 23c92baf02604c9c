//! Error types for docent-vector.

use thiserror::Error;

/// Result type for docent-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in index operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Vector length does not match the index dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions.
        expected: usize,
        /// Actual dimensions provided.
        actual: usize,
    },

    /// Invalid vector (e.g., contains NaN or infinity).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Invalid argument (zero dimensions, `k == 0`).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The index reached its configured vector limit.
    #[error("Capacity exceeded: index is limited to {limit} vectors")]
    CapacityExceeded {
        /// Configured maximum number of vectors.
        limit: usize,
    },
}
