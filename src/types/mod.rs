use docent_vector::Position;
use serde::{Deserialize, Serialize};

// ============= RAG Types =============

/// One chunk returned by retrieval, with its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Position of the chunk in the corpus.
    pub position: Position,
    /// Chunk text.
    pub text: String,
    /// Euclidean distance between the chunk and query embeddings.
    pub distance: f32,
}

/// A generated answer together with the context it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generator output, passed through unvalidated.
    pub text: String,
    /// Retrieved chunks in ascending distance order.
    pub context: Vec<RetrievedChunk>,
}

impl Answer {
    /// The context chunk texts, in retrieval order.
    pub fn context_texts(&self) -> Vec<&str> {
        self.context.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Size information about a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Number of stored chunks.
    pub chunk_count: usize,
    /// Number of indexed vectors. Equal to `chunk_count` at every commit.
    pub vector_count: usize,
    /// Embedding dimensionality.
    pub dimensions: usize,
    /// Approximate memory held by stored vectors, in bytes.
    pub index_bytes: usize,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Generation provider unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Chunk position {position} out of range (store holds {len} chunks)")]
    OutOfRange { position: Position, len: usize },

    #[error("No document has been ingested yet")]
    NoDocument,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<docent_vector::Error> for AppError {
    fn from(err: docent_vector::Error) -> Self {
        match err {
            docent_vector::Error::DimensionMismatch { expected, actual } => {
                AppError::DimensionMismatch { expected, actual }
            }
            docent_vector::Error::InvalidVector(msg) => {
                AppError::InvalidArgument(format!("invalid embedding: {}", msg))
            }
            docent_vector::Error::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            docent_vector::Error::CapacityExceeded { limit } => AppError::InvalidArgument(
                format!("corpus is full ({} chunks maximum)", limit),
            ),
        }
    }
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(err: crate::utils::toml_config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_errors_map_to_core_kinds() {
        let err: AppError = docent_vector::Error::DimensionMismatch {
            expected: 1536,
            actual: 3,
        }
        .into();
        assert!(matches!(
            err,
            AppError::DimensionMismatch {
                expected: 1536,
                actual: 3
            }
        ));

        let err: AppError = docent_vector::Error::CapacityExceeded { limit: 10 }.into();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_answer_context_texts() {
        let answer = Answer {
            text: "42".to_string(),
            context: vec![
                RetrievedChunk {
                    position: 3,
                    text: "first".to_string(),
                    distance: 0.1,
                },
                RetrievedChunk {
                    position: 0,
                    text: "second".to_string(),
                    distance: 0.4,
                },
            ],
        };
        assert_eq!(answer.context_texts(), vec!["first", "second"]);
    }
}
