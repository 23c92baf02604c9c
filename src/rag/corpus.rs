//! The retrieval corpus: chunk store and vector index behind one lock.
//!
//! # Consistency
//!
//! `store[i]` and `index[i]` always describe the same chunk. Both are only
//! extended by [`Corpus::ingest`], which embeds a whole batch first and then
//! commits it under the write lock with no await points in between. A failed
//! or cancelled ingest leaves the corpus exactly as it was.
//!
//! # Locking
//!
//! - `ingest_lock` serializes ingests against each other, for the whole batch.
//! - `state` is a read/write lock. Retrieval takes it shared; the commit step
//!   of an ingest takes it exclusively. Provider calls never run under it, so
//!   a slow embedding batch does not stall queries.

use std::sync::Arc;

use docent_vector::{FlatIndex, IndexConfig, Neighbor};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::chunker::TextChunker;
use super::embeddings::Embedder;
use super::store::ChunkStore;
use crate::types::{AppError, CorpusStats, Result, RetrievedChunk};

/// Default number of chunks returned by retrieval.
pub const DEFAULT_TOP_K: usize = 5;

struct CorpusState {
    store: ChunkStore,
    index: FlatIndex,
}

/// An accumulating set of chunks and their embeddings.
///
/// Chunks from every successful [`ingest`](Self::ingest) are kept for the
/// lifetime of the corpus. Start from a fresh corpus to replace a document.
pub struct Corpus {
    embedder: Arc<dyn Embedder>,
    chunker: TextChunker,
    ingest_lock: Mutex<()>,
    state: RwLock<CorpusState>,
}

impl Corpus {
    /// Create an empty, unbounded corpus sized for `embedder`'s vectors.
    pub fn new(embedder: Arc<dyn Embedder>, chunker: TextChunker) -> Result<Self> {
        let config = IndexConfig::new(embedder.dimensions());
        Self::with_index_config(embedder, chunker, config)
    }

    /// Create an empty corpus with an explicit index configuration.
    pub fn with_index_config(
        embedder: Arc<dyn Embedder>,
        chunker: TextChunker,
        config: IndexConfig,
    ) -> Result<Self> {
        if config.dimensions != embedder.dimensions() {
            return Err(AppError::DimensionMismatch {
                expected: config.dimensions,
                actual: embedder.dimensions(),
            });
        }

        Ok(Self {
            embedder,
            chunker,
            ingest_lock: Mutex::new(()),
            state: RwLock::new(CorpusState {
                store: ChunkStore::new(),
                index: FlatIndex::new(config)?,
            }),
        })
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Chunk, embed and append `text`. Returns the number of chunks added.
    ///
    /// Stops at the first embedding failure and reports it; nothing from the
    /// batch is stored in that case.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn ingest(&self, text: &str) -> Result<usize> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            debug!("Nothing to ingest");
            return Ok(0);
        }

        let _guard = self.ingest_lock.lock().await;

        let mut vectors = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            match self.embedder.embed(chunk).await {
                Ok(vector) => vectors.push(vector),
                Err(e) => {
                    warn!(chunk = i, total = chunks.len(), error = %e, "Ingestion aborted");
                    return Err(e);
                }
            }
        }

        let mut state = self.state.write().await;
        state
            .index
            .check_batch(vectors.iter().map(Vec::as_slice))
            .map_err(embedder_output_error)?;

        for (chunk, vector) in chunks.into_iter().zip(&vectors) {
            let position = state.index.insert(vector)?;
            let stored = state.store.append(chunk);
            debug_assert_eq!(position, stored);
        }

        info!(
            added = vectors.len(),
            corpus_size = state.store.len(),
            "Committed ingestion batch"
        );
        Ok(vectors.len())
    }

    /// Find the `k` chunks closest to `question`, nearest first.
    ///
    /// An empty corpus yields an empty result without calling the embedder.
    #[instrument(skip(self, question))]
    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        if question.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "question must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(AppError::InvalidArgument("k must be > 0".to_string()));
        }

        if self.state.read().await.store.is_empty() {
            debug!("Search on empty corpus");
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(question).await?;
        let state = self.state.read().await;
        let neighbors = state
            .index
            .search(&query, k)
            .map_err(embedder_output_error)?;
        Ok(Self::resolve_hits(&state, neighbors))
    }

    /// Find the `k` chunks closest to a caller-supplied query vector.
    pub async fn search_by_vector(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        let state = self.state.read().await;
        let neighbors = state.index.search(query, k)?;
        Ok(Self::resolve_hits(&state, neighbors))
    }

    fn resolve_hits(state: &CorpusState, neighbors: Vec<Neighbor>) -> Vec<RetrievedChunk> {
        let mut hits = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            match state.store.get(neighbor.position) {
                Ok(text) => hits.push(RetrievedChunk {
                    position: neighbor.position,
                    text: text.to_string(),
                    distance: neighbor.distance,
                }),
                Err(e) => warn!(error = %e, "Dropping unaligned search hit"),
            }
        }

        debug!(hits = hits.len(), "Retrieved chunks");
        hits
    }

    /// Chunk texts for the `k` nearest chunks, nearest first.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .search(question, k)
            .await?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Text of the chunk stored at `position`.
    pub async fn chunk(&self, position: usize) -> Result<String> {
        Ok(self.state.read().await.store.get(position)?.to_string())
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CorpusStats {
        let state = self.state.read().await;
        CorpusStats {
            chunk_count: state.store.len(),
            vector_count: state.index.len(),
            dimensions: state.index.dimensions(),
            index_bytes: state.index.memory_usage(),
        }
    }
}

/// Index errors on vectors the embedder produced are provider failures,
/// not bad caller input.
fn embedder_output_error(err: docent_vector::Error) -> AppError {
    match err {
        docent_vector::Error::InvalidVector(msg) => {
            AppError::EmbeddingUnavailable(format!("embedder returned an invalid vector: {}", msg))
        }
        other => other.into(),
    }
}
