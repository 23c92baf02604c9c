//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! # Module Structure
//!
//! - [`rag::chunker`](crate::rag::chunker) - Whitespace word chunking
//! - [`rag::store`](crate::rag::store) - Append-only chunk text store
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedder trait and HTTP providers
//! - [`rag::cache`](crate::rag::cache) - LRU embedding cache
//! - [`rag::corpus`](crate::rag::corpus) - Chunk store + vector index with ingest/retrieve
//! - [`rag::pipeline`](crate::rag::pipeline) - Context assembly and answer generation
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - The document is chunked, every chunk embedded, then the
//!    whole batch is committed to the store and index together
//! 2. **Retrieval** - The question is embedded and the nearest chunks looked up
//! 3. **Generation** - Chunks are joined one per line and sent with the question
//!
//! # Example
//!
//! ```ignore
//! use docent::rag::{chunker::TextChunker, corpus::Corpus, pipeline::RagPipeline};
//!
//! let corpus = Corpus::new(embedder, TextChunker::default())?;
//! let pipeline = RagPipeline::new(Arc::new(corpus), llm);
//!
//! pipeline.ingest(&document_text).await?;
//! let answer = pipeline.answer("What is photosynthesis?").await?;
//! println!("{}", answer.text);
//! ```

pub mod cache;
pub mod chunker;
pub mod corpus;
pub mod embeddings;
pub mod pipeline;
pub mod store;

pub use chunker::{chunk_text, TextChunker};
pub use corpus::Corpus;
pub use embeddings::{Embedder, EmbeddingProvider};
pub use pipeline::RagPipeline;
