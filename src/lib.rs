//! # Docent - retrieval-augmented study assistant
//!
//! Docent ingests a course document, splits it into chunks, embeds them, and
//! answers questions by retrieving the nearest chunks and handing them to a
//! generative model as context. On top of that it writes course notes,
//! builds assessments and scores open-ended answers.
//!
//! ## Overview
//!
//! Docent can be used in two ways:
//!
//! 1. **As a command-line tool** - Run the `docent` binary
//! 2. **As a library** - Build a [`RagPipeline`] in your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use docent::{DocentConfig, RagPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DocentConfig::load("docent.toml")?;
//!     let pipeline = RagPipeline::from_config(&config)?;
//!
//!     pipeline.ingest(&std::fs::read_to_string("lecture.txt")?).await?;
//!     let answer = pipeline.answer("What does the Krebs cycle produce?").await?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`rag`] - Chunking, embeddings, the corpus and answer assembly
//! - [`llm`] - Generation clients (OpenAI-compatible, Ollama)
//! - [`study`] - Course notes, assessments and answer scoring
//! - [`cli`] - Command-line parsing and output
//! - [`utils`] - TOML configuration
//! - [`types`] - Common types and error handling
//!
//! The vector index itself lives in the `docent-vector` crate.

#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Study features over the latest document.
pub mod study;
/// Core types (results, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, Provider};
pub use rag::{Corpus, Embedder, RagPipeline, TextChunker};
pub use study::{Preferences, StudyAssistant};
pub use types::{Answer, AppError, Result, RetrievedChunk};
pub use utils::toml_config::DocentConfig;
