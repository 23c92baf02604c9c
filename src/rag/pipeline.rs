//! Answer assembly: retrieve context, build the prompt, generate.

use std::sync::Arc;

use docent_vector::IndexConfig;
use parking_lot::RwLock;
use tracing::{info, instrument};

use super::cache::CachedEmbedder;
use super::chunker::TextChunker;
use super::corpus::{Corpus, DEFAULT_TOP_K};
use super::embeddings::Embedder;
use crate::llm::{collect_stream, LLMClient, TokenStream};
use crate::types::{AppError, Answer, Result, RetrievedChunk};
use crate::utils::toml_config::DocentConfig;

/// Join retrieved chunk texts into one context string, one chunk per line.
pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt handed to the generator for a grounded answer.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!("Context: {}\n\nQuestion: {}", context, question)
}

/// Corpus plus generator, with the document most recently ingested.
pub struct RagPipeline {
    corpus: Arc<Corpus>,
    llm: Arc<dyn LLMClient>,
    top_k: usize,
    latest_document: RwLock<Option<String>>,
}

impl RagPipeline {
    pub fn new(corpus: Arc<Corpus>, llm: Arc<dyn LLMClient>) -> Self {
        Self {
            corpus,
            llm,
            top_k: DEFAULT_TOP_K,
            latest_document: RwLock::new(None),
        }
    }

    /// Set how many chunks are retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(AppError::InvalidArgument("top_k must be > 0".to_string()));
        }
        self.top_k = top_k;
        Ok(self)
    }

    /// Build the embedder, corpus and generator described by `config`.
    pub fn from_config(config: &DocentConfig) -> Result<Self> {
        let provider = config.embedding_provider()?;
        let embedder: Arc<dyn Embedder> = if config.cache.enabled {
            Arc::new(CachedEmbedder::new(
                provider.create_embedder(),
                config.cache.capacity,
            )?)
        } else {
            provider.create_embedder()
        };

        let chunker = TextChunker::new(config.rag.chunk_size)?;
        let mut index_config = IndexConfig::new(config.rag.dimensions);
        if config.rag.max_chunks > 0 {
            index_config = index_config.with_max_vectors(config.rag.max_chunks);
        }
        let corpus = Corpus::with_index_config(embedder, chunker, index_config)?;

        let llm = config.llm_provider()?.create_client()?;
        info!(
            embedder = provider.name(),
            generator = llm.model_name(),
            "Pipeline ready"
        );

        Self::new(Arc::new(corpus), llm).with_top_k(config.rag.top_k)
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn llm(&self) -> &Arc<dyn LLMClient> {
        &self.llm
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Add a document to the corpus and remember it as the latest document.
    pub async fn ingest(&self, text: &str) -> Result<usize> {
        let added = self.corpus.ingest(text).await?;
        *self.latest_document.write() = Some(text.to_string());
        Ok(added)
    }

    /// Raw text of the most recently ingested document.
    pub fn latest_document(&self) -> Option<String> {
        self.latest_document.read().clone()
    }

    /// Answer `question` from the corpus.
    ///
    /// Fails with [`AppError::NoDocument`] when nothing has been ingested.
    #[instrument(skip(self, question))]
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let (context, stream) = self.answer_stream(question).await?;
        let text = collect_stream(stream).await?;
        Ok(Answer { text, context })
    }

    /// Like [`answer`](Self::answer), but hands back the token stream.
    pub async fn answer_stream(
        &self,
        question: &str,
    ) -> Result<(Vec<RetrievedChunk>, TokenStream)> {
        let context = self.corpus.search(question, self.top_k).await?;
        if context.is_empty() {
            return Err(AppError::NoDocument);
        }

        let texts: Vec<&str> = context.iter().map(|c| c.text.as_str()).collect();
        let prompt = answer_prompt(&build_context(&texts), question);
        let stream = self.llm.stream(&prompt).await?;
        Ok((context, stream))
    }
}
