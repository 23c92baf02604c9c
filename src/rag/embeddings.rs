//! Embedding providers.
//!
//! The corpus only sees the [`Embedder`] trait. Two HTTP adapters are
//! provided:
//! - **OpenAI** (and compatible APIs): `POST {api_base}/embeddings`
//! - **Ollama**: `POST {base_url}/api/embeddings`
//!
//! Every provider failure surfaces as [`AppError::EmbeddingUnavailable`]; a
//! vector of the wrong length surfaces as [`AppError::DimensionMismatch`].

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Maps text to a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder returns.
    fn dimensions(&self) -> usize;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text).await
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Output dimensions of well-known embedding models, as served by default.
///
/// Returns `None` for models docent does not know; those are trusted to
/// match the configured dimensions.
pub fn native_dimensions(model: &str) -> Option<usize> {
    // Ollama tags may carry a version suffix, e.g. `nomic-embed-text:v1.5`
    let name = model.split(':').next().unwrap_or(model);
    match name {
        "text-embedding-ada-002" | "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "nomic-embed-text" => Some(768),
        "mxbai-embed-large" => Some(1024),
        "all-minilm" => Some(384),
        _ => None,
    }
}

/// Embedding provider selection, built from configuration.
#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    /// OpenAI embeddings API (or any compatible endpoint)
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        dimensions: usize,
    },
    /// Ollama local embeddings
    Ollama {
        base_url: String,
        model: String,
        dimensions: usize,
    },
}

impl EmbeddingProvider {
    /// Create an embedder for this provider.
    pub fn create_embedder(&self) -> Arc<dyn Embedder> {
        match self {
            EmbeddingProvider::OpenAI {
                api_key,
                api_base,
                model,
                dimensions,
            } => Arc::new(OpenAIEmbedder::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *dimensions,
            )),
            EmbeddingProvider::Ollama {
                base_url,
                model,
                dimensions,
            } => Arc::new(OllamaEmbedder::new(
                base_url.clone(),
                model.clone(),
                *dimensions,
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingProvider::OpenAI { .. } => "OpenAI",
            EmbeddingProvider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            EmbeddingProvider::OpenAI { model, .. } | EmbeddingProvider::Ollama { model, .. } => {
                model
            }
        }
    }
}

// ============================================================================
// OpenAI
// ============================================================================

pub struct OpenAIEmbedder {
    http_client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    pub fn new(api_key: String, api_base: String, model: String, dimensions: usize) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.api_base);
        let body = json!({
            "input": text,
            "model": self.model,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::EmbeddingUnavailable(format!("HTTP request failed: {}", e))
            })?;

        let json = read_json(response, "OpenAI").await?;
        let vector = json
            .pointer("/data/0/embedding")
            .ok_or_else(|| {
                AppError::EmbeddingUnavailable(
                    "OpenAI response has no data[0].embedding".to_string(),
                )
            })
            .and_then(parse_vector)?;

        check_dimensions(vector, self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Ollama
// ============================================================================

pub struct OllamaEmbedder {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(base_url: String, model: String, dimensions: usize) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::EmbeddingUnavailable(format!("HTTP request failed: {}", e))
            })?;

        let json = read_json(response, "Ollama").await?;
        let vector = json
            .get("embedding")
            .ok_or_else(|| {
                AppError::EmbeddingUnavailable("Ollama response has no embedding".to_string())
            })
            .and_then(parse_vector)?;

        check_dimensions(vector, self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn read_json(response: reqwest::Response, provider: &str) -> Result<Value> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!(provider, %status, "Embedding request rejected");
        return Err(AppError::EmbeddingUnavailable(format!(
            "{} request failed ({}): {}",
            provider, status, text
        )));
    }

    response.json().await.map_err(|e| {
        AppError::EmbeddingUnavailable(format!("Failed to parse {} response: {}", provider, e))
    })
}

fn parse_vector(value: &Value) -> Result<Vec<f32>> {
    let items = value.as_array().ok_or_else(|| {
        AppError::EmbeddingUnavailable("embedding is not an array".to_string())
    })?;

    items
        .iter()
        .map(|v| {
            let f = v.as_f64().ok_or_else(|| {
                AppError::EmbeddingUnavailable(format!("non-numeric embedding component: {}", v))
            })? as f32;
            // Values beyond f32 range become infinite after the cast
            if !f.is_finite() {
                return Err(AppError::EmbeddingUnavailable(format!(
                    "non-finite embedding component: {}",
                    v
                )));
            }
            Ok(f)
        })
        .collect()
}

fn check_dimensions(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>> {
    if vector.len() != expected {
        return Err(AppError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    debug!(dimensions = expected, "Embedded text");
    Ok(vector)
}
