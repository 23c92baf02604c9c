//! TOML-based configuration for Docent
//!
//! Providers, retrieval settings, caching and logging are declared in a
//! TOML file (`docent.toml`). Every field has a default, so an empty file is
//! a valid configuration. Secrets never live in the file: providers name the
//! environment variable that holds their API key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::llm::{ModelParams, Provider};
use crate::rag::embeddings::{native_dimensions, EmbeddingProvider};

/// Root configuration structure loaded from docent.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocentConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunk size limit in characters (word length + 1 per word)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Embedding dimensionality
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Maximum number of chunks held by a corpus, 0 for unbounded
    #[serde(default)]
    pub max_chunks: usize,
}

fn default_chunk_size() -> usize {
    crate::rag::chunker::DEFAULT_CHUNK_SIZE
}

fn default_top_k() -> usize {
    crate::rag::corpus::DEFAULT_TOP_K
}

fn default_dimensions() -> usize {
    1536
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            top_k: default_top_k(),
            dimensions: default_dimensions(),
            max_chunks: 0,
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmbeddingConfig {
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_openai_embedding_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_embedding_model")]
        model: String,
    },
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig::OpenAI {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_openai_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeneratorConfig {
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_openai_chat_model")]
        model: String,
        #[serde(default)]
        params: ModelParams,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_chat_model")]
        model: String,
        #[serde(default)]
        params: ModelParams,
    },
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::OpenAI {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_openai_chat_model(),
            params: ModelParams::default(),
        }
    }
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_openai_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_ollama_chat_model() -> String {
    "llama3.2".to_string()
}

// ============= Cache Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Maximum number of cached embeddings
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    4096
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            capacity: default_cache_capacity(),
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl DocentConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::FileNotFound(path)) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DocentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges and model names. Environment variables are
    /// checked later, when a provider is actually built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rag.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.chunk_size must be > 0".to_string(),
            ));
        }
        if self.rag.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.top_k must be > 0".to_string(),
            ));
        }
        if self.rag.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "rag.dimensions must be > 0".to_string(),
            ));
        }
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache.capacity must be > 0 when the cache is enabled".to_string(),
            ));
        }

        let embedding_model = match &self.embedding {
            EmbeddingConfig::OpenAI { model, .. } | EmbeddingConfig::Ollama { model, .. } => model,
        };
        if embedding_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if let Some(native) = native_dimensions(embedding_model) {
            if native != self.rag.dimensions {
                return Err(ConfigError::ValidationError(format!(
                    "embedding model '{}' produces {}-dimensional vectors but rag.dimensions is {}",
                    embedding_model, native, self.rag.dimensions
                )));
            }
        }

        if self.generator_model().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generator.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn generator_model(&self) -> &str {
        match &self.generator {
            GeneratorConfig::OpenAI { model, .. } | GeneratorConfig::Ollama { model, .. } => model,
        }
    }

    /// Build the embedding provider, resolving its API key from the environment
    pub fn embedding_provider(&self) -> Result<EmbeddingProvider, ConfigError> {
        let dimensions = self.rag.dimensions;
        Ok(match &self.embedding {
            EmbeddingConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => EmbeddingProvider::OpenAI {
                api_key: resolve_env(api_key_env)?,
                api_base: api_base.clone(),
                model: model.clone(),
                dimensions,
            },
            EmbeddingConfig::Ollama { base_url, model } => EmbeddingProvider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
                dimensions,
            },
        })
    }

    /// Build the generation provider, resolving its API key from the environment
    pub fn llm_provider(&self) -> Result<Provider, ConfigError> {
        Ok(match &self.generator {
            GeneratorConfig::OpenAI {
                api_key_env,
                api_base,
                model,
                params,
            } => Provider::OpenAI {
                api_key: resolve_env(api_key_env)?,
                api_base: api_base.clone(),
                model: model.clone(),
                params: params.clone(),
            },
            GeneratorConfig::Ollama {
                base_url,
                model,
                params,
            } => Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
                params: params.clone(),
            },
        })
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(format!("Failed to render config: {}", e)))
    }
}

fn resolve_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
