//! Mock implementations for testing.
//!
//! Stub embedders and LLM clients shared across test files, so no test
//! needs a real provider.

#![allow(dead_code)]

use async_trait::async_trait;
use docent::llm::{LLMClient, TokenStream};
use docent::rag::Embedder;
use docent::types::{AppError, Result};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic embedder for tests.
///
/// Unscripted texts get orthogonal unit vectors in order of first
/// appearance: the first distinct text maps to axis 0, the second to axis 1,
/// and so on. Specific texts can be given fixed vectors, and a single call
/// can be scripted to fail.
///
/// # Examples
///
/// ```ignore
/// let embedder = StubEmbedder::new(8);
/// let embedder = StubEmbedder::new(8).fail_on_call(3);
/// let embedder = StubEmbedder::new(2).with_vector("near", vec![0.1, 0.0]);
/// ```
pub struct StubEmbedder {
    dimensions: usize,
    axes: Mutex<HashMap<String, usize>>,
    scripted: HashMap<String, Vec<f32>>,
    fail_on: Option<usize>,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            axes: Mutex::new(HashMap::new()),
            scripted: HashMap::new(),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the `n`th call (1-based) with `EmbeddingUnavailable`.
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Return `vector` for `text` instead of a unit vector.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.scripted.insert(text.to_string(), vector);
        self
    }

    /// Number of `embed` calls so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The unit vector along `axis`.
    pub fn unit(&self, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; self.dimensions];
        v[axis] = 1.0;
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            return Err(AppError::EmbeddingUnavailable(format!(
                "stub failure on call {}",
                call
            )));
        }

        if let Some(vector) = self.scripted.get(text) {
            return Ok(vector.clone());
        }

        let axis = {
            let mut axes = self.axes.lock();
            let next = axes.len();
            *axes.entry(text.to_string()).or_insert(next)
        };
        if axis >= self.dimensions {
            return Err(AppError::EmbeddingUnavailable(format!(
                "stub embedder ran out of axes ({} dimensions)",
                self.dimensions
            )));
        }
        Ok(self.unit(axis))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "stub-embedder"
    }
}

/// Mock LLM client for testing with configurable responses.
///
/// Streams its response in 5-character fragments and records every prompt
/// it receives.
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    fail_mid_stream: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            fail_mid_stream: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Create a mock client whose stream breaks after the first fragment.
    pub fn failing_mid_stream(response: &str) -> Self {
        Self {
            fail_mid_stream: true,
            ..Self::new(response)
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }

    fn record(&self, prompt: &str) -> Result<()> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::GenerationUnavailable(
                "Mock LLM failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(prompt)?;
        Ok(self.response.clone())
    }

    async fn stream(&self, prompt: &str) -> Result<TokenStream> {
        self.record(prompt)?;

        // Split response into chunks for streaming simulation
        let mut chunks: Vec<Result<String>> = self
            .response
            .chars()
            .collect::<Vec<_>>()
            .chunks(5)
            .map(|c| Ok(c.iter().collect()))
            .collect();

        if self.fail_mid_stream {
            chunks.truncate(1);
            chunks.push(Err(AppError::GenerationUnavailable(
                "Mock stream dropped".to_string(),
            )));
        }

        Ok(Box::new(stream::iter(chunks).boxed()))
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}
