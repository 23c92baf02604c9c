//! Generation providers
//!
//! Everything that produces text goes through the [`LLMClient`] trait, so
//! the answer pipeline and the study features work with any backend.
//!
//! # Supported Providers
//!
//! - `openai` - OpenAI chat completions (and compatible APIs)
//! - `ollama` - Local Ollama server
//!
//! # Streaming
//!
//! [`LLMClient::stream`] returns a [`TokenStream`] of text fragments;
//! [`collect_stream`] concatenates them into the final answer.

/// Core LLM client trait and streaming types.
pub mod client;
pub mod ollama;
pub mod openai;

pub use client::{collect_stream, LLMClient, ModelParams, Provider, TokenStream};
