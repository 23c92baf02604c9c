use crate::llm::client::{http_client, LLMClient, LineBuffer, ModelParams, TokenStream};
use crate::types::{AppError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{instrument, warn};

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAIClient {
    http_client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    params: ModelParams,
}

impl OpenAIClient {
    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    ) -> Result<Self> {
        Ok(Self {
            http_client: http_client()?,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            params,
        })
    }

    fn request_body(&self, prompt: &str, stream: bool) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": stream,
        });
        if let Some(temperature) = self.params.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.params.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        self.params.merge_extra(&mut body);
        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.api_base);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::GenerationUnavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "OpenAI request rejected");
            return Err(AppError::GenerationUnavailable(format!(
                "OpenAI request failed ({}): {}",
                status, text
            )));
        }

        Ok(response)
    }
}

/// Outcome of one server-sent event line.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Token(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> Result<SseEvent> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseEvent::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let json: Value = serde_json::from_str(data).map_err(|e| {
        AppError::GenerationUnavailable(format!("Malformed OpenAI stream event: {}", e))
    })?;

    if let Some(message) = json.pointer("/error/message").and_then(Value::as_str) {
        return Err(AppError::GenerationUnavailable(message.to_string()));
    }

    match json
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
    {
        Some(content) if !content.is_empty() => Ok(SseEvent::Token(content.to_string())),
        _ => Ok(SseEvent::Skip),
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.send(&self.request_body(prompt, false)).await?;

        let json: Value = response.json().await.map_err(|e| {
            AppError::GenerationUnavailable(format!("Failed to parse response: {}", e))
        })?;

        json.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::GenerationUnavailable("No response from OpenAI".to_string()))
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn stream(&self, prompt: &str) -> Result<TokenStream> {
        let response = self.send(&self.request_body(prompt, true)).await?;
        let mut bytes = response.bytes_stream();

        let output_stream = stream! {
            let mut lines = LineBuffer::default();
            'read: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(AppError::GenerationUnavailable(format!("Stream error: {}", e)));
                        break;
                    }
                };

                for line in lines.push(&chunk) {
                    match parse_sse_line(&line) {
                        Ok(SseEvent::Token(token)) => yield Ok(token),
                        Ok(SseEvent::Skip) => {}
                        Ok(SseEvent::Done) => break 'read,
                        Err(e) => {
                            yield Err(e);
                            break 'read;
                        }
                    }
                }
            }
        };

        Ok(Box::new(Box::pin(output_stream)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
