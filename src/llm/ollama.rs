use crate::llm::client::{http_client, LLMClient, LineBuffer, ModelParams, TokenStream};
use crate::types::{AppError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{instrument, warn};

/// Client for the Ollama chat API.
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    params: ModelParams,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, params: ModelParams) -> Result<Self> {
        Ok(Self {
            http_client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            params,
        })
    }

    fn request_body(&self, prompt: &str, stream: bool) -> Value {
        let mut options = serde_json::Map::new();
        if let Some(temperature) = self.params.temperature {
            options.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = self.params.max_tokens {
            options.insert("num_predict".to_string(), json!(max_tokens));
        }

        let mut body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": stream,
        });
        if !options.is_empty() {
            body["options"] = Value::Object(options);
        }
        self.params.merge_extra(&mut body);
        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::GenerationUnavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "Ollama request rejected");
            return Err(AppError::GenerationUnavailable(format!(
                "Ollama request failed ({}): {}",
                status, text
            )));
        }

        Ok(response)
    }
}

/// One parsed NDJSON line: optional content and whether generation finished.
fn parse_chat_line(line: &str) -> Result<(Option<String>, bool)> {
    let json: Value = serde_json::from_str(line).map_err(|e| {
        AppError::GenerationUnavailable(format!("Malformed Ollama stream line: {}", e))
    })?;

    if let Some(error) = json.get("error").and_then(Value::as_str) {
        return Err(AppError::GenerationUnavailable(error.to_string()));
    }

    let content = json
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let done = json.get("done").and_then(Value::as_bool).unwrap_or(false);

    Ok((content, done))
}

#[async_trait]
impl LLMClient for OllamaClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.send(&self.request_body(prompt, false)).await?;

        let json: Value = response.json().await.map_err(|e| {
            AppError::GenerationUnavailable(format!("Failed to parse response: {}", e))
        })?;

        if let Some(error) = json.get("error").and_then(Value::as_str) {
            return Err(AppError::GenerationUnavailable(error.to_string()));
        }

        json.pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::GenerationUnavailable("No response from Ollama".to_string()))
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn stream(&self, prompt: &str) -> Result<TokenStream> {
        let response = self.send(&self.request_body(prompt, true)).await?;
        let mut bytes = response.bytes_stream();

        let output_stream = stream! {
            let mut lines = LineBuffer::default();
            let mut done = false;

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(AppError::GenerationUnavailable(format!("Stream error: {}", e)));
                        done = true;
                        break;
                    }
                };

                for line in lines.push(&chunk) {
                    match parse_chat_line(&line) {
                        Ok((content, finished)) => {
                            if let Some(content) = content {
                                yield Ok(content);
                            }
                            if finished {
                                done = true;
                                break;
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            done = true;
                            break;
                        }
                    }
                }
                if done {
                    break;
                }
            }

            if !done {
                if let Some(line) = lines.finish() {
                    match parse_chat_line(&line) {
                        Ok((Some(content), _)) => yield Ok(content),
                        Ok((None, _)) => {}
                        Err(e) => yield Err(e),
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
