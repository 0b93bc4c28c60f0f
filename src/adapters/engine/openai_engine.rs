//! OpenAI-compatible chat engine.
//!
//! Streams completions from any server exposing an OpenAI-style
//! `/chat/completions` endpoint (OpenAI itself, vLLM, llama.cpp server,
//! Ollama, ...).
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiEngineConfig::new("gpt-3.5-turbo")
//!     .with_base_url("http://localhost:11434/v1")
//!     .with_system_prompt("Answer briefly.");
//!
//! let engine = OpenAiChatEngine::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Responses arrive as Server-Sent Events. Network chunks do not respect line
//! boundaries, so bytes are buffered until a full `data:` line is available.
//! The stream ends at the `[DONE]` marker.

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::chat::{Message, MessageRole};
use crate::ports::{ChatEngine, EngineError, EngineInfo, TokenStream};

const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

/// Configuration for the OpenAI-compatible engine.
#[derive(Debug, Clone)]
pub struct OpenAiEngineConfig {
    /// Bearer token, if the upstream requires one.
    api_key: Option<Secret<String>>,
    /// Model to request.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Prepended to every conversation when set.
    pub system_prompt: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Timeout for establishing the stream.
    pub timeout: Duration,
}

impl OpenAiEngineConfig {
    /// Creates a new configuration for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            system_prompt: None,
            temperature: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the API key from an already-wrapped secret.
    pub fn with_api_key_secret(mut self, api_key: Option<Secret<String>>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chat engine backed by an OpenAI-compatible completions API.
pub struct OpenAiChatEngine {
    config: OpenAiEngineConfig,
    client: Client,
}

impl OpenAiChatEngine {
    /// Creates a new engine with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed (e.g. TLS backend
    /// initialization failure).
    pub fn new(config: OpenAiEngineConfig) -> Result<Self, reqwest::Error> {
        // Bounds connection setup only, not the streamed body.
        let client = Client::builder().connect_timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts a turn to the upstream request format.
    fn to_request(&self, query: String, history: Vec<Message>) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);

        if let Some(ref prompt) = self.config.system_prompt {
            messages.push(WireMessage {
                role: MessageRole::System.as_str(),
                content: prompt.clone(),
            });
        }

        messages.extend(history.into_iter().filter_map(|m| {
            let Some(role) = wire_role(m.role) else {
                tracing::debug!(role = %m.role, "Dropping tool output from upstream history");
                return None;
            };
            Some(WireMessage {
                role,
                content: m.content,
            })
        }));

        messages.push(WireMessage {
            role: MessageRole::User.as_str(),
            content: query,
        });

        CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            stream: true,
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<Response, EngineError> {
        let mut builder = self.client.post(self.completions_url()).json(request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else if e.is_connect() {
                EngineError::network(format!("Connection failed: {}", e))
            } else {
                EngineError::network(e.to_string())
            }
        })
    }

    fn timeout_error(&self) -> EngineError {
        EngineError::Timeout {
            timeout_secs: u32::try_from(self.config.timeout.as_secs()).unwrap_or(u32::MAX),
        }
    }

    /// Passes successful responses through; maps failures to engine errors.
    async fn check_status(response: Response) -> Result<Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let body = response.text().await.unwrap_or_default();

        Err(status_error(status, &body, retry_after))
    }
}

#[async_trait]
impl ChatEngine for OpenAiChatEngine {
    async fn stream_chat(
        &self,
        query: String,
        history: Vec<Message>,
    ) -> Result<TokenStream, EngineError> {
        let request = self.to_request(query, history);
        let response = Self::check_status(self.send(&request).await?).await?;

        let stream = decode_sse(response.bytes_stream());

        Ok(Box::pin(stream))
    }

    fn engine_info(&self) -> EngineInfo {
        EngineInfo::new("openai", &self.config.model)
    }
}

/// Role sent upstream for a conversation role.
///
/// Tool and function outputs have no standalone form on this API (they need
/// the id of the call they answer), so they yield `None` and are left out.
fn wire_role(role: MessageRole) -> Option<&'static str> {
    match role {
        MessageRole::System => Some("system"),
        MessageRole::User => Some("user"),
        MessageRole::Assistant | MessageRole::Chatbot | MessageRole::Model => Some("assistant"),
        MessageRole::Tool | MessageRole::Function => None,
    }
}

/// Turns the raw SSE body into completion fragments.
///
/// A trailing line without a newline is still decoded when the body ends.
fn decode_sse<S, B, E>(body: S) -> impl Stream<Item = Result<String, EngineError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    body.map(Some)
        .chain(stream::once(future::ready(None)))
        .scan(SseDecoder::default(), |decoder, chunk| {
            if decoder.is_done() {
                return future::ready(None);
            }
            let items = match chunk {
                Some(Ok(bytes)) => decoder.feed(bytes.as_ref()),
                Some(Err(e)) => vec![Err(EngineError::network(format!("Stream error: {}", e)))],
                None => decoder.finish(),
            };
            future::ready(Some(stream::iter(items)))
        })
        .flatten()
}

/// Maps a non-success upstream status to an engine error.
fn status_error(status: StatusCode, body: &str, retry_after: Option<u32>) -> EngineError {
    match status.as_u16() {
        401 | 403 => EngineError::AuthenticationFailed,
        429 => EngineError::rate_limited(retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
        400 | 404 | 413 | 422 => EngineError::InvalidRequest(upstream_message(body)),
        500..=599 => EngineError::unavailable(format!(
            "Server error {}: {}",
            status,
            upstream_message(body)
        )),
        _ => EngineError::network(format!("Unexpected status {}: {}", status, body)),
    }
}

/// Extracts `error.message` from an OpenAI-style error body, falling back to
/// the raw body.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Incremental decoder for the SSE body of a streamed completion.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    fn is_done(&self) -> bool {
        self.done
    }

    /// Consumes a network chunk, returning the fragments completed by it.
    fn feed(&mut self, bytes: &[u8]) -> Vec<Result<String, EngineError>> {
        self.buffer.extend_from_slice(bytes);
        let mut results = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.done {
                continue;
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(item) = self.decode_line(line.trim_end_matches(|c| c == '\r' || c == '\n')) {
                results.push(item);
            }
        }

        results
    }

    /// Decodes whatever is left once the body has ended.
    fn finish(&mut self) -> Vec<Result<String, EngineError>> {
        let rest = std::mem::take(&mut self.buffer);
        if self.done || rest.is_empty() {
            return Vec::new();
        }
        let line = String::from_utf8_lossy(&rest);
        self.decode_line(line.trim_end_matches('\r'))
            .into_iter()
            .collect()
    }

    fn decode_line(&mut self, line: &str) -> Option<Result<String, EngineError>> {
        let data = line.strip_prefix("data:")?.trim_start();

        if data == "[DONE]" {
            self.done = true;
            return None;
        }
        if data.is_empty() {
            return None;
        }

        match serde_json::from_str::<StreamEvent>(data) {
            Ok(StreamEvent {
                error: Some(error), ..
            }) => Some(Err(EngineError::unavailable(error.message))),
            Ok(event) => event
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty())
                .map(Ok),
            Err(e) => Some(Err(EngineError::parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            )))),
        }
    }
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
