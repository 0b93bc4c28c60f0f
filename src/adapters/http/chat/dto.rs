//! HTTP DTOs for the chat endpoint.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::chat::{ChatRequest, Message, MessageRole};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST <chat prefix>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequestBody {
    /// Conversation so far, oldest first; the last entry is the new query.
    pub messages: Vec<MessageBody>,
}

/// A single message as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    pub role: MessageRole,
    pub content: String,
}

impl From<MessageBody> for Message {
    fn from(body: MessageBody) -> Self {
        Message::new(body.role, body.content)
    }
}

impl From<ChatRequestBody> for ChatRequest {
    fn from(body: ChatRequestBody) -> Self {
        ChatRequest::new(body.messages.into_iter().map(Message::from).collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new("UNSUPPORTED_MEDIA_TYPE", message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new("RATE_LIMITED", message)
    }

    pub fn engine_unavailable(message: impl Into<String>) -> Self {
        Self::new("ENGINE_UNAVAILABLE", message)
    }

    pub fn engine_timeout(message: impl Into<String>) -> Self {
        Self::new("ENGINE_TIMEOUT", message)
    }

    pub fn engine_error(message: impl Into<String>) -> Self {
        Self::new("ENGINE_ERROR", message)
    }
}
