//! Chat Engine Port - Interface for conversational engines.
//!
//! The relay knows nothing about how an engine produces its answer (retrieval,
//! memory, model runtime). It hands over the newest query plus the preceding
//! history and consumes whatever fragments come back.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//! use futures::stream;
//!
//! struct Parrot;
//!
//! #[async_trait]
//! impl ChatEngine for Parrot {
//!     async fn stream_chat(&self, query: String, _history: Vec<Message>) -> Result<TokenStream, EngineError> {
//!         Ok(Box::pin(stream::iter(vec![Ok(query)])))
//!     }
//!
//!     fn engine_info(&self) -> EngineInfo {
//!         EngineInfo::new("parrot", "none")
//!     }
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

use crate::domain::chat::Message;

/// Lazy, finite, non-restartable sequence of text fragments for one request.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, EngineError>> + Send>>;

/// Port for streaming chat engines.
///
/// Implementations must be shareable across concurrent requests; every call
/// to [`ChatEngine::stream_chat`] returns an independent stream.
#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// Starts a streaming chat turn.
    ///
    /// `history` is the conversation preceding `query`, oldest first.
    async fn stream_chat(
        &self,
        query: String,
        history: Vec<Message>,
    ) -> Result<TokenStream, EngineError>;

    /// Describes the engine (for logging and diagnostics).
    fn engine_info(&self) -> EngineInfo;
}

/// Engine identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInfo {
    /// Engine name (e.g., "openai", "echo").
    pub name: String,
    /// Model identifier served by the engine.
    pub model: String,
}

impl EngineInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Chat engine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Rate limited by the upstream model provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Engine or its upstream is unavailable.
    #[error("engine unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Credentials were rejected upstream.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error talking to the upstream.
    #[error("network error: {0}")]
    Network(String),

    /// Upstream produced output the engine could not understand.
    #[error("parse error: {0}")]
    Parse(String),

    /// The engine refused the turn as given.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream did not answer in time.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl EngineError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
