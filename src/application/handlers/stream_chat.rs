//! Stream chat handler.
//!
//! Delegates a validated turn to the chat engine and wraps the resulting
//! fragment stream in a [`TokenRelay`] for the response body.

use std::sync::Arc;

use crate::application::relay::{StreamErrorPolicy, TokenRelay};
use crate::domain::chat::PendingTurn;
use crate::ports::{ChatEngine, EngineError};

/// Command to start streaming a chat response.
#[derive(Debug, Clone)]
pub struct StreamChatCommand {
    /// The validated turn (query + history).
    pub turn: PendingTurn,
}

impl StreamChatCommand {
    pub fn new(turn: PendingTurn) -> Self {
        Self { turn }
    }
}

/// Handler for streaming chat turns.
#[derive(Clone)]
pub struct StreamChatHandler {
    engine: Arc<dyn ChatEngine>,
    error_policy: StreamErrorPolicy,
}

impl StreamChatHandler {
    pub fn new(engine: Arc<dyn ChatEngine>) -> Self {
        Self {
            engine,
            error_policy: StreamErrorPolicy::default(),
        }
    }

    /// Sets how mid-stream engine failures are surfaced.
    pub fn with_error_policy(mut self, policy: StreamErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Starts the engine call.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if it fails before producing a stream.
    pub async fn handle(&self, cmd: StreamChatCommand) -> Result<TokenRelay, EngineError> {
        let (query, history) = cmd.turn.into_parts();
        let info = self.engine.engine_info();

        tracing::debug!(
            engine = %info.name,
            model = %info.model,
            history_len = history.len(),
            "Starting chat stream"
        );

        let stream = self
            .engine
            .stream_chat(query, history)
            .await
            .map_err(|e| {
                tracing::warn!(engine = %info.name, error = %e, "Chat engine rejected turn");
                e
            })?;

        Ok(TokenRelay::new(stream, self.error_policy.clone()))
    }
}
