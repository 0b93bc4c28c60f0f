//! Splitting an incoming conversation into the pending user turn and history.

use thiserror::Error;

use super::message::{Message, MessageRole};

/// Errors raised while validating an incoming chat request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatRequestError {
    #[error("No messages provided")]
    NoMessages,

    #[error("Last message must be from user")]
    LastMessageNotFromUser {
        /// Role the final message actually had.
        found: MessageRole,
    },
}

/// An ordered conversation as submitted by a client.
///
/// Insertion order is conversational order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Validates the conversation and separates out the pending turn.
    pub fn into_pending_turn(self) -> Result<PendingTurn, ChatRequestError> {
        PendingTurn::try_from_messages(self.messages)
    }
}

/// The newest user query together with the conversation that preceded it.
///
/// # Invariants
///
/// - `query` is the content of a message whose role was `user`
/// - `history` preserves the original order and excludes the query message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    query: String,
    history: Vec<Message>,
}

impl PendingTurn {
    /// Splits `messages` into (query, history).
    ///
    /// # Errors
    ///
    /// - [`ChatRequestError::NoMessages`] if `messages` is empty
    /// - [`ChatRequestError::LastMessageNotFromUser`] if the final message
    ///   was not authored by the user
    pub fn try_from_messages(mut messages: Vec<Message>) -> Result<Self, ChatRequestError> {
        let last = messages.pop().ok_or(ChatRequestError::NoMessages)?;
        if !last.is_from_user() {
            return Err(ChatRequestError::LastMessageNotFromUser { found: last.role });
        }

        Ok(Self {
            query: last.content,
            history: messages,
        })
    }

    /// Consumes the turn, returning `(query, history)`.
    pub fn into_parts(self) -> (String, Vec<Message>) {
        (self.query, self.history)
    }
}
