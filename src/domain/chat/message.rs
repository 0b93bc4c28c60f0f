//! Chat messages exchanged between a client and a chat engine.
//!
//! Messages are immutable once constructed. The role set is closed: a role
//! string that does not name one of the variants below is rejected when the
//! message is deserialized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (guides engine behavior).
    System,
    /// User input.
    User,
    /// Assistant (engine) response.
    Assistant,
    /// Output of a tool invoked on the assistant's behalf.
    Tool,
    /// Output of a function call (legacy form of `Tool`).
    Function,
    /// Assistant turn as named by Cohere-style clients.
    Chatbot,
    /// Assistant turn as named by Gemini-style clients.
    Model,
}

impl MessageRole {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Function => "function",
            Self::Chatbot => "chatbot",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Returns true if the message was authored by the user.
    pub fn is_from_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
