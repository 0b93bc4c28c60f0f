//! Chat conversation types and request validation.

mod message;
mod turn;

pub use message::{Message, MessageRole};
pub use turn::{ChatRequest, ChatRequestError, PendingTurn};
