//! HTTP adapter for the streaming chat endpoint.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ChatRequestBody, ErrorResponse, MessageBody};
pub use handlers::{ChatApiError, ChatAppState};
pub use routes::chat_routes;
