//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the relay to external systems:
//! - `engine` - Chat engine implementations (OpenAI-compatible, echo, mock)
//! - `http` - Axum routes for the chat and healthcheck endpoints

pub mod engine;
pub mod http;

pub use engine::{build_engine, EchoChatEngine, MockChatEngine, OpenAiChatEngine};
pub use http::{app_router, ChatAppState};
