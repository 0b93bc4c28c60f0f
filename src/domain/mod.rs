//! Domain layer containing the conversation types and request validation.
//!
//! # Module Organization
//!
//! - `chat` - Messages, roles, and the pending turn extracted from a request

pub mod chat;
