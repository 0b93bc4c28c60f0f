//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ChatEngine` - Produces a streamed reply for a query and its history

mod chat_engine;

pub use chat_engine::{ChatEngine, EngineError, EngineInfo, TokenStream};
