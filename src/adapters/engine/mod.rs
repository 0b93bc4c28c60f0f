//! Chat Engine Adapters.
//!
//! Implementations of the ChatEngine port.
//!
//! ## Available Adapters
//!
//! - `OpenAiChatEngine` - Any OpenAI-compatible `/chat/completions` server
//! - `EchoChatEngine` - Streams the query back (smoke testing)
//! - `MockChatEngine` - Scripted engine for tests

mod echo_engine;
mod mock_engine;
mod openai_engine;

pub use echo_engine::EchoChatEngine;
pub use mock_engine::{MockChatEngine, RecordedTurn};
pub use openai_engine::{OpenAiChatEngine, OpenAiEngineConfig};

use std::sync::Arc;

use crate::config::{EngineConfig, EngineKind};
use crate::ports::ChatEngine;

/// Builds the engine selected by configuration.
///
/// # Errors
///
/// Returns an error if the engine's HTTP client cannot be constructed.
pub fn build_engine(config: &EngineConfig) -> Result<Arc<dyn ChatEngine>, reqwest::Error> {
    match config.kind {
        EngineKind::Echo => Ok(Arc::new(EchoChatEngine::new())),
        EngineKind::OpenAI => {
            let mut engine_config = OpenAiEngineConfig::new(&config.model)
                .with_base_url(&config.base_url)
                .with_api_key_secret(config.api_key.clone())
                .with_timeout(config.timeout());
            if let Some(ref prompt) = config.system_prompt {
                engine_config = engine_config.with_system_prompt(prompt);
            }
            if let Some(temperature) = config.temperature {
                engine_config = engine_config.with_temperature(temperature);
            }
            Ok(Arc::new(OpenAiChatEngine::new(engine_config)?))
        }
    }
}
