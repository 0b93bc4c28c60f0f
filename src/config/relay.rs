//! Token relay configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::StreamErrorPolicy;

/// Behavior of the token relay
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// What happens when the engine fails after streaming has begun
    #[serde(default)]
    pub on_stream_error: StreamErrorMode,

    /// Text appended when `on_stream_error` is `marker`
    #[serde(default = "default_error_marker")]
    pub error_marker: String,
}

/// Mid-stream failure handling
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StreamErrorMode {
    #[default]
    Abort,
    Truncate,
    Marker,
}

impl RelayConfig {
    /// Policy handed to the relay
    pub fn error_policy(&self) -> StreamErrorPolicy {
        match self.on_stream_error {
            StreamErrorMode::Abort => StreamErrorPolicy::Abort,
            StreamErrorMode::Truncate => StreamErrorPolicy::Truncate,
            StreamErrorMode::Marker => StreamErrorPolicy::Marker(self.error_marker.clone()),
        }
    }

    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.on_stream_error == StreamErrorMode::Marker && self.error_marker.is_empty() {
            return Err(ValidationError::EmptyErrorMarker);
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            on_stream_error: StreamErrorMode::default(),
            error_marker: default_error_marker(),
        }
    }
}

fn default_error_marker() -> String {
    "\n[stream interrupted]".to_string()
}
