//! Chat engine configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Chat engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Engine implementation to serve
    #[serde(default)]
    pub kind: EngineKind,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: Option<Secret<String>>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// System prompt prepended to every conversation
    pub system_prompt: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Connect timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Engine implementation
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    OpenAI,
    Echo,
}

impl EngineConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        use secrecy::ExposeSecret;
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kind == EngineKind::Echo {
            return Ok(());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidEngineUrl);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ENGINE__MODEL"));
        }
        // The hosted API always requires a key; self-hosted servers often don't.
        if self.base_url.contains("api.openai.com") && !self.has_api_key() {
            return Err(ValidationError::MissingRequired("ENGINE__API_KEY"));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ValidationError::InvalidTemperature);
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            system_prompt: None,
            temperature: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> EngineConfig {
        EngineConfig {
            api_key: Some(Secret::new("sk-xxx".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.kind, EngineKind::OpenAI);
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_validation_hosted_api_requires_key() {
        let config = EngineConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("ENGINE__API_KEY"))
        ));
        assert!(with_key().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_key_is_missing() {
        let config = EngineConfig {
            api_key: Some(Secret::new(String::new())),
            ..Default::default()
        };
        assert!(!config.has_api_key());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_self_hosted_without_key() {
        let config = EngineConfig {
            base_url: "http://localhost:11434/v1".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_bad_url() {
        let config = EngineConfig {
            base_url: "localhost:11434".to_string(),
            ..with_key()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidEngineUrl)));
    }

    #[test]
    fn test_validation_temperature_range() {
        let config = EngineConfig {
            temperature: Some(2.5),
            ..with_key()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTemperature)));

        let config = EngineConfig {
            temperature: Some(0.7),
            ..with_key()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_echo_needs_nothing() {
        let config = EngineConfig {
            kind: EngineKind::Echo,
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let rendered = format!("{:?}", with_key());
        assert!(!rendered.contains("sk-xxx"));
    }
}
