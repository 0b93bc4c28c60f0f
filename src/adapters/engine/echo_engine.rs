//! Echo engine - streams the query back, one word at a time.
//!
//! Useful for smoke-testing a deployment without a model provider.

use async_trait::async_trait;
use futures::stream;

use crate::domain::chat::Message;
use crate::ports::{ChatEngine, EngineError, EngineInfo, TokenStream};

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoChatEngine;

impl EchoChatEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatEngine for EchoChatEngine {
    async fn stream_chat(
        &self,
        query: String,
        _history: Vec<Message>,
    ) -> Result<TokenStream, EngineError> {
        let words: Vec<Result<String, EngineError>> = query
            .split_inclusive(char::is_whitespace)
            .map(|word| Ok(word.to_string()))
            .collect();

        Ok(Box::pin(stream::iter(words)))
    }

    fn engine_info(&self) -> EngineInfo {
        EngineInfo::new("echo", "echo")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn echo_streams_query_word_by_word() {
        let engine = EchoChatEngine::new();

        let words: Vec<String> = engine
            .stream_chat("how are you".into(), vec![Message::user("ignored")])
            .await
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(words, vec!["how ", "are ", "you"]);
        assert_eq!(words.concat(), "how are you");
    }

    #[tokio::test]
    async fn echo_of_empty_query_is_empty() {
        let engine = EchoChatEngine::new();
        let words: Vec<_> = engine
            .stream_chat(String::new(), vec![])
            .await
            .unwrap()
            .collect()
            .await;
        assert!(words.is_empty());
    }
}
