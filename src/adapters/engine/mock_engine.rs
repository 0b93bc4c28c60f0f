//! Mock Chat Engine for testing.
//!
//! Provides a scripted implementation of the ChatEngine port so the relay and
//! HTTP layers can be exercised without a real model behind them.
//!
//! # Features
//!
//! - Scripted fragments, replayed on every call
//! - Error injection before or during streaming
//! - Simulated per-fragment latency
//! - Call recording and pull counting for verification
//!
//! # Example
//!
//! ```ignore
//! let engine = MockChatEngine::new().with_fragments(["Hel", "lo"]);
//! let stream = engine.stream_chat("hi".into(), vec![]).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::chat::Message;
use crate::ports::{ChatEngine, EngineError, EngineInfo, TokenStream};

/// A turn received by the mock engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTurn {
    pub query: String,
    pub history: Vec<Message>,
}

/// Mock chat engine for testing.
#[derive(Debug, Clone, Default)]
pub struct MockChatEngine {
    /// Fragments yielded by every stream.
    fragments: Vec<String>,
    /// Error returned instead of a stream.
    start_error: Option<EngineError>,
    /// Error yielded after the scripted fragments.
    stream_error: Option<EngineError>,
    /// Simulated latency before each fragment.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<RecordedTurn>>>,
    /// Items pulled from all streams handed out.
    pulls: Arc<AtomicUsize>,
}

impl MockChatEngine {
    /// Creates a mock engine that yields an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends fragments to the script.
    pub fn with_fragments<I, T>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.fragments.extend(fragments.into_iter().map(Into::into));
        self
    }

    /// Fails every call before a stream is produced.
    pub fn with_start_error(mut self, error: EngineError) -> Self {
        self.start_error = Some(error);
        self
    }

    /// Ends every stream with the given error after the scripted fragments.
    pub fn with_stream_error(mut self, error: EngineError) -> Self {
        self.stream_error = Some(error);
        self
    }

    /// Sets simulated latency per fragment.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<RecordedTurn> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the number of calls made to this engine.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns how many stream items have been pulled so far.
    pub fn pulls(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatEngine for MockChatEngine {
    async fn stream_chat(
        &self,
        query: String,
        history: Vec<Message>,
    ) -> Result<TokenStream, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedTurn { query, history });

        if let Some(err) = self.start_error.clone() {
            return Err(err);
        }

        let mut items: Vec<Result<String, EngineError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if let Some(err) = self.stream_error.clone() {
            items.push(Err(err));
        }

        let pulls = self.pulls.clone();
        let delay = self.delay;
        let stream = stream::iter(items).then(move |item| {
            let pulls = pulls.clone();
            async move {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                pulls.fetch_add(1, Ordering::SeqCst);
                item
            }
        });

        Ok(Box::pin(stream))
    }

    fn engine_info(&self) -> EngineInfo {
        EngineInfo::new("mock", "mock-model-1")
    }
}
