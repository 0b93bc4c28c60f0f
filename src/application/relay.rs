//! Token relay - forwards engine fragments to a client until either side stops.
//!
//! [`TokenRelay`] wraps an engine's [`TokenStream`] and pulls one fragment per
//! poll. It is the response body's only handle on the engine stream, so when
//! the client goes away and the server drops the body, the engine stream is
//! dropped with it and never polled again.
//!
//! A failure reported by the engine after streaming has begun is handled
//! according to the configured [`StreamErrorPolicy`]; the HTTP status has
//! already been sent by then and cannot change.

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use crate::ports::{EngineError, TokenStream};

/// What to do when the engine fails after fragments have been sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamErrorPolicy {
    /// Surface the failure to the transport so the response is aborted.
    #[default]
    Abort,
    /// End the response cleanly with whatever was already sent.
    Truncate,
    /// Append the given text, then end cleanly.
    Marker(String),
}

/// Error surfaced by the relay when the policy is [`StreamErrorPolicy::Abort`].
#[derive(Debug, thiserror::Error)]
#[error("engine stream interrupted after {fragments} fragments: {source}")]
pub struct RelayError {
    /// Fragments successfully relayed before the failure.
    pub fragments: usize,
    #[source]
    pub source: EngineError,
}

/// Stream adapter relaying engine fragments to a client.
pub struct TokenRelay<S = TokenStream> {
    inner: Option<S>,
    policy: StreamErrorPolicy,
    fragments: usize,
}

impl<S> TokenRelay<S>
where
    S: Stream<Item = Result<String, EngineError>> + Unpin,
{
    pub fn new(inner: S, policy: StreamErrorPolicy) -> Self {
        Self {
            inner: Some(inner),
            policy,
            fragments: 0,
        }
    }

    /// Number of non-empty fragments relayed so far.
    pub fn fragments_relayed(&self) -> usize {
        self.fragments
    }

    /// Returns true once the engine stream has been released.
    pub fn is_finished(&self) -> bool {
        self.inner.is_none()
    }

    fn fail(&mut self, source: EngineError) -> Option<Result<String, RelayError>> {
        self.inner = None;
        tracing::error!(
            fragments = self.fragments,
            error = %source,
            policy = ?self.policy,
            "Engine stream failed mid-response"
        );

        match &self.policy {
            StreamErrorPolicy::Abort => Some(Err(RelayError {
                fragments: self.fragments,
                source,
            })),
            StreamErrorPolicy::Truncate => None,
            StreamErrorPolicy::Marker(marker) => Some(Ok(marker.clone())),
        }
    }
}

impl<S> Stream for TokenRelay<S>
where
    S: Stream<Item = Result<String, EngineError>> + Unpin,
{
    type Item = Result<String, RelayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let Some(inner) = this.inner.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(inner.poll_next_unpin(cx)) {
                // Zero-length fragments carry nothing to write.
                Some(Ok(fragment)) if fragment.is_empty() => continue,
                Some(Ok(fragment)) => {
                    this.fragments += 1;
                    return Poll::Ready(Some(Ok(fragment)));
                }
                Some(Err(err)) => return Poll::Ready(this.fail(err)),
                None => {
                    tracing::debug!(fragments = this.fragments, "Engine stream complete");
                    this.inner = None;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<S> Drop for TokenRelay<S> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            tracing::debug!(
                fragments = self.fragments,
                "Client went away, releasing engine stream"
            );
        }
    }
}
