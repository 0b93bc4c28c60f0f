//! Application layer - orchestrates domain validation and engine calls.

pub mod handlers;
pub mod relay;

pub use relay::{RelayError, StreamErrorPolicy, TokenRelay};
