//! Chat Relay - streaming HTTP front for conversational engines
//!
//! This crate validates incoming conversations, hands the newest user query and
//! its history to a pluggable chat engine, and relays the engine's token stream
//! back to the caller as it is produced.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
