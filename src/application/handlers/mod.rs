//! Application command handlers.

mod stream_chat;

pub use stream_chat::{StreamChatCommand, StreamChatHandler};
