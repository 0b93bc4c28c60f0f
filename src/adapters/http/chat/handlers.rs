//! HTTP handlers for the chat endpoint.
//!
//! Validates the conversation, starts the engine call and hands the relayed
//! fragments to the response body as they arrive. The body owns the relay, so
//! a client that hangs up stops the engine stream along with it.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::{StreamChatCommand, StreamChatHandler};
use crate::domain::chat::{ChatRequest, ChatRequestError};
use crate::ports::EngineError;

use super::dto::{ChatRequestBody, ErrorResponse};

/// Content type of the streamed response.
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub stream_chat: StreamChatHandler,
}

impl ChatAppState {
    pub fn new(stream_chat: StreamChatHandler) -> Self {
        Self { stream_chat }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST <chat prefix>
// ════════════════════════════════════════════════════════════════════════════════

/// POST <chat prefix> - Stream a chat response.
///
/// Responds with `text/plain` and a chunked body carrying the engine's
/// fragments verbatim and in order.
///
/// # Errors
/// - 400 Bad Request: malformed body, empty conversation, or last message not from user
/// - 415 Unsupported Media Type: body not sent as JSON
/// - 429/502/503/504: engine failed before streaming began
pub async fn chat(
    State(state): State<ChatAppState>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Result<Response, ChatApiError> {
    let Json(body) = payload?;
    let turn = ChatRequest::from(body).into_pending_turn()?;

    let relay = state.stream_chat.handle(StreamChatCommand::new(turn)).await?;
    let body = Body::from_stream(relay);

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8))],
        body,
    )
        .into_response())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts request and engine errors to HTTP responses.
#[derive(Debug)]
pub enum ChatApiError {
    BadRequest(String),
    UnsupportedMediaType(String),
    Engine(EngineError),
}

impl From<JsonRejection> for ChatApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ChatApiError::UnsupportedMediaType(rejection.body_text())
            }
            // Unknown roles and missing fields land here too.
            _ => ChatApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<ChatRequestError> for ChatApiError {
    fn from(err: ChatRequestError) -> Self {
        ChatApiError::BadRequest(err.to_string())
    }
}

impl From<EngineError> for ChatApiError {
    fn from(err: EngineError) -> Self {
        ChatApiError::Engine(err)
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ChatApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            ChatApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorResponse::unsupported_media_type(msg),
            ),
            ChatApiError::Engine(err) => return engine_error_response(err),
        };

        (status, Json(error)).into_response()
    }
}

fn engine_error_response(err: EngineError) -> Response {
    let (status, error) = match &err {
        EngineError::RateLimited { retry_after_secs } => {
            let retry_after = HeaderValue::from(*retry_after_secs);
            return (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after)],
                Json(ErrorResponse::rate_limited(err.to_string())),
            )
                .into_response();
        }
        EngineError::Unavailable { .. } | EngineError::Network(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::engine_unavailable(err.to_string()),
        ),
        EngineError::Timeout { .. } => (
            StatusCode::GATEWAY_TIMEOUT,
            ErrorResponse::engine_timeout(err.to_string()),
        ),
        EngineError::InvalidRequest(msg) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg.clone()))
        }
        EngineError::AuthenticationFailed | EngineError::Parse(_) => {
            tracing::error!(error = %err, "Chat engine failure");
            (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::engine_error("The chat engine failed to respond"),
            )
        }
    };

    (status, Json(error)).into_response()
}
