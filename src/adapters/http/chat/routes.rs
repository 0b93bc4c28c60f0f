//! Axum routes for the chat endpoint.

use axum::routing::post;
use axum::Router;

use super::handlers::{chat, ChatAppState};

/// Creates the chat route mounted at `path`.
///
/// Both `path` and `path/` are accepted.
pub fn chat_routes(path: &str) -> Router<ChatAppState> {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return Router::new().route("/", post(chat));
    }

    Router::new()
        .route(path, post(chat))
        .route(&format!("{path}/"), post(chat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use futures::StreamExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::adapters::engine::MockChatEngine;
    use crate::application::handlers::StreamChatHandler;
    use crate::application::StreamErrorPolicy;
    use crate::domain::chat::Message;
    use crate::ports::EngineError;

    fn app(engine: &MockChatEngine) -> Router {
        app_with_policy(engine, StreamErrorPolicy::default())
    }

    fn app_with_policy(engine: &MockChatEngine, policy: StreamErrorPolicy) -> Router {
        let handler = StreamChatHandler::new(Arc::new(engine.clone())).with_error_policy(policy);
        chat_routes("/api/chat").with_state(ChatAppState::new(handler))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn streams_fragments_as_plain_text() {
        let engine = MockChatEngine::new().with_fragments(["T", "o", "k", ""]);

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Tok");
    }

    #[tokio::test]
    async fn trailing_slash_is_accepted() {
        let engine = MockChatEngine::new().with_fragments(["ok"]);

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat/",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn root_prefix_mounts_at_root() {
        let engine = MockChatEngine::new().with_fragments(["ok"]);
        let handler = StreamChatHandler::new(Arc::new(engine.clone()));
        let app = chat_routes("/").with_state(ChatAppState::new(handler));

        let response = app
            .oneshot(post_json(
                "/",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_messages_is_bad_request() {
        let engine = MockChatEngine::new();

        let response = app(&engine)
            .oneshot(post_json("/api/chat", json!({ "messages": [] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["message"], "No messages provided");
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn last_message_from_assistant_is_bad_request() {
        let engine = MockChatEngine::new();

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [
                    { "role": "user", "content": "hi" },
                    { "role": "assistant", "content": "hello" }
                ] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Last message must be from user");
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_role_is_bad_request() {
        let engine = MockChatEngine::new();

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [{ "role": "narrator", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn alternate_roles_in_history_are_accepted() {
        for role in ["system", "assistant", "tool", "function", "chatbot", "model"] {
            let engine = MockChatEngine::new().with_fragments(["ok"]);

            let response = app(&engine)
                .oneshot(post_json(
                    "/api/chat",
                    json!({ "messages": [
                        { "role": role, "content": "x" },
                        { "role": "user", "content": "hi" }
                    ] }),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "role {role}");
            assert_eq!(engine.calls()[0].history[0].role.as_str(), role);
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let engine = MockChatEngine::new();

        let response = app(&engine)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"messages\": ["))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media_type() {
        let engine = MockChatEngine::new();

        let response = app(&engine)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .body(Body::from(
                        json!({ "messages": [{ "role": "user", "content": "hi" }] }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(response).await["code"], "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn history_reaches_engine_in_order() {
        let engine = MockChatEngine::new().with_fragments(["fine"]);

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [
                    { "role": "user", "content": "hi" },
                    { "role": "assistant", "content": "hello" },
                    { "role": "user", "content": "how are you" }
                ] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let calls = engine.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "how are you");
        assert_eq!(
            calls[0].history,
            vec![Message::user("hi"), Message::assistant("hello")]
        );
    }

    #[tokio::test]
    async fn engine_start_failure_maps_to_status() {
        let engine = MockChatEngine::new().with_start_error(EngineError::unavailable("warming up"));

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["code"], "ENGINE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn client_disconnect_stops_pulling_from_engine() {
        let engine = MockChatEngine::new().with_fragments(["a", "b", "c", "d", "e"]);

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        let mut body = response.into_body().into_data_stream();
        assert_eq!(&body.next().await.unwrap().unwrap()[..], b"a");
        assert_eq!(&body.next().await.unwrap().unwrap()[..], b"b");
        drop(body);

        assert_eq!(engine.pulls(), 2);
    }

    #[tokio::test]
    async fn mid_stream_failure_aborts_body_by_default() {
        let engine = MockChatEngine::new()
            .with_fragments(["partial"])
            .with_stream_error(EngineError::network("connection reset"));

        let response = app(&engine)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(to_bytes(response.into_body(), usize::MAX).await.is_err());
    }

    #[tokio::test]
    async fn mid_stream_failure_with_marker_policy_ends_cleanly() {
        let engine = MockChatEngine::new()
            .with_fragments(["partial"])
            .with_stream_error(EngineError::network("connection reset"));
        let policy = StreamErrorPolicy::Marker("\n[stream interrupted]".to_string());

        let response = app_with_policy(&engine, policy)
            .oneshot(post_json(
                "/api/chat",
                json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            ))
            .await
            .unwrap();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"partial\n[stream interrupted]");
    }

    #[tokio::test]
    async fn get_is_not_allowed() {
        let engine = MockChatEngine::new();

        let response = app(&engine)
            .oneshot(
                Request::builder()
                    .uri("/api/chat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
