//! HTTP adapters - the relay's public surface.
//!
//! `app_router` assembles the chat and health routes and wraps them in the
//! shared middleware stack (request ids, tracing, CORS, timeout).

pub mod chat;
pub mod health;

pub use chat::{chat_routes, ChatAppState};
pub use health::{health_routes, HEALTHCHECK_PAYLOAD};

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Path of the liveness endpoint.
pub const HEALTHCHECK_PATH: &str = "/healthcheck";

/// Builds the full application router.
pub fn app_router(state: ChatAppState, config: &ServerConfig) -> Router {
    let chat_path = config.chat_path();

    let mut router = Router::new()
        .merge(chat_routes(&chat_path))
        .merge(health_routes::<ChatAppState>(HEALTHCHECK_PATH));

    if chat_path != "/" {
        let prefixed = format!("{chat_path}{HEALTHCHECK_PATH}");
        router = router.merge(health_routes::<ChatAppState>(&prefixed));
    }

    router
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(cors_layer(config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// CORS for the configured origins.
///
/// With no origins configured, development allows any origin and production
/// allows none.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any);
    }

    if config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    }
}
