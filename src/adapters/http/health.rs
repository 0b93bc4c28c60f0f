//! Liveness endpoint.

use axum::routing::get;
use axum::{Json, Router};

/// Body returned by the healthcheck.
pub const HEALTHCHECK_PAYLOAD: &str = "Hello world!";

/// Registers `GET` and `HEAD` on `path`.
pub fn health_routes<S>(path: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(path, get(healthcheck).head(healthcheck))
}

/// Always 200 with a constant JSON string. HEAD responses carry headers only.
pub async fn healthcheck() -> Json<&'static str> {
    Json(HEALTHCHECK_PAYLOAD)
}
