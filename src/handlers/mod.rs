pub mod metadata;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Liveness endpoint. Exempt from rate limiting so orchestrator probes are
/// never throttled.
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
