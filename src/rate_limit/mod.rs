use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

pub const KEY_PREFIX: &str = "rate_limit";

/// Fixed-window counter with increment-and-expire semantics: the first hit
/// for a key opens a window, every hit inside it increments, and the count
/// resets when the window lapses. Matches a Redis `INCR` + `EXPIRE NX` pair,
/// which is what a distributed deployment would swap in behind this trait.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record one hit for `key` and return the count within the current window.
    async fn incr_and_check(&self, key: &str, window: Duration) -> u64;
}

/// In-process store with per-key windows. Lapsed windows are swept on every
/// hit — the key space is client-controlled, so the map must never grow
/// unbounded.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, (u64, Instant)>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn incr_and_check(&self, key: &str, window: Duration) -> u64 {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap();
        windows.retain(|_, (_, expires_at)| *expires_at > now);
        let entry = windows.entry(key.to_string()).or_insert((0, now + window));
        entry.0 += 1;
        entry.0
    }
}

/// Per-client-IP rate limiting middleware. Health checks bypass it so
/// orchestrator probes are never throttled.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == "/" {
        return next.run(request).await;
    }

    let ip = request
        .headers()
        .get("CF-Connecting-IP")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let key = format!("{KEY_PREFIX}{}{ip}", crate::cache::KEY_SEPARATOR);

    let current = state
        .rate_limiter
        .incr_and_check(&key, state.rate_limit_window)
        .await;

    if current > state.rate_limit_max_requests {
        tracing::warn!(client = %ip, count = current, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "too many requests" })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_hits_within_window() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::from_secs(60);
        assert_eq!(store.incr_and_check("rate_limit:1.2.3.4", window).await, 1);
        assert_eq!(store.incr_and_check("rate_limit:1.2.3.4", window).await, 2);
        assert_eq!(store.incr_and_check("rate_limit:1.2.3.4", window).await, 3);
    }

    #[tokio::test]
    async fn keys_are_counted_independently() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::from_secs(60);
        assert_eq!(store.incr_and_check("rate_limit:a", window).await, 1);
        assert_eq!(store.incr_and_check("rate_limit:b", window).await, 1);
        assert_eq!(store.incr_and_check("rate_limit:a", window).await, 2);
    }

    #[tokio::test]
    async fn expired_windows_for_other_keys_are_swept() {
        let store = InMemoryRateLimitStore::new();
        let short = Duration::from_millis(20);
        // Distinct client keys, as a rotating client-supplied header produces.
        for i in 0..50 {
            store.incr_and_check(&format!("rate_limit:{i}"), short).await;
        }
        tokio::time::sleep(Duration::from_millis(40)).await;

        store
            .incr_and_check("rate_limit:fresh", Duration::from_secs(60))
            .await;
        assert_eq!(store.windows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn window_expiry_resets_the_count() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::from_millis(20);
        assert_eq!(store.incr_and_check("rate_limit:x", window).await, 1);
        assert_eq!(store.incr_and_check("rate_limit:x", window).await, 2);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.incr_and_check("rate_limit:x", window).await, 1);
    }
}
