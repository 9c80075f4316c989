// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware, routing, Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use unfurl_server::cache::InMemoryCache;
use unfurl_server::error::PreviewError;
use unfurl_server::handlers;
use unfurl_server::models::PartialMetadata;
use unfurl_server::preview::render::Renderer;
use unfurl_server::preview::resolver::MetadataResolver;
use unfurl_server::rate_limit::{self, InMemoryRateLimitStore};
use unfurl_server::state::AppState;

/// Renderer double standing in for the external rendering service — no real
/// browser or network involved. Records how often it is invoked.
pub struct StubRenderer {
    partial: PartialMetadata,
    calls: AtomicUsize,
}

impl StubRenderer {
    pub fn returning(partial: PartialMetadata) -> Arc<Self> {
        Arc::new(StubRenderer {
            partial,
            calls: AtomicUsize::new(0),
        })
    }

    /// A renderer whose dynamic pass finds nothing.
    pub fn empty() -> Arc<Self> {
        Self::returning(PartialMetadata::default())
    }

    pub fn with_title(title: &str) -> Arc<Self> {
        Self::returning(PartialMetadata {
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render(&self, _url: &str) -> Result<PartialMetadata, PreviewError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.partial.clone())
    }
}

pub fn test_state(renderer: Arc<dyn Renderer>) -> AppState {
    test_state_with(renderer, Duration::from_secs(5), 1000, Duration::from_secs(60))
}

pub fn test_state_with(
    renderer: Arc<dyn Renderer>,
    fetch_timeout: Duration,
    rate_limit_max_requests: u64,
    rate_limit_window: Duration,
) -> AppState {
    AppState {
        resolver: MetadataResolver::new(reqwest::Client::new(), renderer, fetch_timeout),
        cache: Arc::new(InMemoryCache::new()),
        rate_limiter: Arc::new(InMemoryRateLimitStore::new()),
        cache_ttl: Duration::from_secs(3600),
        rate_limit_max_requests,
        rate_limit_window,
    }
}

/// Build the full application router, minus the CORS/trace layers that do
/// not affect behavior under test.
pub fn create_test_app(state: AppState) -> Router {
    Router::new()
        .route("/", routing::get(handlers::health_check))
        .route("/metadata", routing::get(handlers::metadata::get_metadata))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ))
        .with_state(state)
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn get_from_ip(app: Router, uri: &str, ip: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("CF-Connecting-IP", ip)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
