use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unfurl_server::cache::InMemoryCache;
use unfurl_server::config::Config;
use unfurl_server::handlers;
use unfurl_server::preview::fetch::USER_AGENT;
use unfurl_server::preview::render::BrowserlessRenderer;
use unfurl_server::preview::resolver::MetadataResolver;
use unfurl_server::rate_limit::{self, InMemoryRateLimitStore};
use unfurl_server::state::AppState;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "unfurl_server=info,tower_http=info".parse().unwrap());
    if config.is_production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Configuration loaded");

    // One shared HTTP client; fetch and render deadlines are applied
    // per request from the config.
    let http_client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to build HTTP client");

    let renderer = Arc::new(BrowserlessRenderer::new(
        http_client.clone(),
        config.renderer_url.clone(),
        config.renderer_token.clone(),
        config.render_timeout,
    ));
    let resolver = MetadataResolver::new(http_client, renderer, config.fetch_timeout);

    let state = AppState {
        resolver,
        cache: Arc::new(InMemoryCache::new()),
        rate_limiter: Arc::new(InMemoryRateLimitStore::new()),
        cache_ttl: config.cache_ttl,
        rate_limit_max_requests: config.rate_limit_max_requests,
        rate_limit_window: config.rate_limit_window,
    };

    let app = Router::new()
        .route("/", get(handlers::health_check))
        .route("/metadata", get(handlers::metadata::get_metadata))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.server_addr();
    info!("Server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
