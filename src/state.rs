use std::sync::Arc;
use std::time::Duration;

use crate::cache::MetadataCache;
use crate::preview::resolver::MetadataResolver;
use crate::rate_limit::RateLimitStore;

/// Shared application state passed to all handlers and middleware.
/// Collaborators are constructed once at startup and injected here —
/// never rebuilt per request.
#[derive(Clone)]
pub struct AppState {
    pub resolver: MetadataResolver,
    pub cache: Arc<dyn MetadataCache>,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    pub cache_ttl: Duration,
    pub rate_limit_max_requests: u64,
    pub rate_limit_window: Duration,
}
