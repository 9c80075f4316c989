use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use url::Url;

use crate::cache;
use crate::error::{AppError, AppResult};
use crate::models::{ApiResponse, Metadata};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    pub url: Option<String>,
    #[serde(rename = "noCache")]
    pub no_cache: Option<String>,
}

/// GET /metadata?url=<encoded-url>[&noCache=true]
///
/// Validates the target URL, consults the cache (key: raw URL, no
/// normalization), and otherwise runs the resolution pipeline. Successful
/// results are cached with the configured TTL; `noCache=true` skips the
/// lookup but still refreshes the entry.
pub async fn get_metadata(
    State(state): State<AppState>,
    Query(params): Query<MetadataQuery>,
) -> AppResult<Json<ApiResponse>> {
    // ── Validate URL ──────────────────────────────────────────────────────
    let url_str = params
        .url
        .filter(|u| !u.is_empty())
        .ok_or(AppError::MissingUrl)?;

    let parsed = Url::parse(&url_str).map_err(|_| AppError::InvalidUrl)?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(AppError::InvalidUrl);
    }

    let no_cache = params.no_cache.as_deref() == Some("true");
    let key = cache::metadata_key(&url_str);

    // ── Check cache ───────────────────────────────────────────────────────
    if !no_cache {
        if let Some(serialized) = state.cache.get(&key).await {
            match serde_json::from_str::<Metadata>(&serialized) {
                Ok(data) => return Ok(Json(ApiResponse::success(data, true))),
                Err(e) => {
                    tracing::warn!(error = %e, url = %url_str, "Discarding undecodable cache entry")
                }
            }
        }
    }

    // ── Resolve and cache ─────────────────────────────────────────────────
    let metadata = state.resolver.resolve(&url_str).await?;

    match serde_json::to_string(&metadata) {
        Ok(serialized) => state.cache.put(&key, serialized, state.cache_ttl).await,
        Err(e) => tracing::warn!(error = %e, "Failed to serialize metadata for caching"),
    }

    Ok(Json(ApiResponse::success(metadata, false)))
}
