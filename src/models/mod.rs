use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Metadata Models
// ============================================================================

/// Canonical preview metadata for a URL, returned by `GET /metadata`.
///
/// `title` and `url` always resolve to at least a fallback value; everything
/// else is optional and serialized as an explicit `null` when absent so
/// clients can rely on a stable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// The `og:url` canonical URL when present, else the requested URL.
    pub url: String,
    pub site_name: Option<String>,
    pub r#type: Option<String>,
    pub locale: Option<String>,
    pub determiner: Option<String>,
    pub audio: Option<String>,
    pub video: Option<String>,
    /// Absolute favicon URL; relative hrefs are resolved against the page URL.
    pub favicon: Option<String>,
    pub language: Option<String>,
    /// Every `og:locale:alternate` in document order, duplicates preserved.
    pub locale_alternates: Vec<String>,
    /// Raw dump of every `<meta>` tag with a usable name/property and content.
    /// Keyed by `property` when present, else `name`; last write wins.
    pub meta_tags: HashMap<String, String>,
    pub image_metadata: Option<MediaMetadata>,
    pub video_metadata: Option<MediaMetadata>,
    pub audio_metadata: Option<MediaMetadata>,
}

/// Structured `og:image:*` / `og:video:*` / `og:audio:*` family.
///
/// `width`/`height` use a best-effort integer parse — non-numeric content
/// yields `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub url: Option<String>,
    pub secure_url: Option<String>,
    pub r#type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: Option<String>,
}

impl MediaMetadata {
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.secure_url.is_none()
            && self.r#type.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.alt.is_none()
    }
}

/// One extraction pass's view of a page: the same shape as [`Metadata`] with
/// nothing guaranteed. Produced by the static extractor and by the dynamic
/// renderer, merged by the resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub site_name: Option<String>,
    pub r#type: Option<String>,
    pub locale: Option<String>,
    pub determiner: Option<String>,
    pub audio: Option<String>,
    pub video: Option<String>,
    pub favicon: Option<String>,
    pub language: Option<String>,
    pub locale_alternates: Vec<String>,
    pub meta_tags: HashMap<String, String>,
    pub image_metadata: Option<MediaMetadata>,
    pub video_metadata: Option<MediaMetadata>,
    pub audio_metadata: Option<MediaMetadata>,
}

// ============================================================================
// Response Envelope
// ============================================================================

/// Wire envelope for the metadata endpoint:
/// `{ success, data?, cached?, error?, code? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiResponse {
    pub fn success(data: Metadata, cached: bool) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            cached: Some(cached),
            error: None,
            code: None,
        }
    }

    pub fn failure(error: impl Into<String>, code: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            cached: None,
            error: Some(error.into()),
            code: Some(code.into()),
        }
    }
}
