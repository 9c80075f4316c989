use std::sync::Arc;
use std::time::Duration;

use crate::error::PreviewError;
use crate::models::{Metadata, PartialMetadata};
use crate::preview::{extract, fetch, render::Renderer};

/// Where a resolution stands after the static pass.
#[derive(Debug)]
pub enum Resolution {
    /// Static pass yielded both a title and a description — no fallback.
    Complete(PartialMetadata),
    /// Title or description is still missing; the dynamic renderer runs next.
    NeedsFallback(PartialMetadata),
}

impl Resolution {
    /// Completeness check: the dynamic fallback triggers when either the
    /// title or the description is missing after the static pass.
    pub fn classify(partial: PartialMetadata) -> Self {
        if partial.title.is_some() && partial.description.is_some() {
            Resolution::Complete(partial)
        } else {
            Resolution::NeedsFallback(partial)
        }
    }
}

/// Merge the dynamic result into the static one. Dynamic values fill only
/// fields the static pass left absent — static values are never overwritten.
/// The meta-tag dump merges per key with the same rule; media sub-records
/// merge as whole records.
pub fn merge(static_pass: PartialMetadata, dynamic: PartialMetadata) -> PartialMetadata {
    let mut merged = static_pass;
    merged.title = merged.title.or(dynamic.title);
    merged.description = merged.description.or(dynamic.description);
    merged.image = merged.image.or(dynamic.image);
    merged.url = merged.url.or(dynamic.url);
    merged.site_name = merged.site_name.or(dynamic.site_name);
    merged.r#type = merged.r#type.or(dynamic.r#type);
    merged.locale = merged.locale.or(dynamic.locale);
    merged.determiner = merged.determiner.or(dynamic.determiner);
    merged.audio = merged.audio.or(dynamic.audio);
    merged.video = merged.video.or(dynamic.video);
    merged.favicon = merged.favicon.or(dynamic.favicon);
    merged.language = merged.language.or(dynamic.language);
    if merged.locale_alternates.is_empty() {
        merged.locale_alternates = dynamic.locale_alternates;
    }
    for (key, value) in dynamic.meta_tags {
        merged.meta_tags.entry(key).or_insert(value);
    }
    merged.image_metadata = merged.image_metadata.or(dynamic.image_metadata);
    merged.video_metadata = merged.video_metadata.or(dynamic.video_metadata);
    merged.audio_metadata = merged.audio_metadata.or(dynamic.audio_metadata);
    merged
}

/// Seal a merged pass into the canonical record. A still-empty title means
/// the pipeline produced nothing usable — surfaced as `Incomplete`, which
/// the boundary maps to 422 rather than fabricating a value. The URL
/// canonicalizes to `og:url` when present, else the requested URL.
pub fn finalize(merged: PartialMetadata, requested_url: &str) -> Result<Metadata, PreviewError> {
    let title = merged.title.unwrap_or_default();
    if title.is_empty() {
        return Err(PreviewError::Incomplete);
    }

    Ok(Metadata {
        title,
        description: merged.description,
        image: merged.image,
        url: merged.url.unwrap_or_else(|| requested_url.to_string()),
        site_name: merged.site_name,
        r#type: merged.r#type,
        locale: merged.locale,
        determiner: merged.determiner,
        audio: merged.audio,
        video: merged.video,
        favicon: merged.favicon,
        language: merged.language,
        locale_alternates: merged.locale_alternates,
        meta_tags: merged.meta_tags,
        image_metadata: merged.image_metadata,
        video_metadata: merged.video_metadata,
        audio_metadata: merged.audio_metadata,
    })
}

/// Orchestrates one resolution: static fetch → extract → completeness
/// check → optional dynamic render → merge → finalize. Constructed once at
/// startup; each call is an independent sequential pipeline with at most
/// two outbound requests.
#[derive(Clone)]
pub struct MetadataResolver {
    client: reqwest::Client,
    renderer: Arc<dyn Renderer>,
    fetch_timeout: Duration,
}

impl MetadataResolver {
    pub fn new(
        client: reqwest::Client,
        renderer: Arc<dyn Renderer>,
        fetch_timeout: Duration,
    ) -> Self {
        MetadataResolver {
            client,
            renderer,
            fetch_timeout,
        }
    }

    /// Resolve preview metadata for an already-validated URL.
    ///
    /// A failed static fetch fails the whole call — the dynamic path is not
    /// tried as a resilience fallback. No retries; errors propagate typed.
    pub async fn resolve(&self, url: &str) -> Result<Metadata, PreviewError> {
        let html = fetch::fetch_html(&self.client, url, self.fetch_timeout).await?;
        let static_pass = extract::extract(&html, url);

        let merged = match Resolution::classify(static_pass) {
            Resolution::Complete(partial) => partial,
            Resolution::NeedsFallback(partial) => {
                tracing::debug!(url, "Static pass incomplete, invoking dynamic renderer");
                let rendered = self.renderer.render(url).await?;
                merge(partial, rendered)
            }
        };

        finalize(merged, url)
    }
}
