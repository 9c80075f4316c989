use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PreviewError;
use crate::models::{MediaMetadata, PartialMetadata};
use crate::preview::extract::resolve_href;

/// Capability interface for the dynamic-rendering fallback: load the page in
/// a real browser, execute its scripts, and read the same field set as the
/// static extractor. Implementations must surface their timeout distinctly
/// from generic failure.
///
/// This call is expensive (a full browser page load) — the resolver invokes
/// it only when the static pass is judged insufficient, never unconditionally.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<PartialMetadata, PreviewError>;
}

/// Selectors the rendering service is asked to scrape, mirrored by
/// [`partial_from_scrape`]. `None` means take the element's text.
const SCRAPE_TARGETS: &[(&str, Option<&str>)] = &[
    ("title", None),
    ("html", Some("lang")),
    ("meta", None),
    (r#"meta[name="description"]"#, Some("content")),
    (r#"meta[property="og:title"]"#, Some("content")),
    (r#"meta[property="og:description"]"#, Some("content")),
    (r#"meta[property="og:image"]"#, Some("content")),
    (r#"meta[property="og:url"]"#, Some("content")),
    (r#"meta[property="og:site_name"]"#, Some("content")),
    (r#"meta[property="og:type"]"#, Some("content")),
    (r#"meta[property="og:locale"]"#, Some("content")),
    (r#"meta[property="og:locale:alternate"]"#, Some("content")),
    (r#"meta[property="og:determiner"]"#, Some("content")),
    (r#"meta[property="og:audio"]"#, Some("content")),
    (r#"meta[property="og:video"]"#, Some("content")),
    (r#"meta[property="og:image:url"]"#, Some("content")),
    (r#"meta[property="og:image:secure_url"]"#, Some("content")),
    (r#"meta[property="og:image:type"]"#, Some("content")),
    (r#"meta[property="og:image:width"]"#, Some("content")),
    (r#"meta[property="og:image:height"]"#, Some("content")),
    (r#"meta[property="og:image:alt"]"#, Some("content")),
    (r#"meta[property="og:video:url"]"#, Some("content")),
    (r#"meta[property="og:video:secure_url"]"#, Some("content")),
    (r#"meta[property="og:video:type"]"#, Some("content")),
    (r#"meta[property="og:video:width"]"#, Some("content")),
    (r#"meta[property="og:video:height"]"#, Some("content")),
    (r#"meta[property="og:audio:url"]"#, Some("content")),
    (r#"meta[property="og:audio:secure_url"]"#, Some("content")),
    (r#"meta[property="og:audio:type"]"#, Some("content")),
    (r#"link[rel="icon"]"#, Some("href")),
    (r#"link[rel="shortcut icon"]"#, Some("href")),
    (r#"link[rel="apple-touch-icon"]"#, Some("href")),
];

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    elements: Vec<ScrapeTarget>,
    timeout: u64,
}

#[derive(Serialize)]
struct ScrapeTarget {
    selector: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<&'static str>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: Vec<ScrapedElement>,
}

#[derive(Deserialize)]
pub(crate) struct ScrapedElement {
    selector: String,
    #[serde(default)]
    results: Vec<ScrapedNode>,
}

#[derive(Deserialize, Default)]
struct ScrapedNode {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    attributes: Vec<ScrapedAttribute>,
}

#[derive(Deserialize)]
struct ScrapedAttribute {
    name: String,
    value: String,
}

/// Client for a browserless-style headless-Chrome scrape endpoint.
pub struct BrowserlessRenderer {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl BrowserlessRenderer {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Self {
        BrowserlessRenderer {
            client,
            endpoint,
            token,
            timeout,
        }
    }
}

#[async_trait]
impl Renderer for BrowserlessRenderer {
    async fn render(&self, url: &str) -> Result<PartialMetadata, PreviewError> {
        let request = ScrapeRequest {
            url,
            elements: SCRAPE_TARGETS
                .iter()
                .map(|&(selector, attribute)| ScrapeTarget {
                    selector,
                    attribute,
                })
                .collect(),
            timeout: self.timeout.as_millis() as u64,
        };

        let mut builder = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("Cache-Control", "no-cache")
            .json(&request);
        if let Some(token) = &self.token {
            builder = builder.header("x-api-key", token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                PreviewError::Timeout
            } else {
                tracing::warn!(error = %e, url, "Rendering service unreachable");
                PreviewError::Render(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::Render(format!(
                "rendering service returned {status}"
            )));
        }

        let scrape: ScrapeResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                PreviewError::Timeout
            } else {
                PreviewError::Render(e.to_string())
            }
        })?;

        Ok(partial_from_scrape(&scrape.data, url))
    }
}

fn attr_value(node: &ScrapedNode, name: &str) -> Option<String> {
    node.attributes
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Map scraped element results back into the extractor's field shape,
/// applying the same precedence and absence rules as the static pass.
pub(crate) fn partial_from_scrape(
    elements: &[ScrapedElement],
    base_url: &str,
) -> PartialMetadata {
    let element = |selector: &str| elements.iter().find(|el| el.selector == selector);
    let first = |selector: &str, attr: &str| -> Option<String> {
        element(selector)
            .and_then(|el| el.results.first())
            .and_then(|node| attr_value(node, attr))
    };
    let og = |prop: &str| first(&format!(r#"meta[property="{prop}"]"#), "content");

    let title = element("title")
        .and_then(|el| el.results.first())
        .and_then(|node| node.text.as_deref())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| og("og:title"));

    let description = first(r#"meta[name="description"]"#, "content")
        .or_else(|| og("og:description"));

    let favicon = [
        r#"link[rel="icon"]"#,
        r#"link[rel="shortcut icon"]"#,
        r#"link[rel="apple-touch-icon"]"#,
    ]
    .iter()
    .copied()
    .find_map(|selector| first(selector, "href"))
    .and_then(|href| resolve_href(&href, base_url));

    let locale_alternates = element(r#"meta[property="og:locale:alternate"]"#)
        .map(|el| {
            el.results
                .iter()
                .filter_map(|node| attr_value(node, "content"))
                .collect()
        })
        .unwrap_or_default();

    let mut meta_tags = HashMap::new();
    if let Some(el) = element("meta") {
        for node in &el.results {
            let Some(key) = attr_value(node, "property").or_else(|| attr_value(node, "name"))
            else {
                continue;
            };
            let Some(content) = attr_value(node, "content") else {
                continue;
            };
            meta_tags.insert(key, content);
        }
    }

    let media = |family: &str| -> Option<MediaMetadata> {
        let sub = |suffix: &str| og(&format!("{family}:{suffix}"));
        let mut media = MediaMetadata {
            url: sub("url"),
            secure_url: sub("secure_url"),
            r#type: sub("type"),
            width: sub("width").and_then(|v| v.trim().parse().ok()),
            height: sub("height").and_then(|v| v.trim().parse().ok()),
            alt: sub("alt"),
        };
        if media.is_empty() {
            return None;
        }
        if media.url.is_none() {
            media.url = og(family);
        }
        Some(media)
    };

    PartialMetadata {
        title,
        description,
        image: og("og:image"),
        url: og("og:url"),
        site_name: og("og:site_name"),
        r#type: og("og:type"),
        locale: og("og:locale"),
        determiner: og("og:determiner"),
        audio: og("og:audio"),
        video: og("og:video"),
        favicon,
        language: first("html", "lang"),
        locale_alternates,
        meta_tags,
        image_metadata: media("og:image"),
        video_metadata: media("og:video"),
        audio_metadata: media("og:audio"),
    }
}
