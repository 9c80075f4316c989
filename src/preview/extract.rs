use std::collections::HashMap;

use url::Url;

use crate::models::{MediaMetadata, PartialMetadata};
use crate::preview::document::Document;

/// Extract preview metadata from already-fetched markup. Pure transformation:
/// no I/O, no script execution; every pass tolerates missing elements.
///
/// Precedence is fixed: `<title>` text over `og:title`, and
/// `meta[name=description]` over `og:description`. Open Graph single-value
/// fields take the first matching element when duplicates exist.
pub fn extract(html: &str, base_url: &str) -> PartialMetadata {
    let doc = Document::parse(html);

    PartialMetadata {
        title: title_tag(&doc).or_else(|| meta_property(&doc, "og:title")),
        description: meta_name(&doc, "description")
            .or_else(|| meta_property(&doc, "og:description")),
        image: meta_property(&doc, "og:image"),
        url: meta_property(&doc, "og:url"),
        site_name: meta_property(&doc, "og:site_name"),
        r#type: meta_property(&doc, "og:type"),
        locale: meta_property(&doc, "og:locale"),
        determiner: meta_property(&doc, "og:determiner"),
        audio: meta_property(&doc, "og:audio"),
        video: meta_property(&doc, "og:video"),
        favicon: favicon(&doc, base_url),
        language: language(&doc),
        locale_alternates: locale_alternates(&doc),
        meta_tags: meta_tag_dump(&doc),
        image_metadata: media_family(&doc, "og:image"),
        video_metadata: media_family(&doc, "og:video"),
        audio_metadata: media_family(&doc, "og:audio"),
    }
}

fn meta_property(doc: &Document, property: &str) -> Option<String> {
    doc.query_first(&format!(r#"meta[property="{property}"]"#))
        .and_then(|el| el.attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn meta_name(doc: &Document, name: &str) -> Option<String> {
    doc.query_first(&format!(r#"meta[name="{name}"]"#))
        .and_then(|el| el.attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn title_tag(doc: &Document) -> Option<String> {
    doc.query_first("title")
        .map(|el| el.text().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First usable icon href among the conventional `rel` values, resolved to
/// an absolute URL against the page's own URL.
fn favicon(doc: &Document, base_url: &str) -> Option<String> {
    const ICON_SELECTORS: [&str; 3] = [
        r#"link[rel="icon"]"#,
        r#"link[rel="shortcut icon"]"#,
        r#"link[rel="apple-touch-icon"]"#,
    ];

    ICON_SELECTORS
        .iter()
        .filter_map(|selector| {
            doc.query_first(selector)
                .and_then(|el| el.attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
        })
        .find_map(|href| resolve_href(href, base_url))
}

fn language(doc: &Document) -> Option<String> {
    doc.query_first("html")
        .and_then(|el| el.attr("lang"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Every `og:locale:alternate`, document order, duplicates included.
fn locale_alternates(doc: &Document) -> Vec<String> {
    doc.query_all(r#"meta[property="og:locale:alternate"]"#)
        .iter()
        .filter_map(|el| el.attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Catch-all dump of `<meta>` tags with a usable key and content.
/// `property` wins over `name` when both are present on one element;
/// duplicate keys overwrite earlier entries.
fn meta_tag_dump(doc: &Document) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for element in doc.query_all("meta") {
        let Some(key) = element
            .attr("property")
            .or_else(|| element.attr("name"))
            .map(str::trim)
            .filter(|k| !k.is_empty())
        else {
            continue;
        };
        let Some(content) = element
            .attr("content")
            .map(str::trim)
            .filter(|c| !c.is_empty())
        else {
            continue;
        };
        tags.insert(key.to_string(), content.to_string());
    }
    tags
}

/// Structured `{family}:*` sub-record. Present only when the page carries at
/// least one structured sub-tag; the bare `{family}` pointer then backfills
/// a missing `url`.
fn media_family(doc: &Document, family: &str) -> Option<MediaMetadata> {
    let sub = |suffix: &str| meta_property(doc, &format!("{family}:{suffix}"));

    let mut media = MediaMetadata {
        url: sub("url"),
        secure_url: sub("secure_url"),
        r#type: sub("type"),
        width: sub("width").and_then(|v| parse_dimension(&v)),
        height: sub("height").and_then(|v| parse_dimension(&v)),
        alt: sub("alt"),
    };

    if media.is_empty() {
        return None;
    }
    if media.url.is_none() {
        media.url = meta_property(doc, family);
    }
    Some(media)
}

/// Best-effort pixel dimension parse; non-numeric content is absent, never
/// an error.
fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Resolve a possibly-relative href against the page URL.
pub(crate) fn resolve_href(href: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}
