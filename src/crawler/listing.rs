//! Container listing: fetch a listing page and extract its item titles.
//!
//! Items are the anchors whose `class` attribute carries the configured
//! title class. Extraction is regex based and independent of attribute order.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, instrument};
use url::Url;

use super::CrawlError;
use crate::config::PortalConfig;
use crate::transport::{Session, Transport, TransportError};

/// One entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerItem {
    /// Visible title of the item.
    pub display_name: String,
    /// Absolute URL of the item.
    pub url: String,
}

impl ContainerItem {
    /// Creates a listing entry.
    #[must_use]
    pub fn new(display_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            url: url.into(),
        }
    }
}

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Attribute text may contain `>` inside quoted values.
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<a\b((?:[^>"']|"[^"]*"|'[^']*')*)>(.*?)</a\s*>"#)
});

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
});

static HREF_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)(?:^|\s)href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<[^>]*>"));

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);"));

/// Fetches `url` and returns its items in listing order.
///
/// # Errors
///
/// Returns [`CrawlError::ListingFailed`] when the page cannot be fetched or
/// its body cannot be read.
#[instrument(level = "debug", skip(transport, session, config))]
pub async fn list_container(
    transport: &Transport,
    session: &Session,
    config: &PortalConfig,
    url: &str,
) -> Result<Vec<ContainerItem>, CrawlError> {
    let response = transport
        .get(session, url)
        .await
        .map_err(|source| CrawlError::listing_failed(url, source))?;
    let html = response
        .text()
        .await
        .map_err(|e| CrawlError::listing_failed(url, TransportError::network(url, e)))?;

    let items = parse_listing(&html, &config.base_url, &config.item_title_class);
    debug!(count = items.len(), "listed container");
    Ok(items)
}

/// Extracts container items from a listing page.
///
/// Relative hrefs are resolved against `base_url`; anchors without an
/// `href` are ignored.
#[must_use]
pub fn parse_listing(html: &str, base_url: &Url, title_class: &str) -> Vec<ContainerItem> {
    ANCHOR_RE
        .captures_iter(html)
        .filter_map(|anchor| {
            let attributes = anchor.get(1).map_or("", |m| m.as_str());
            let inner = anchor.get(2).map_or("", |m| m.as_str());

            let classes = attribute_value(&CLASS_ATTR_RE, attributes)?;
            if !classes.split_whitespace().any(|class| class == title_class) {
                return None;
            }

            let href = attribute_value(&HREF_ATTR_RE, attributes)?;
            let href = decode_entities(href.trim());
            if href.is_empty() {
                return None;
            }
            let url = absolutize_url(&href, base_url)?;

            Some(ContainerItem::new(display_text(inner), url))
        })
        .collect()
}

fn attribute_value<'a>(regex: &Regex, attributes: &'a str) -> Option<&'a str> {
    let caps = regex.captures(attributes)?;
    (1..=3).find_map(|group| caps.get(group).map(|m| m.as_str()))
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to `https:...`; otherwise joins with `base_url`.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

/// Visible text of an anchor: tags stripped, entities decoded, whitespace collapsed.
fn display_text(inner_html: &str) -> String {
    let without_tags = TAG_RE.replace_all(inner_html, " ");
    decode_entities(&without_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes the HTML entities that show up in portal titles and hrefs.
///
/// Unknown named entities are left untouched.
pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |caps: &Captures<'_>| {
        let entity = &caps[1];
        let decoded = if let Some(hex) = entity
            .strip_prefix("#x")
            .or_else(|| entity.strip_prefix("#X"))
        {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = entity.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => None,
            }
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}
