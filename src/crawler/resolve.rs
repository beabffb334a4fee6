//! Network lookups that happen before an item is materialized:
//! following forwarding links and probing a file's declared content type.

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::CrawlError;
use crate::config::ContentTypeTable;
use crate::transport::{Session, Transport};

/// Follows a forwarding link's server-side redirects and returns the final URL.
///
/// # Errors
///
/// Returns [`CrawlError::ResolutionFailed`] when the transport gives up.
#[instrument(level = "debug", skip(transport, session))]
pub async fn resolve_forwarding_link(
    transport: &Transport,
    session: &Session,
    url: &str,
) -> Result<String, CrawlError> {
    let response = transport
        .get(session, url)
        .await
        .map_err(|source| CrawlError::resolution_failed(url, source))?;
    let target = response.url().to_string();
    debug!(target = %target, "resolved forwarding link");
    Ok(target)
}

/// Probes `url` with a HEAD request and maps its `Content-Type` to an extension.
///
/// Unrecognized or missing content types yield `""`.
///
/// # Errors
///
/// Returns [`CrawlError::DownloadFailed`] when the probe itself fails; the
/// caller skips the file so a later run can retry it.
#[instrument(level = "debug", skip(transport, session, table))]
pub async fn extension_for<'t>(
    transport: &Transport,
    session: &Session,
    table: &'t ContentTypeTable,
    url: &str,
) -> Result<&'t str, CrawlError> {
    let response = transport
        .head(session, url)
        .await
        .map_err(|source| CrawlError::download_failed(url, source))?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let extension = table.extension_for(content_type);
    debug!(content_type, extension, "probed content type");
    Ok(extension)
}
