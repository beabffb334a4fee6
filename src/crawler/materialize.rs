//! Idempotent creation of the local mirror.
//!
//! Every operation treats "path already exists" as done: nothing is
//! overwritten and prior content is never verified.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::CrawlError;
use crate::transport::{Session, Transport, TransportError};

/// Outcome of a materializer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// The artifact was created by this call.
    Created,
    /// The path existed already; nothing was touched.
    AlreadyExisted,
}

/// Creates `path` and all missing ancestors.
///
/// # Errors
///
/// Returns [`CrawlError::Io`] when the directory cannot be created or when
/// something other than a directory already occupies `path`.
pub async fn ensure_directory(path: &Path) -> Result<Materialized, CrawlError> {
    if let Ok(metadata) = tokio::fs::metadata(path).await {
        if metadata.is_dir() {
            return Ok(Materialized::AlreadyExisted);
        }
        return Err(CrawlError::io(
            path,
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a directory"),
        ));
    }

    info!(path = %path.display(), "creating directory");
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| CrawlError::io(path, e))?;
    Ok(Materialized::Created)
}

/// Downloads `url` to `path` unless `path` already exists.
///
/// The body is streamed into a `.part` sibling that is renamed into place
/// once complete, so a failed download never leaves an artifact at `path`.
///
/// # Errors
///
/// - [`CrawlError::DownloadFailed`] when the transport gives up or the body
///   stream breaks
/// - [`CrawlError::Io`] when the file cannot be written
#[instrument(level = "debug", skip(transport, session, path), fields(path = %path.display()))]
pub async fn write_file(
    transport: &Transport,
    session: &Session,
    path: &Path,
    url: &str,
) -> Result<Materialized, CrawlError> {
    if path_exists(path).await {
        debug!("file exists, skipping download");
        return Ok(Materialized::AlreadyExisted);
    }

    info!(path = %path.display(), "downloading");
    let response = transport
        .get(session, url)
        .await
        .map_err(|source| CrawlError::download_failed(url, source))?;

    let partial_path = partial_path_for(path);
    let mut file = File::create(&partial_path)
        .await
        .map_err(|e| CrawlError::io(&partial_path, e))?;

    let stream_result = stream_to_file(&mut file, response, url, &partial_path).await;
    drop(file);

    let bytes_written = match stream_result {
        Ok(bytes) => bytes,
        Err(error) => {
            debug!(path = %partial_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(error);
        }
    };

    tokio::fs::rename(&partial_path, path)
        .await
        .map_err(|e| CrawlError::io(path, e))?;

    debug!(bytes = bytes_written, "download complete");
    Ok(Materialized::Created)
}

/// Writes an HTML redirect stub pointing at `target_url` unless `path` exists.
///
/// # Errors
///
/// Returns [`CrawlError::Io`] when the stub cannot be written.
pub async fn write_redirect_stub(path: &Path, target_url: &str) -> Result<Materialized, CrawlError> {
    if path_exists(path).await {
        return Ok(Materialized::AlreadyExisted);
    }

    info!(path = %path.display(), target = %target_url, "creating link");
    tokio::fs::write(path, redirect_stub_html(target_url))
        .await
        .map_err(|e| CrawlError::io(path, e))?;
    Ok(Materialized::Created)
}

/// Minimal HTML document that navigates the browser to `target_url` on load.
#[must_use]
pub fn redirect_stub_html(target_url: &str) -> String {
    let escaped = target_url
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("</", "<\\/");
    format!(
        "<html><body><script type=\"text/javascript\">window.location.href=\"{escaped}\"</script></body></html>"
    )
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn partial_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, std::ffi::OsStr::to_os_string);
    name.push(".part");
    path.with_file_name(name)
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, CrawlError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result
            .map_err(|e| CrawlError::download_failed(url, TransportError::network(url, e)))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| CrawlError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| CrawlError::io(file_path, e))?;

    Ok(bytes_written)
}
