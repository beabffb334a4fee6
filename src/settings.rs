//! Merges CLI flags and file config into the settings of one run.
//!
//! Priority for every value: CLI flag (or its env var) > config file > built-in default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use lms_mirror::{DEFAULT_BASE_URL, PortalConfig};

use crate::app_config::FileConfig;
use crate::cli::Args;

/// Fully resolved inputs for a mirror run.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) portal: PortalConfig,
    pub(crate) start_url: String,
    pub(crate) output_dir: PathBuf,
    pub(crate) username: Option<String>,
}

pub(crate) fn resolve_run_settings(args: &Args, file: &FileConfig) -> Result<RunSettings> {
    let base_url = args
        .base_url
        .as_deref()
        .or(file.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL);
    let mut portal = PortalConfig::for_base_url(base_url)
        .with_context(|| format!("Invalid portal base URL '{base_url}'"))?;

    if let Some(max_attempts) = args.max_attempts.or(file.max_attempts) {
        portal = portal.with_max_attempts(max_attempts);
    }
    let connect = file
        .connect_timeout_secs
        .unwrap_or(portal.connect_timeout_secs);
    let read = file.read_timeout_secs.unwrap_or(portal.read_timeout_secs);
    portal = portal.with_timeouts(connect, read);

    let start_url = args
        .start_url
        .clone()
        .unwrap_or_else(|| portal.memberships_url.clone());
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| file.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let username = args
        .username
        .clone()
        .or_else(|| file.username.clone())
        .filter(|name| !name.trim().is_empty());

    Ok(RunSettings {
        portal,
        start_url,
        output_dir,
        username,
    })
}
