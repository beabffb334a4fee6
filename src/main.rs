//! CLI entry point for the course mirror.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lms_mirror::{CrawlReport, Crawler, login};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod credentials;
mod progress;
mod settings;
mod terminal;

use cli::Args;
use progress::SpinnerObserver;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = app_config::load_default_file_config()?;
    let file_config = loaded.config.unwrap_or_default();

    let file_level = file_config
        .verbosity
        .map(app_config::VerbositySetting::log_level);
    let default_level = terminal::default_log_level(args.quiet, args.verbose, file_level);
    terminal::init_tracing(default_level, terminal::no_color_env_requested());

    debug!(
        ?args,
        config_path = ?loaded.path,
        file_verbosity = file_config.verbosity.map(app_config::VerbositySetting::as_str),
        "CLI arguments parsed"
    );

    let settings = settings::resolve_run_settings(&args, &file_config)?;
    let credentials = credentials::read_credentials(settings.username.clone())?;

    info!(portal = %settings.portal.base_url, "logging in");
    let portal = Arc::new(settings.portal);
    let session = login(&portal, &credentials)
        .await
        .context("Login failed")?;

    let spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress || args.verbose > 0,
        terminal::is_dumb_terminal(),
    )
    .then(|| Arc::new(SpinnerObserver::start()));

    let mut crawler = Crawler::new(Arc::clone(&portal));
    if let Some(observer) = &spinner {
        crawler = crawler.with_observer(Arc::clone(observer) as Arc<dyn lms_mirror::CrawlObserver>);
    }

    info!(
        start = %settings.start_url,
        output_dir = %settings.output_dir.display(),
        "mirroring"
    );
    let report = crawler
        .crawl(&session, &settings.start_url, &settings.output_dir)
        .await;

    if let Some(observer) = &spinner {
        observer.finish();
    }
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &CrawlReport) {
    info!(
        "{} directories, {} files and {} links created; {} already present",
        report.directories_created,
        report.files_downloaded,
        report.links_created,
        report.skipped_existing
    );

    if report.is_complete() {
        return;
    }
    warn!(
        "{} items could not be mirrored and will be retried on the next run:",
        report.failures.len()
    );
    for failure in &report.failures {
        warn!("  {failure}");
    }
}
