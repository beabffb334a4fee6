//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Mirror the course tree of a learning-management portal onto local storage.
///
/// Containers become directories, files are downloaded with an extension
/// inferred from their content type, and forwarding links become small HTML
/// redirect stubs. Anything that already exists locally is left untouched,
/// so re-running only fetches what is missing.
#[derive(Parser, Debug)]
#[command(name = "lms-mirror")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Portal base URL (login and listing endpoints are derived from it)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Container URL to start from (default: the memberships listing)
    #[arg(long, value_name = "URL")]
    pub start_url: Option<String>,

    /// Local directory to mirror into (default: current directory)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Portal username (prompted when omitted)
    #[arg(short = 'u', long, env = "LMS_MIRROR_USERNAME")]
    pub username: Option<String>,

    /// Maximum requests per remote call before giving up (1-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: Option<u32>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}
