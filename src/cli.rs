//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use artifact_transfer::transfer::DEFAULT_CONCURRENCY;

/// Default artifact-level concurrency for `download-all`.
const DEFAULT_ARTIFACT_CONCURRENCY: u8 = 2;

/// Default delay before the single retry, in seconds.
const DEFAULT_RETRY_DELAY_SECS: u64 = 10;

/// Upload and download workflow run artifacts.
///
/// The artifact service is located through ACTIONS_RUNTIME_URL,
/// ACTIONS_RUNTIME_TOKEN and GITHUB_RUN_ID; GITHUB_WORKSPACE is the default
/// root for uploads and downloads.
#[derive(Parser, Debug)]
#[command(name = "artifact")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Seconds to wait before retrying a transient failure (0-600)
    #[arg(long, global = true, default_value_t = DEFAULT_RETRY_DELAY_SECS, value_parser = clap::value_parser!(u64).range(0..=600))]
    pub retry_delay_secs: u64,

    /// Print the report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload files as a named artifact
    Upload {
        /// Artifact name
        name: String,

        /// Files to upload; all must live under the root directory
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Root directory the remote paths are relative to [default: workspace]
        #[arg(long)]
        root: Option<PathBuf>,

        /// Stop uploading after the first failed file
        #[arg(long)]
        fail_fast: bool,

        /// Maximum concurrent file uploads (1-100)
        #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
        concurrency: u8,
    },

    /// Download one named artifact
    Download {
        /// Artifact name
        name: String,

        /// Target directory [default: workspace]
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Place files under <path>/<name>
        #[arg(long)]
        create_artifact_folder: bool,

        /// Maximum concurrent file downloads (1-100)
        #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
        concurrency: u8,
    },

    /// Download every artifact of the run, each into its own folder
    DownloadAll {
        /// Target directory [default: workspace]
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Maximum concurrent file downloads per artifact (1-100)
        #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
        concurrency: u8,

        /// Maximum artifacts downloaded at once (1-100)
        #[arg(long, default_value_t = DEFAULT_ARTIFACT_CONCURRENCY, value_parser = clap::value_parser!(u8).range(1..=100))]
        artifact_concurrency: u8,
    },
}
