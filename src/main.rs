//! CLI entry point for the artifact tool.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use artifact_transfer::{
    ArtifactClient, DownloadOptions, HttpArtifactStore, RuntimeEnvironment, TransferSettings,
    UploadOptions,
};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

/// Exit code when the operation finished but some files failed to transfer.
const EXIT_PARTIAL_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so --json output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let env = RuntimeEnvironment::from_env().context("artifact service is not configured")?;
    let base_settings = TransferSettings {
        retry_delay: Duration::from_secs(args.retry_delay_secs),
        ..TransferSettings::default()
    };
    let store = HttpArtifactStore::new(
        env.artifacts_url()?,
        env.runtime_token.clone(),
        base_settings.timeouts,
    )?;
    let store = Arc::new(store);

    let all_transferred = match args.command {
        Command::Upload {
            name,
            files,
            root,
            fail_fast,
            concurrency,
        } => {
            let settings = TransferSettings {
                upload_file_concurrency: usize::from(concurrency),
                ..base_settings
            };
            let client = ArtifactClient::new(store, settings);
            let root = root.unwrap_or_else(|| env.workspace.clone());
            let options = UploadOptions {
                continue_on_error: !fail_fast,
            };

            let report = client.upload(&name, &files, &root, &options).await?;
            info!(
                artifact = %report.artifact_name,
                files = report.artifact_items.len(),
                size = report.size,
                failed = report.failed_items.len(),
                "Upload complete"
            );
            emit(args.json, &report)?;
            report.is_complete_success()
        }
        Command::Download {
            name,
            path,
            create_artifact_folder,
            concurrency,
        } => {
            let settings = TransferSettings {
                download_file_concurrency: usize::from(concurrency),
                ..base_settings
            };
            let client = ArtifactClient::new(store, settings);
            let path = target_path(path, &env);
            let options = DownloadOptions {
                create_artifact_subfolder: create_artifact_folder,
            };

            let report = client.download(&name, &path, &options).await?;
            info!(
                artifact = %report.artifact_name,
                path = %report.download_path.display(),
                size = report.size,
                failed = report.failed_items.len(),
                "Download complete"
            );
            emit(args.json, &report)?;
            report.is_complete_success()
        }
        Command::DownloadAll {
            path,
            concurrency,
            artifact_concurrency,
        } => {
            let settings = TransferSettings {
                download_file_concurrency: usize::from(concurrency),
                download_artifact_concurrency: usize::from(artifact_concurrency),
                ..base_settings
            };
            let client = ArtifactClient::new(store, settings);
            let path = target_path(path, &env);

            let reports = client.download_all(&path).await?;
            let failed: usize = reports.iter().map(|r| r.failed_items.len()).sum();
            info!(
                artifacts = reports.len(),
                size = reports.iter().map(|r| r.size).sum::<u64>(),
                failed,
                "Download complete"
            );
            emit(args.json, &reports)?;
            failed == 0
        }
    };

    if all_transferred {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("Some files failed to transfer");
        Ok(ExitCode::from(EXIT_PARTIAL_FAILURE))
    }
}

fn target_path(path: Option<PathBuf>, env: &RuntimeEnvironment) -> PathBuf {
    path.unwrap_or_else(|| env.workspace.clone())
}

fn emit<T: Serialize>(json: bool, report: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}
