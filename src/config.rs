//! Runtime configuration: where the artifact service lives and how hard to push it.
//!
//! [`RuntimeEnvironment`] is read from the variables a workflow runner exports;
//! [`TransferSettings`] carries concurrency, retry and timeout knobs with
//! documented defaults that the CLI may override.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::remote::HttpTimeouts;
use crate::transfer::{DEFAULT_CONCURRENCY, DEFAULT_RETRY_DELAY};

/// Base URL of the artifact service.
pub const RUNTIME_URL_VAR: &str = "ACTIONS_RUNTIME_URL";
/// Bearer token for the artifact service.
pub const RUNTIME_TOKEN_VAR: &str = "ACTIONS_RUNTIME_TOKEN";
/// Identifier of the current workflow run.
pub const RUN_ID_VAR: &str = "GITHUB_RUN_ID";
/// Workspace directory used as the default root.
pub const WORKSPACE_VAR: &str = "GITHUB_WORKSPACE";

/// Artifact service API version.
const API_VERSION: &str = "6.0-preview";

/// Errors resolving the runtime environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("required environment variable {name} is not set")]
    MissingVariable {
        /// The variable name.
        name: &'static str,
    },

    /// The runtime URL is not a valid URL.
    #[error("invalid URL in {name}: {value}")]
    InvalidUrl {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The current directory could not be determined.
    #[error("unable to determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Where the artifact service is and which run it is serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnvironment {
    pub runtime_url: Url,
    pub runtime_token: Option<String>,
    pub run_id: String,
    pub workspace: PathBuf,
}

impl RuntimeEnvironment {
    /// Reads the environment of the current process.
    ///
    /// # Errors
    ///
    /// See [`RuntimeEnvironment::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the environment through `lookup`, which maps a variable name to its value.
    ///
    /// Blank values count as unset. Without a workspace variable the current
    /// directory is used.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingVariable`] if the runtime URL or run id is missing
    /// - [`ConfigError::InvalidUrl`] if the runtime URL does not parse
    /// - [`ConfigError::CurrentDir`] if the workspace falls back to an unreadable cwd
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let raw_url = read(RUNTIME_URL_VAR).ok_or(ConfigError::MissingVariable {
            name: RUNTIME_URL_VAR,
        })?;
        let runtime_url = Url::parse(&raw_url).map_err(|_| ConfigError::InvalidUrl {
            name: RUNTIME_URL_VAR,
            value: raw_url.clone(),
        })?;
        let run_id = read(RUN_ID_VAR).ok_or(ConfigError::MissingVariable { name: RUN_ID_VAR })?;

        let workspace = match read(WORKSPACE_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        };

        let runtime_token = read(RUNTIME_TOKEN_VAR);
        debug!(
            runtime_url = %runtime_url,
            run_id = %run_id,
            workspace = %workspace.display(),
            has_token = runtime_token.is_some(),
            "resolved runtime environment"
        );

        Ok(Self {
            runtime_url,
            runtime_token,
            run_id,
            workspace,
        })
    }

    /// URL listing, creating and finalizing the run's artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the joined URL does not parse.
    pub fn artifacts_url(&self) -> Result<Url, ConfigError> {
        let base = self.runtime_url.as_str().trim_end_matches('/');
        let raw = format!(
            "{base}/_apis/pipelines/workflows/{}/artifacts?api-version={API_VERSION}",
            self.run_id
        );
        Url::parse(&raw).map_err(|_| ConfigError::InvalidUrl {
            name: RUNTIME_URL_VAR,
            value: raw,
        })
    }
}

/// Tunables for transfers.
///
/// # Default Values
///
/// - `upload_file_concurrency`: 2
/// - `download_file_concurrency`: 2
/// - `download_artifact_concurrency`: 2
/// - `retry_delay`: 10 seconds
/// - `timeouts`: 30s connect, 300s read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    pub upload_file_concurrency: usize,
    pub download_file_concurrency: usize,
    pub download_artifact_concurrency: usize,
    pub retry_delay: Duration,
    pub timeouts: HttpTimeouts,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            upload_file_concurrency: DEFAULT_CONCURRENCY,
            download_file_concurrency: DEFAULT_CONCURRENCY,
            download_artifact_concurrency: DEFAULT_CONCURRENCY,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeouts: HttpTimeouts::default(),
        }
    }
}
