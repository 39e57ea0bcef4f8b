//! Caller options and the reports returned by each operation.

use std::path::PathBuf;

use serde::Serialize;

use crate::specification::{DownloadItem, UploadItem};
use crate::transfer::{FailedTransfer, TransferSummary};

/// Options for [`ArtifactClient::upload`](super::ArtifactClient::upload).
///
/// # Default Values
///
/// - `continue_on_error`: true
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Keep uploading after a file fails; when false the first failure aborts
    /// the remaining files.
    pub continue_on_error: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
        }
    }
}

/// Options for [`ArtifactClient::download`](super::ArtifactClient::download).
///
/// # Default Values
///
/// - `create_artifact_subfolder`: false
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Place files under `<path>/<artifact name>` instead of `<path>`.
    pub create_artifact_subfolder: bool,
}

/// Outcome of one upload.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub artifact_name: String,
    /// Absolute local paths of every planned file, in plan order.
    pub artifact_items: Vec<PathBuf>,
    /// Bytes uploaded successfully; the size the artifact was sealed with.
    pub size: u64,
    pub attempted: usize,
    pub retried: usize,
    pub failed_items: Vec<FailedTransfer<UploadItem>>,
}

impl UploadReport {
    pub(crate) fn empty(artifact_name: &str) -> Self {
        Self {
            artifact_name: artifact_name.to_string(),
            artifact_items: Vec::new(),
            size: 0,
            attempted: 0,
            retried: 0,
            failed_items: Vec::new(),
        }
    }

    pub(crate) fn from_summary(
        artifact_name: &str,
        artifact_items: Vec<PathBuf>,
        summary: TransferSummary<UploadItem>,
    ) -> Self {
        Self {
            artifact_name: artifact_name.to_string(),
            artifact_items,
            size: summary.total_bytes,
            attempted: summary.attempted,
            retried: summary.retried,
            failed_items: summary.failed_items,
        }
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed_items.is_empty()
    }
}

/// Outcome of downloading one artifact.
#[derive(Debug, Serialize)]
pub struct DownloadReport {
    pub artifact_name: String,
    /// Root download location the files were rebased under.
    pub download_path: PathBuf,
    pub attempted: usize,
    /// Bytes written to disk by successful transfers.
    pub size: u64,
    pub retried: usize,
    pub failed_items: Vec<FailedTransfer<DownloadItem>>,
}

impl DownloadReport {
    pub(crate) fn empty(artifact_name: &str, download_path: PathBuf) -> Self {
        Self {
            artifact_name: artifact_name.to_string(),
            download_path,
            attempted: 0,
            size: 0,
            retried: 0,
            failed_items: Vec::new(),
        }
    }

    pub(crate) fn from_summary(
        artifact_name: &str,
        download_path: PathBuf,
        summary: TransferSummary<DownloadItem>,
    ) -> Self {
        Self {
            artifact_name: artifact_name.to_string(),
            download_path,
            attempted: summary.attempted,
            size: summary.total_bytes,
            retried: summary.retried,
            failed_items: summary.failed_items,
        }
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed_items.is_empty()
    }
}
