//! Artifact Transfer Library
//!
//! Persists named collections of files ("artifacts") for a workflow run and
//! retrieves them later, preserving directory structure and moving files
//! under a bounded level of concurrency.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`specification`] - Transfer plans: local files to remote paths and back
//! - [`remote`] - The artifact service wire contract and its HTTP client
//! - [`transfer`] - Worker pool, single-retry policy and result aggregation
//! - [`client`] - Caller-facing upload, download and download-all
//! - [`config`] - Runtime environment and transfer settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod remote;
pub mod specification;
pub mod transfer;

// Re-export commonly used types
pub use client::{
    ArtifactClient, ArtifactError, DownloadOptions, DownloadReport, UploadOptions, UploadReport,
};
pub use config::{ConfigError, RuntimeEnvironment, TransferSettings};
pub use remote::{HttpArtifactStore, HttpTimeouts, RemoteError, RemoteStore};
pub use specification::{
    DownloadItem, DownloadSpecification, SpecificationError, UploadItem, UploadSpecification,
    build_download_specification, build_upload_specification,
};
pub use transfer::{
    DEFAULT_CONCURRENCY, DEFAULT_RETRY_DELAY, RetryDecision, RetryPolicy, TransferEngine,
    TransferError, TransferSummary, classify_error,
};
