//! Caller-facing artifact operations.
//!
//! [`ArtifactClient`] ties the pieces together: it builds the transfer plan,
//! talks to the [`RemoteStore`](crate::remote::RemoteStore) for structural
//! calls, and hands the file list to the
//! [`TransferEngine`](crate::transfer::TransferEngine).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use artifact_transfer::client::{ArtifactClient, DownloadOptions};
//! use artifact_transfer::config::{RuntimeEnvironment, TransferSettings};
//! use artifact_transfer::remote::{HttpArtifactStore, HttpTimeouts};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = RuntimeEnvironment::from_env()?;
//! let store = HttpArtifactStore::new(env.artifacts_url()?, env.runtime_token, HttpTimeouts::default())?;
//! let client = ArtifactClient::new(Arc::new(store), TransferSettings::default());
//! let report = client
//!     .download("build-output", Path::new("./out"), &DownloadOptions::default())
//!     .await?;
//! println!("{} bytes, {} failed", report.size, report.failed_items.len());
//! # Ok(())
//! # }
//! ```

mod artifact_client;
mod error;
mod report;

pub use artifact_client::ArtifactClient;
pub use error::ArtifactError;
pub use report::{DownloadOptions, DownloadReport, UploadOptions, UploadReport};
