//! The remote artifact store.
//!
//! [`RemoteStore`] is the seam between the transfer core and the service: the
//! client only ever talks to a `dyn RemoteStore`, and [`HttpArtifactStore`]
//! implements it over HTTP. Structural calls fail with [`RemoteError`];
//! per-file calls fail with [`TransferError`] so the engine can classify and
//! retry them.

mod error;
mod http;
mod types;

use async_trait::async_trait;

pub use error::RemoteError;
pub use http::{HttpArtifactStore, HttpTimeouts};
pub use types::{ArtifactEntry, ArtifactList, ContainerItem, ItemType};

use crate::specification::{DownloadItem, UploadItem};
use crate::transfer::TransferError;

/// Operations the artifact service offers.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists the artifacts of the current run. Zero artifacts is not an error.
    async fn list_artifacts(&self) -> Result<ArtifactList, RemoteError>;

    /// Lists the flat file and folder entries of one artifact.
    async fn list_container_items(
        &self,
        artifact_name: &str,
        container_url: &str,
    ) -> Result<Vec<ContainerItem>, RemoteError>;

    /// Creates the artifact entry and returns the container URL files go to.
    async fn create_container(&self, artifact_name: &str) -> Result<String, RemoteError>;

    /// Sends one file; returns the bytes sent.
    async fn upload_file(
        &self,
        resource_url: &str,
        artifact_name: &str,
        item: &UploadItem,
    ) -> Result<u64, TransferError>;

    /// Fetches one file, overwriting the local target; returns the bytes written.
    async fn download_file(&self, item: &DownloadItem) -> Result<u64, TransferError>;

    /// Seals an uploaded artifact with its total size.
    async fn finalize_size(&self, artifact_name: &str, size: u64) -> Result<(), RemoteError>;
}
