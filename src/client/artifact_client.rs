//! The caller-facing artifact client.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, instrument, warn};

use super::error::ArtifactError;
use super::report::{DownloadOptions, DownloadReport, UploadOptions, UploadReport};
use crate::config::TransferSettings;
use crate::remote::{ArtifactEntry, RemoteStore};
use crate::specification::path::{lexical_normalize, to_absolute};
use crate::specification::{
    build_download_specification, build_upload_specification, validate_artifact_name,
};
use crate::transfer::{RetryPolicy, TransferEngine, drain_work_list};

/// Uploads and downloads the artifacts of one workflow run.
///
/// Structural failures (bad paths, listing or container errors) are returned as
/// [`ArtifactError`]; files that fail to transfer are listed in the report and
/// never abort their siblings.
#[derive(Clone)]
pub struct ArtifactClient {
    store: Arc<dyn RemoteStore>,
    settings: TransferSettings,
}

impl std::fmt::Debug for ArtifactClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ArtifactClient {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, settings: TransferSettings) -> Self {
        Self { store, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    fn engine(&self, concurrency: usize) -> TransferEngine {
        TransferEngine::new(concurrency, RetryPolicy::new(self.settings.retry_delay))
    }

    /// Uploads `files` (all under `root_directory`) as the artifact `name`.
    ///
    /// An empty plan logs a warning and returns an empty report without
    /// contacting the service. Otherwise the container is created, files are
    /// sent, and the artifact is sealed with the number of bytes that arrived.
    ///
    /// # Errors
    ///
    /// - [`ArtifactError::Specification`] if the name, root or a file is invalid
    /// - [`ArtifactError::Remote`] if the container cannot be created or sealed
    #[instrument(skip(self, files, root_directory, options), fields(files = files.len(), root = %root_directory.display()))]
    pub async fn upload<P: AsRef<Path>>(
        &self,
        name: &str,
        files: &[P],
        root_directory: &Path,
        options: &UploadOptions,
    ) -> Result<UploadReport, ArtifactError> {
        let specification = build_upload_specification(name, root_directory, files)?;
        if specification.is_empty() {
            warn!(artifact = name, "no files found that can be uploaded");
            return Ok(UploadReport::empty(name));
        }

        let resource_url = self.store.create_container(name).await?;
        debug!(artifact = name, resource_url = %resource_url, "container created");

        let store = self.store.as_ref();
        let resource_url = resource_url.as_str();
        let summary = self
            .engine(self.settings.upload_file_concurrency)
            .run_transfers_with(specification.items(), options.continue_on_error, |item| {
                store.upload_file(resource_url, name, item)
            })
            .await;

        self.store.finalize_size(name, summary.total_bytes).await?;
        info!(
            artifact = name,
            size = summary.total_bytes,
            failed = summary.failed(),
            "artifact upload finished"
        );

        Ok(UploadReport::from_summary(
            name,
            specification.local_paths(),
            summary,
        ))
    }

    /// Downloads the artifact `name` into `path`.
    ///
    /// # Errors
    ///
    /// - [`ArtifactError::NoArtifacts`] if the run has no artifacts
    /// - [`ArtifactError::ArtifactNotFound`] if none is called `name`
    /// - [`ArtifactError::Remote`] if a listing fails
    /// - [`ArtifactError::Specification`] if an entry escapes the target
    /// - [`ArtifactError::CreateDirectory`] if the directory tree cannot be created
    #[instrument(skip(self, path, options), fields(path = %path.display()))]
    pub async fn download(
        &self,
        name: &str,
        path: &Path,
        options: &DownloadOptions,
    ) -> Result<DownloadReport, ArtifactError> {
        validate_artifact_name(name)?;
        let target = resolve_target(path)?;

        let listing = self.store.list_artifacts().await?;
        if listing.is_empty() {
            return Err(ArtifactError::NoArtifacts);
        }
        let entry = listing
            .find(name)
            .ok_or_else(|| ArtifactError::ArtifactNotFound {
                name: name.to_string(),
            })?;

        self.download_artifact(entry, &target, options.create_artifact_subfolder)
            .await
    }

    /// Downloads every artifact of the run, each into `<path>/<artifact name>`.
    ///
    /// A run without artifacts yields an empty list. Reports come back in
    /// listing order.
    ///
    /// # Errors
    ///
    /// The first structural failure in listing order. Artifacts already in
    /// flight finish first; artifacts not yet started are skipped.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn download_all(&self, path: &Path) -> Result<Vec<DownloadReport>, ArtifactError> {
        let target = resolve_target(path)?;

        let listing = self.store.list_artifacts().await?;
        if listing.is_empty() {
            info!("unable to find any artifacts for the associated workflow");
            return Ok(Vec::new());
        }
        info!(artifacts = listing.value.len(), "downloading all artifacts");

        let results = Mutex::new(Vec::with_capacity(listing.value.len()));
        let aborted = AtomicBool::new(false);
        {
            let results = &results;
            let aborted = &aborted;
            let target = target.as_path();

            drain_work_list(
                &listing.value,
                self.settings.download_artifact_concurrency,
                move |index, entry| async move {
                    if aborted.load(Ordering::SeqCst) {
                        debug!(artifact = %entry.name, "skipping after earlier failure");
                        return;
                    }
                    let result = self.download_artifact(entry, target, true).await;
                    if let Err(error) = &result {
                        warn!(artifact = %entry.name, error = %error, "artifact download failed");
                        aborted.store(true, Ordering::SeqCst);
                    }
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, result));
                },
            )
            .await;
        }

        let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    async fn download_artifact(
        &self,
        entry: &ArtifactEntry,
        target_root: &Path,
        create_artifact_subfolder: bool,
    ) -> Result<DownloadReport, ArtifactError> {
        let items = self
            .store
            .list_container_items(&entry.name, &entry.file_container_resource_url)
            .await?;
        let specification = build_download_specification(
            &entry.name,
            &items,
            target_root,
            create_artifact_subfolder,
        )?;

        if specification.files_to_download.is_empty() {
            info!(artifact = %entry.name, "no downloadable files were found for the artifact");
            return Ok(DownloadReport::empty(
                &entry.name,
                specification.root_download_location,
            ));
        }

        // Every directory exists before the first file is written.
        for dir in &specification.directory_structure {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| ArtifactError::CreateDirectory {
                    path: dir.clone(),
                    source,
                })?;
        }

        let store = self.store.as_ref();
        let summary = self
            .engine(self.settings.download_file_concurrency)
            .run_transfers(&specification.files_to_download, |item| {
                store.download_file(item)
            })
            .await;

        info!(
            artifact = %entry.name,
            path = %specification.root_download_location.display(),
            size = summary.total_bytes,
            failed = summary.failed(),
            "artifact download finished"
        );

        Ok(DownloadReport::from_summary(
            &entry.name,
            specification.root_download_location,
            summary,
        ))
    }
}

fn resolve_target(path: &Path) -> Result<PathBuf, ArtifactError> {
    Ok(lexical_normalize(&to_absolute(path)?))
}
