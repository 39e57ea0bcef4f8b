//! Path Mapper: local candidate files to remote-relative artifact entries.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::SpecificationError;
use super::path::{to_absolute, to_remote_path, validate_artifact_name};

/// One local file to send to the artifact container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadItem {
    /// Absolute, normalized local path.
    pub local_path: PathBuf,
    /// Path inside the artifact, forward-slash separated, no leading separator.
    pub remote_path: String,
}

impl fmt::Display for UploadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.local_path.display(), self.remote_path)
    }
}

/// The ordered plan for uploading one artifact.
///
/// Built once before any network call and only consumed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSpecification {
    artifact_name: String,
    items: Vec<UploadItem>,
}

impl UploadSpecification {
    /// Name of the artifact this plan belongs to.
    #[must_use]
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    /// Items in the order the candidate files were supplied.
    #[must_use]
    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Absolute local paths of every planned file.
    #[must_use]
    pub fn local_paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|item| item.local_path.clone()).collect()
    }
}

/// Builds the upload plan for `candidate_files` relative to `root_directory`.
///
/// Directories among the candidates are skipped: the remote store does not keep
/// empty directories. Output order matches input order.
///
/// # Errors
///
/// - [`SpecificationError::InvalidArtifactName`] for a name the store rejects
/// - [`SpecificationError::RootDirectoryMissing`] / [`SpecificationError::RootNotADirectory`]
/// - [`SpecificationError::FileNotFound`] for a candidate that does not exist
/// - [`SpecificationError::InvalidPath`] for a candidate outside `root_directory`
#[instrument(skip(candidate_files), fields(root = %root_directory.display(), candidates = candidate_files.len()))]
pub fn build_upload_specification<P: AsRef<Path>>(
    artifact_name: &str,
    root_directory: &Path,
    candidate_files: &[P],
) -> Result<UploadSpecification, SpecificationError> {
    validate_artifact_name(artifact_name)?;

    let root = to_absolute(root_directory)?;
    match std::fs::metadata(&root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(SpecificationError::RootNotADirectory { path: root }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SpecificationError::RootDirectoryMissing { path: root });
        }
        Err(e) => return Err(SpecificationError::io(root, e)),
    }

    let mut items = Vec::with_capacity(candidate_files.len());
    for candidate in candidate_files {
        let local_path = to_absolute(candidate.as_ref())?;

        let relative = local_path
            .strip_prefix(&root)
            .map_err(|_| SpecificationError::invalid_path(&local_path, &root))?;

        let meta = match std::fs::metadata(&local_path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SpecificationError::FileNotFound { path: local_path });
            }
            Err(e) => return Err(SpecificationError::io(local_path, e)),
        };
        if meta.is_dir() {
            debug!(path = %local_path.display(), "skipping directory");
            continue;
        }

        let Some(remote_path) = to_remote_path(relative) else {
            warn!(path = %local_path.display(), "file name is not valid UTF-8");
            return Err(SpecificationError::invalid_path(&local_path, &root));
        };
        debug!(local = %local_path.display(), remote = %remote_path, "planned upload");
        items.push(UploadItem {
            local_path,
            remote_path,
        });
    }

    Ok(UploadSpecification {
        artifact_name: artifact_name.to_string(),
        items,
    })
}
