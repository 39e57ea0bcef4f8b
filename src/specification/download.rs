//! Download Mapper: remote container entries to local directories and files.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument};

use super::SpecificationError;
use super::path::rebase_remote_path;
use crate::remote::{ContainerItem, ItemType};

/// One remote file to fetch into the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadItem {
    /// URL the file content is served from.
    pub content_location: String,
    /// Local path the content is written to.
    pub local_path: PathBuf,
}

impl fmt::Display for DownloadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.content_location, self.local_path.display())
    }
}

/// The plan for downloading one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpecification {
    /// Directory the artifact's files are rebased under.
    pub root_download_location: PathBuf,
    /// Every directory to create before any file is written.
    ///
    /// `Path` ordering is component-wise, so iteration yields each parent
    /// before its children.
    pub directory_structure: BTreeSet<PathBuf>,
    /// Files to fetch, in container listing order.
    pub files_to_download: Vec<DownloadItem>,
}

/// Builds the download plan for `remote_items` under `target_root`.
///
/// File entries contribute their file and every ancestor directory up to the
/// root download location; folder entries contribute only directories so empty
/// folders are recreated. The root download location is always included.
///
/// # Errors
///
/// Returns [`SpecificationError::InvalidPath`] if an entry would resolve
/// outside the root download location.
#[instrument(skip(remote_items), fields(entries = remote_items.len(), target = %target_root.display()))]
pub fn build_download_specification(
    artifact_name: &str,
    remote_items: &[ContainerItem],
    target_root: &Path,
    create_artifact_subfolder: bool,
) -> Result<DownloadSpecification, SpecificationError> {
    let root_download_location = if create_artifact_subfolder {
        target_root.join(artifact_name)
    } else {
        target_root.to_path_buf()
    };

    let mut directory_structure = BTreeSet::new();
    directory_structure.insert(root_download_location.clone());
    let mut files_to_download = Vec::new();

    for entry in remote_items {
        let local_path = rebase_remote_path(&entry.path, artifact_name, &root_download_location)?;

        match entry.item_type {
            ItemType::File => {
                if let Some(parent) = local_path.parent() {
                    register_ancestors(&mut directory_structure, parent, &root_download_location);
                }
                files_to_download.push(DownloadItem {
                    content_location: entry.content_location.clone(),
                    local_path,
                });
            }
            ItemType::Folder => {
                register_ancestors(&mut directory_structure, &local_path, &root_download_location);
            }
        }
    }

    debug!(
        directories = directory_structure.len(),
        files = files_to_download.len(),
        "built download specification"
    );

    Ok(DownloadSpecification {
        root_download_location,
        directory_structure,
        files_to_download,
    })
}

/// Inserts `dir` and each of its ancestors down to (and including) `root`.
fn register_ancestors(directories: &mut BTreeSet<PathBuf>, dir: &Path, root: &Path) {
    for ancestor in dir.ancestors() {
        if !ancestor.starts_with(root) {
            break;
        }
        if !directories.insert(ancestor.to_path_buf()) {
            // Already present means its ancestors are too.
            break;
        }
    }
}
