//! Errors raised by the artifact client.
//!
//! Only structural failures surface here. A file that fails to transfer is
//! listed in the operation's report instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::remote::RemoteError;
use crate::specification::SpecificationError;

/// Errors that abort a whole upload or download.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The transfer plan could not be built.
    #[error(transparent)]
    Specification(#[from] SpecificationError),

    /// The artifact service refused a structural call.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The run has no artifacts at all.
    #[error("unable to find any artifacts for the associated workflow")]
    NoArtifacts,

    /// The run has artifacts, but none with the requested name.
    #[error("unable to find an artifact with the name: {name}")]
    ArtifactNotFound {
        /// The requested name.
        name: String,
    },

    /// A directory of the download plan could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// The directory being created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
