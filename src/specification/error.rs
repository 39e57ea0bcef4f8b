//! Error types for building transfer specifications.
//!
//! Every variant here is raised before any network call is made: a
//! specification that cannot be built means there is nothing meaningful to
//! transfer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while mapping local or remote paths into a specification.
#[derive(Debug, Error)]
pub enum SpecificationError {
    /// A path does not reside under the declared root.
    #[error("path {path} is not located under {root}")]
    InvalidPath {
        /// The offending path (local file on upload, remote entry on download).
        path: PathBuf,
        /// The root it was expected to live under.
        root: PathBuf,
    },

    /// The artifact name is empty or contains a forbidden character.
    #[error("invalid artifact name {name:?}: {reason}")]
    InvalidArtifactName {
        /// The rejected name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The upload root directory does not exist.
    #[error("root directory {path} does not exist")]
    RootDirectoryMissing {
        /// The configured root directory.
        path: PathBuf,
    },

    /// The upload root exists but is not a directory.
    #[error("root path {path} is not a directory")]
    RootNotADirectory {
        /// The configured root path.
        path: PathBuf,
    },

    /// A candidate file does not exist.
    #[error("file {path} does not exist")]
    FileNotFound {
        /// The missing candidate.
        path: PathBuf,
    },

    /// Inspecting a local path failed for a reason other than absence.
    #[error("IO error inspecting {path}: {source}")]
    Io {
        /// The path that could not be inspected.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SpecificationError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            root: root.into(),
        }
    }

    /// Creates an invalid artifact name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArtifactName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display_names_both_paths() {
        let error = SpecificationError::invalid_path("/tmp/elsewhere/a.txt", "/work/out");
        let msg = error.to_string();
        assert!(msg.contains("/tmp/elsewhere/a.txt"), "Expected path in: {msg}");
        assert!(msg.contains("/work/out"), "Expected root in: {msg}");
    }

    #[test]
    fn test_invalid_name_display_includes_reason() {
        let error = SpecificationError::invalid_name("a:b", "contains ':'");
        let msg = error.to_string();
        assert!(msg.contains("\"a:b\""), "Expected quoted name in: {msg}");
        assert!(msg.contains("contains ':'"), "Expected reason in: {msg}");
    }
}
