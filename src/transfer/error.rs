//! Error types for a single file transfer.
//!
//! A [`TransferError`] never aborts a batch on its own: the engine records it
//! against the item that failed and moves on to the next one.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while moving one file to or from the artifact store.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error transferring {url}: {source}")]
    Network {
        /// The URL being transferred.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout transferring {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The store answered with a non-success status.
    #[error("HTTP {status} transferring {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: Option<String>,
    },

    /// Reading the local source or writing the local target failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The transfer URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Never attempted because an earlier item failed and the batch stops on error.
    #[error("transfer skipped after an earlier failure")]
    Aborted,
}

impl TransferError {
    /// Creates a network error, folding reqwest timeouts into [`TransferError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: None,
        }
    }

    /// Creates an HTTP status error carrying the response body.
    pub fn http_status_with_body(url: impl Into<String>, status: u16, body: String) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: (!body.is_empty()).then_some(body),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// As with the other error modules, no blanket `From<reqwest::Error>` or
// `From<std::io::Error>`: every variant needs the URL or path for context.
