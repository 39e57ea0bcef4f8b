//! Error types for structural calls to the artifact service.
//!
//! These abort the whole artifact operation: without a listing, a container
//! or a finalized size there is no valid result to report.

use thiserror::Error;

/// Errors from listing, creating or finalizing artifacts.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The store answered a listing request with a non-success status or no body.
    #[error("unable to list {url}: HTTP {status}")]
    List {
        /// The listing URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// A response body could not be parsed.
    #[error("unparsable response from {url}: {source}")]
    Parse {
        /// The request URL.
        url: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The store refused to create the artifact entry or returned no usable URL.
    #[error("unable to create artifact container for {name}: {reason}")]
    ContainerCreation {
        /// The artifact name.
        name: String,
        /// What went wrong.
        reason: String,
        /// Raw response body, when the store sent one.
        body: Option<String>,
    },

    /// The size finalization call failed.
    #[error("unable to finalize size of artifact {name}: HTTP {status}")]
    SizeFinalization {
        /// The artifact name.
        name: String,
        /// The HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// A service URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl RemoteError {
    /// Creates a request error.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a container creation error.
    pub fn container_creation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContainerCreation {
            name: name.into(),
            reason: reason.into(),
            body: None,
        }
    }

    /// Creates a container creation error that keeps the response body.
    pub fn container_creation_with_body(
        name: impl Into<String>,
        reason: impl Into<String>,
        body: String,
    ) -> Self {
        Self::ContainerCreation {
            name: name.into(),
            reason: reason.into(),
            body: Some(body),
        }
    }

    /// Raw response body, if this error carries one.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::List { body, .. }
            | Self::Parse { body, .. }
            | Self::SizeFinalization { body, .. } => Some(body),
            Self::ContainerCreation { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}
