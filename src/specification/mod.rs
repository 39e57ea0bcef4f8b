//! Transfer specifications: the plan computed before any network call.
//!
//! - [`build_upload_specification`] maps local files under a root directory to
//!   remote-relative artifact paths.
//! - [`build_download_specification`] maps remote container entries to the
//!   local directories to create and the files to fetch.
//!
//! Specifications are built fresh per call, consumed once by the transfer
//! engine and then dropped.

mod download;
mod error;
pub mod path;
mod upload;

pub use download::{DownloadItem, DownloadSpecification, build_download_specification};
pub use error::SpecificationError;
pub use path::validate_artifact_name;
pub use upload::{UploadItem, UploadSpecification, build_upload_specification};
