//! Transfer engine: bounded-concurrency execution with a single retry.
//!
//! # Features
//!
//! - Fixed worker pool draining one shared cursor ([`drain_work_list`])
//! - One retry after a fixed delay for transient failures ([`RetryPolicy`])
//! - Per-item failures collected, never raised ([`TransferSummary`])
//!
//! The engine is generic over the item type; the artifact client runs it
//! with [`UploadItem`](crate::specification::UploadItem)s and
//! [`DownloadItem`](crate::specification::DownloadItem)s.

mod engine;
mod error;
mod retry;

pub use engine::{
    DEFAULT_CONCURRENCY, FailedTransfer, TransferEngine, TransferStats, TransferSummary, WorkList,
    drain_work_list,
};
pub use error::TransferError;
pub use retry::{
    AttemptClass, DEFAULT_RETRY_DELAY, RetryDecision, RetryPolicy, TransferOutcome,
    attempt_transfer, classify_attempt, classify_error,
};
