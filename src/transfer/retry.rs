//! Single-retry policy for transient transfer failures.
//!
//! Every attempt is classified into an [`AttemptClass`]:
//! - [`AttemptClass::Success`] - the transport reported a 2xx and the bytes were moved
//! - [`AttemptClass::RetryableFailure`] - a transient condition worth one more try
//! - [`AttemptClass::FatalFailure`] - anything else, including malformed responses
//!
//! A retryable first attempt is followed by a fixed delay and exactly one more
//! attempt. Whatever that second attempt returns is final; there is no
//! unbounded retry loop and no backoff growth.
//!
//! # Example
//!
//! ```
//! use artifact_transfer::transfer::{AttemptClass, RetryDecision, RetryPolicy, TransferError, classify_error};
//!
//! let policy = RetryPolicy::default();
//! let error = TransferError::http_status("https://store.test/file.bin", 503);
//! assert_eq!(classify_error(&error), AttemptClass::RetryableFailure);
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => println!("retrying in {delay:?} (attempt {attempt})"),
//!     RetryDecision::DoNotRetry { reason } => println!("not retrying: {reason}"),
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use super::TransferError;

/// Delay before the single retry attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Initial attempt plus one retry.
const MAX_ATTEMPTS: u32 = 2;

/// Classification of one transport attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptClass {
    /// The file was transferred.
    Success,
    /// Transient server or network condition; one retry is allowed.
    RetryableFailure,
    /// Will not succeed by trying again.
    FatalFailure,
}

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number the retry will be (1-indexed, so the retry is attempt 2).
        attempt: u32,
    },

    /// Record the item as failed.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Fixed-delay, single-retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy that waits `retry_delay` before its single retry.
    #[must_use]
    pub fn new(retry_delay: Duration) -> Self {
        Self { retry_delay }
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Maximum attempts per item, including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        MAX_ATTEMPTS
    }

    /// Decides whether the attempt numbered `attempt` (1-indexed) should be retried.
    #[instrument(skip(self))]
    pub fn should_retry(&self, class: AttemptClass, attempt: u32) -> RetryDecision {
        match class {
            AttemptClass::Success => {
                return RetryDecision::DoNotRetry {
                    reason: "attempt succeeded".to_string(),
                };
            }
            AttemptClass::FatalFailure => {
                return RetryDecision::DoNotRetry {
                    reason: "fatal failure - retry would not help".to_string(),
                };
            }
            AttemptClass::RetryableFailure => {}
        }

        if attempt >= MAX_ATTEMPTS {
            debug!(attempt, "retry already used");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({MAX_ATTEMPTS}) exhausted"),
            };
        }

        RetryDecision::Retry {
            delay: self.retry_delay,
            attempt: attempt + 1,
        }
    }
}

/// Result of driving one item through the retry policy.
#[derive(Debug)]
pub enum TransferOutcome<T> {
    /// The item was transferred.
    Success {
        /// The item, unchanged.
        item: T,
        /// Bytes reported by the successful attempt.
        bytes: u64,
        /// Attempts made, 1 or 2.
        attempts: u32,
    },
    /// The item failed for good.
    Failed {
        /// The item, unchanged.
        item: T,
        /// The error from the last attempt.
        error: TransferError,
        /// Attempts made, 0 when aborted before trying.
        attempts: u32,
    },
}

impl<T> TransferOutcome<T> {
    #[must_use]
    pub fn item(&self) -> &T {
        match self {
            Self::Success { item, .. } | Self::Failed { item, .. } => item,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Runs `transport_call` for `item` under `policy`, never returning an error.
///
/// The failure, if any, is captured in the returned [`TransferOutcome`] so a
/// batch can keep going.
pub async fn attempt_transfer<'a, T, F, Fut>(
    policy: &RetryPolicy,
    item: &'a T,
    transport_call: F,
) -> TransferOutcome<T>
where
    T: Clone + fmt::Display,
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = Result<u64, TransferError>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        debug!(%item, attempt, "attempting transfer");

        let error = match transport_call(item).await {
            Ok(bytes) => {
                return TransferOutcome::Success {
                    item: item.clone(),
                    bytes,
                    attempts: attempt,
                };
            }
            Err(error) => error,
        };

        match policy.should_retry(classify_error(&error), attempt) {
            RetryDecision::Retry { delay, attempt: next } => {
                warn!(
                    %item,
                    error = %error,
                    next_attempt = next,
                    delay_ms = delay.as_millis(),
                    "transient transfer failure, will retry"
                );
                tokio::time::sleep(delay).await;
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(%item, %reason, "not retrying transfer");
                return TransferOutcome::Failed {
                    item: item.clone(),
                    error,
                    attempts: attempt,
                };
            }
        }
    }
}

/// Classifies a transport result.
#[must_use]
pub fn classify_attempt(result: &Result<u64, TransferError>) -> AttemptClass {
    match result {
        Ok(_) => AttemptClass::Success,
        Err(error) => classify_error(error),
    }
}

/// Classifies a transfer error as retryable or fatal.
///
/// # HTTP Status Code Classification
///
/// | Status | Class | Rationale |
/// |--------|-------|-----------|
/// | 408 | Retryable | Request timeout |
/// | 429 | Retryable | Rate limited |
/// | 500 | Retryable | Server error - may be temporary |
/// | 502 | Retryable | Bad gateway |
/// | 503 | Retryable | Service unavailable |
/// | 504 | Retryable | Gateway timeout |
/// | other 5xx | Retryable | Server side |
/// | anything else | Fatal | Request or resource problem |
///
/// # Non-HTTP Errors
///
/// | Error | Class |
/// |-------|-------|
/// | Timeout | Retryable |
/// | Network (most) | Retryable |
/// | Network (TLS) | Fatal |
/// | Io | Fatal |
/// | InvalidUrl | Fatal |
/// | Aborted | Fatal |
#[instrument]
pub fn classify_error(error: &TransferError) -> AttemptClass {
    match error {
        TransferError::HttpStatus { status, .. } => classify_http_status(*status),

        TransferError::Timeout { .. } => AttemptClass::RetryableFailure,

        TransferError::Network { source, .. } => {
            if is_tls_error(source) {
                AttemptClass::FatalFailure
            } else {
                AttemptClass::RetryableFailure
            }
        }

        TransferError::Io { .. } | TransferError::InvalidUrl { .. } | TransferError::Aborted => {
            AttemptClass::FatalFailure
        }
    }
}

#[allow(clippy::match_same_arms)]
fn classify_http_status(status: u16) -> AttemptClass {
    match status {
        408 => AttemptClass::RetryableFailure, // Request Timeout
        429 => AttemptClass::RetryableFailure, // Too Many Requests
        500 => AttemptClass::RetryableFailure, // Internal Server Error
        502 => AttemptClass::RetryableFailure, // Bad Gateway
        503 => AttemptClass::RetryableFailure, // Service Unavailable
        504 => AttemptClass::RetryableFailure, // Gateway Timeout
        status if (500..600).contains(&status) => AttemptClass::RetryableFailure,
        _ => AttemptClass::FatalFailure,
    }
}

/// Looks for TLS failures in the causes of `error`.
///
/// The top-level message only names the request URL, so it is skipped.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut cause = std::error::Error::source(error);
    while let Some(current) = cause {
        let message = current.to_string().to_lowercase();
        if message.contains("certificate")
            || message.contains("tls")
            || message.contains("ssl")
            || message.contains("handshake")
        {
            return true;
        }
        cause = current.source();
    }
    false
}
