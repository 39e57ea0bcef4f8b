//! Concurrency-limited transfer engine and result aggregation.
//!
//! The engine drains a [`WorkList`] with a fixed pool of workers. Every worker
//! claims the next unclaimed index from one shared atomic cursor, runs that
//! item through the [`RetryPolicy`] to completion, and only then claims
//! another. At most `concurrency` transfers are in flight at once, each item is
//! processed exactly once, and a failed item never stops its siblings.
//!
//! # Example
//!
//! ```
//! use artifact_transfer::transfer::{RetryPolicy, TransferEngine};
//!
//! # async fn example() {
//! let engine = TransferEngine::new(2, RetryPolicy::default());
//! let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
//! let summary = engine
//!     .run_transfers(&items, |item| async move { Ok(item.len() as u64) })
//!     .await;
//! assert_eq!(summary.total_bytes, 3);
//! assert!(summary.failed_items.is_empty());
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use futures_util::future::join_all;
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument, warn};

use super::TransferError;
use super::retry::{RetryPolicy, TransferOutcome, attempt_transfer};

/// Default number of concurrent file transfers.
pub const DEFAULT_CONCURRENCY: usize = 2;

/// A borrowed item list with a shared claim cursor.
///
/// Created per call; never shared between batches.
#[derive(Debug)]
pub struct WorkList<'a, T> {
    items: &'a [T],
    cursor: AtomicUsize,
}

impl<'a, T> WorkList<'a, T> {
    #[must_use]
    pub fn new(items: &'a [T]) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claims the next unclaimed item, or `None` once the list is drained.
    ///
    /// Two callers never receive the same index.
    pub fn claim(&self) -> Option<(usize, &'a T)> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.items.get(index).map(|item| (index, item))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Drains `items` with `min(concurrency, items.len())` workers.
///
/// `concurrency` is clamped to at least 1. Returns once every worker has
/// finished, so all items have been processed when the future resolves.
pub async fn drain_work_list<'a, T, F, Fut>(items: &'a [T], concurrency: usize, work: F)
where
    F: Fn(usize, &'a T) -> Fut,
    Fut: Future<Output = ()>,
{
    let work_list = WorkList::new(items);
    let worker_count = concurrency.max(1).min(work_list.len());
    debug!(worker_count, items = work_list.len(), "starting worker pool");

    let work_list = &work_list;
    let work = &work;
    let workers = (0..worker_count).map(move |worker| async move {
        let mut processed = 0usize;
        while let Some((index, item)) = work_list.claim() {
            work(index, item).await;
            processed += 1;
        }
        debug!(worker, processed, "worker finished");
    });

    join_all(workers).await;
}

/// An item that failed after the retry policy was exhausted.
#[derive(Debug, Serialize)]
pub struct FailedTransfer<T> {
    /// The original item, unchanged.
    pub item: T,
    /// The error from the final attempt.
    #[serde(serialize_with = "serialize_display")]
    pub error: TransferError,
    /// Attempts made; 0 if the item was skipped after an earlier failure.
    pub attempts: u32,
}

fn serialize_display<S: Serializer>(value: &impl fmt::Display, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Aggregate of a finished batch.
#[derive(Debug, Serialize)]
pub struct TransferSummary<T> {
    /// Items processed, successful or not.
    pub attempted: usize,
    /// Items transferred successfully.
    pub completed: usize,
    /// Bytes moved by successful transfers.
    pub total_bytes: u64,
    /// Retries performed across the batch.
    pub retried: usize,
    /// Failed items, in completion order.
    pub failed_items: Vec<FailedTransfer<T>>,
}

impl<T> TransferSummary<T> {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed_items.len()
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed_items.is_empty()
    }
}

/// Thread-safe accumulator of [`TransferOutcome`]s.
///
/// Counters are atomics and the failure list sits behind a mutex so
/// concurrent workers never lose an update.
#[derive(Debug)]
pub struct TransferStats<T> {
    completed: AtomicUsize,
    retried: AtomicUsize,
    total_bytes: AtomicU64,
    failed_items: Mutex<Vec<FailedTransfer<T>>>,
}

impl<T> Default for TransferStats<T> {
    fn default() -> Self {
        Self {
            completed: AtomicUsize::new(0),
            retried: AtomicUsize::new(0),
            total_bytes: AtomicU64::new(0),
            failed_items: Mutex::new(Vec::new()),
        }
    }
}

impl<T> TransferStats<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one item's final outcome.
    pub fn record(&self, outcome: TransferOutcome<T>) {
        if outcome.attempts() > 1 {
            self.retried
                .fetch_add((outcome.attempts() - 1) as usize, Ordering::SeqCst);
        }
        match outcome {
            TransferOutcome::Success { bytes, .. } => {
                self.completed.fetch_add(1, Ordering::SeqCst);
                self.total_bytes.fetch_add(bytes, Ordering::SeqCst);
            }
            TransferOutcome::Failed {
                item,
                error,
                attempts,
            } => {
                self.failed_items
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(FailedTransfer {
                        item,
                        error,
                        attempts,
                    });
            }
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed_items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::SeqCst)
    }

    /// Consumes the accumulator into a summary.
    #[must_use]
    pub fn into_summary(self) -> TransferSummary<T> {
        let completed = self.completed.into_inner();
        let failed_items = self
            .failed_items
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        TransferSummary {
            attempted: completed + failed_items.len(),
            completed,
            total_bytes: self.total_bytes.into_inner(),
            retried: self.retried.into_inner(),
            failed_items,
        }
    }
}

/// Runs batches of transfers under a concurrency limit and a retry policy.
///
/// # Concurrency Model
///
/// - A batch spawns `min(concurrency, items)` logical workers on the current task
/// - Workers share one atomic cursor; each claims, finishes, then claims again
/// - The batch returns only after every worker has drained (join, not fire-and-forget)
/// - There is no cancellation: a started batch always produces one outcome per item
#[derive(Debug, Clone)]
pub struct TransferEngine {
    concurrency: usize,
    retry_policy: RetryPolicy,
}

impl TransferEngine {
    /// Creates an engine; `concurrency` is clamped to at least 1.
    #[must_use]
    #[instrument(level = "debug", skip(retry_policy))]
    pub fn new(concurrency: usize, retry_policy: RetryPolicy) -> Self {
        let concurrency = concurrency.max(1);
        debug!(
            concurrency,
            retry_delay_ms = retry_policy.retry_delay().as_millis(),
            "creating transfer engine"
        );
        Self {
            concurrency,
            retry_policy,
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Transfers every item, continuing past failures.
    ///
    /// Individual failures never make this method fail; they are listed in
    /// [`TransferSummary::failed_items`].
    pub async fn run_transfers<'a, T, F, Fut>(
        &self,
        items: &'a [T],
        transfer_one: F,
    ) -> TransferSummary<T>
    where
        T: Clone + fmt::Display,
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<u64, TransferError>>,
    {
        self.run_transfers_with(items, true, transfer_one).await
    }

    /// Transfers every item; with `continue_on_error == false` the first
    /// failure stops further network calls.
    ///
    /// Items claimed after a stop are recorded as [`TransferError::Aborted`]
    /// with zero attempts, so the summary still has one outcome per item.
    #[instrument(skip(self, items, transfer_one), fields(items = items.len(), concurrency = self.concurrency))]
    pub async fn run_transfers_with<'a, T, F, Fut>(
        &self,
        items: &'a [T],
        continue_on_error: bool,
        transfer_one: F,
    ) -> TransferSummary<T>
    where
        T: Clone + fmt::Display,
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<u64, TransferError>>,
    {
        let stats = TransferStats::new();
        let stop = AtomicBool::new(false);

        {
            let stats = &stats;
            let stop = &stop;
            let policy = &self.retry_policy;
            let transfer_one = &transfer_one;

            drain_work_list(items, self.concurrency, move |index, item| async move {
                if stop.load(Ordering::SeqCst) {
                    debug!(index, %item, "skipping after earlier failure");
                    stats.record(TransferOutcome::Failed {
                        item: item.clone(),
                        error: TransferError::Aborted,
                        attempts: 0,
                    });
                    return;
                }

                let outcome = attempt_transfer(policy, item, transfer_one).await;
                match &outcome {
                    TransferOutcome::Success { bytes, .. } => {
                        debug!(index, %item, bytes, "transfer completed");
                    }
                    TransferOutcome::Failed {
                        error, attempts, ..
                    } => {
                        warn!(index, %item, error = %error, attempts, "transfer failed");
                        if !continue_on_error {
                            stop.store(true, Ordering::SeqCst);
                        }
                    }
                }
                stats.record(outcome);
            })
            .await;
        }

        let summary = stats.into_summary();
        info!(
            attempted = summary.attempted,
            completed = summary.completed,
            failed = summary.failed(),
            retried = summary.retried,
            bytes = summary.total_bytes,
            "transfer batch complete"
        );
        summary
    }
}
