//! Intake workers.
//!
//! Each worker pulls events off the shared queue and applies them to the
//! store:
//!
//! - invalid events are ignored
//! - standard posts that pass the content filter are saved
//! - any other event that references a post deletes that post
//!
//! Workers keep running counters which they log and reset on a fixed
//! interval, and mirror into Prometheus counters as they go.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lonely_core::{ContentFilter, PostRecord, Store, StreamEvent, Verdict, post_hash};
use metrics::counter;
use tokio::sync::{Mutex, mpsc, watch};

/// Queue receiver shared by every worker.
pub type SharedQueue = Arc<Mutex<mpsc::Receiver<StreamEvent>>>;

/// What a worker did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Standard post written to the store.
    Saved,
    /// Interaction removed its target from the store.
    Deleted,
    /// Standard post rejected by the content filter.
    Filtered(Verdict),
    /// Not eligible, or references nothing.
    Ignored,
    /// Store call failed; the event's effect is lost.
    Failed,
}

/// Per-worker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub saves: u64,
    pub deletions: u64,
    pub filtered: u64,
    pub ignored: u64,
    pub errors: u64,
}

impl WorkerStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Saved => self.saves += 1,
            Outcome::Deleted => self.deletions += 1,
            Outcome::Filtered(_) => self.filtered += 1,
            Outcome::Ignored => self.ignored += 1,
            Outcome::Failed => self.errors += 1,
        }
    }

    /// Add another set of counters to this one.
    pub fn merge(&mut self, other: &WorkerStats) {
        self.saves += other.saves;
        self.deletions += other.deletions;
        self.filtered += other.filtered;
        self.ignored += other.ignored;
        self.errors += other.errors;
    }

    /// Events accounted for.
    pub fn total(&self) -> u64 {
        self.saves + self.deletions + self.filtered + self.ignored + self.errors
    }
}

/// One consumer of the work queue.
pub struct Worker {
    id: usize,
    store: Store,
    filter: ContentFilter,
    stats_interval: Duration,
    queue_depth: Arc<AtomicUsize>,
}

impl Worker {
    pub fn new(id: usize, store: Store, filter: ContentFilter, stats_interval: Duration) -> Self {
        Self {
            id,
            store,
            filter,
            stats_interval,
            queue_depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Share the queue depth counter with the reader and the other workers.
    pub fn with_queue_depth(mut self, queue_depth: Arc<AtomicUsize>) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    /// Apply a single event to the store.
    pub async fn process(&self, event: &StreamEvent) -> Outcome {
        if !event.is_valid() {
            counter!("intake_events_ignored_total").increment(1);
            return Outcome::Ignored;
        }

        if event.is_standard_post() {
            let verdict = self.filter.evaluate(&event.did, event.text());
            if !verdict.is_include() {
                counter!("intake_events_filtered_total", "reason" => verdict.as_str()).increment(1);
                return Outcome::Filtered(verdict);
            }

            let at_uri = event.post_uri();
            let record = PostRecord::new(at_uri.as_str(), event.time_us);
            if let Err(e) = self.store.save_post(&post_hash(&at_uri), &record).await {
                tracing::error!(worker = self.id, %at_uri, error = %e, "failed to save post");
                counter!("intake_errors_total").increment(1);
                return Outcome::Failed;
            }

            tracing::debug!(worker = self.id, %at_uri, "saved post");
            counter!("intake_events_saved_total").increment(1);
            return Outcome::Saved;
        }

        let Some(at_uri) = event.target_uri() else {
            counter!("intake_events_ignored_total").increment(1);
            return Outcome::Ignored;
        };

        if let Err(e) = self.store.delete_post(&post_hash(at_uri)).await {
            tracing::error!(worker = self.id, %at_uri, error = %e, "failed to delete post");
            counter!("intake_errors_total").increment(1);
            return Outcome::Failed;
        }

        counter!("intake_events_deleted_total").increment(1);
        Outcome::Deleted
    }

    /// Consume events until shutdown is signalled or the queue closes.
    ///
    /// Events still queued at shutdown are not processed. Returns the
    /// worker's lifetime counters.
    pub async fn run(self, queue: SharedQueue, mut shutdown: watch::Receiver<bool>) -> WorkerStats {
        tracing::info!(worker = self.id, "starting worker");

        let mut lifetime = WorkerStats::default();
        let mut window = WorkerStats::default();
        let period = self.stats_interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    tracing::info!(worker = self.id, "shutting down worker");
                    break;
                }

                _ = ticker.tick() => {
                    let depth = self.queue_depth.load(Ordering::Relaxed);
                    tracing::info!(
                        worker = self.id,
                        saves = window.saves,
                        deletions = window.deletions,
                        errors = window.errors,
                        ignored = window.ignored,
                        blocked = window.filtered,
                        queue = depth,
                        "intake stats"
                    );
                    window = WorkerStats::default();
                }

                event = async {
                    let mut rx = queue.lock().await;
                    let event = rx.recv().await;
                    self.queue_depth.store(rx.len(), Ordering::Relaxed);
                    event
                } => {
                    let Some(event) = event else {
                        tracing::info!(worker = self.id, "queue closed, stopping worker");
                        break;
                    };
                    let outcome = self.process(&event).await;
                    window.record(outcome);
                    lifetime.record(outcome);
                }
            }
        }

        lifetime
    }
}
