//! The intake pipeline: one reader, a bounded queue, N workers.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ MessageStream  │  Jetstream (or any source of JSON messages)
//! └───────┬────────┘
//!         │ parse, track last time_us
//!         ▼
//! ┌────────────────┐
//! │     Reader     │  single producer, counts parse errors
//! └───────┬────────┘
//!         │ bounded mpsc (blocks when full)
//!         ▼
//! ┌────────────────┐
//! │  Worker pool   │  save / delete against the Store
//! └────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! connecting → streaming → draining → stopped. The reader stops when the
//! stream closes, when parse errors exceed the lifetime threshold, or when
//! the running flag is cleared. In every case it saves the last parsed
//! `time_us` as the stream cursor (best effort), broadcasts shutdown to the
//! workers and waits for all of them to return.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use lonely_core::metrics::{increment, set_gauge};
use lonely_core::{CURSOR_REWIND_MICROS, ContentFilter, Store, StreamEvent};
use tokio::sync::{Mutex, mpsc, watch};

use crate::worker::{Worker, WorkerStats};
use crate::{Error, Result};

/// Pipeline tunables.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Number of worker tasks.
    pub workers: usize,

    /// Capacity of the queue between the reader and the workers.
    pub queue_size: usize,

    /// Parse errors tolerated over the lifetime of the run.
    pub error_threshold: usize,

    /// How far a persisted cursor is rewound before resuming.
    pub rewind: Duration,

    /// How often workers log and reset their counters.
    pub stats_interval: Duration,

    /// Longest the reader waits for a message before checking the running
    /// flag.
    pub read_timeout: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            queue_size: 10_000,
            error_threshold: 10,
            rewind: Duration::from_micros(CURSOR_REWIND_MICROS as u64),
            stats_interval: Duration::from_secs(5 * 60),
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source closed the stream.
    StreamClosed,
    /// Parse errors exceeded the threshold.
    ErrorThreshold,
    /// The running flag was cleared.
    Signal,
    /// Every worker exited while the reader was still producing.
    WorkersExited,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::StreamClosed => "stream closed",
            StopReason::ErrorThreshold => "error threshold exceeded",
            StopReason::Signal => "shutdown signal",
            StopReason::WorkersExited => "workers exited",
        };
        f.write_str(reason)
    }
}

/// What happened during a run.
#[derive(Debug, Clone)]
pub struct IntakeSummary {
    /// Messages parsed and queued.
    pub events_read: u64,

    /// Messages dropped because they could not be read or parsed.
    pub parse_errors: u64,

    /// `time_us` of the last parsed event.
    pub last_cursor: Option<i64>,

    /// Whether `last_cursor` was persisted.
    pub cursor_saved: bool,

    pub stop_reason: StopReason,

    /// Counters summed over all workers.
    pub processed: WorkerStats,
}

/// A configured intake, ready to run against a message stream.
pub struct Intake {
    config: IntakeConfig,
    store: Store,
    filter: ContentFilter,
    running: Arc<AtomicBool>,
}

impl Intake {
    pub fn new(config: IntakeConfig, store: Store, filter: ContentFilter) -> Self {
        Self {
            config,
            store,
            filter,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Use an externally owned running flag, typically one cleared by a
    /// signal handler.
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Flag that stops the run when cleared.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Cursor to resume from: the persisted cursor minus the rewind margin.
    ///
    /// A missing, expired or unreadable cursor means "start live", as does a
    /// cursor that the rewind takes to zero or below. Read failures are
    /// logged, not returned.
    pub async fn resume_cursor(&self) -> Option<i64> {
        match self.store.read_cursor().await {
            Ok(Some(cursor)) if cursor > 0 => {
                tracing::info!(cursor, "discovered cursor");
                let rewind = i64::try_from(self.config.rewind.as_micros()).unwrap_or(i64::MAX);
                let resume = cursor.saturating_sub(rewind);
                if resume <= 0 {
                    tracing::info!(cursor, "cursor predates the rewind, continuing without");
                    return None;
                }
                tracing::info!(cursor = resume, "using cursor");
                Some(resume)
            }
            Ok(_) => {
                tracing::info!("no cursor found, continuing without");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cursor");
                None
            }
        }
    }

    /// Run the pipeline until the stream ends, too many errors occur, or
    /// the running flag is cleared.
    ///
    /// Returns an error only if the configuration is unusable or all
    /// workers disappear mid-run.
    pub async fn run<S>(self, mut stream: S) -> Result<IntakeSummary>
    where
        S: Stream<Item = Result<String>> + Unpin,
    {
        if self.config.workers == 0 {
            return Err(Error::Config("at least one worker is required".to_string()));
        }
        if self.config.queue_size == 0 {
            return Err(Error::Config("queue size must be positive".to_string()));
        }

        tracing::info!(
            workers = self.config.workers,
            queue_size = self.config.queue_size,
            error_threshold = self.config.error_threshold,
            "starting intake"
        );
        set_gauge("intake_running", 1.0);

        let (tx, rx) = mpsc::channel::<StreamEvent>(self.config.queue_size);
        let queue = Arc::new(Mutex::new(rx));
        let queue_depth = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles: Vec<_> = (1..=self.config.workers)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    self.store.clone(),
                    self.filter.clone(),
                    self.config.stats_interval,
                )
                .with_queue_depth(Arc::clone(&queue_depth));
                tokio::spawn(worker.run(Arc::clone(&queue), shutdown_rx.clone()))
            })
            .collect();

        let mut events_read = 0u64;
        let mut parse_errors = 0u64;
        let mut last_cursor: Option<i64> = None;

        let stop_reason = loop {
            if !self.running.load(Ordering::SeqCst) {
                break StopReason::Signal;
            }

            let message = match tokio::time::timeout(self.config.read_timeout, stream.next()).await {
                Err(_) => continue,
                Ok(None) => {
                    tracing::warn!("jetstream closed the connection");
                    break StopReason::StreamClosed;
                }
                Ok(Some(message)) => message,
            };

            let parsed = message.and_then(|text| Ok(serde_json::from_str::<StreamEvent>(&text)?));
            match parsed {
                Ok(event) => {
                    last_cursor = Some(event.time_us);
                    events_read += 1;
                    increment("intake_events_read_total", 1);

                    if tx.send(event).await.is_err() {
                        tracing::error!("work queue closed, no workers left");
                        break StopReason::WorkersExited;
                    }
                    let depth = tx.max_capacity() - tx.capacity();
                    queue_depth.store(depth, Ordering::Relaxed);
                    set_gauge("intake_queue_depth", depth as f64);
                }
                Err(e) => {
                    parse_errors += 1;
                    increment("intake_parse_errors_total", 1);
                    tracing::warn!(error = %e, errors = parse_errors, "failed to read message");

                    if parse_errors > self.config.error_threshold as u64 {
                        tracing::error!(
                            "encountered too many errors reading from jetstream, saving cursor and exiting"
                        );
                        break StopReason::ErrorThreshold;
                    }
                }
            }
        };

        tracing::info!(reason = %stop_reason, "stopping intake");

        let cursor_saved = match last_cursor {
            Some(cursor) => match self.store.save_cursor(cursor).await {
                Ok(()) => {
                    tracing::info!(cursor, "saved cursor");
                    true
                }
                Err(e) => {
                    tracing::error!(cursor, error = %e, "failed to save cursor");
                    false
                }
            },
            None => {
                tracing::warn!("no cursor to save");
                false
            }
        };

        // Workers stop pulling as soon as they see the signal; anything still
        // queued is dropped with the channel.
        let _ = shutdown_tx.send(true);
        drop(tx);

        let mut processed = WorkerStats::default();
        for handle in handles {
            match handle.await {
                Ok(stats) => processed.merge(&stats),
                Err(e) => tracing::error!(error = %e, "worker task failed"),
            }
        }

        set_gauge("intake_running", 0.0);
        set_gauge("intake_queue_depth", 0.0);

        let summary = IntakeSummary {
            events_read,
            parse_errors,
            last_cursor,
            cursor_saved,
            stop_reason,
            processed,
        };

        if stop_reason == StopReason::WorkersExited {
            return Err(Error::ChannelSend(format!(
                "all workers exited after {events_read} events"
            )));
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::stream;
    use lonely_core::{Backend, MemoryBackend, PostRecord, StoreSettings, post_hash};
    use serde_json::json;

    const AUTHOR: &str = "did:plc:author";

    fn test_config() -> IntakeConfig {
        IntakeConfig {
            read_timeout: Duration::from_millis(10),
            ..Default::default()
        }
    }

    fn store_with(settings: StoreSettings) -> Store {
        Store::new(Arc::new(MemoryBackend::new()), settings)
    }

    fn post_json(rkey: &str, text: &str, time_us: i64) -> String {
        json!({
            "did": AUTHOR,
            "time_us": time_us,
            "kind": "commit",
            "commit": {
                "operation": "create",
                "collection": "app.bsky.feed.post",
                "rkey": rkey,
                "record": {
                    "$type": "app.bsky.feed.post",
                    "text": text,
                    "langs": ["en"]
                }
            }
        })
        .to_string()
    }

    fn like_json(rkey: &str, time_us: i64) -> String {
        json!({
            "did": "did:plc:fan",
            "time_us": time_us,
            "kind": "commit",
            "commit": {
                "operation": "create",
                "collection": "app.bsky.feed.like",
                "rkey": "like",
                "record": {
                    "$type": "app.bsky.feed.like",
                    "subject": { "cid": "bafy", "uri": uri(rkey) }
                }
            }
        })
        .to_string()
    }

    fn uri(rkey: &str) -> String {
        format!("at://{AUTHOR}/app.bsky.feed.post/{rkey}")
    }

    fn micros_ago(minutes: i64) -> i64 {
        chrono::Utc::now().timestamp_micros() - minutes * 60 * 1_000_000
    }

    fn messages(items: Vec<String>) -> impl Stream<Item = Result<String>> + Unpin {
        stream::iter(items.into_iter().map(Ok))
    }

    /// Messages followed by a stream that never yields, so the run only ends
    /// when the running flag is cleared.
    fn open_messages(items: Vec<String>) -> impl Stream<Item = Result<String>> + Unpin + Send {
        stream::iter(items.into_iter().map(Ok)).chain(stream::pending())
    }

    async fn read(store: &Store, rkey: &str) -> Option<PostRecord> {
        store.read_post(&post_hash(&uri(rkey))).await.unwrap()
    }

    async fn wait_for_post(store: &Store, rkey: &str) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while read(store, rkey).await.is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("post should be saved");
    }

    /// Run against an open stream until `sentinel` is stored, then stop.
    /// With one worker the queue is FIFO, so everything before the sentinel
    /// has been applied.
    async fn run_until_sentinel(store: &Store, mut items: Vec<String>) -> IntakeSummary {
        items.push(post_json("sentinel", "last one in", micros_ago(60)));
        let intake = Intake::new(test_config(), store.clone(), ContentFilter::default());
        let running = intake.running_flag();
        let handle = tokio::spawn(intake.run(open_messages(items)));

        wait_for_post(store, "sentinel").await;
        running.store(false, Ordering::SeqCst);
        handle.await.unwrap().unwrap()
    }

    // =========================================================================
    // End to end
    // =========================================================================

    #[tokio::test]
    async fn aged_post_appears_in_sample() {
        let store = store_with(StoreSettings::default());
        let summary =
            run_until_sentinel(&store, vec![post_json("p1", "a quiet afternoon", micros_ago(30))])
                .await;

        assert_eq!(summary.stop_reason, StopReason::Signal);
        assert_eq!(summary.processed.saves, 2);

        let page = store.find_posts(10, 0).await.unwrap();
        let uris: Vec<_> = page.posts.iter().map(|p| p.at_uri.as_str()).collect();
        assert!(uris.contains(&uri("p1").as_str()));
    }

    #[tokio::test]
    async fn fresh_post_is_held_back() {
        let store = store_with(StoreSettings::default());
        run_until_sentinel(&store, vec![post_json("p1", "just now", micros_ago(1))]).await;

        assert!(read(&store, "p1").await.is_some());
        let page = store.find_posts(10, 0).await.unwrap();
        assert!(page.posts.iter().all(|p| p.at_uri != uri("p1")));
    }

    #[tokio::test]
    async fn liked_post_is_never_sampled() {
        let store = store_with(StoreSettings::default());
        let summary = run_until_sentinel(
            &store,
            vec![
                post_json("p1", "nobody will see this", micros_ago(30)),
                like_json("p1", micros_ago(29)),
            ],
        )
        .await;

        assert_eq!(summary.processed.deletions, 1);
        assert!(read(&store, "p1").await.is_none());
        let page = store.find_posts(10, 0).await.unwrap();
        assert!(page.posts.iter().all(|p| p.at_uri != uri("p1")));
    }

    #[tokio::test]
    async fn expired_post_disappears() {
        let settings = StoreSettings {
            post_ttl: Duration::from_millis(300),
            ..Default::default()
        };
        let store = store_with(settings);
        run_until_sentinel(&store, vec![post_json("p1", "short lived", micros_ago(30))]).await;

        let before = store.find_posts(10, 0).await.unwrap();
        assert!(before.posts.iter().any(|p| p.at_uri == uri("p1")));

        tokio::time::sleep(Duration::from_millis(400)).await;
        let after = store.find_posts(10, 0).await.unwrap();
        assert!(after.posts.is_empty());
    }

    #[tokio::test]
    async fn filtered_post_is_not_stored() {
        let store = store_with(StoreSettings::default());
        let summary = run_until_sentinel(
            &store,
            vec![post_json("p1", "today's Connections Puzzle #412", micros_ago(30))],
        )
        .await;

        assert_eq!(summary.processed.filtered, 1);
        assert!(read(&store, "p1").await.is_none());
    }

    #[tokio::test]
    async fn multiple_workers_process_everything() {
        let store = store_with(StoreSettings::default());
        let items: Vec<_> = (0..50)
            .map(|i| post_json(&format!("p{i}"), "hello world", micros_ago(30)))
            .collect();

        let config = IntakeConfig {
            workers: 4,
            ..test_config()
        };
        let intake = Intake::new(config, store.clone(), ContentFilter::default());
        let running = intake.running_flag();
        let handle = tokio::spawn(intake.run(open_messages(items)));

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let mut all = true;
                for i in 0..50 {
                    if read(&store, &format!("p{i}")).await.is_none() {
                        all = false;
                        break;
                    }
                }
                if all {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("all posts should be saved");

        running.store(false, Ordering::SeqCst);
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.events_read, 50);
        assert_eq!(summary.processed.saves, 50);
    }

    /// Memory backend whose writes wait until the gate opens.
    struct GatedBackend {
        inner: MemoryBackend,
        gate: watch::Receiver<bool>,
    }

    #[async_trait]
    impl Backend for GatedBackend {
        async fn get(&self, key: &str) -> lonely_core::Result<Option<Vec<u8>>> {
            self.inner.get(key).await
        }
        async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> lonely_core::Result<()> {
            let mut gate = self.gate.clone();
            let _ = gate.wait_for(|open| *open).await;
            self.inner.set_ex(key, value, ttl).await
        }
        async fn del(&self, key: &str) -> lonely_core::Result<()> {
            self.inner.del(key).await
        }
        async fn scan(
            &self,
            cursor: u64,
            pattern: &str,
            count: usize,
        ) -> lonely_core::Result<(u64, Vec<String>)> {
            self.inner.scan(cursor, pattern, count).await
        }
        async fn ping(&self) -> lonely_core::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn full_queue_stops_the_reader() {
        let (open_gate, gate) = watch::channel(false);
        let backend = GatedBackend {
            inner: MemoryBackend::new(),
            gate,
        };
        let store = Store::new(Arc::new(backend), StoreSettings::default());

        let mut items: Vec<_> = (0..9)
            .map(|i| post_json(&format!("p{i}"), "waiting in line", micros_ago(30)))
            .collect();
        items.push(post_json("sentinel", "last one in", micros_ago(30)));

        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let source = open_messages(items).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let config = IntakeConfig {
            queue_size: 1,
            ..test_config()
        };
        let intake = Intake::new(config, store.clone(), ContentFilter::default());
        let running = intake.running_flag();
        let handle = tokio::spawn(intake.run(source));

        // One event held by the blocked worker, one queued, one waiting to
        // be sent.
        tokio::time::timeout(Duration::from_secs(2), async {
            while pulled.load(Ordering::SeqCst) < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("reader should fill the queue");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
        assert!(read(&store, "p0").await.is_none());

        open_gate.send(true).unwrap();
        wait_for_post(&store, "sentinel").await;
        running.store(false, Ordering::SeqCst);

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(pulled.load(Ordering::SeqCst), 10);
        assert_eq!(summary.events_read, 10);
        assert_eq!(summary.processed.saves, 10);
    }

    // =========================================================================
    // Stopping and cursor persistence
    // =========================================================================

    #[tokio::test]
    async fn error_threshold_saves_last_cursor() {
        let store = store_with(StoreSettings::default());
        let mut items = vec![
            post_json("p1", "first", 1_000),
            post_json("p2", "second", 2_000),
        ];
        items.extend((0..11).map(|_| "{not json".to_string()));
        items.push(post_json("p3", "never read", 3_000));

        let intake = Intake::new(test_config(), store.clone(), ContentFilter::default());
        let summary = intake.run(messages(items)).await.unwrap();

        assert_eq!(summary.stop_reason, StopReason::ErrorThreshold);
        assert_eq!(summary.parse_errors, 11);
        assert_eq!(summary.events_read, 2);
        assert_eq!(summary.last_cursor, Some(2_000));
        assert!(summary.cursor_saved);
        assert_eq!(store.read_cursor().await.unwrap(), Some(2_000));
    }

    #[tokio::test]
    async fn errors_at_threshold_do_not_stop() {
        let store = store_with(StoreSettings::default());
        let mut items: Vec<_> = (0..10).map(|_| "}".to_string()).collect();
        items.push(post_json("p1", "still going", 5_000));

        let intake = Intake::new(test_config(), store.clone(), ContentFilter::default());
        let summary = intake.run(messages(items)).await.unwrap();

        assert_eq!(summary.stop_reason, StopReason::StreamClosed);
        assert_eq!(summary.parse_errors, 10);
        assert_eq!(summary.last_cursor, Some(5_000));
    }

    #[tokio::test]
    async fn transport_errors_count_toward_threshold() {
        let store = store_with(StoreSettings::default());
        let items = (0..11).map(|_| {
            Err::<String, Error>(Error::WebSocket(
                tokio_tungstenite::tungstenite::Error::ConnectionClosed,
            ))
        });
        let config = IntakeConfig {
            error_threshold: 10,
            ..test_config()
        };

        let intake = Intake::new(config, store.clone(), ContentFilter::default());
        let summary = intake.run(stream::iter(items)).await.unwrap();

        assert_eq!(summary.stop_reason, StopReason::ErrorThreshold);
        assert_eq!(summary.last_cursor, None);
        assert!(!summary.cursor_saved);
        assert_eq!(store.read_cursor().await.unwrap(), None);
    }

    #[tokio::test]
    async fn closed_stream_saves_cursor() {
        let store = store_with(StoreSettings::default());
        let intake = Intake::new(test_config(), store.clone(), ContentFilter::default());
        let summary = intake
            .run(messages(vec![post_json("p1", "bye", 42)]))
            .await
            .unwrap();

        assert_eq!(summary.stop_reason, StopReason::StreamClosed);
        assert_eq!(store.read_cursor().await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn cleared_flag_stops_idle_reader() {
        let store = store_with(StoreSettings::default());
        let running = Arc::new(AtomicBool::new(true));
        let intake = Intake::new(test_config(), store, ContentFilter::default())
            .with_running_flag(Arc::clone(&running));
        let handle = tokio::spawn(intake.run(open_messages(Vec::new())));

        tokio::time::sleep(Duration::from_millis(30)).await;
        running.store(false, Ordering::SeqCst);

        let summary = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reader should notice the flag")
            .unwrap()
            .unwrap();
        assert_eq!(summary.stop_reason, StopReason::Signal);
        assert_eq!(summary.events_read, 0);
    }

    #[tokio::test]
    async fn rejects_zero_workers() {
        let store = store_with(StoreSettings::default());
        let config = IntakeConfig {
            workers: 0,
            ..test_config()
        };
        let intake = Intake::new(config, store, ContentFilter::default());
        assert!(matches!(
            intake.run(messages(Vec::new())).await,
            Err(Error::Config(_))
        ));
    }

    // =========================================================================
    // Resume
    // =========================================================================

    #[tokio::test]
    async fn resume_rewinds_five_seconds() {
        let store = store_with(StoreSettings::default());
        store.save_cursor(1_725_911_162_329_308).await.unwrap();

        let intake = Intake::new(IntakeConfig::default(), store, ContentFilter::default());
        assert_eq!(intake.resume_cursor().await, Some(1_725_911_157_329_308));
    }

    #[tokio::test]
    async fn resume_cursor_inside_rewind_starts_live() {
        let store = store_with(StoreSettings::default());
        store.save_cursor(3_000_000).await.unwrap();

        let intake = Intake::new(IntakeConfig::default(), store.clone(), ContentFilter::default());
        assert_eq!(intake.resume_cursor().await, None);

        store.save_cursor(5_000_000).await.unwrap();
        assert_eq!(intake.resume_cursor().await, None);

        store.save_cursor(5_000_001).await.unwrap();
        assert_eq!(intake.resume_cursor().await, Some(1));
    }

    #[tokio::test]
    async fn resume_without_cursor_starts_live() {
        let store = store_with(StoreSettings::default());
        let intake = Intake::new(IntakeConfig::default(), store, ContentFilter::default());
        assert_eq!(intake.resume_cursor().await, None);
    }

    #[tokio::test]
    async fn resume_with_expired_cursor_starts_live() {
        let settings = StoreSettings {
            cursor_ttl: Duration::from_millis(20),
            ..Default::default()
        };
        let store = store_with(settings);
        store.save_cursor(1_725_911_162_329_308).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        let intake = Intake::new(IntakeConfig::default(), store, ContentFilter::default());
        assert_eq!(intake.resume_cursor().await, None);
    }

    #[test]
    fn stop_reason_display() {
        assert_eq!(StopReason::ErrorThreshold.to_string(), "error threshold exceeded");
        assert_eq!(StopReason::Signal.to_string(), "shutdown signal");
    }
}
