//! The lonely post store.
//!
//! A TTL-backed mapping from post hash to a minimal [`PostRecord`]. A post
//! is eligible for the feed exactly while its record exists: workers save
//! standard posts and delete them on the first interaction, and the backend
//! expires whatever is left after [`StoreSettings::post_ttl`].
//!
//! # Key Layout
//!
//! ```text
//! post:{hash}  ->  msgpack {"AtURI": "at://...", "t": time_us}   (post TTL)
//! cursor       ->  "1725911162329308"                           (cursor TTL)
//! ```
//!
//! # Sampling
//!
//! [`Store::find_posts`] builds a page on top of the backend's unordered
//! `SCAN`, keeping only posts older than the freshness window. The number of
//! backend scan calls per page is capped so a store with few qualifying posts
//! answers quickly with a short page instead of walking every key.

mod backend;
mod cursor;
mod memory;
mod valkey;

pub use backend::Backend;
pub use memory::MemoryBackend;
pub use valkey::{ValkeyBackend, ValkeyConfig};

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const POST_KEY_PREFIX: &str = "post:";
const POST_KEY_PATTERN: &str = "post:*";

/// Hash of a post URI used as its store key.
///
/// FNV-1a 64 rendered as lowercase hex without padding, matching the keys
/// existing deployments hold. Collisions are possible and accepted: two
/// colliding posts share one slot.
pub fn post_hash(uri: &str) -> String {
    format!("{:x}", fnv1a_64(uri.as_bytes()))
}

fn fnv1a_64(data: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    data.iter()
        .fold(OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(PRIME))
}

fn post_key(hash: &str) -> String {
    format!("{POST_KEY_PREFIX}{hash}")
}

/// What the store keeps for each eligible post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// AT URI of the post.
    #[serde(rename = "AtURI")]
    pub at_uri: String,

    /// Jetstream timestamp of the create event, in microseconds.
    #[serde(rename = "t")]
    pub timestamp: i64,
}

impl PostRecord {
    pub fn new(at_uri: impl Into<String>, timestamp: i64) -> Self {
        Self {
            at_uri: at_uri.into(),
            timestamp,
        }
    }

    /// A record missing its URI or timestamp carries no usable post.
    pub fn is_empty(&self) -> bool {
        self.at_uri.is_empty() || self.timestamp == 0
    }
}

/// One page of sampled posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub posts: Vec<PostRecord>,

    /// Cursor to pass to the next call. 0 means the enumeration completed.
    pub cursor: u64,
}

/// Store tunables.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Lifetime of a post record from its last write.
    pub post_ttl: Duration,

    /// Lifetime of the persisted stream cursor.
    pub cursor_ttl: Duration,

    /// Minimum age of a post before it can be sampled.
    pub freshness_window: Duration,

    /// Maximum backend scan calls per page.
    pub max_scans: usize,

    /// Keys examined per backend scan call.
    pub scan_batch: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            post_ttl: Duration::from_secs(3600),
            cursor_ttl: Duration::from_secs(120),
            freshness_window: Duration::from_secs(20 * 60),
            max_scans: 30,
            scan_batch: 10,
        }
    }
}

/// Handle to the post store. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn Backend>,
    settings: StoreSettings,
}

impl Store {
    pub fn new(backend: Arc<dyn Backend>, settings: StoreSettings) -> Self {
        Self { backend, settings }
    }

    /// Like [`new`](Self::new), but fails if the backend is unreachable.
    pub async fn connect(backend: Arc<dyn Backend>, settings: StoreSettings) -> Result<Self> {
        backend.ping().await?;
        Ok(Self::new(backend, settings))
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Upsert a post. The TTL restarts on every write.
    pub async fn save_post(&self, hash: &str, record: &PostRecord) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(record)?;
        self.backend
            .set_ex(&post_key(hash), &bytes, self.settings.post_ttl)
            .await
    }

    /// Read a post. `Ok(None)` if it was never saved, was deleted or expired.
    pub async fn read_post(&self, hash: &str) -> Result<Option<PostRecord>> {
        match self.backend.get(&post_key(hash)).await? {
            Some(bytes) => Ok(Some(rmp_serde::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove a post. Removing an absent post succeeds.
    pub async fn delete_post(&self, hash: &str) -> Result<()> {
        self.backend.del(&post_key(hash)).await
    }

    /// Sample up to `count` posts that have outlived the freshness window,
    /// resuming enumeration at `cursor`.
    ///
    /// Stops when the page is full, when the backend reports the enumeration
    /// complete (returned cursor 0), or after `max_scans` backend calls. May
    /// return fewer than `count` posts; never returns a post younger than the
    /// window at call time.
    pub async fn find_posts(&self, count: usize, cursor: u64) -> Result<Page> {
        let threshold = chrono::Utc::now().timestamp_micros()
            - i64::try_from(self.settings.freshness_window.as_micros()).unwrap_or(i64::MAX);

        let mut posts = Vec::with_capacity(count);
        let mut scan_cursor = cursor;
        let mut scans = 0;

        while posts.len() < count && scans < self.settings.max_scans {
            scans += 1;

            let (next, keys) = self
                .backend
                .scan(scan_cursor, POST_KEY_PATTERN, self.settings.scan_batch)
                .await?;
            scan_cursor = next;

            for key in keys {
                let hash = key
                    .strip_prefix(POST_KEY_PREFIX)
                    .ok_or_else(|| Error::MalformedScan(format!("unexpected key '{key}'")))?;

                let record = match self.read_post(hash).await? {
                    Some(record) if !record.is_empty() => record,
                    _ => {
                        tracing::debug!(hash, "ignoring empty post");
                        continue;
                    }
                };

                if record.timestamp > threshold {
                    tracing::debug!(
                        at_uri = %record.at_uri,
                        timestamp = record.timestamp,
                        "ignoring new post"
                    );
                    continue;
                }

                tracing::debug!(at_uri = %record.at_uri, timestamp = record.timestamp, "found post");
                posts.push(record);
                if posts.len() >= count {
                    break;
                }
            }

            if scan_cursor == 0 {
                break;
            }
        }

        Ok(Page {
            posts,
            cursor: scan_cursor,
        })
    }
}
