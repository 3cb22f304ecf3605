//! In-process backend with per-key expiry.
//!
//! Expired keys are hidden from every read as soon as their deadline passes
//! and physically removed by [`MemoryBackend::evict_expired`], which
//! [`MemoryBackend::spawn_evictor`] runs on an interval.
//!
//! Enumeration walks the sorted key space; the cursor is the offset of the
//! next key to examine. Keys written or removed between calls may shift
//! positions, so a chained enumeration can skip or repeat keys, which matches
//! the guarantees of a server-side `SCAN`.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use super::backend::Backend;
use crate::Result;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local [`Backend`]. Thread-safe; share it through an `Arc`.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired key. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }

    /// Run [`evict_expired`](Self::evict_expired) every `interval` until the
    /// backend is dropped.
    pub fn spawn_evictor(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let backend: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(backend) = backend.upgrade() else {
                    break;
                };
                let evicted = backend.evict_expired();
                if evicted > 0 {
                    tracing::debug!(evicted, "evicted expired keys");
                }
            }
        })
    }
}

fn matches_pattern(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_vec(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        let now = Instant::now();
        let entries = self.entries.read();
        let start = usize::try_from(cursor).unwrap_or(usize::MAX);
        let count = count.max(1);

        let keys = entries
            .iter()
            .skip(start)
            .take(count)
            .filter(|(key, e)| e.is_live(now) && matches_pattern(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();

        let end = start.saturating_add(count);
        let next = if end >= entries.len() { 0 } else { end as u64 };
        Ok((next, keys))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
