use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Minimal key-value surface the post store is built on.
///
/// Every call is atomic per key on the backend side; the store adds no
/// locking of its own and backends must be safe to share across tasks.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch a value. Missing and expired keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value that expires `ttl` after this call. Overwrites reset the
    /// expiry.
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn del(&self, key: &str) -> Result<()>;

    /// One step of a resumable, unordered enumeration of keys matching
    /// `pattern` (a literal prefix followed by `*`).
    ///
    /// Returns the continuation cursor and the keys found in this step. A
    /// returned cursor of 0 means the enumeration is complete. `count` is a
    /// hint for how many keys to examine, not a guarantee of how many are
    /// returned.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)>;

    /// Round-trip to the backend, used to fail fast at startup.
    async fn ping(&self) -> Result<()>;
}
