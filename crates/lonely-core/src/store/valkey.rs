//! Valkey/Redis backend using a deadpool connection pool.
//!
//! Expiry is native (`SET ... EX`), so no sweeper is needed: keys vanish on
//! their own once the TTL elapses.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::cmd;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};

use super::backend::Backend;
use crate::{Error, Result};

/// Default pool size per process.
const DEFAULT_POOL_SIZE: usize = 32;

/// Connection settings for the Valkey server.
#[derive(Debug, Clone)]
pub struct ValkeyConfig {
    /// `host:port` of the server.
    pub address: String,

    /// Connect with TLS (`rediss://`), validating the server certificate.
    pub tls: bool,

    /// Maximum number of pooled connections.
    pub pool_size: usize,
}

impl Default for ValkeyConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:6379".to_string(),
            tls: false,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl ValkeyConfig {
    /// Load from `VALKEY_ADDRESS` and `VALKEY_TLS_ENABLED` (`true` enables TLS).
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let address = std::env::var("VALKEY_ADDRESS")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.address);

        let tls = std::env::var("VALKEY_TLS_ENABLED")
            .map(|v| v == "true")
            .unwrap_or(defaults.tls);

        Self {
            address,
            tls,
            ..defaults
        }
    }

    /// Connection URL for the configured address.
    pub fn url(&self) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        format!("{scheme}://{}", self.address)
    }
}

/// [`Backend`] backed by a Valkey (or Redis) server.
#[derive(Clone)]
pub struct ValkeyBackend {
    pool: Pool,
}

impl ValkeyBackend {
    /// Create the connection pool. Connections are opened lazily; use
    /// [`Backend::ping`] to verify the server is reachable.
    pub fn new(config: &ValkeyConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(Error::Config("valkey address must not be empty".to_string()));
        }

        let mut pool_config = Config::from_url(config.url());
        pool_config.pool = Some(PoolConfig::new(config.pool_size.max(1)));
        let pool = pool_config.create_pool(Some(Runtime::Tokio1))?;

        tracing::info!(
            address = %config.address,
            tls = config.tls,
            pool_size = config.pool_size,
            "valkey pool created"
        );

        Ok(Self { pool })
    }
}

#[async_trait]
impl Backend for ValkeyBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let () = cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _removed: u64 = cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        let mut conn = self.pool.get().await?;
        // A reply that is not `[cursor, [key, ...]]` fails conversion here.
        let (next, keys): (u64, Vec<String>) = cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok((next, keys))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _pong: String = cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_without_tls() {
        let config = ValkeyConfig {
            address: "cache.internal:6379".to_string(),
            ..Default::default()
        };
        assert_eq!(config.url(), "redis://cache.internal:6379");
    }

    #[test]
    fn url_with_tls() {
        let config = ValkeyConfig {
            address: "cache.internal:6380".to_string(),
            tls: true,
            ..Default::default()
        };
        assert_eq!(config.url(), "rediss://cache.internal:6380");
    }

    #[test]
    fn rejects_empty_address() {
        let config = ValkeyConfig {
            address: String::new(),
            ..Default::default()
        };
        assert!(matches!(ValkeyBackend::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn pool_creation_is_lazy() {
        // Nothing listens here; creating the pool must still succeed.
        let config = ValkeyConfig {
            address: "127.0.0.1:1".to_string(),
            ..Default::default()
        };
        assert!(ValkeyBackend::new(&config).is_ok());
    }
}
