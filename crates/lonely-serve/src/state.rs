//! Application state and configuration.

use std::sync::Arc;

use lonely_core::{Store, ValkeyConfig};

use crate::cache::{ResponseCache, new_cache};

/// Hostname the feed generator is published under when none is configured.
pub const DEFAULT_FEEDGEN_HOSTNAME: &str = "feedgen.george.black";

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Post store connection.
    pub valkey: ValkeyConfig,

    /// Public hostname; the service DID is `did:web:{hostname}`.
    pub feedgen_hostname: String,

    /// Prometheus exporter port, 0 when disabled.
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `SERVER_PORT`: Listen port on all interfaces (default: 8080)
    /// - `VALKEY_ADDRESS`: Store address (default: "127.0.0.1:6379")
    /// - `VALKEY_TLS_ENABLED`: "true" to connect with TLS
    /// - `FEEDGEN_HOSTNAME`: Public hostname (default: "feedgen.george.black")
    /// - `METRICS_PORT`: Prometheus exporter port (default: 0, disabled)
    pub fn from_env() -> anyhow::Result<Self> {
        let port = parse_port("SERVER_PORT", 8080)?;
        let metrics_port = parse_port("METRICS_PORT", 0)?;

        let feedgen_hostname = std::env::var("FEEDGEN_HOSTNAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_FEEDGEN_HOSTNAME.to_string());

        let valkey = ValkeyConfig::from_env();
        let bind_addr = format!("0.0.0.0:{port}");

        tracing::info!(
            bind_addr = %bind_addr,
            valkey_address = %valkey.address,
            valkey_tls = valkey.tls,
            feedgen_hostname = %feedgen_hostname,
            metrics_port,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            valkey,
            feedgen_hostname,
            metrics_port,
        })
    }

    /// `did:web` identifier of this service.
    pub fn service_did(&self) -> String {
        format!("did:web:{}", self.feedgen_hostname)
    }
}

fn parse_port(key: &str, default: u16) -> anyhow::Result<u16> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} must be a port number, got '{value}': {e}")),
        _ => Ok(default),
    }
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Post store.
    pub store: Store,

    /// Application configuration.
    pub config: Arc<Config>,

    /// Feed skeleton response cache.
    pub cache: ResponseCache,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            cache: new_cache(),
        }
    }
}
