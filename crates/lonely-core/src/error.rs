//! Error types shared by the store and its callers.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the post store.
#[derive(Error, Debug)]
pub enum Error {
    /// Command failed or the server replied with an unexpected shape.
    #[error("redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    /// Could not create the pool or check out a connection.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Record could not be serialized.
    #[error("record encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Stored bytes are not a valid record.
    #[error("record decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Persisted stream cursor is not a decimal integer.
    #[error("invalid cursor '{value}': {reason}")]
    InvalidCursor { value: String, reason: String },

    /// Enumeration returned a key outside the scanned namespace.
    #[error("malformed scan reply: {0}")]
    MalformedScan(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<deadpool_redis::PoolError> for Error {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<deadpool_redis::CreatePoolError> for Error {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
