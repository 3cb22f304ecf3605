//! Error types for the intake pipeline.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during intake.
#[derive(Error, Debug)]
pub enum Error {
    /// Store error.
    #[error("store error: {0}")]
    Core(#[from] lonely_core::Error),

    /// WebSocket transport or handshake error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Message is not a valid event.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Work queue closed while the reader was still producing.
    #[error("channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_store_errors() {
        let err: Error = lonely_core::Error::Config("bad".to_string()).into();
        assert!(matches!(err, Error::Core(_)));
        assert_eq!(err.to_string(), "store error: configuration error: bad");
    }

    #[test]
    fn wraps_json_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
