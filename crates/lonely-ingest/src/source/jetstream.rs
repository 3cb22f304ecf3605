//! Jetstream WebSocket source.
//!
//! Jetstream is the JSON projection of the Bluesky firehose. The subscription
//! is narrowed server-side to the collections the intake cares about, and an
//! optional `cursor` (microseconds) replays from an earlier position.
//!
//! There is one connection per run and no reconnect: a failed handshake is a
//! startup error, a closed connection ends the run.

use futures_util::StreamExt;
use lonely_core::{LIKE_COLLECTION, POST_COLLECTION, REPOST_COLLECTION};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::MessageStream;
use crate::{Error, Result};

/// Public Jetstream instance used when no URL is configured.
pub const DEFAULT_JETSTREAM_URL: &str = "wss://jetstream2.us-east.bsky.network/subscribe";

/// Jetstream subscription settings.
#[derive(Debug, Clone)]
pub struct JetstreamConfig {
    /// Subscribe endpoint, without query string.
    pub url: String,

    /// NSIDs passed as `wantedCollections`.
    pub collections: Vec<String>,
}

impl Default for JetstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_JETSTREAM_URL.to_string(),
            collections: vec![
                POST_COLLECTION.to_string(),
                REPOST_COLLECTION.to_string(),
                LIKE_COLLECTION.to_string(),
            ],
        }
    }
}

impl JetstreamConfig {
    /// Full subscription URL, resuming at `cursor` when given.
    pub fn subscribe_url(&self, cursor: Option<i64>) -> String {
        let mut params: Vec<String> = self
            .collections
            .iter()
            .map(|c| format!("wantedCollections={c}"))
            .collect();
        if let Some(cursor) = cursor {
            params.push(format!("cursor={cursor}"));
        }

        if params.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, params.join("&"))
    }

    /// Open the connection and return its text messages.
    ///
    /// Ping, pong and binary frames are dropped. Read errors are yielded so
    /// the caller can count them.
    pub async fn connect(&self, cursor: Option<i64>) -> Result<MessageStream> {
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(Error::Config(format!(
                "jetstream url must use ws:// or wss://, got '{}'",
                self.url
            )));
        }

        let url = self.subscribe_url(cursor);
        tracing::info!(%url, "connecting to jetstream");

        let (socket, response) = connect_async(url.as_str()).await?;
        tracing::info!(status = %response.status(), "connected to jetstream");

        let messages = socket.filter_map(|frame| async move {
            match frame {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                Ok(Message::Close(close)) => {
                    tracing::info!(?close, "jetstream sent close frame");
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(Error::from(e))),
            }
        });

        Ok(messages.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_subscription_url() {
        let config = JetstreamConfig::default();
        assert_eq!(
            config.subscribe_url(None),
            "wss://jetstream2.us-east.bsky.network/subscribe\
             ?wantedCollections=app.bsky.feed.post\
             &wantedCollections=app.bsky.feed.repost\
             &wantedCollections=app.bsky.feed.like"
        );
    }

    #[test]
    fn cursor_is_appended() {
        let config = JetstreamConfig::default();
        let url = config.subscribe_url(Some(1_725_911_157_329_308));
        assert!(url.ends_with("&wantedCollections=app.bsky.feed.like&cursor=1725911157329308"));
    }

    #[test]
    fn respects_existing_query_string() {
        let config = JetstreamConfig {
            url: "ws://localhost:6008/subscribe?compress=false".to_string(),
            collections: vec![POST_COLLECTION.to_string()],
        };
        assert_eq!(
            config.subscribe_url(Some(5)),
            "ws://localhost:6008/subscribe?compress=false&wantedCollections=app.bsky.feed.post&cursor=5"
        );
    }

    #[test]
    fn no_params_leaves_url_untouched() {
        let config = JetstreamConfig {
            url: "ws://localhost:6008/subscribe".to_string(),
            collections: Vec::new(),
        };
        assert_eq!(config.subscribe_url(None), "ws://localhost:6008/subscribe");
    }

    #[tokio::test]
    async fn rejects_non_websocket_url() {
        let config = JetstreamConfig {
            url: "https://jetstream.example/subscribe".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.connect(None).await, Err(Error::Config(_))));
    }
}
