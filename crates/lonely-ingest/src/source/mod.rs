//! Message sources for the intake.
//!
//! A source is anything that yields raw JSON messages as a
//! [`MessageStream`]. The intake only depends on that shape, so the live
//! [Jetstream](jetstream) connection and an in-memory list of messages are
//! interchangeable.

pub mod jetstream;

pub use jetstream::{DEFAULT_JETSTREAM_URL, JetstreamConfig};

use futures_util::stream::BoxStream;

use crate::Result;

/// A stream of raw JSON messages. Transport errors are items, not the end of
/// the stream; the stream ends when the connection closes.
pub type MessageStream = BoxStream<'static, Result<String>>;
