//! Intake for the lonely posts feed.
//!
//! Reads the Bluesky Jetstream, saves standalone English posts to the post
//! store and deletes any post as soon as something interacts with it. What
//! remains in the store after the freshness window is, by construction, a
//! post nobody has liked, reposted, quoted or replied to.
//!
//! # Modules
//!
//! - [`source`] - Jetstream connection and the [`MessageStream`] it yields
//! - [`intake`] - reader, bounded queue, worker pool, shutdown
//! - [`worker`] - per-event save/delete logic and counters

pub mod error;
pub mod intake;
pub mod source;
pub mod worker;

pub use error::{Error, Result};
pub use intake::{Intake, IntakeConfig, IntakeSummary, StopReason};
pub use source::{DEFAULT_JETSTREAM_URL, JetstreamConfig, MessageStream};
pub use worker::{Outcome, Worker, WorkerStats};
