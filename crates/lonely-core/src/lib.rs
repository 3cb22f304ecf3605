//! Core types and storage for the lonely posts feed.
//!
//! This crate provides:
//! - Jetstream event model and post classification
//! - The content filter applied to standard posts
//! - The TTL post store and stream cursor persistence, over Valkey or an
//!   in-process backend
//! - Prometheus metrics helpers
//! - Shared error types

mod error;
mod event;
mod filter;
pub mod metrics;
pub mod store;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// Amount the persisted cursor is rewound on resume, in microseconds.
///
/// Events in this overlap are processed twice; saves and deletes are
/// idempotent so the replay is harmless.
pub const CURSOR_REWIND_MICROS: i64 = 5_000_000;

pub use error::{Error, Result};
pub use event::{
    Commit, Embed, ExternalEmbed, Facet, Feature, LIKE_COLLECTION, POST_COLLECTION, REPOST_COLLECTION,
    Record, RecordEmbed, Reply, StreamEvent, StrongRef,
};
pub use filter::{ContentFilter, FilterSets, Verdict, parse_did_list};
pub use store::{
    Backend, MemoryBackend, Page, PostRecord, Store, StoreSettings, ValkeyBackend, ValkeyConfig,
    post_hash,
};
