//! Lonely posts feed generator API.
//!
//! Serves the Bluesky feed generator endpoints on top of the post store
//! maintained by `lonely-ingest`: a feed skeleton of sampled lonely posts and
//! the `did:web` document that lets the AppView find this service.
//!
//! # Architecture
//!
//! - **AppState**: store handle, configuration and response cache
//! - **Routes**: one module per endpoint
//! - **Cache**: short-lived moka cache in front of store scans

pub mod cache;
mod error;
mod routes;
mod state;

pub use self::cache::{ResponseCache, get_or_compute, new_cache};
pub use self::error::ApiError;
pub use self::routes::{DidDocument, DidService, FeedSkeleton, SkeletonPost, SkeletonQuery, router};
pub use self::state::{AppState, Config, DEFAULT_FEEDGEN_HOSTNAME};
