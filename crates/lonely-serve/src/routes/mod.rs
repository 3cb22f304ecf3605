//! API route definitions.

mod did;
mod feed;
mod health;

pub use did::{DidDocument, DidService};
pub use feed::{FeedSkeleton, SkeletonPost, SkeletonQuery};

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// - `GET /health` - Health check
/// - `GET /.well-known/did.json` - `did:web` document for the service
/// - `GET /xrpc/app.bsky.feed.getFeedSkeleton` - Lonely post sample
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/.well-known/did.json", get(did::did_document))
        .route(
            "/xrpc/app.bsky.feed.getFeedSkeleton",
            get(feed::feed_skeleton),
        )
        .with_state(state)
}
