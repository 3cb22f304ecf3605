//! Feed skeleton endpoint.
//!
//! Returns AT URIs of lonely posts sampled from the store. Paging follows
//! the store's enumeration cursor; pages are neither ordered nor guaranteed
//! to be disjoint.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use lonely_core::PostRecord;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::cache::get_or_compute;
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// Matches the response cache lifetime.
const CACHE_CONTROL: &str = "public; max-age=15";

/// Raw query parameters. Kept as strings so malformed values fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkeletonQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

impl SkeletonQuery {
    /// Requested page size; anything unparsable or outside 1..=100 is 10.
    pub fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| (1..=MAX_LIMIT).contains(n))
            .unwrap_or(DEFAULT_LIMIT)
    }

    /// Enumeration cursor; anything unparsable is 0.
    pub fn cursor(&self) -> u64 {
        self.cursor
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonPost {
    pub post: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSkeleton {
    pub feed: Vec<SkeletonPost>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cursor: Option<String>,
}

impl FeedSkeleton {
    /// The cursor is omitted when enumeration completed or the page is empty.
    pub fn new(posts: Vec<PostRecord>, cursor: u64) -> Self {
        let cursor = (cursor != 0 && !posts.is_empty()).then(|| cursor.to_string());
        Self {
            feed: posts
                .into_iter()
                .map(|p| SkeletonPost { post: p.at_uri })
                .collect(),
            cursor,
        }
    }
}

/// `GET /xrpc/app.bsky.feed.getFeedSkeleton`
pub async fn feed_skeleton(
    State(state): State<AppState>,
    Query(params): Query<SkeletonQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params.limit();
    let cursor = params.cursor();

    tracing::info!(
        limit = params.limit.as_deref().unwrap_or(""),
        cursor = params.cursor.as_deref().unwrap_or(""),
        "request"
    );
    counter!("feed_requests_total").increment(1);

    let cache_key = format!("skeleton:limit={limit}&cursor={cursor}");
    let skeleton = get_or_compute(&state.cache, &cache_key, || async {
        let page = state.store.find_posts(limit, cursor).await?;
        Ok(FeedSkeleton::new(page.posts, page.cursor))
    })
    .await?;

    counter!("feed_posts_served_total").increment(skeleton.feed.len() as u64);

    Ok(([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(skeleton)))
}
