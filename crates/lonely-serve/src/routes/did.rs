//! DID document for `did:web` resolution of the feed generator service.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::state::AppState;

/// Clients may cache the document for 8 hours.
const CACHE_CONTROL: &str = "public; max-age=28800";

#[derive(Debug, Clone, Serialize)]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub service: Vec<DidService>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DidService {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(rename = "serviceEndpoint")]
    pub service_endpoint: String,
}

impl DidDocument {
    /// Document declaring a feed generator reachable at `https://{hostname}`.
    pub fn feed_generator(hostname: &str) -> Self {
        Self {
            context: vec!["https://www.w3.org/ns/did/v1".to_string()],
            id: format!("did:web:{hostname}"),
            service: vec![DidService {
                id: "#bsky_fg".to_string(),
                service_type: "BskyFeedGenerator".to_string(),
                service_endpoint: format!("https://{hostname}"),
            }],
        }
    }
}

/// `GET /.well-known/did.json`
pub async fn did_document(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, CACHE_CONTROL)],
        Json(DidDocument::feed_generator(&state.config.feedgen_hostname)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_shape() {
        let doc = serde_json::to_value(DidDocument::feed_generator("feedgen.example.com")).unwrap();
        assert_eq!(
            doc,
            serde_json::json!({
                "@context": ["https://www.w3.org/ns/did/v1"],
                "id": "did:web:feedgen.example.com",
                "service": [{
                    "id": "#bsky_fg",
                    "type": "BskyFeedGenerator",
                    "serviceEndpoint": "https://feedgen.example.com"
                }]
            })
        );
    }
}
