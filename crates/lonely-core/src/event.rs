//! Typed Jetstream events and the classification predicates built on them.
//!
//! Jetstream delivers one JSON object per message. Only `commit` events that
//! create a post, repost or like are of interest; everything else (identity
//! and account events, updates, deletes, other collections) is classified as
//! invalid and ignored by the pipeline.
//!
//! Every nested structure defaults to empty, so a message that omits a field
//! still parses and simply fails the relevant predicate.

use serde::Deserialize;

/// Collection NSID for posts.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Collection NSID for reposts.
pub const REPOST_COLLECTION: &str = "app.bsky.feed.repost";

/// Collection NSID for likes.
pub const LIKE_COLLECTION: &str = "app.bsky.feed.like";

const EMBED_RECORD: &str = "app.bsky.embed.record";
const EMBED_RECORD_WITH_MEDIA: &str = "app.bsky.embed.recordWithMedia";

/// One message from the Jetstream firehose.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamEvent {
    /// DID of the account that produced the event.
    pub did: String,

    /// Jetstream timestamp in microseconds. Used as the resume cursor.
    pub time_us: i64,

    /// Event kind (`commit`, `identity`, `account`).
    pub kind: String,

    pub commit: Commit,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Commit {
    /// `create`, `update` or `delete`.
    pub operation: String,
    pub collection: String,
    pub rkey: String,
    pub cid: String,
    pub record: Record,
}

/// Record payload. Fields for posts, reposts and likes share one struct and
/// are told apart by `$type`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "$type")]
    pub record_type: String,
    pub text: String,
    #[serde(rename = "langs")]
    pub languages: Vec<String>,
    pub embed: Embed,
    pub facets: Vec<Facet>,
    pub reply: Reply,

    /// Target of a repost or like.
    pub subject: StrongRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Embed {
    #[serde(rename = "$type")]
    pub embed_type: String,
    pub external: ExternalEmbed,
    pub record: RecordEmbed,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExternalEmbed {
    pub title: String,
    pub description: String,
    pub uri: String,
}

/// Reference carried by a record embed.
///
/// For `app.bsky.embed.record` the reference sits directly here. For
/// `app.bsky.embed.recordWithMedia` it is wrapped one level deeper in
/// `record`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordEmbed {
    pub cid: String,
    pub uri: String,
    pub record: Option<Box<StrongRef>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Facet {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Feature {
    #[serde(rename = "$type")]
    pub feature_type: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Reply {
    pub parent: StrongRef,
    pub root: StrongRef,
}

/// A `(cid, uri)` pointer to another record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StrongRef {
    pub cid: String,
    pub uri: String,
}

impl StreamEvent {
    /// Whether the pipeline should act on this event at all.
    ///
    /// Valid events are `commit`/`create` events for a post, repost or like.
    /// Posts must additionally be tagged English.
    pub fn is_valid(&self) -> bool {
        if self.kind != "commit" || self.commit.operation != "create" {
            return false;
        }
        if !self.is_post() && !self.is_repost() && !self.is_like() {
            return false;
        }
        if self.is_post() && !self.is_english() {
            return false;
        }
        true
    }

    pub fn is_post(&self) -> bool {
        self.commit.record.record_type == POST_COLLECTION
    }

    pub fn is_repost(&self) -> bool {
        self.commit.record.record_type == REPOST_COLLECTION
    }

    pub fn is_like(&self) -> bool {
        self.commit.record.record_type == LIKE_COLLECTION
    }

    /// A bare, standalone post: not a reply, no embed of any kind, no facets.
    ///
    /// Quotes, replies, links and media are commentary on something else and
    /// never enter the store.
    pub fn is_standard_post(&self) -> bool {
        self.is_post() && !self.is_reply_post() && !self.has_embed() && !self.has_facet()
    }

    /// A post embedding another record, with or without media.
    pub fn is_quote_post(&self) -> bool {
        self.is_post()
            && matches!(
                self.commit.record.embed.embed_type.as_str(),
                EMBED_RECORD | EMBED_RECORD_WITH_MEDIA
            )
    }

    /// A post whose reply parent carries both a CID and a URI.
    pub fn is_reply_post(&self) -> bool {
        let parent = &self.commit.record.reply.parent;
        self.is_post() && !parent.cid.is_empty() && !parent.uri.is_empty()
    }

    pub fn is_english(&self) -> bool {
        self.commit.record.languages.iter().any(|lang| lang == "en")
    }

    pub fn has_embed(&self) -> bool {
        !self.commit.record.embed.embed_type.is_empty()
    }

    pub fn has_facet(&self) -> bool {
        !self.commit.record.facets.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.commit.record.text
    }

    /// AT URI of the post this event created.
    pub fn post_uri(&self) -> String {
        format!("at://{}/{}/{}", self.did, POST_COLLECTION, self.commit.rkey)
    }

    /// AT URI of the post this event interacts with.
    ///
    /// Likes and reposts point at their subject, quotes at the embedded
    /// record, replies at their parent. Returns `None` when the event does not
    /// reference a post or the reference is missing.
    pub fn target_uri(&self) -> Option<&str> {
        let record = &self.commit.record;
        let uri = if self.is_like() || self.is_repost() {
            record.subject.uri.as_str()
        } else if self.is_quote_post() {
            match &record.embed.record.record {
                Some(nested) if record.embed.embed_type == EMBED_RECORD_WITH_MEDIA => {
                    nested.uri.as_str()
                }
                _ => record.embed.record.uri.as_str(),
            }
        } else if self.is_reply_post() {
            record.reply.parent.uri.as_str()
        } else {
            ""
        };

        (!uri.is_empty()).then_some(uri)
    }
}
