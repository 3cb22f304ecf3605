//! Content filter for standard posts.
//!
//! The filter is a fixed sequence of checks; the first failing check decides.
//!
//! 1. Empty text is rejected.
//! 2. Posts from blocked DIDs (known bots) are rejected.
//! 3. Posts containing a blocked word as a whole whitespace-separated token,
//!    compared lower-cased, are rejected. `trumpet` is not `trump`.
//! 4. Posts containing both `Connections` and `Puzzle` (case-sensitive) are
//!    rejected. These are daily puzzle score posts; the word `connections`
//!    alone is far too common to block.
//! 5. Posts with no lowercase `a`-`z` character are rejected. This drops
//!    all-caps shouting and posts tagged English that are written in another
//!    script.

use std::collections::HashSet;
use std::sync::Arc;

/// Embedded list of blocked DIDs, one per line. `#` starts a comment.
const BLOCKED_DIDS: &str = include_str!("../assets/blocked_dids.txt");

/// Words whose presence as a token excludes a post.
const BLOCKED_WORDS: &[&str] = &[
    "trump",
    "trump's",
    "biden",
    "biden's",
    "putin",
    "rfk",
    "elon",
    "musk",
    "schumer",
    "pelosi",
    "maga",
    "republican",
    "republicans",
    "democrat",
    "democrats",
    "gop",
    "genocide",
    "wordle",
    "quordle",
];

const PUZZLE_PHRASES: (&str, &str) = ("Connections", "Puzzle");

/// Immutable block-lists used by the [`ContentFilter`].
#[derive(Debug, Clone, Default)]
pub struct FilterSets {
    blocked_dids: HashSet<String>,
    blocked_words: HashSet<String>,
}

impl FilterSets {
    /// Build filter sets from explicit lists. Words are stored lower-cased.
    pub fn new<D, W>(blocked_dids: D, blocked_words: W) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        Self {
            blocked_dids: blocked_dids.into_iter().map(Into::into).collect(),
            blocked_words: blocked_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// The lists compiled into the binary.
    pub fn builtin() -> Self {
        let sets = Self::new(parse_did_list(BLOCKED_DIDS), BLOCKED_WORDS.iter().copied());
        tracing::debug!(
            blocked_dids = sets.blocked_dids.len(),
            blocked_words = sets.blocked_words.len(),
            "loaded built-in filter sets"
        );
        sets
    }

    pub fn is_blocked_did(&self, did: &str) -> bool {
        self.blocked_dids.contains(did)
    }

    pub fn is_blocked_word(&self, token: &str) -> bool {
        self.blocked_words.contains(&token.to_lowercase())
    }
}

/// Parse a newline-separated DID list, skipping blank lines and comments.
pub fn parse_did_list(data: &str) -> impl Iterator<Item = String> + '_ {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// Outcome of running a post through the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Include,
    EmptyText,
    BlockedDid,
    BlockedWord,
    PuzzlePost,
    NoLowercase,
}

impl Verdict {
    pub fn is_include(self) -> bool {
        self == Self::Include
    }

    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::EmptyText => "empty_text",
            Self::BlockedDid => "blocked_did",
            Self::BlockedWord => "blocked_word",
            Self::PuzzlePost => "puzzle_post",
            Self::NoLowercase => "no_lowercase",
        }
    }
}

/// Decides whether a standard post may enter the store.
///
/// Cheap to clone; the sets are shared.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    sets: Arc<FilterSets>,
}

impl ContentFilter {
    pub fn new(sets: FilterSets) -> Self {
        Self {
            sets: Arc::new(sets),
        }
    }

    /// Run every check against a post's author DID and text.
    pub fn evaluate(&self, did: &str, text: &str) -> Verdict {
        if text.is_empty() {
            return Verdict::EmptyText;
        }

        if self.sets.is_blocked_did(did) {
            return Verdict::BlockedDid;
        }

        if text
            .split_whitespace()
            .any(|token| self.sets.is_blocked_word(token))
        {
            return Verdict::BlockedWord;
        }

        let (first, second) = PUZZLE_PHRASES;
        if text.contains(first) && text.contains(second) {
            return Verdict::PuzzlePost;
        }

        if !text.chars().any(|c| c.is_ascii_lowercase()) {
            return Verdict::NoLowercase;
        }

        Verdict::Include
    }

    /// Whether the post should be saved.
    pub fn include_post(&self, did: &str, text: &str) -> bool {
        self.evaluate(did, text).is_include()
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(FilterSets::builtin())
    }
}
