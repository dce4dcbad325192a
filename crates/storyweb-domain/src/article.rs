//! Article-level records: refs, sentences, mentions and tags

use crate::{Category, ClusterId, IdentityId};

/// Article metadata owned by the ingestion pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    /// Article identifier supplied by the crawler
    pub id: String,

    /// Source site name
    pub site: String,

    /// Canonical article URL
    pub url: String,

    /// Article headline
    pub title: String,
}

/// One sentence of an article that carries at least one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Article the sentence belongs to
    pub ref_id: String,

    /// Zero-based sentence position in the article
    pub sequence: u32,

    /// Sentence text
    pub text: String,
}

/// Raw entity span emitted by the extraction step
///
/// Ephemeral: mentions are normalized into tags and never stored as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Article the mention was found in
    pub ref_id: String,

    /// Sentence the mention was found in
    pub sentence: u32,

    /// Recognizer label (`PERSON`, `ORG`, `GPE`, or anything else)
    pub category: String,

    /// Span text as it appeared in the article
    pub raw_text: String,
}

/// A normalized mention, unique per `(ref_id, sentence, key)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Article the tag was found in
    pub ref_id: String,

    /// Sentence the tag was found in
    pub sentence: u32,

    /// Fingerprint key
    pub key: String,

    /// Entity category
    pub category: Category,

    /// Cleaned display text
    pub text: String,
}

/// A source site with the number of articles imported from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Site name
    pub site: String,

    /// Number of refs imported from the site
    pub ref_count: u64,
}

/// Tags of one key within one article, aggregated for listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTag {
    /// Article the tags belong to
    pub ref_: Ref,

    /// Fingerprint key
    pub key: String,

    /// Representative text across the article's tags for this key
    pub text: String,

    /// Representative category across the article's tags for this key
    pub category: Category,

    /// Number of sentences mentioning the key
    pub count: u64,

    /// Identity for `(ref, key)`, if one was created
    pub identity: Option<IdentityId>,

    /// Cluster of that identity
    pub cluster: Option<ClusterId>,
}
