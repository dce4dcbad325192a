//! Article records handed over by the extraction pipeline

use serde::{Deserialize, Serialize};
use storyweb_domain::{Mention, Ref};

/// One article as produced upstream: metadata, sentences and entity spans
///
/// Read from JSON lines; every field except `id` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article identifier; records without one are skipped
    #[serde(default)]
    pub id: Option<String>,

    /// Source site name
    #[serde(default)]
    pub site: String,

    /// Article URL
    #[serde(default)]
    pub url: String,

    /// Headline
    #[serde(default)]
    pub title: String,

    /// ISO 639-3 language code
    #[serde(default)]
    pub language: Option<String>,

    /// Sentences of the article
    #[serde(default)]
    pub sentences: Vec<SentenceRecord>,

    /// Entity spans recognized in the article
    #[serde(default)]
    pub mentions: Vec<MentionRecord>,
}

/// A sentence of an article record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Zero-based position in the article
    pub sequence: u32,

    /// Sentence text
    pub text: String,
}

/// An entity span of an article record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    /// Sentence the span belongs to
    pub sentence: u32,

    /// Recognizer label
    pub category: String,

    /// Span text
    pub text: String,
}

impl ArticleRecord {
    /// Article metadata, if the record has an id
    pub fn to_ref(&self) -> Option<Ref> {
        let id = self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        Some(Ref {
            id: id.to_string(),
            site: self.site.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
        })
    }

    /// Entity spans as domain mentions of article `ref_id`
    pub fn mentions_for(&self, ref_id: &str) -> Vec<Mention> {
        self.mentions
            .iter()
            .map(|m| Mention {
                ref_id: ref_id.to_string(),
                sentence: m.sentence,
                category: m.category.clone(),
                raw_text: m.text.clone(),
            })
            .collect()
    }
}

/// Outcome of ingesting one article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Article id
    pub ref_id: String,

    /// Tags written
    pub tags: usize,

    /// Sentences written
    pub sentences: usize,

    /// Distinct identities upserted
    pub identities: usize,

    /// Mentions the normalizer rejected
    pub rejected: usize,

    /// Identities that joined this article's same-key clusters (auto-merge only)
    pub merged: usize,
}

/// Outcome of ingesting a file of articles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Articles ingested
    pub articles: usize,

    /// Records skipped (no id, filtered language, unparseable)
    pub skipped: usize,

    /// Tags written across all articles
    pub tags: usize,

    /// Identities upserted across all articles
    pub identities: usize,

    /// Mentions rejected across all articles
    pub rejected: usize,

    /// Identities merged by key across all articles
    pub merged: usize,
}

impl IngestReport {
    /// Fold one article's summary into the report
    pub fn record(&mut self, summary: &IngestSummary) {
        self.articles += 1;
        self.tags += summary.tags;
        self.identities += summary.identities;
        self.rejected += summary.rejected;
        self.merged += summary.merged;
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} articles ingested ({} skipped): {} tags, {} identities, {} mentions rejected, {} merged by key",
            self.articles, self.skipped, self.tags, self.identities, self.rejected, self.merged
        )
    }
}
