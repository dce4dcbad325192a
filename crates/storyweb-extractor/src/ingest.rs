//! Core Ingestor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::normalize::make_tag;
use crate::reader::ArticleReader;
use crate::types::{ArticleRecord, IngestReport, IngestSummary};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::io::BufRead;
use std::path::Path;
use storyweb_domain::traits::{ArticleStore, ClusterGraph, IdentityStore};
use storyweb_domain::{pick_category, pick_label, Sentence, Tag};
use tracing::{debug, info};

fn store_error(e: impl Display) -> ExtractorError {
    ExtractorError::Store(e.to_string())
}

/// The Ingestor turns extracted article records into tags and identities
///
/// Re-ingesting an article replaces its sentences and tags but keeps its
/// identities, so identity ids and cluster assignments survive.
pub struct Ingestor<S> {
    store: S,
    config: ExtractorConfig,
}

impl<S> Ingestor<S>
where
    S: ArticleStore + IdentityStore + ClusterGraph,
    <S as ArticleStore>::Error: Display,
    <S as IdentityStore>::Error: Display,
    <S as ClusterGraph>::Error: Display,
{
    /// Create a new Ingestor
    pub fn new(store: S, config: ExtractorConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying store, mutably
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give back the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Ingest one article record
    pub fn ingest(&mut self, record: &ArticleRecord) -> Result<IngestSummary, ExtractorError> {
        let article = record
            .to_ref()
            .ok_or_else(|| ExtractorError::InvalidArticle("record has no id".to_string()))?;

        let mentions = record.mentions_for(&article.id);
        let tags: Vec<Tag> = mentions
            .iter()
            .filter_map(make_tag)
            .filter(|t| self.config.accepts_category(t.category))
            .collect();
        let rejected = mentions.len() - tags.len();

        // Only sentences that carry a tag are kept
        let tagged: BTreeSet<u32> = tags.iter().map(|t| t.sentence).collect();
        let sentences: Vec<Sentence> = record
            .sentences
            .iter()
            .filter(|s| tagged.contains(&s.sequence))
            .map(|s| Sentence {
                ref_id: article.id.clone(),
                sequence: s.sequence,
                text: s.text.clone(),
            })
            .collect();

        self.store
            .replace_article(&article, &sentences, &tags)
            .map_err(store_error)?;

        let mut by_key: BTreeMap<&str, Vec<&Tag>> = BTreeMap::new();
        for tag in &tags {
            by_key.entry(tag.key.as_str()).or_default().push(tag);
        }

        let mut merged = 0;
        for (key, group) in &by_key {
            let (Some(label), Some(category)) = (
                pick_label(group.iter().map(|t| t.text.as_str())),
                pick_category(group.iter().map(|t| t.category)),
            ) else {
                continue;
            };

            let identity = self
                .store
                .upsert_identity(&article.id, key, &label, category, None)
                .map_err(store_error)?;
            debug!(identity = %identity.id, key = %key, "Upserted identity");

            if self.config.auto_merge_by_key {
                let before = self.store.find(identity.id).map_err(store_error)?;
                let before_size = self.store.members(before).map_err(store_error)?.len();
                if let Some(root) = self.store.merge_by_key(key).map_err(store_error)? {
                    let after_size = self.store.members(root).map_err(store_error)?.len();
                    merged += after_size.saturating_sub(before_size);
                }
            }
        }

        let summary = IngestSummary {
            ref_id: article.id,
            tags: tags.len(),
            sentences: sentences.len(),
            identities: by_key.len(),
            rejected,
            merged,
        };

        info!(
            ref_id = %summary.ref_id,
            tags = summary.tags,
            identities = summary.identities,
            rejected = summary.rejected,
            merged = summary.merged,
            "Ingested article"
        );

        Ok(summary)
    }

    /// Ingest every acceptable record from a JSON lines source
    pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> Result<IngestReport, ExtractorError> {
        let records = ArticleReader::new(reader, &self.config);
        self.ingest_records(records)
    }

    /// Ingest every acceptable record from a JSON lines file
    pub fn ingest_file(&mut self, path: impl AsRef<Path>) -> Result<IngestReport, ExtractorError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Starting ingestion");
        let records = ArticleReader::open(path, &self.config)?;
        self.ingest_records(records)
    }

    fn ingest_records<R: BufRead>(
        &mut self,
        mut records: ArticleReader<R>,
    ) -> Result<IngestReport, ExtractorError> {
        let mut report = IngestReport::default();

        for record in records.by_ref() {
            let summary = self.ingest(&record?)?;
            report.record(&summary);
        }
        report.skipped = records.skipped();

        info!("{}", report.summary());
        Ok(report)
    }
}
