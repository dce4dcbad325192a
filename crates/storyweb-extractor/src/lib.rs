//! Storyweb Extractor
//!
//! Turns entity mentions recognized in news articles into tags and identities.
//!
//! # Overview
//!
//! Named-entity recognition happens upstream; this crate receives its output
//! as JSON lines, one article per line, with the sentences and the raw entity
//! spans of each article. Every span is normalized into a fingerprint key and
//! stored as a tag, and every distinct key of an article gets one identity.
//!
//! # Architecture
//!
//! ```text
//! JSONL → ArticleReader → Ingestor → normalize → ArticleStore / IdentityStore
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use storyweb_extractor::{ExtractorConfig, Ingestor};
//! use storyweb_store::SqliteStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("storyweb.db")?;
//! let mut ingestor = Ingestor::new(store, ExtractorConfig::default());
//!
//! let report = ingestor.ingest_file("articles.jsonl")?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod ingest;
mod normalize;
mod reader;
mod types;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use ingest::Ingestor;
pub use normalize::{clean_entity_name, make_tag, normalize, normalize_mention, slugify, Normalized};
pub use reader::ArticleReader;
pub use types::{ArticleRecord, IngestReport, IngestSummary, MentionRecord, SentenceRecord};
