//! Storyweb Storage Layer
//!
//! Implements the storyweb store traits on SQLite.
//!
//! # Architecture
//!
//! - `refs`, `sentences`, `tags`: article records written by ingestion
//! - `identities`: one row per `(ref_id, key)` carrying its cluster root
//! - `links`: typed edges between cluster roots
//!
//! The cluster graph is a store-compressed union-find: every identity row
//! holds its current root, so `find` is a point read, and `merge` rewrites the
//! losing cluster (and its links) inside one `BEGIN IMMEDIATE` transaction.
//! The root of a cluster is always its lowest member id.
//!
//! # Examples
//!
//! ```no_run
//! use storyweb_domain::Category;
//! use storyweb_domain::traits::{ClusterGraph, IdentityStore};
//! use storyweb_store::SqliteStore;
//!
//! let mut store = SqliteStore::new("storyweb.db").unwrap();
//! let a = store.upsert_identity("ref-1", "person:putin-vladimir", "Vladimir Putin", Category::Person, None).unwrap();
//! let b = store.upsert_identity("ref-2", "person:putin-vladimir", "Putin Vladimir", Category::Person, None).unwrap();
//! let root = store.merge(a.id, b.id).unwrap();
//! assert_eq!(root, a.id.min(b.id));
//! ```

#![warn(missing_docs)]

mod articles;
mod graph;
mod links;

pub use articles::DEFAULT_TAG_LIMIT;

use rusqlite::{Connection, ErrorCode, Row};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use storyweb_domain::{Category, DomainError, Identity, IdentityId, LinkVocabulary};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// Identity not found
    #[error("Identity not found: {0}")]
    NotFound(String),

    /// Rejected input (unknown link type, self-link)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Another writer holds the database lock
    #[error("Database busy: {0}")]
    Busy(String),

    /// Stored data could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Whether the caller may retry the operation with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if matches!(err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                StoreError::Busy(e.to_string())
            }
            _ => StoreError::Database(e),
        }
    }
}

impl From<DomainError> for StoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidArgument(msg) => StoreError::InvalidArgument(msg),
        }
    }
}

/// SQLite-based implementation of the storyweb store traits
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should open its own
/// SqliteStore against the same database file; writers serialize on the
/// database lock and surface [`StoreError::Busy`] once `busy_timeout` expires.
pub struct SqliteStore {
    conn: Connection,
    vocabulary: LinkVocabulary,
}

impl SqliteStore {
    /// Open (and migrate) the database at `path` with no busy timeout
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open(path, Duration::ZERO)
    }

    /// Open a fresh in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, Duration::ZERO)
    }

    /// Open the database at `path`, waiting up to `busy_timeout` for locks
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        if path != Path::new(":memory:") {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            tracing::debug!(path = %path.display(), journal_mode = %mode, "Opened database");
        }
        Self::from_connection(conn, busy_timeout)
    }

    fn from_connection(conn: Connection, busy_timeout: Duration) -> Result<Self, StoreError> {
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        articles::register_functions(&conn)?;
        let mut store = Self {
            conn,
            vocabulary: LinkVocabulary::default(),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Restrict the link types this store accepts
    pub fn with_link_vocabulary(mut self, vocabulary: LinkVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

/// Current timestamp in seconds since Unix epoch
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Wrap a decode failure so it can travel through rusqlite row mappers
pub(crate) fn conversion_error(
    column: usize,
    ty: rusqlite::types::Type,
    e: DomainError,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(e))
}

/// Read an id stored as a 16-byte blob
pub(crate) fn id_column(row: &Row<'_>, column: usize) -> rusqlite::Result<IdentityId> {
    let bytes: Vec<u8> = row.get(column)?;
    IdentityId::from_bytes(&bytes)
        .map_err(|e| conversion_error(column, rusqlite::types::Type::Blob, e))
}

/// Read a category stored by name
pub(crate) fn category_column(row: &Row<'_>, column: usize) -> rusqlite::Result<Category> {
    let name: String = row.get(column)?;
    Category::parse(&name).ok_or_else(|| {
        conversion_error(
            column,
            rusqlite::types::Type::Text,
            DomainError::InvalidArgument(format!("Unknown category: {}", name)),
        )
    })
}

/// Columns selected by [`identity_from_row`], in order
pub(crate) const IDENTITY_COLUMNS: &str =
    "id, key, ref_id, cluster, label, category, user, timestamp";

/// Map a row selected with [`IDENTITY_COLUMNS`]
pub(crate) fn identity_from_row(row: &Row<'_>) -> rusqlite::Result<Identity> {
    Ok(Identity {
        id: id_column(row, 0)?,
        key: row.get(1)?,
        ref_id: row.get(2)?,
        cluster: id_column(row, 3)?,
        label: row.get(4)?,
        category: category_column(row, 5)?,
        user: row.get(6)?,
        timestamp: row.get::<_, i64>(7)? as u64,
    })
}
