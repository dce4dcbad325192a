//! Identity module - one fingerprint occurring in one article

use crate::{Category, DomainError};
use std::fmt;

/// Unique identifier for an identity based on UUIDv7
///
/// UUIDv7 values sort by creation time, so comparing two ids is a stable,
/// reproducible total order. The cluster graph uses it to pick merge winners:
/// the lower id (the older identity) always survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityId(u128);

/// A cluster is named by the id of its root identity
pub type ClusterId = IdentityId;

impl IdentityId {
    /// Generate a new UUIDv7-based IdentityId
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweb_domain::IdentityId;
    ///
    /// let id = IdentityId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an IdentityId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an IdentityId from its hyphenated or simple UUID form
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweb_domain::IdentityId;
    ///
    /// let id = IdentityId::new();
    /// let parsed = IdentityId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| DomainError::InvalidArgument(format!("Invalid identity id '{}': {}", s, e)))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Big-endian bytes; byte order equals numeric order
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Rebuild an id from the big-endian bytes produced by [`IdentityId::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            DomainError::InvalidArgument(format!(
                "Expected 16 bytes for IdentityId, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(u128::from_be_bytes(arr)))
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// "This fingerprint occurred in this article."
///
/// `cluster` always holds the root of the identity's cluster. A fresh identity
/// is its own root (`cluster == id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable identifier, assigned on first upsert
    pub id: IdentityId,

    /// Normalized fingerprint, e.g. `person:putin-vladimir`
    pub key: String,

    /// Article the fingerprint occurred in
    pub ref_id: String,

    /// Root of the cluster this identity belongs to
    pub cluster: ClusterId,

    /// Display label for this occurrence
    pub label: String,

    /// Category for this occurrence
    pub category: Category,

    /// Curator who last asserted label/category, if any
    pub user: Option<String>,

    /// Last write, seconds since Unix epoch
    pub timestamp: u64,
}

impl Identity {
    /// Create a new singleton identity (its own cluster root)
    pub fn new(
        key: String,
        ref_id: String,
        label: String,
        category: Category,
        user: Option<String>,
        timestamp: u64,
    ) -> Self {
        let id = IdentityId::new();
        Self {
            id,
            key,
            ref_id,
            cluster: id,
            label,
            category,
            user,
            timestamp,
        }
    }

    /// Whether this identity is the root of its cluster
    pub fn is_root(&self) -> bool {
        self.cluster == self.id
    }
}
