//! Link module - typed relationships between clusters

use crate::{ClusterId, DomainError};
use std::fmt;
use std::str::FromStr;

/// Kind of relationship between two clusters
///
/// The set is closed; [`LinkVocabulary`] decides which members a deployment
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkType {
    /// Relatives, spouses, in-laws
    Family,

    /// Work in the same organization or office
    Colleague,

    /// Business or social association
    Associate,

    /// Adversaries, rivals, litigants
    Opponent,

    /// Related in a way the curator did not classify
    Unspecified,
}

impl LinkType {
    /// Every link type, in display order
    pub const ALL: [LinkType; 5] = [
        LinkType::Family,
        LinkType::Colleague,
        LinkType::Associate,
        LinkType::Opponent,
        LinkType::Unspecified,
    ];

    /// Stable name used in storage and at the API boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Family => "FAMILY",
            LinkType::Colleague => "COLLEAGUE",
            LinkType::Associate => "ASSOCIATE",
            LinkType::Opponent => "OPPONENT",
            LinkType::Unspecified => "UNSPECIFIED",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            LinkType::Family => "Family",
            LinkType::Colleague => "Colleague",
            LinkType::Associate => "Associate",
            LinkType::Opponent => "Opponent",
            LinkType::Unspecified => "Unspecified",
        }
    }

    /// Verb phrase for rendering `source <phrase> target`
    pub fn phrase(&self) -> &'static str {
        match self {
            LinkType::Family => "is related to",
            LinkType::Colleague => "works with",
            LinkType::Associate => "is associated with",
            LinkType::Opponent => "is opposed to",
            LinkType::Unspecified => "is linked to",
        }
    }

    /// Parse a stable name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidArgument(format!("Unknown link type: {}", s)))
    }
}

/// The link types a deployment accepts
///
/// Defaults to every [`LinkType`]. Configuration may narrow it, but never
/// widen it beyond the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkVocabulary {
    types: Vec<LinkType>,
}

impl LinkVocabulary {
    /// Build a vocabulary from stable names; unknown names are rejected
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, DomainError> {
        let mut types = Vec::new();
        for name in names {
            let link_type: LinkType = name.as_ref().parse()?;
            if !types.contains(&link_type) {
                types.push(link_type);
            }
        }
        if types.is_empty() {
            return Err(DomainError::InvalidArgument(
                "Link vocabulary cannot be empty".to_string(),
            ));
        }
        types.sort();
        Ok(Self { types })
    }

    /// All accepted link types
    pub fn all(&self) -> &[LinkType] {
        &self.types
    }

    /// Whether a link type is accepted
    pub fn contains(&self, link_type: LinkType) -> bool {
        self.types.contains(&link_type)
    }

    /// Parse a name and check it against the vocabulary
    pub fn parse(&self, name: &str) -> Result<LinkType, DomainError> {
        let link_type: LinkType = name.parse()?;
        self.check(link_type)?;
        Ok(link_type)
    }

    /// Reject link types outside the vocabulary
    pub fn check(&self, link_type: LinkType) -> Result<(), DomainError> {
        if self.contains(link_type) {
            Ok(())
        } else {
            Err(DomainError::InvalidArgument(format!(
                "Link type not enabled: {}",
                link_type
            )))
        }
    }
}

impl Default for LinkVocabulary {
    fn default() -> Self {
        Self {
            types: LinkType::ALL.to_vec(),
        }
    }
}

/// A typed edge between two clusters
///
/// Endpoints are cluster roots, never raw identities, so a merge only has to
/// re-point the edges that touched the losing root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Source cluster root
    pub source: ClusterId,

    /// Target cluster root
    pub target: ClusterId,

    /// Relationship kind
    pub link_type: LinkType,

    /// Curator who created the link
    pub user: Option<String>,

    /// When the link was created, seconds since Unix epoch
    pub created_at: u64,
}

impl Link {
    /// Create a new link; self-links are rejected
    pub fn new(
        source: ClusterId,
        target: ClusterId,
        link_type: LinkType,
        user: Option<String>,
        created_at: u64,
    ) -> Result<Self, DomainError> {
        if source == target {
            return Err(DomainError::InvalidArgument(format!(
                "A cluster cannot link to itself: {}",
                source
            )));
        }
        Ok(Self {
            source,
            target,
            link_type,
            user,
            created_at,
        })
    }

    /// The endpoint opposite `cluster`, if `cluster` is one of the endpoints
    pub fn other(&self, cluster: ClusterId) -> Option<ClusterId> {
        if self.source == cluster {
            Some(self.target)
        } else if self.target == cluster {
            Some(self.source)
        } else {
            None
        }
    }
}
