//! Entity categories accepted from the extraction pipeline

use crate::DomainError;
use std::fmt;
use std::str::FromStr;

/// Category of a named entity
///
/// Only these three categories survive normalization; every other label the
/// recognizer emits (dates, money, works of art, ...) is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// A person
    Person,

    /// An organization
    Org,

    /// A geo-political entity (country, city, state)
    Gpe,
}

impl Category {
    /// All accepted categories
    pub const ALL: [Category; 3] = [Category::Person, Category::Org, Category::Gpe];

    /// Upper-case label as emitted by the recognizer (`PERSON`, `ORG`, `GPE`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Person => "PERSON",
            Category::Org => "ORG",
            Category::Gpe => "GPE",
        }
    }

    /// Lower-case prefix used to namespace fingerprint keys
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Category::Person => "person",
            Category::Org => "org",
            Category::Gpe => "gpe",
        }
    }

    /// Parse a recognizer label; `None` for anything outside the accepted set
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PERSON" => Some(Category::Person),
            "ORG" => Some(Category::Org),
            "GPE" => Some(Category::Gpe),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&s.to_uppercase())
            .ok_or_else(|| DomainError::InvalidArgument(format!("Unknown category: {}", s)))
    }
}
