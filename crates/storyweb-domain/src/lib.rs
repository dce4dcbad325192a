//! Storyweb Domain Layer
//!
//! Core model for turning per-article entity mentions into curated identities
//! and a relationship graph between them. This crate holds no storage or I/O
//! code; it defines the value types, the representative picker, and the trait
//! interfaces the storage layer implements.
//!
//! ## Key Concepts
//!
//! - **Tag**: a normalized mention of an entity in one sentence of an article
//! - **Identity**: one fingerprint occurring in one article
//! - **Cluster**: identities believed to denote the same real-world entity,
//!   named by their root identity id
//! - **Link**: a typed relationship between two clusters
//!
//! ## Architecture
//!
//! - Pure business logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all storage interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod article;
pub mod category;
pub mod error;
pub mod identity;
pub mod link;
pub mod represent;
pub mod traits;

// Re-exports for convenience
pub use article::{Mention, Ref, RefTag, Sentence, Site, Tag};
pub use category::Category;
pub use error::DomainError;
pub use identity::{ClusterId, Identity, IdentityId};
pub use link::{Link, LinkType, LinkVocabulary};
pub use represent::{pick_category, pick_label, pick_mode, Representative, Resolution};
