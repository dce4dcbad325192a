//! Trait definitions for storage interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    pick_category, pick_label, Category, ClusterId, Identity, IdentityId, Link, LinkType, Ref,
    RefTag, Representative, Sentence, Site, Tag,
};

/// Trait for article-level records written by ingestion
///
/// Implemented by the infrastructure layer (storyweb-store)
pub trait ArticleStore {
    /// Error type for store operations
    type Error;

    /// Insert or refresh article metadata
    fn save_ref(&mut self, article: &Ref) -> Result<(), Self::Error>;

    /// Insert or refresh sentences, keyed by `(ref_id, sequence)`
    fn save_sentences(&mut self, sentences: &[Sentence]) -> Result<(), Self::Error>;

    /// Insert or refresh tags, keyed by `(ref_id, sentence, key)`
    fn save_tags(&mut self, tags: &[Tag]) -> Result<(), Self::Error>;

    /// Remove the sentences and tags of an article ahead of re-ingestion
    fn clear_ref(&mut self, ref_id: &str) -> Result<(), Self::Error>;

    /// Replace everything stored for one article
    ///
    /// Sentences and tags from an earlier ingestion of the same ref are
    /// removed first, so mentions dropped by a newer extraction pass vanish.
    /// Implementations backed by a transactional store should override this
    /// to apply all four steps atomically.
    fn replace_article(
        &mut self,
        article: &Ref,
        sentences: &[Sentence],
        tags: &[Tag],
    ) -> Result<(), Self::Error> {
        self.save_ref(article)?;
        self.clear_ref(&article.id)?;
        self.save_sentences(sentences)?;
        self.save_tags(tags)
    }

    /// Source sites with their article counts
    fn list_sites(&self) -> Result<Vec<Site>, Self::Error>;

    /// Aggregated tags matching the query
    fn list_tags(&self, query: &TagQuery) -> Result<Vec<RefTag>, Self::Error>;
}

/// Query criteria for listing tags
#[derive(Debug, Clone, Default)]
pub struct TagQuery {
    /// Only tags from these sites (empty means all sites)
    pub sites: Vec<String>,

    /// Case-insensitive substring of the tag text
    pub text: Option<String>,

    /// Maximum results to return
    pub limit: Option<usize>,

    /// Results to skip
    pub offset: Option<usize>,

    /// Only tags from articles that mention a member of this cluster; the
    /// cluster's own tags are left out
    pub coref: Option<ClusterId>,

    /// With `coref`: `Some(true)` keeps tags whose cluster is already linked
    /// to it, `Some(false)` keeps the rest
    pub coref_linked: Option<bool>,
}

/// Trait for identity rows
///
/// Implemented by the infrastructure layer (storyweb-store)
pub trait IdentityStore {
    /// Error type for store operations
    type Error;

    /// Create the identity for `(ref_id, key)` or refresh its label and
    /// category. Never creates a duplicate and never touches `cluster`.
    ///
    /// A refresh without a `user` leaves an identity a curator has asserted
    /// unchanged.
    fn upsert_identity(
        &mut self,
        ref_id: &str,
        key: &str,
        label: &str,
        category: Category,
        user: Option<&str>,
    ) -> Result<Identity, Self::Error>;

    /// Point read by id
    fn get_identity(&self, id: IdentityId) -> Result<Option<Identity>, Self::Error>;

    /// Point read by `(ref_id, key)`
    fn get_identity_by_ref_key(
        &self,
        ref_id: &str,
        key: &str,
    ) -> Result<Option<Identity>, Self::Error>;
}

/// Trait for the partition of identities into clusters
///
/// Every identity row stores its current root directly, so `find` is a point
/// read and `merge` rewrites the losing cluster in one transaction.
pub trait ClusterGraph {
    /// Error type for graph operations
    type Error;

    /// Root of the cluster containing `id`
    fn find(&self, id: IdentityId) -> Result<ClusterId, Self::Error>;

    /// Union the clusters of `a` and `b`; the lower root wins and is returned
    fn merge(&mut self, a: IdentityId, b: IdentityId) -> Result<ClusterId, Self::Error>;

    /// Detach `id` into its own singleton cluster and return it
    fn split(&mut self, id: IdentityId) -> Result<ClusterId, Self::Error>;

    /// All identities whose root is `cluster`
    fn members(&self, cluster: ClusterId) -> Result<Vec<Identity>, Self::Error>;

    /// Identities sharing `id`'s key that sit in a different cluster
    fn merge_candidates(&self, id: IdentityId) -> Result<Vec<Identity>, Self::Error>;

    /// Merge every identity carrying `key` into one cluster (opt-in)
    fn merge_by_key(&mut self, key: &str) -> Result<Option<ClusterId>, Self::Error>;

    /// Tags of every member identity of `cluster`
    fn cluster_tags(&self, cluster: ClusterId) -> Result<Vec<Tag>, Self::Error>;

    /// Canonical label and category of `cluster`
    ///
    /// Labels and categories a curator asserted on member identities take
    /// precedence. Otherwise the choice is computed from the member tags,
    /// falling back to the identities' own labels when the tags have been
    /// cleared. `None` if the cluster has no members.
    fn represent(&self, cluster: ClusterId) -> Result<Option<Representative>, Self::Error> {
        let members = self.members(cluster)?;
        let curated: Vec<&Identity> = members.iter().filter(|i| i.user.is_some()).collect();

        let (label, category) = if !curated.is_empty() {
            (
                pick_label(curated.iter().map(|i| i.label.as_str())),
                pick_category(curated.iter().map(|i| i.category)),
            )
        } else {
            let tags = self.cluster_tags(cluster)?;
            if tags.is_empty() {
                (
                    pick_label(members.iter().map(|i| i.label.as_str())),
                    pick_category(members.iter().map(|i| i.category)),
                )
            } else {
                (
                    pick_label(tags.iter().map(|t| t.text.as_str())),
                    pick_category(tags.iter().map(|t| t.category)),
                )
            }
        };

        Ok(match (label, category) {
            (Some(label), Some(category)) => Some(Representative {
                cluster,
                label,
                category,
            }),
            _ => None,
        })
    }
}

/// Trait for typed links between clusters
pub trait LinkGraph {
    /// Error type for link operations
    type Error;

    /// Create a link, or return the existing one for `(source, target, type)`
    fn create_link(
        &mut self,
        source: ClusterId,
        target: ClusterId,
        link_type: LinkType,
        user: Option<&str>,
    ) -> Result<Link, Self::Error>;

    /// Links touching any of `clusters`, ordered by creation
    fn list_links(&self, clusters: &[ClusterId]) -> Result<Vec<Link>, Self::Error>;

    /// Move every link endpoint at `old` onto `new`
    fn repoint(&mut self, old: ClusterId, new: ClusterId) -> Result<usize, Self::Error>;

    /// The accepted link types
    fn link_types(&self) -> &[LinkType];
}
