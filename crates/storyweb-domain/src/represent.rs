//! Representative picker - canonical label and category of a cluster
//!
//! Curators see the label chosen here everywhere a cluster is shown, so the
//! choice must not drift between repeated reads. Everything routes through
//! [`pick_mode`], whose ordering is:
//!
//! 1. highest frequency
//! 2. most whitespace-separated tokens
//! 3. most characters
//! 4. lexicographically smallest
//!
//! Blank values are ignored.

use crate::{Category, ClusterId, Identity};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Canonical view of a cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representative {
    /// Cluster root
    pub cluster: ClusterId,

    /// Most common display text
    pub label: String,

    /// Most common category
    pub category: Category,
}

/// An identity together with the canonical view of its cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The identity as stored
    pub identity: Identity,

    /// Representative of the identity's current cluster
    pub representative: Representative,
}

/// Most frequent value with a deterministic tie-break
///
/// # Examples
///
/// ```
/// use storyweb_domain::pick_mode;
///
/// // Frequency wins
/// assert_eq!(pick_mode(["Putin", "Vladimir Putin", "Putin"]), Some("Putin".to_string()));
///
/// // Ties go to the longer name, then to the alphabetically first one
/// assert_eq!(pick_mode(["Putin", "Vladimir Putin"]), Some("Vladimir Putin".to_string()));
/// assert_eq!(pick_mode(["Vladimir Putin", "Putin Vladimir"]), Some("Putin Vladimir".to_string()));
/// ```
pub fn pick_mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by_key(|(value, count)| {
            (
                *count,
                value.split_whitespace().count(),
                value.chars().count(),
                Reverse(*value),
            )
        })
        .map(|(value, _)| value.to_string())
}

/// Display label for a set of texts
pub fn pick_label<'a, I>(texts: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    pick_mode(texts)
}

/// Category for a set of category observations
pub fn pick_category<I>(categories: I) -> Option<Category>
where
    I: IntoIterator<Item = Category>,
{
    let names: Vec<&'static str> = categories.into_iter().map(|c| c.as_str()).collect();
    pick_mode(names.iter().copied()).and_then(|name| Category::parse(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_prefers_frequency() {
        let texts = ["V. Putin", "Vladimir Putin", "V. Putin"];
        assert_eq!(pick_mode(texts), Some("V. Putin".to_string()));
    }

    #[test]
    fn test_tie_prefers_more_tokens() {
        let texts = ["Angela Dorothea Merkel", "Angela Merkel"];
        assert_eq!(pick_mode(texts), Some("Angela Dorothea Merkel".to_string()));
    }

    #[test]
    fn test_tie_prefers_more_characters() {
        let texts = ["Joe Biden", "Joseph Biden"];
        assert_eq!(pick_mode(texts), Some("Joseph Biden".to_string()));
    }

    #[test]
    fn test_tie_prefers_lexicographically_smallest() {
        let texts = ["Vladimir Putin", "Putin Vladimir"];
        assert_eq!(pick_mode(texts), Some("Putin Vladimir".to_string()));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = ["Vladimir Putin", "Putin Vladimir", "Putin"];
        let b = ["Putin", "Putin Vladimir", "Vladimir Putin"];
        assert_eq!(pick_mode(a), pick_mode(b));
    }

    #[test]
    fn test_blank_values_ignored() {
        assert_eq!(pick_mode(["", "  "]), None);
        assert_eq!(pick_mode(["", "NATO", " "]), Some("NATO".to_string()));
        assert_eq!(pick_mode(std::iter::empty::<&str>()), None);
    }

    #[test]
    fn test_pick_category() {
        let categories = [Category::Org, Category::Person, Category::Person];
        assert_eq!(pick_category(categories), Some(Category::Person));

        // GPE < ORG < PERSON alphabetically
        assert_eq!(pick_category([Category::Person, Category::Gpe]), Some(Category::Gpe));
        assert_eq!(pick_category(Vec::new()), None);
    }
}
