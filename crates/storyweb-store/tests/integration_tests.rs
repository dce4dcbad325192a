//! Integration tests for storyweb-store
//!
//! These tests exercise identity upserts, the cluster graph, representatives
//! and links against a real SQLite database.

use std::time::Duration;
use storyweb_domain::traits::{ArticleStore, ClusterGraph, IdentityStore, LinkGraph, TagQuery};
use storyweb_domain::{Category, Identity, IdentityId, LinkType, LinkVocabulary, Ref, Sentence, Tag};
use storyweb_store::{SqliteStore, StoreError};

fn person(store: &mut SqliteStore, ref_id: &str, key: &str, label: &str) -> Identity {
    store
        .upsert_identity(ref_id, key, label, Category::Person, None)
        .unwrap()
}

fn article(id: &str, site: &str) -> Ref {
    Ref {
        id: id.to_string(),
        site: site.to_string(),
        url: format!("https://{}/{}", site, id),
        title: format!("Article {}", id),
    }
}

fn tag(ref_id: &str, sentence: u32, key: &str, text: &str, category: Category) -> Tag {
    Tag {
        ref_id: ref_id.to_string(),
        sentence,
        key: key.to_string(),
        category,
        text: text.to_string(),
    }
}

fn sentence(ref_id: &str, sequence: u32) -> Sentence {
    Sentence {
        ref_id: ref_id.to_string(),
        sequence,
        text: format!("Sentence {} of {}", sequence, ref_id),
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::in_memory();
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_upsert_is_idempotent() {
    let mut store = SqliteStore::in_memory().unwrap();

    let first = person(&mut store, "ref-1", "person:putin-vladimir", "Vladimir Putin");
    assert_eq!(first.cluster, first.id, "New identity should be its own root");

    let second = person(&mut store, "ref-1", "person:putin-vladimir", "Putin Vladimir");
    assert_eq!(second.id, first.id, "Upsert must not create a duplicate");
    assert_eq!(second.label, "Putin Vladimir", "Upsert refreshes the label");

    let by_key = store
        .get_identity_by_ref_key("ref-1", "person:putin-vladimir")
        .unwrap()
        .unwrap();
    assert_eq!(by_key.id, first.id);
    assert!(store.get_identity_by_ref_key("ref-2", "person:putin-vladimir").unwrap().is_none());
}

#[test]
fn test_upsert_keeps_cluster_assignment() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:putin-vladimir", "Vladimir Putin");
    let b = person(&mut store, "ref-2", "person:putin-vladimir", "Putin Vladimir");
    let root = store.merge(a.id, b.id).unwrap();

    let refreshed = store
        .upsert_identity("ref-2", "person:putin-vladimir", "V. Putin", Category::Person, Some("curator"))
        .unwrap();
    assert_eq!(refreshed.cluster, root, "Re-ingestion must not regress the cluster");
    assert_eq!(refreshed.user.as_deref(), Some("curator"));
}

#[test]
fn test_find_unknown_identity() {
    let mut store = SqliteStore::in_memory().unwrap();
    let unknown = IdentityId::new();

    assert!(matches!(store.find(unknown), Err(StoreError::NotFound(_))));
    assert!(store.get_identity(unknown).unwrap().is_none());

    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let err = store.merge(a.id, unknown).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert!(!err.is_retryable());
    assert!(matches!(store.split(unknown), Err(StoreError::NotFound(_))));
}

#[test]
fn test_merge_is_idempotent() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-2", "person:a-b", "B A");

    let once = store.merge(a.id, b.id).unwrap();
    let twice = store.merge(a.id, b.id).unwrap();
    let reversed = store.merge(b.id, a.id).unwrap();

    assert_eq!(once, twice);
    assert_eq!(once, reversed);
    assert_eq!(once, a.id.min(b.id), "Lower root wins");
    assert_eq!(store.members(once).unwrap().len(), 2);
}

#[test]
fn test_split_then_remerge_restores_membership() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-2", "person:a-b", "A B");
    let c = person(&mut store, "ref-3", "person:a-b", "A B");
    store.merge(a.id, b.id).unwrap();
    let root = store.merge(b.id, c.id).unwrap();
    let before: Vec<IdentityId> = store.members(root).unwrap().iter().map(|i| i.id).collect();

    for x in [a.id, b.id, c.id] {
        assert_eq!(store.split(x).unwrap(), x);
        assert_eq!(store.find(x).unwrap(), x);

        let other = [a.id, b.id, c.id].into_iter().find(|id| *id != x).unwrap();
        let remainder_root = store.find(other).unwrap();
        assert_ne!(remainder_root, x, "Remainder must not keep the split id as root");

        let restored = store.merge(x, remainder_root).unwrap();
        assert_eq!(restored, root);
        let after: Vec<IdentityId> = store.members(restored).unwrap().iter().map(|i| i.id).collect();
        assert_eq!(after, before);
    }
}

#[test]
fn test_merge_candidates_and_merge_by_key() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:putin-vladimir", "Vladimir Putin");
    let b = person(&mut store, "ref-2", "person:putin-vladimir", "Putin Vladimir");
    let c = person(&mut store, "ref-3", "person:putin-vladimir", "Vladimir Putin");
    let other = person(&mut store, "ref-1", "person:merkel-angela", "Angela Merkel");

    // Same key across refs is only a candidate; nothing merges on its own
    let candidates: Vec<IdentityId> = store.merge_candidates(a.id).unwrap().iter().map(|i| i.id).collect();
    assert_eq!(candidates.len(), 2);
    assert!(candidates.contains(&b.id) && candidates.contains(&c.id));
    assert_eq!(store.find(b.id).unwrap(), b.id);

    let root = store.merge_by_key("person:putin-vladimir").unwrap().unwrap();
    assert_eq!(root, a.id.min(b.id).min(c.id));
    assert_eq!(store.members(root).unwrap().len(), 3);
    assert!(store.merge_candidates(a.id).unwrap().is_empty());
    assert_eq!(store.find(other.id).unwrap(), other.id);

    assert_eq!(store.merge_by_key("person:nobody-known").unwrap(), None);
}

#[test]
fn test_represent_is_stable_and_uses_tags() {
    let mut store = SqliteStore::in_memory().unwrap();
    store
        .replace_article(
            &article("ref-1", "example.org"),
            &[sentence("ref-1", 0), sentence("ref-1", 1)],
            &[
                tag("ref-1", 0, "person:putin-vladimir", "Vladimir Putin", Category::Person),
                tag("ref-1", 1, "person:putin-vladimir", "Vladimir Putin", Category::Person),
            ],
        )
        .unwrap();
    store
        .replace_article(
            &article("ref-2", "example.com"),
            &[sentence("ref-2", 0)],
            &[tag("ref-2", 0, "person:putin-vladimir", "Putin Vladimir", Category::Org)],
        )
        .unwrap();
    let a = person(&mut store, "ref-1", "person:putin-vladimir", "Vladimir Putin");
    let b = person(&mut store, "ref-2", "person:putin-vladimir", "Putin Vladimir");
    let root = store.merge(a.id, b.id).unwrap();

    let first = store.represent(root).unwrap().unwrap();
    assert_eq!(first.label, "Vladimir Putin", "Two mentions beat one");
    assert_eq!(first.category, Category::Person);
    for _ in 0..5 {
        assert_eq!(store.represent(root).unwrap().unwrap(), first);
    }
}

#[test]
fn test_represent_falls_back_to_identity_labels() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = store
        .upsert_identity("ref-1", "org:nato", "NATO", Category::Org, None)
        .unwrap();
    let rep = store.represent(a.id).unwrap().unwrap();
    assert_eq!(rep.label, "NATO");
    assert_eq!(rep.category, Category::Org);

    assert!(store.represent(IdentityId::new()).unwrap().is_none());
}

#[test]
fn test_link_validation() {
    let mut store = SqliteStore::in_memory()
        .unwrap()
        .with_link_vocabulary(LinkVocabulary::from_names(&["FAMILY"]).unwrap());
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-1", "person:c-d", "C D");

    assert_eq!(store.link_types(), &[LinkType::Family]);

    let disabled = store.create_link(a.id, b.id, LinkType::Opponent, None);
    assert!(matches!(disabled, Err(StoreError::InvalidArgument(_))));

    let self_link = store.create_link(a.id, a.id, LinkType::Family, None);
    assert!(matches!(self_link, Err(StoreError::InvalidArgument(_))));

    let missing = store.create_link(a.id, IdentityId::new(), LinkType::Family, None);
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    assert!(store.list_links(&[]).unwrap().is_empty());
}

#[test]
fn test_create_link_is_idempotent() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-1", "person:c-d", "C D");

    let first = store.create_link(a.id, b.id, LinkType::Family, Some("curator")).unwrap();
    let again = store.create_link(a.id, b.id, LinkType::Family, Some("someone-else")).unwrap();
    assert_eq!(first, again, "Re-creating a link returns the existing one");

    store.create_link(a.id, b.id, LinkType::Colleague, None).unwrap();
    assert_eq!(store.list_links(&[a.id]).unwrap().len(), 2);
}

#[test]
fn test_link_repoint_on_merge() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-1", "person:c-d", "C D");
    let c = person(&mut store, "ref-2", "person:a-b", "A B");

    store.create_link(a.id, b.id, LinkType::Family, None).unwrap();
    let root = store.merge(a.id, c.id).unwrap();
    let loser = if root == a.id { c.id } else { a.id };

    let links = store.list_links(&[c.id]).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].source, root);
    assert_eq!(links[0].target, b.id);
    assert_eq!(links[0].link_type, LinkType::Family);

    for link in store.list_links(&[]).unwrap() {
        assert_ne!(link.source, loser);
        assert_ne!(link.target, loser);
    }
}

#[test]
fn test_merge_drops_links_that_become_self_links_or_duplicates() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-2", "person:a-b", "A B");
    let target = person(&mut store, "ref-1", "person:c-d", "C D");

    store.create_link(a.id, b.id, LinkType::Associate, None).unwrap();
    store.create_link(a.id, target.id, LinkType::Family, None).unwrap();
    store.create_link(b.id, target.id, LinkType::Family, None).unwrap();

    let root = store.merge(a.id, b.id).unwrap();
    let links = store.list_links(&[root]).unwrap();
    assert_eq!(links.len(), 1, "Self-link and duplicate edge are dropped");
    assert_eq!(links[0].source, root);
    assert_eq!(links[0].target, target.id);
}

#[test]
fn test_split_root_moves_links_with_remainder() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-2", "person:a-b", "A B");
    let target = person(&mut store, "ref-1", "person:c-d", "C D");
    let root = store.merge(a.id, b.id).unwrap();
    store.create_link(root, target.id, LinkType::Colleague, None).unwrap();

    store.split(root).unwrap();
    let remainder = if root == a.id { b.id } else { a.id };
    assert!(store.list_links(&[root]).unwrap().is_empty());
    let links = store.list_links(&[remainder]).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].source, remainder);
}

#[test]
fn test_replace_article_clears_previous_tags() {
    let mut store = SqliteStore::in_memory().unwrap();
    let r = article("ref-1", "example.org");
    store
        .replace_article(
            &r,
            &[sentence("ref-1", 0), sentence("ref-1", 1)],
            &[
                tag("ref-1", 0, "org:nato", "NATO", Category::Org),
                tag("ref-1", 1, "gpe:russia", "Russia", Category::Gpe),
                tag("ref-1", 1, "gpe:russia", "RUSSIA", Category::Gpe),
            ],
        )
        .unwrap();
    let tags = store.list_ref_tags("ref-1").unwrap();
    assert_eq!(tags.len(), 2, "Duplicate (ref, sentence, key) collapses");
    assert_eq!(tags[1].key, "gpe:russia");
    assert_eq!(tags[1].text, "RUSSIA", "Later duplicate wins");

    store
        .replace_article(&r, &[sentence("ref-1", 0)], &[tag("ref-1", 0, "org:nato", "NATO", Category::Org)])
        .unwrap();
    assert_eq!(store.list_ref_tags("ref-1").unwrap().len(), 1);
    assert_eq!(store.list_sentences("ref-1").unwrap().len(), 1);
    assert_eq!(store.get_ref("ref-1").unwrap(), Some(r));
}

#[test]
fn test_list_sites_and_tags() {
    let mut store = SqliteStore::in_memory().unwrap();
    store
        .replace_article(
            &article("ref-1", "b.example"),
            &[sentence("ref-1", 0), sentence("ref-1", 1)],
            &[
                tag("ref-1", 0, "person:putin-vladimir", "Vladimir Putin", Category::Person),
                tag("ref-1", 1, "person:putin-vladimir", "Putin", Category::Person),
                tag("ref-1", 1, "org:nato", "NATO", Category::Org),
            ],
        )
        .unwrap();
    store
        .replace_article(
            &article("ref-2", "a.example"),
            &[sentence("ref-2", 0)],
            &[tag("ref-2", 0, "org:nato", "NATO", Category::Org)],
        )
        .unwrap();
    let identity = person(&mut store, "ref-1", "person:putin-vladimir", "Vladimir Putin");

    let sites = store.list_sites().unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].site, "a.example");
    assert_eq!(sites[0].ref_count, 1);

    let all = store.list_tags(&TagQuery::default()).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].key, "person:putin-vladimir", "Highest count first");
    assert_eq!(all[0].count, 2);
    assert_eq!(all[0].text, "Vladimir Putin");
    assert_eq!(all[0].identity, Some(identity.id));
    assert_eq!(all[0].cluster, Some(identity.id));

    let by_site = store
        .list_tags(&TagQuery {
            sites: vec!["a.example".to_string()],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_site.len(), 1);
    assert_eq!(by_site[0].ref_.id, "ref-2");
    assert_eq!(by_site[0].identity, None);

    let by_text = store
        .list_tags(&TagQuery {
            text: Some("putin".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].category, Category::Person);

    let paged = store
        .list_tags(&TagQuery {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].key, "org:nato");
}

#[test]
fn test_curator_label_represents_cluster() {
    let mut store = SqliteStore::in_memory().unwrap();
    for ref_id in ["ref-1", "ref-2"] {
        store
            .replace_article(
                &article(ref_id, "example.org"),
                &[sentence(ref_id, 0)],
                &[tag(ref_id, 0, "person:biden-joe", "Joe Biden", Category::Person)],
            )
            .unwrap();
    }
    let a = person(&mut store, "ref-1", "person:biden-joe", "Joe Biden");
    let b = person(&mut store, "ref-2", "person:biden-joe", "Joe Biden");
    let root = store.merge(a.id, b.id).unwrap();
    assert_eq!(store.represent(root).unwrap().unwrap().label, "Joe Biden");

    store
        .upsert_identity("ref-2", "person:biden-joe", "Joseph R. Biden", Category::Person, Some("editor"))
        .unwrap();
    let rep = store.represent(root).unwrap().unwrap();
    assert_eq!(rep.label, "Joseph R. Biden");
    assert_eq!(rep.category, Category::Person);

    // Re-ingestion refreshes without a user and must not undo the curator
    let refreshed = person(&mut store, "ref-2", "person:biden-joe", "Joe Biden");
    assert_eq!(refreshed.label, "Joseph R. Biden");
    assert_eq!(refreshed.user.as_deref(), Some("editor"));
    assert_eq!(store.represent(root).unwrap().unwrap().label, "Joseph R. Biden");
}

#[test]
fn test_list_tags_text_filter_folds_unicode_case() {
    let mut store = SqliteStore::in_memory().unwrap();
    store
        .replace_article(
            &article("ref-1", "example.fr"),
            &[sentence("ref-1", 0)],
            &[
                tag("ref-1", 0, "gpe:elysee-palace", "\u{c9}lys\u{e9}e Palace", Category::Gpe),
                tag("ref-1", 0, "org:stra-verlag", "STRA\u{df}E Verlag", Category::Org),
            ],
        )
        .unwrap();

    let hits = store
        .list_tags(&TagQuery {
            text: Some("\u{e9}lys\u{e9}e".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].key, "gpe:elysee-palace");

    let upper = store
        .list_tags(&TagQuery {
            text: Some("\u{c9}LYS\u{c9}E".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(upper.len(), 1);

    let wildcard = store
        .list_tags(&TagQuery {
            text: Some("%".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert!(wildcard.is_empty(), "Query text is matched literally");
}

#[test]
fn test_list_tags_pages_follow_full_order() {
    let mut store = SqliteStore::in_memory().unwrap();
    for (n, mentions) in [3u32, 1, 2, 2, 1].into_iter().enumerate() {
        let ref_id = format!("ref-{}", n);
        let sentences: Vec<Sentence> = (0..mentions).map(|i| sentence(&ref_id, i)).collect();
        let tags: Vec<Tag> = (0..mentions)
            .map(|i| tag(&ref_id, i, "org:nato", "NATO", Category::Org))
            .collect();
        store
            .replace_article(&article(&ref_id, "example.org"), &sentences, &tags)
            .unwrap();
    }

    let all = store.list_tags(&TagQuery::default()).unwrap();
    let counts: Vec<u64> = all.iter().map(|t| t.count).collect();
    assert_eq!(counts, vec![3, 2, 2, 1, 1]);
    assert_eq!(all[1].ref_.id, "ref-2", "Equal counts order by ref id");

    let mut paged = Vec::new();
    for page in 0..3 {
        paged.extend(
            store
                .list_tags(&TagQuery {
                    limit: Some(2),
                    offset: Some(page * 2),
                    ..Default::default()
                })
                .unwrap(),
        );
    }
    assert_eq!(paged, all);
}

#[test]
fn test_list_tags_cooccurring_with_cluster() {
    let mut store = SqliteStore::in_memory().unwrap();
    let mentions: [(&str, &[(&str, &str, Category)]); 3] = [
        (
            "ref-1",
            &[
                ("person:putin-vladimir", "Vladimir Putin", Category::Person),
                ("org:nato", "NATO", Category::Org),
                ("gpe:russia", "Russia", Category::Gpe),
            ],
        ),
        (
            "ref-2",
            &[
                ("person:putin-vladimir", "Vladimir Putin", Category::Person),
                ("org:kremlin", "Kremlin", Category::Org),
            ],
        ),
        ("ref-3", &[("org:nato", "NATO", Category::Org)]),
    ];
    let mut ids = std::collections::HashMap::new();
    for (ref_id, tags) in mentions {
        let tags: Vec<Tag> = tags
            .iter()
            .map(|(key, text, category)| tag(ref_id, 0, key, text, *category))
            .collect();
        store
            .replace_article(&article(ref_id, "example.org"), &[sentence(ref_id, 0)], &tags)
            .unwrap();
        for t in &tags {
            let identity = store
                .upsert_identity(ref_id, &t.key, &t.text, t.category, None)
                .unwrap();
            ids.insert((ref_id, t.key.clone()), identity.id);
        }
    }
    let putin_1 = ids[&("ref-1", "person:putin-vladimir".to_string())];
    let putin_2 = ids[&("ref-2", "person:putin-vladimir".to_string())];
    let nato_1 = ids[&("ref-1", "org:nato".to_string())];
    let putin = store.merge(putin_1, putin_2).unwrap();
    store.create_link(nato_1, putin_2, LinkType::Associate, None).unwrap();

    let keys = |linked: Option<bool>| -> Vec<(String, String)> {
        let mut keys: Vec<(String, String)> = store
            .list_tags(&TagQuery {
                coref: Some(putin_2),
                coref_linked: linked,
                ..Default::default()
            })
            .unwrap()
            .into_iter()
            .map(|t| (t.ref_.id, t.key))
            .collect();
        keys.sort();
        keys
    };
    let pair = |r: &str, k: &str| (r.to_string(), k.to_string());

    assert_eq!(
        keys(None),
        vec![
            pair("ref-1", "gpe:russia"),
            pair("ref-1", "org:nato"),
            pair("ref-2", "org:kremlin"),
        ],
        "Tags from articles mentioning the cluster, minus its own"
    );
    assert_eq!(keys(Some(true)), vec![pair("ref-1", "org:nato")]);
    assert_eq!(
        keys(Some(false)),
        vec![pair("ref-1", "gpe:russia"), pair("ref-2", "org:kremlin")]
    );
    assert_eq!(store.find(putin_1).unwrap(), putin);

    assert!(matches!(
        store.list_tags(&TagQuery {
            coref: Some(IdentityId::new()),
            ..Default::default()
        }),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_busy_merge_leaves_partition_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storyweb.db");

    let mut store = SqliteStore::open(&path, Duration::ZERO).unwrap();
    let a = person(&mut store, "ref-1", "person:a-b", "A B");
    let b = person(&mut store, "ref-2", "person:a-b", "A B");

    let blocker = rusqlite::Connection::open(&path).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

    let err = store.merge(a.id, b.id).unwrap_err();
    assert!(matches!(err, StoreError::Busy(_)), "got {:?}", err);
    assert!(err.is_retryable());
    assert_eq!(store.find(a.id).unwrap(), a.id);
    assert_eq!(store.find(b.id).unwrap(), b.id);

    blocker.execute_batch("ROLLBACK").unwrap();
    let root = store.merge(a.id, b.id).unwrap();
    assert_eq!(store.find(a.id).unwrap(), root);
    assert_eq!(store.find(b.id).unwrap(), root);
}

#[test]
fn test_reopen_preserves_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storyweb.db");

    let (a, b, root) = {
        let mut store = SqliteStore::new(&path).unwrap();
        let a = person(&mut store, "ref-1", "person:a-b", "A B");
        let b = person(&mut store, "ref-2", "person:a-b", "A B");
        let root = store.merge(a.id, b.id).unwrap();
        (a, b, root)
    };

    let store = SqliteStore::new(&path).unwrap();
    assert_eq!(store.find(a.id).unwrap(), root);
    assert_eq!(store.find(b.id).unwrap(), root);
}
