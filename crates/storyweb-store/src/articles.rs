//! Article records: refs, sentences, tags, and the tag listing

use crate::graph::find_in;
use crate::{category_column, id_column, SqliteStore, StoreError};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, ToSql, TransactionBehavior};
use std::collections::BTreeMap;
use storyweb_domain::traits::{ArticleStore, TagQuery};
use storyweb_domain::{pick_category, pick_label, Category, Ref, RefTag, Sentence, Site, Tag};

/// Page size when a tag query does not set one
pub const DEFAULT_TAG_LIMIT: usize = 100;

fn save_ref_in(conn: &Connection, article: &Ref) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO refs (id, site, url, title) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
         site = excluded.site, url = excluded.url, title = excluded.title",
        params![&article.id, &article.site, &article.url, &article.title],
    )?;
    Ok(())
}

fn save_sentences_in(conn: &Connection, sentences: &[Sentence]) -> Result<(), StoreError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO sentences (ref_id, sequence, text) VALUES (?1, ?2, ?3)
         ON CONFLICT(ref_id, sequence) DO UPDATE SET text = excluded.text",
    )?;
    for sentence in sentences {
        stmt.execute(params![&sentence.ref_id, sentence.sequence, &sentence.text])?;
    }
    Ok(())
}

fn save_tags_in(conn: &Connection, tags: &[Tag]) -> Result<(), StoreError> {
    // Later tags win when a batch repeats (ref_id, sentence, key)
    let by_key: BTreeMap<(&str, u32, &str), &Tag> = tags
        .iter()
        .map(|t| ((t.ref_id.as_str(), t.sentence, t.key.as_str()), t))
        .collect();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO tags (ref_id, sentence, key, category, text) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(ref_id, sentence, key) DO UPDATE SET
         category = excluded.category, text = excluded.text",
    )?;
    for tag in by_key.values() {
        stmt.execute(params![
            &tag.ref_id,
            tag.sentence,
            &tag.key,
            tag.category.as_str(),
            &tag.text,
        ])?;
    }
    Ok(())
}

fn clear_ref_in(conn: &Connection, ref_id: &str) -> Result<(), StoreError> {
    conn.execute("DELETE FROM tags WHERE ref_id = ?1", params![ref_id])?;
    conn.execute("DELETE FROM sentences WHERE ref_id = ?1", params![ref_id])?;
    Ok(())
}

/// Separator for `group_concat` in the tag listing
const FIELD_SEPARATOR: char = '\u{1f}';

/// Register `fold_contains(haystack, needle)`: Unicode case-insensitive
/// substring test, with `needle` already lower-cased
pub(crate) fn register_functions(conn: &Connection) -> Result<(), StoreError> {
    conn.create_scalar_function(
        "fold_contains",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: String = ctx.get(0)?;
            let needle: String = ctx.get(1)?;
            Ok(haystack.to_lowercase().contains(&needle))
        },
    )?;
    Ok(())
}

/// Split a `group_concat` column back into its values
fn split_concat(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(FIELD_SEPARATOR)
}

/// Saturating `usize` to SQLite integer
fn sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl SqliteStore {
    /// Point read of article metadata
    pub fn get_ref(&self, ref_id: &str) -> Result<Option<Ref>, StoreError> {
        let article = self
            .conn
            .query_row(
                "SELECT id, site, url, title FROM refs WHERE id = ?1",
                params![ref_id],
                |row| {
                    Ok(Ref {
                        id: row.get(0)?,
                        site: row.get(1)?,
                        url: row.get(2)?,
                        title: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(article)
    }

    /// Stored sentences of an article, in order
    pub fn list_sentences(&self, ref_id: &str) -> Result<Vec<Sentence>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ref_id, sequence, text FROM sentences WHERE ref_id = ?1 ORDER BY sequence",
        )?;
        let sentences = stmt
            .query_map(params![ref_id], |row| {
                Ok(Sentence {
                    ref_id: row.get(0)?,
                    sequence: row.get(1)?,
                    text: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sentences)
    }

    /// Stored tags of an article, ordered by sentence then key
    pub fn list_ref_tags(&self, ref_id: &str) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ref_id, sentence, key, category, text FROM tags
             WHERE ref_id = ?1 ORDER BY sentence, key",
        )?;
        let tags = stmt
            .query_map(params![ref_id], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }
}

/// Map a `ref_id, sentence, key, category, text` row
pub(crate) fn tag_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        ref_id: row.get(0)?,
        sentence: row.get(1)?,
        key: row.get(2)?,
        category: category_column(row, 3)?,
        text: row.get(4)?,
    })
}

impl ArticleStore for SqliteStore {
    type Error = StoreError;

    fn save_ref(&mut self, article: &Ref) -> Result<(), Self::Error> {
        save_ref_in(&self.conn, article)
    }

    fn save_sentences(&mut self, sentences: &[Sentence]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        save_sentences_in(&tx, sentences)?;
        tx.commit()?;
        Ok(())
    }

    fn save_tags(&mut self, tags: &[Tag]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        save_tags_in(&tx, tags)?;
        tx.commit()?;
        Ok(())
    }

    fn clear_ref(&mut self, ref_id: &str) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        clear_ref_in(&tx, ref_id)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_article(
        &mut self,
        article: &Ref,
        sentences: &[Sentence],
        tags: &[Tag],
    ) -> Result<(), Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        save_ref_in(&tx, article)?;
        clear_ref_in(&tx, &article.id)?;
        save_sentences_in(&tx, sentences)?;
        save_tags_in(&tx, tags)?;
        tx.commit()?;

        tracing::debug!(
            ref_id = %article.id,
            sentences = sentences.len(),
            tags = tags.len(),
            "Replaced article records"
        );
        Ok(())
    }

    fn list_sites(&self) -> Result<Vec<Site>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT site, COUNT(id) FROM refs GROUP BY site ORDER BY site")?;
        let sites = stmt
            .query_map([], |row| {
                Ok(Site {
                    site: row.get(0)?,
                    ref_count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn list_tags(&self, query: &TagQuery) -> Result<Vec<RefTag>, Self::Error> {
        let mut sql = format!(
            "SELECT r.id, r.site, r.url, r.title, t.key,
                    group_concat(t.text, char({sep})), group_concat(t.category, char({sep})),
                    COUNT(*) AS mentions, i.id, i.cluster
             FROM tags t
             JOIN refs r ON r.id = t.ref_id
             LEFT JOIN identities i ON i.ref_id = t.ref_id AND i.key = t.key
             WHERE 1=1",
            sep = FIELD_SEPARATOR as u32
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        let sites: Vec<&str> = query
            .sites
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !sites.is_empty() {
            let placeholders = vec!["?"; sites.len()].join(", ");
            sql.push_str(&format!(" AND r.site IN ({})", placeholders));
            for site in sites {
                params.push(Box::new(site.to_string()));
            }
        }

        if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            sql.push_str(" AND fold_contains(t.text, ?)");
            params.push(Box::new(text.to_lowercase()));
        }

        if let Some(coref) = query.coref {
            let root = find_in(&self.conn, coref)?.to_bytes().to_vec();
            sql.push_str(
                " AND t.ref_id IN (SELECT ref_id FROM identities WHERE cluster = ?)
                  AND (i.cluster IS NULL OR i.cluster <> ?)",
            );
            params.push(Box::new(root.clone()));
            params.push(Box::new(root.clone()));

            let linked = "(SELECT target FROM links WHERE source = ?
                           UNION SELECT source FROM links WHERE target = ?)";
            match query.coref_linked {
                Some(true) => sql.push_str(&format!(" AND i.cluster IN {}", linked)),
                Some(false) => sql.push_str(&format!(
                    " AND (i.cluster IS NULL OR i.cluster NOT IN {})",
                    linked
                )),
                None => {}
            }
            if query.coref_linked.is_some() {
                params.push(Box::new(root.clone()));
                params.push(Box::new(root));
            }
        }

        sql.push_str(
            " GROUP BY t.ref_id, t.key
              ORDER BY mentions DESC, t.ref_id, t.key
              LIMIT ? OFFSET ?",
        );
        params.push(Box::new(sql_count(query.limit.unwrap_or(DEFAULT_TAG_LIMIT))));
        params.push(Box::new(sql_count(query.offset.unwrap_or(0))));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut rows = stmt.query(&param_refs[..])?;

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let key: String = row.get(4)?;
            let texts: String = row.get(5)?;
            let categories = split_concat(&row.get::<_, String>(6)?)
                .map(|name| {
                    Category::parse(name)
                        .ok_or_else(|| StoreError::InvalidData(format!("Unknown category: {}", name)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let identity = row
                .get::<_, Option<Vec<u8>>>(8)?
                .map(|_| id_column(row, 8))
                .transpose()?;
            let cluster = row
                .get::<_, Option<Vec<u8>>>(9)?
                .map(|_| id_column(row, 9))
                .transpose()?;

            results.push(RefTag {
                ref_: Ref {
                    id: row.get(0)?,
                    site: row.get(1)?,
                    url: row.get(2)?,
                    title: row.get(3)?,
                },
                text: pick_label(split_concat(&texts)).unwrap_or_else(|| key.clone()),
                category: pick_category(categories)
                    .ok_or_else(|| StoreError::InvalidData(format!("No category for {}", key)))?,
                count: row.get::<_, i64>(7)? as u64,
                key,
                identity,
                cluster,
            });
        }
        Ok(results)
    }
}
