//! Typed links between cluster roots

use crate::graph::find_in;
use crate::{conversion_error, current_timestamp, id_column, SqliteStore, StoreError};
use rusqlite::{params, Connection, ToSql, TransactionBehavior};
use storyweb_domain::traits::LinkGraph;
use storyweb_domain::{ClusterId, Link, LinkType};

const LINK_COLUMNS: &str = "source, target, type, user, created_at";

fn link_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Link> {
    let type_name: String = row.get(2)?;
    let link_type = type_name
        .parse::<LinkType>()
        .map_err(|e| conversion_error(2, rusqlite::types::Type::Text, e))?;
    Ok(Link {
        source: id_column(row, 0)?,
        target: id_column(row, 1)?,
        link_type,
        user: row.get(3)?,
        created_at: row.get::<_, i64>(4)? as u64,
    })
}

/// Move every link endpoint at `old` onto `new`
///
/// Links between `old` and `new` would become self-links and are dropped, as
/// are links that would duplicate an edge `new` already has.
pub(crate) fn repoint_in(conn: &Connection, old: ClusterId, new: ClusterId) -> Result<usize, StoreError> {
    if old == new {
        return Ok(0);
    }
    let old_bytes = old.to_bytes();
    let new_bytes = new.to_bytes();

    conn.execute(
        "DELETE FROM links
         WHERE (source = ?1 AND target = ?2) OR (source = ?2 AND target = ?1)",
        params![&old_bytes[..], &new_bytes[..]],
    )?;
    let moved_sources = conn.execute(
        "UPDATE OR IGNORE links SET source = ?2 WHERE source = ?1",
        params![&old_bytes[..], &new_bytes[..]],
    )?;
    let moved_targets = conn.execute(
        "UPDATE OR IGNORE links SET target = ?2 WHERE target = ?1",
        params![&old_bytes[..], &new_bytes[..]],
    )?;
    // Rows skipped by OR IGNORE duplicate an existing edge of `new`
    conn.execute(
        "DELETE FROM links WHERE source = ?1 OR target = ?1",
        params![&old_bytes[..]],
    )?;

    Ok(moved_sources + moved_targets)
}

impl LinkGraph for SqliteStore {
    type Error = StoreError;

    fn create_link(
        &mut self,
        source: ClusterId,
        target: ClusterId,
        link_type: LinkType,
        user: Option<&str>,
    ) -> Result<Link, Self::Error> {
        self.vocabulary.check(link_type)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Callers may hand us any member of a cluster; edges attach to roots
        let source = find_in(&tx, source)?;
        let target = find_in(&tx, target)?;
        let link = Link::new(
            source,
            target,
            link_type,
            user.map(str::to_string),
            current_timestamp(),
        )?;

        let created = tx.execute(
            "INSERT INTO links (source, target, type, user, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(source, target, type) DO NOTHING",
            params![
                &source.to_bytes()[..],
                &target.to_bytes()[..],
                link_type.as_str(),
                &link.user,
                link.created_at as i64,
            ],
        )?;
        let stored = tx.query_row(
            &format!(
                "SELECT {} FROM links WHERE source = ?1 AND target = ?2 AND type = ?3",
                LINK_COLUMNS
            ),
            params![&source.to_bytes()[..], &target.to_bytes()[..], link_type.as_str()],
            link_from_row,
        )?;
        tx.commit()?;

        if created > 0 {
            tracing::info!(%source, %target, link_type = %link_type, "Created link");
        }
        Ok(stored)
    }

    fn list_links(&self, clusters: &[ClusterId]) -> Result<Vec<Link>, Self::Error> {
        let mut sql = format!("SELECT {} FROM links", LINK_COLUMNS);
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if !clusters.is_empty() {
            let mut roots = clusters
                .iter()
                .map(|id| find_in(&self.conn, *id))
                .collect::<Result<Vec<_>, _>>()?;
            roots.sort();
            roots.dedup();

            let placeholders = vec!["?"; roots.len()].join(", ");
            sql.push_str(&format!(
                " WHERE source IN ({0}) OR target IN ({0})",
                placeholders
            ));
            for _ in 0..2 {
                for root in &roots {
                    params.push(Box::new(root.to_bytes().to_vec()));
                }
            }
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let links = stmt
            .query_map(&param_refs[..], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    fn repoint(&mut self, old: ClusterId, new: ClusterId) -> Result<usize, Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let moved = repoint_in(&tx, old, new)?;
        tx.commit()?;
        Ok(moved)
    }

    fn link_types(&self) -> &[LinkType] {
        self.vocabulary.all()
    }
}
