//! Identity rows and the cluster graph over them
//!
//! Every identity stores its cluster root directly. Merges rewrite the losing
//! cluster wholesale, so no chain is ever longer than one hop. Roots are kept
//! at the lowest member id: merges pick the lower root, and splitting a root
//! hands the remainder to its lowest remaining member. That makes both the
//! partition and its root ids independent of merge order.

use crate::articles::tag_from_row;
use crate::links::repoint_in;
use crate::{current_timestamp, id_column, identity_from_row, SqliteStore, StoreError, IDENTITY_COLUMNS};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use storyweb_domain::traits::{ClusterGraph, IdentityStore};
use storyweb_domain::{Category, ClusterId, Identity, IdentityId, Resolution, Tag};

pub(crate) fn find_in(conn: &Connection, id: IdentityId) -> Result<ClusterId, StoreError> {
    conn.query_row(
        "SELECT cluster FROM identities WHERE id = ?1",
        params![&id.to_bytes()[..]],
        |row| id_column(row, 0),
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

/// Fold `loser` into `winner`: identities first, then links
fn absorb_in(conn: &Connection, winner: ClusterId, loser: ClusterId) -> Result<(usize, usize), StoreError> {
    let moved = conn.execute(
        "UPDATE identities SET cluster = ?1 WHERE cluster = ?2",
        params![&winner.to_bytes()[..], &loser.to_bytes()[..]],
    )?;
    let relinked = repoint_in(conn, loser, winner)?;
    Ok((moved, relinked))
}

impl SqliteStore {
    /// Resolve an identity to its cluster and that cluster's representative
    pub fn resolve(&self, id: IdentityId) -> Result<Resolution, StoreError> {
        let identity = self
            .get_identity(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let representative = self
            .represent(identity.cluster)?
            .ok_or_else(|| StoreError::NotFound(identity.cluster.to_string()))?;
        Ok(Resolution {
            identity,
            representative,
        })
    }
}

impl IdentityStore for SqliteStore {
    type Error = StoreError;

    fn upsert_identity(
        &mut self,
        ref_id: &str,
        key: &str,
        label: &str,
        category: Category,
        user: Option<&str>,
    ) -> Result<Identity, Self::Error> {
        let fresh = IdentityId::new().to_bytes();
        let sql = format!(
            "INSERT INTO identities (id, key, ref_id, cluster, label, category, user, timestamp)
             VALUES (?1, ?2, ?3, ?1, ?4, ?5, ?6, ?7)
             ON CONFLICT(ref_id, key) DO UPDATE SET
             label = excluded.label, category = excluded.category,
             user = excluded.user, timestamp = excluded.timestamp
             WHERE excluded.user IS NOT NULL OR identities.user IS NULL
             RETURNING {}",
            IDENTITY_COLUMNS
        );
        let upserted = self
            .conn
            .query_row(
                &sql,
                params![
                    &fresh[..],
                    key,
                    ref_id,
                    label,
                    category.as_str(),
                    user,
                    current_timestamp() as i64,
                ],
                identity_from_row,
            )
            .optional()?;

        match upserted {
            Some(identity) => {
                tracing::debug!(id = %identity.id, ref_id, key, "Upserted identity");
                Ok(identity)
            }
            // Curator assertions survive anonymous refreshes
            None => self
                .get_identity_by_ref_key(ref_id, key)?
                .ok_or_else(|| StoreError::NotFound(format!("{}/{}", ref_id, key))),
        }
    }

    fn get_identity(&self, id: IdentityId) -> Result<Option<Identity>, Self::Error> {
        let sql = format!("SELECT {} FROM identities WHERE id = ?1", IDENTITY_COLUMNS);
        let identity = self
            .conn
            .query_row(&sql, params![&id.to_bytes()[..]], identity_from_row)
            .optional()?;
        Ok(identity)
    }

    fn get_identity_by_ref_key(
        &self,
        ref_id: &str,
        key: &str,
    ) -> Result<Option<Identity>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM identities WHERE ref_id = ?1 AND key = ?2",
            IDENTITY_COLUMNS
        );
        let identity = self
            .conn
            .query_row(&sql, params![ref_id, key], identity_from_row)
            .optional()?;
        Ok(identity)
    }
}

impl ClusterGraph for SqliteStore {
    type Error = StoreError;

    fn find(&self, id: IdentityId) -> Result<ClusterId, Self::Error> {
        find_in(&self.conn, id)
    }

    fn merge(&mut self, a: IdentityId, b: IdentityId) -> Result<ClusterId, Self::Error> {
        // IMMEDIATE takes the write lock before the roots are read, so two
        // overlapping merges cannot both act on a stale snapshot.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let root_a = find_in(&tx, a)?;
        let root_b = find_in(&tx, b)?;
        if root_a == root_b {
            return Ok(root_a);
        }

        let (winner, loser) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        let (moved, relinked) = absorb_in(&tx, winner, loser)?;
        tx.commit()?;

        tracing::info!(%winner, %loser, moved, relinked, "Merged clusters");
        Ok(winner)
    }

    fn split(&mut self, id: IdentityId) -> Result<ClusterId, Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let root = find_in(&tx, id)?;
        let id_bytes = id.to_bytes();

        if root != id {
            tx.execute(
                "UPDATE identities SET cluster = ?1 WHERE id = ?1",
                params![&id_bytes[..]],
            )?;
            tx.commit()?;
            tracing::info!(%id, from = %root, "Split identity from cluster");
            return Ok(id);
        }

        // Splitting a root: the rest of the cluster moves to its lowest
        // remaining member, and the cluster's links follow it.
        let successor = tx
            .query_row(
                "SELECT id FROM identities WHERE cluster = ?1 AND id <> ?1 ORDER BY id LIMIT 1",
                params![&id_bytes[..]],
                |row| id_column(row, 0),
            )
            .optional()?;

        if let Some(successor) = successor {
            tx.execute(
                "UPDATE identities SET cluster = ?1 WHERE cluster = ?2 AND id <> ?2",
                params![&successor.to_bytes()[..], &id_bytes[..]],
            )?;
            let relinked = repoint_in(&tx, id, successor)?;
            tx.commit()?;
            tracing::info!(%id, %successor, relinked, "Split root from cluster");
        }

        Ok(id)
    }

    fn members(&self, cluster: ClusterId) -> Result<Vec<Identity>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM identities WHERE cluster = ?1 ORDER BY id",
            IDENTITY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let members = stmt
            .query_map(params![&cluster.to_bytes()[..]], identity_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    fn merge_candidates(&self, id: IdentityId) -> Result<Vec<Identity>, Self::Error> {
        find_in(&self.conn, id)?;
        let sql = format!(
            "SELECT {} FROM identities
             WHERE key = (SELECT key FROM identities WHERE id = ?1)
             AND cluster <> (SELECT cluster FROM identities WHERE id = ?1)
             ORDER BY id",
            IDENTITY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(params![&id.to_bytes()[..]], identity_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(candidates)
    }

    fn merge_by_key(&mut self, key: &str) -> Result<Option<ClusterId>, Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let roots: Vec<ClusterId> = {
            let mut stmt = tx.prepare(
                "SELECT DISTINCT cluster FROM identities WHERE key = ?1 ORDER BY cluster",
            )?;
            let rows = stmt.query_map(params![key], |row| id_column(row, 0))?;
            rows.collect::<Result<_, _>>()?
        };

        let Some((&winner, losers)) = roots.split_first() else {
            return Ok(None);
        };
        for &loser in losers {
            absorb_in(&tx, winner, loser)?;
        }
        tx.commit()?;

        if !losers.is_empty() {
            tracing::info!(key, %winner, absorbed = losers.len(), "Merged clusters by key");
        }
        Ok(Some(winner))
    }

    fn cluster_tags(&self, cluster: ClusterId) -> Result<Vec<Tag>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT t.ref_id, t.sentence, t.key, t.category, t.text
             FROM tags t
             JOIN identities i ON t.ref_id = i.ref_id AND t.key = i.key
             WHERE i.cluster = ?1
             ORDER BY t.ref_id, t.sentence, t.key",
        )?;
        let tags = stmt
            .query_map(params![&cluster.to_bytes()[..]], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }
}
