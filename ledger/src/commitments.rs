//! Weekly commitment rows.
//!
//! One row per week, keyed by the week identifier. A stored commitment is
//! authoritative: its root may already be referenced on-chain, so inserts
//! for an existing week fail rather than replace the row.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use merkle::MerkleCommitment;
use rewards::ClaimEntry;

use crate::db::{is_constraint_violation, LedgerDb};
use crate::receipts::PointsReceipt;
use crate::error::{LedgerError, Result};

/// Insert the commitment row on an existing connection or transaction.
fn insert_commitment_row(conn: &rusqlite::Connection, commitment: &MerkleCommitment) -> Result<()> {
    let claims_json = serde_json::to_string(&commitment.claims)?;

    conn.execute(
        "INSERT INTO commitments (week, season, merkle_tree_root, total_claimable, claims_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            commitment.week,
            commitment.season,
            commitment.merkle_tree_root,
            commitment.total_claimable as i64,
            claims_json,
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            LedgerError::CommitmentExists(commitment.week.clone())
        } else {
            LedgerError::Database(e)
        }
    })?;
    Ok(())
}

impl LedgerDb {
    /// Persist a week's commitment. Fails with
    /// [`LedgerError::CommitmentExists`] if the week already has one.
    pub fn insert_commitment(&self, commitment: &MerkleCommitment) -> Result<()> {
        self.with_conn(|conn| {
            insert_commitment_row(conn, commitment)?;

            info!(
                week = %commitment.week,
                root = %commitment.merkle_tree_root,
                total_claimable = commitment.total_claimable,
                claims = commitment.claims.len(),
                "Persisted weekly commitment"
            );
            Ok(())
        })
    }

    /// Persist a week's receipts and its commitment in one transaction.
    ///
    /// Receipt rows go in before the commitment row, and the unique week
    /// key is enforced inside the same transaction: if the week already
    /// has a commitment (including one committed by a racing run after
    /// the caller's pre-check), every receipt rolls back with it, so a
    /// failed run can never inflate claimable points.
    pub fn commit_week(
        &self,
        receipts: &[PointsReceipt],
        commitment: &MerkleCommitment,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            for receipt in receipts {
                crate::receipts::insert_receipt(&tx, receipt)?;
            }
            insert_commitment_row(&tx, commitment)?;

            tx.commit()?;

            info!(
                week = %commitment.week,
                root = %commitment.merkle_tree_root,
                total_claimable = commitment.total_claimable,
                claims = commitment.claims.len(),
                receipts = receipts.len(),
                "Persisted weekly commitment"
            );
            Ok(())
        })
    }

    /// Load the commitment for a week, if one was persisted.
    pub fn get_commitment(&self, week: &str) -> Result<Option<MerkleCommitment>> {
        self.with_conn(|conn| {
            let row: Option<(String, String, i64, String)> = conn
                .query_row(
                    "SELECT season, merkle_tree_root, total_claimable, claims_json
                     FROM commitments WHERE week = ?1",
                    params![week],
                    |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                    },
                )
                .optional()?;

            match row {
                Some((season, root, total, claims_json)) => {
                    let claims: Vec<ClaimEntry> = serde_json::from_str(&claims_json)?;
                    Ok(Some(MerkleCommitment {
                        season,
                        week: week.to_string(),
                        merkle_tree_root: root,
                        total_claimable: total as u64,
                        claims,
                    }))
                }
                None => Ok(None),
            }
        })
    }
}
