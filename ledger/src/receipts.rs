//! Point receipts and claim settlement.
//!
//! Receipts are append-only; amounts are never updated in place. Claiming
//! settles all of a user's unclaimed receipts into their spendable balance
//! inside a single transaction, so receipts can never be marked claimed
//! without the matching balance increment (or vice versa).

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::db::{is_constraint_violation, LedgerDb};
use crate::error::{LedgerError, Result};

/// One immutable unit of the points ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsReceipt {
    /// Unique receipt id
    pub id: Uuid,
    /// Point value
    pub value: u64,
    /// User credited by this receipt
    pub recipient_id: Uuid,
    /// Optional counterparty
    pub sender_id: Option<Uuid>,
    /// Source event, e.g. `gems_payout:2026-W35`
    pub event_id: String,
    /// Season the receipt belongs to
    pub season: String,
    /// When the receipt was recorded
    pub created_at: DateTime<Utc>,
    /// Set once the receipt has been settled into the balance
    pub claimed_at: Option<DateTime<Utc>>,
}

impl PointsReceipt {
    /// Create a new unclaimed receipt.
    pub fn new(recipient_id: Uuid, value: u64, event_id: impl Into<String>, season: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
            recipient_id,
            sender_id: None,
            event_id: event_id.into(),
            season: season.into(),
            created_at: Utc::now(),
            claimed_at: None,
        }
    }

    /// Attach the sending counterparty.
    pub fn with_sender(mut self, sender_id: Uuid) -> Self {
        self.sender_id = Some(sender_id);
        self
    }
}

/// Insert one receipt row on an existing connection or transaction.
pub(crate) fn insert_receipt(conn: &rusqlite::Connection, receipt: &PointsReceipt) -> Result<()> {
    conn.execute(
        "INSERT INTO receipts (id, value, recipient_id, sender_id, event_id, season, created_at, claimed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            receipt.id.to_string(),
            receipt.value as i64,
            receipt.recipient_id.to_string(),
            receipt.sender_id.map(|id| id.to_string()),
            receipt.event_id,
            receipt.season,
            receipt.created_at.to_rfc3339(),
            receipt.claimed_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            LedgerError::DuplicateReceipt(receipt.id)
        } else {
            LedgerError::Database(e)
        }
    })?;
    Ok(())
}

impl LedgerDb {
    /// Append one receipt. Receipts are immutable; recording the same id
    /// twice is an error, never an update.
    pub fn record_receipt(&self, receipt: &PointsReceipt) -> Result<()> {
        self.with_conn(|conn| insert_receipt(conn, receipt))
    }

    /// Sum of a user's unclaimed receipt values.
    pub fn claimable_points(&self, user_id: &Uuid) -> Result<u64> {
        self.with_conn(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(value), 0) FROM receipts
                 WHERE recipient_id = ?1 AND claimed_at IS NULL",
                params![user_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(total as u64)
        })
    }

    /// A user's spendable balance.
    pub fn balance(&self, user_id: &Uuid) -> Result<u64> {
        self.with_conn(|conn| {
            let balance: Option<i64> = conn
                .query_row(
                    "SELECT balance FROM balances WHERE user_id = ?1",
                    params![user_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(balance.unwrap_or(0) as u64)
        })
    }

    /// A user's unclaimed receipts, oldest first.
    pub fn unclaimed_receipts(&self, user_id: &Uuid) -> Result<Vec<PointsReceipt>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, value, recipient_id, sender_id, event_id, season, created_at, claimed_at
                 FROM receipts
                 WHERE recipient_id = ?1 AND claimed_at IS NULL
                 ORDER BY created_at",
            )?;

            let rows = stmt.query_map(params![user_id.to_string()], row_to_receipt)?;
            let mut receipts = Vec::new();
            for row in rows {
                receipts.push(row?);
            }
            Ok(receipts)
        })
    }

    /// Settle all of a user's unclaimed receipts into their balance.
    ///
    /// One atomic transaction: select unclaimed, mark claimed, increment
    /// the balance by the sum. Returns the settled amount; a second call
    /// finds nothing left and returns 0. Rolls back wholesale on any
    /// failure.
    pub fn claim_points(&self, user_id: &Uuid) -> Result<u64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let claimed = settle_unclaimed(&tx, user_id, None)?;
            tx.commit()?;
            Ok(claimed)
        })
    }

    /// Settle unclaimed receipts restricted to the given eligible seasons.
    pub fn claim_points_for_seasons(&self, user_id: &Uuid, seasons: &[&str]) -> Result<u64> {
        if seasons.is_empty() {
            return Ok(0);
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let claimed = settle_unclaimed(&tx, user_id, Some(seasons))?;
            tx.commit()?;
            Ok(claimed)
        })
    }
}

fn settle_unclaimed(tx: &Transaction<'_>, user_id: &Uuid, seasons: Option<&[&str]>) -> Result<u64> {
    let season_filter = match seasons {
        Some(list) => {
            let placeholders = vec!["?"; list.len()].join(", ");
            format!(" AND season IN ({})", placeholders)
        }
        None => String::new(),
    };

    let mut args: Vec<String> = vec![user_id.to_string()];
    if let Some(list) = seasons {
        args.extend(list.iter().map(|s| s.to_string()));
    }

    let total: i64 = tx.query_row(
        &format!(
            "SELECT COALESCE(SUM(value), 0) FROM receipts
             WHERE recipient_id = ? AND claimed_at IS NULL{}",
            season_filter
        ),
        params_from_iter(args.iter()),
        |row| row.get(0),
    )?;

    if total == 0 {
        return Ok(0);
    }

    let now = Utc::now().to_rfc3339();
    let mut update_args: Vec<String> = vec![now, user_id.to_string()];
    if let Some(list) = seasons {
        update_args.extend(list.iter().map(|s| s.to_string()));
    }

    tx.execute(
        &format!(
            "UPDATE receipts SET claimed_at = ?
             WHERE recipient_id = ? AND claimed_at IS NULL{}",
            season_filter
        ),
        params_from_iter(update_args.iter()),
    )?;

    tx.execute(
        "INSERT INTO balances (user_id, balance) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET balance = balance + ?2",
        params![user_id.to_string(), total],
    )?;

    debug!(user = %user_id, claimed = total, "Settled unclaimed receipts");
    Ok(total as u64)
}

fn row_to_receipt(row: &rusqlite::Row<'_>) -> rusqlite::Result<PointsReceipt> {
    let id: String = row.get(0)?;
    let value: i64 = row.get(1)?;
    let recipient: String = row.get(2)?;
    let sender: Option<String> = row.get(3)?;
    let event_id: String = row.get(4)?;
    let season: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let claimed_at: Option<String> = row.get(7)?;

    Ok(PointsReceipt {
        id: parse_uuid(&id, 0)?,
        value: value as u64,
        recipient_id: parse_uuid(&recipient, 2)?,
        sender_id: match sender {
            Some(s) => Some(parse_uuid(&s, 3)?),
            None => None,
        },
        event_id,
        season,
        created_at: parse_timestamp(&created_at, 6)?,
        claimed_at: match claimed_at {
            Some(t) => Some(parse_timestamp(&t, 7)?),
            None => None,
        },
    })
}

fn parse_uuid(s: &str, column: usize) -> rusqlite::Result<Uuid> {
    s.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(s: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(user: Uuid, value: u64, season: &str) -> PointsReceipt {
        PointsReceipt::new(user, value, "gems_payout:2026-W35", season)
    }

    #[test]
    fn test_record_and_sum_claimable() {
        let db = LedgerDb::open_in_memory().unwrap();
        let user = Uuid::new_v4();

        db.record_receipt(&receipt(user, 100, "2026-S1")).unwrap();
        db.record_receipt(&receipt(user, 250, "2026-S1")).unwrap();

        assert_eq!(db.claimable_points(&user).unwrap(), 350);
        assert_eq!(db.balance(&user).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_receipt_id_is_rejected() {
        let db = LedgerDb::open_in_memory().unwrap();
        let r = receipt(Uuid::new_v4(), 100, "2026-S1");

        db.record_receipt(&r).unwrap();
        let err = db.record_receipt(&r).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateReceipt(id) if id == r.id));
    }

    #[test]
    fn test_claim_settles_exactly_the_unclaimed_sum() {
        let db = LedgerDb::open_in_memory().unwrap();
        let user = Uuid::new_v4();

        db.record_receipt(&receipt(user, 100, "2026-S1")).unwrap();
        db.record_receipt(&receipt(user, 40, "2026-S1")).unwrap();

        let claimed = db.claim_points(&user).unwrap();
        assert_eq!(claimed, 140);
        assert_eq!(db.claimable_points(&user).unwrap(), 0);
        assert_eq!(db.balance(&user).unwrap(), 140);
        assert!(db.unclaimed_receipts(&user).unwrap().is_empty());
    }

    #[test]
    fn test_second_claim_finds_nothing() {
        let db = LedgerDb::open_in_memory().unwrap();
        let user = Uuid::new_v4();

        db.record_receipt(&receipt(user, 75, "2026-S1")).unwrap();
        assert_eq!(db.claim_points(&user).unwrap(), 75);
        assert_eq!(db.claim_points(&user).unwrap(), 0);
        assert_eq!(db.balance(&user).unwrap(), 75);
    }

    #[test]
    fn test_claims_do_not_cross_users() {
        let db = LedgerDb::open_in_memory().unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        db.record_receipt(&receipt(alice, 100, "2026-S1")).unwrap();
        db.record_receipt(&receipt(bob, 30, "2026-S1")).unwrap();

        assert_eq!(db.claim_points(&alice).unwrap(), 100);
        assert_eq!(db.claimable_points(&bob).unwrap(), 30);
        assert_eq!(db.balance(&bob).unwrap(), 0);
    }

    #[test]
    fn test_season_restricted_claim() {
        let db = LedgerDb::open_in_memory().unwrap();
        let user = Uuid::new_v4();

        db.record_receipt(&receipt(user, 100, "2026-S1")).unwrap();
        db.record_receipt(&receipt(user, 60, "2026-S2")).unwrap();

        let claimed = db.claim_points_for_seasons(&user, &["2026-S1"]).unwrap();
        assert_eq!(claimed, 100);
        assert_eq!(db.claimable_points(&user).unwrap(), 60);
        assert_eq!(db.balance(&user).unwrap(), 100);
    }

    #[test]
    fn test_claim_with_no_eligible_seasons_is_a_no_op() {
        let db = LedgerDb::open_in_memory().unwrap();
        let user = Uuid::new_v4();

        db.record_receipt(&receipt(user, 100, "2026-S1")).unwrap();
        assert_eq!(db.claim_points_for_seasons(&user, &[]).unwrap(), 0);
        assert_eq!(db.claimable_points(&user).unwrap(), 100);
    }

    #[test]
    fn test_receipts_round_trip_through_sqlite() {
        let db = LedgerDb::open_in_memory().unwrap();
        let user = Uuid::new_v4();
        let sender = Uuid::new_v4();

        let r = receipt(user, 42, "2026-S1").with_sender(sender);
        db.record_receipt(&r).unwrap();

        let stored = db.unclaimed_receipts(&user).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, r.id);
        assert_eq!(stored[0].value, 42);
        assert_eq!(stored[0].sender_id, Some(sender));
        assert_eq!(stored[0].event_id, "gems_payout:2026-W35");
        assert!(stored[0].claimed_at.is_none());
    }
}
