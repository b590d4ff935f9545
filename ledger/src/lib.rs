//! SQLite-backed points ledger and weekly commitment store.
//!
//! The ledger is the off-chain bookkeeping side of the weekly pipeline:
//! immutable point receipts per user, a claim operation that settles all
//! of a user's unclaimed receipts into their spendable balance inside one
//! transaction, and the per-week Merkle commitment rows (unique per week,
//! never replaced).
//!
//! ## Tables
//!
//! - `receipts` - append-only point receipts (`claimed_at IS NULL` means
//!   unclaimed)
//! - `balances` - spendable balance per user
//! - `commitments` - one committed claim set per week, keyed by week

pub mod commitments;
pub mod db;
pub mod error;
pub mod receipts;
pub mod schema;

// Re-export main types
pub use db::LedgerDb;
pub use error::{LedgerError, Result};
pub use receipts::PointsReceipt;
