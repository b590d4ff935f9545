//! Error types for the ledger.

use uuid::Uuid;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A receipt with this id was already recorded
    #[error("Receipt {0} already recorded")]
    DuplicateReceipt(Uuid),

    /// A commitment for this week already exists and is authoritative
    #[error("Commitment for week {0} already exists")]
    CommitmentExists(String),

    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored claim set could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (lock poisoned, invariant broken)
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
