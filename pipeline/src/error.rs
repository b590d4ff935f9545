//! Error types for the weekly pipeline.

use uuid::Uuid;

use crate::sources::SourceError;

/// Error types for pipeline runs.
///
/// A weekly run either completes and commits a root or fails with one of
/// these before any commitment is persisted; there are no partial results.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reward computation error (invalid input, no weekly activity)
    #[error("Rewards error: {0}")]
    Rewards(#[from] rewards::RewardsError),

    /// Merkle commitment error
    #[error("Merkle error: {0}")]
    Merkle(#[from] merkle::MerkleError),

    /// Ledger store error
    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger::LedgerError),

    /// External collaborator failure
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The week already has an authoritative commitment
    #[error("Claims for week {0} already exist")]
    CommitmentExists(String),

    /// An earner has no registered wallet and the run policy is strict
    #[error("No wallet address registered for user {0}")]
    MissingWallet(Uuid),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
