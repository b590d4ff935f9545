//! Error types for reward computation.

/// Error types for the rewards crate.
#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    /// Week identifier did not match the `YYYY-WNN` format
    #[error("Invalid week identifier: {0}")]
    InvalidWeek(String),

    /// Wallet address string could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Normalization was requested for a week with no ranked builders
    #[error("No ranked builders with weekly activity")]
    NoWeeklyActivity,
}

pub type Result<T> = std::result::Result<T, RewardsError>;
