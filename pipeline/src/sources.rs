//! External collaborator traits.
//!
//! The pipeline never talks to the application database or chain
//! directly; it reads through these seams, which makes the whole weekly
//! run testable against in-memory fixtures. Retries and timeouts belong
//! to the implementations, not to the pipeline.

use async_trait::async_trait;
use uuid::Uuid;

use rewards::{Address, BuilderStats, CardHolding, WeekContext};

/// Error types for collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Collaborator is not reachable
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Collaborator returned something the pipeline cannot use
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Weekly leaderboard data source.
#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    /// All approved builders with their gems and earliest qualifying
    /// event for the week.
    async fn weekly_stats(&self, ctx: &WeekContext)
        -> Result<Vec<BuilderStats>, SourceError>;
}

/// Card-holding data source.
#[async_trait]
pub trait HoldingsSource: Send + Sync {
    /// All holdings of one builder's collectible within the season.
    async fn holdings(
        &self,
        builder_id: Uuid,
        season: &str,
    ) -> Result<Vec<CardHolding>, SourceError>;
}

/// On-chain wallet address lookup.
#[async_trait]
pub trait WalletResolver: Send + Sync {
    /// The registered wallet for a user, or `None` if they have none.
    async fn wallet_address(&self, user_id: Uuid) -> Result<Option<Address>, SourceError>;
}

/// What a run does when an earner has no registered wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingWalletPolicy {
    /// Log a warning and drop that identity's points from the week's
    /// commitment (forfeited, not carried over).
    #[default]
    WarnAndSkip,
    /// Fail the whole run loudly.
    Fail,
}
