//! Weekly rewards batch pipeline for the Gemdrop protocol.
//!
//! Wires the pure computation in `rewards` to the external collaborators
//! (leaderboard source, holdings source, wallet resolver) and the ledger,
//! and commits the resulting claim set into a Merkle tree once per week:
//!
//! ranker -> reward curve -> splitter (per builder) -> aggregator ->
//! wallet resolution -> Merkle commitment
//!
//! The pipeline is a single-pass batch computation. It only reads
//! leaderboard and holding data and writes a brand-new commitment keyed
//! by week; re-running a committed week is rejected rather than silently
//! replacing a root that may already be referenced on-chain.
//!
//! # Key Components
//!
//! - [`WeeklyPipeline`]: the batch orchestrator
//! - [`LeaderboardSource`] / [`HoldingsSource`] / [`WalletResolver`]:
//!   async collaborator traits, mockable in tests
//! - [`verify_proof`]: re-exported for clients pre-validating a claim
//!   before submitting it on-chain

pub mod error;
pub mod sources;
pub mod weekly;

// Re-export main types
pub use error::{PipelineError, Result};
pub use sources::{
    HoldingsSource, LeaderboardSource, MissingWalletPolicy, SourceError, WalletResolver,
};
pub use weekly::WeeklyPipeline;

// Clients verify claims against a committed root with this
pub use merkle::verify_proof;
