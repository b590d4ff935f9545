//! Weekly reward computation for the Gemdrop protocol.
//!
//! This crate implements the pure-computation half of the weekly rewards
//! pipeline: ranking builders by collected gems, converting ranks into
//! point quotas along a geometric decay curve, splitting each builder's
//! quota between the builder and the scouts holding their cards, and
//! aggregating the results into per-identity totals.
//!
//! # Key Components
//!
//! - [`WeekContext`]: explicit season/week/budget value passed into every
//!   operation (never ambient state)
//! - [`rank_builders`]: deterministic leaderboard ranking with tie-breaks
//! - [`curve`]: rank decay curve and per-week normalization
//! - [`split_builder_quota`]: builder/scout split weighted by card holdings
//! - [`aggregate_splits`]: cumulative per-identity totals across the week
//!
//! # Example
//!
//! ```ignore
//! use rewards::{rank_builders, curve, split_builder_quota, aggregate_splits};
//!
//! let entries = rank_builders(stats);
//! let factor = curve::normalization_factor(entries.len() as u32, ctx.weekly_budget, &config)?;
//! let quota = curve::normalized_quota(entry.rank, ctx.weekly_budget, factor, config.decay);
//! let split = split_builder_quota(entry.builder_id, quota, &holdings, &split_config);
//! ```

pub mod aggregator;
pub mod curve;
pub mod error;
pub mod ranker;
pub mod splitter;
pub mod types;

// Re-export main types
pub use aggregator::aggregate_splits;
pub use curve::CurveConfig;
pub use error::{Result, RewardsError};
pub use ranker::rank_builders;
pub use splitter::{split_builder_quota, SplitConfig};
pub use types::*;
