//! Scout/builder split of one rank's quota.
//!
//! A builder keeps a fixed fraction of their normalized quota; the rest is
//! divided among the scouts holding that builder's cards, proportional to
//! weighted units purchased. All flooring is per-scout with no global
//! redistribution of the remainder, so the split can never emit more than
//! the quota it was given.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::types::{BuilderSplit, CardHolding};

/// Fraction of a builder's quota earnable by their scouts.
pub const SCOUT_SHARE: f64 = 0.8;

/// Fraction of a builder's quota kept by the builder.
pub const BUILDER_SHARE: f64 = 0.2;

/// Split parameters.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Fraction of the quota earnable by scouts
    pub scout_share: f64,
    /// Fraction of the quota kept by the builder
    pub builder_share: f64,
    /// When a builder has no backers, roll the scout share into the
    /// builder's own share instead of forfeiting it. Off by default:
    /// those points stay undistributed for the week.
    pub rollover_unbacked_share: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            scout_share: SCOUT_SHARE,
            builder_share: BUILDER_SHARE,
            rollover_unbacked_share: false,
        }
    }
}

/// Divide one builder's normalized quota between the builder and their
/// backing scouts.
///
/// Holdings are weighted by [`NftType::weight`](crate::types::NftType::weight)
/// and summed per scout; each scout receives
/// `floor(earnable_scout_points * scout_weight / total_weight)`. The
/// per-scout division is exact integer arithmetic, so the floor matches
/// the real-number formula with no floating drift.
pub fn split_builder_quota(
    builder_id: Uuid,
    normalized_quota: u64,
    holdings: &[CardHolding],
    config: &SplitConfig,
) -> BuilderSplit {
    let mut scout_weights: HashMap<Uuid, u64> = HashMap::new();
    let mut total_weight: u64 = 0;

    for holding in holdings {
        let weight = holding.nft_type.weight() * holding.tokens_purchased;
        if weight > 0 {
            *scout_weights.entry(holding.scout_id).or_default() += weight;
            total_weight += weight;
        }
    }

    let mut points_for_builder = (normalized_quota as f64 * config.builder_share).floor() as u64;
    let earnable_scout_points = (normalized_quota as f64 * config.scout_share).floor() as u64;

    let mut points_per_scout = HashMap::new();
    if total_weight == 0 {
        if config.rollover_unbacked_share {
            points_for_builder += earnable_scout_points;
        } else {
            debug!(
                builder = %builder_id,
                forfeited = earnable_scout_points,
                "Builder has no backers; scout share not distributed"
            );
        }
    } else {
        for (scout_id, weight) in scout_weights {
            let share =
                (earnable_scout_points as u128 * weight as u128 / total_weight as u128) as u64;
            if share > 0 {
                points_per_scout.insert(scout_id, share);
            }
        }
    }

    BuilderSplit {
        builder_id,
        points_for_builder,
        points_per_scout,
    }
}
