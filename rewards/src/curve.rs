//! Rank decay curve and weekly normalization.
//!
//! Each rank receives the slice of a geometric decay curve between
//! consecutive decay levels: `budget * ((1-d)^(rank-1) - (1-d)^rank)`.
//! Summed over an infinite rank range the slices partition the budget
//! exactly; truncating at the top N ranks leaves a residual, which the
//! per-week normalization factor redistributes across the included ranks.
//!
//! The curve is computed in floating point; quotas are floored to integers
//! at the last step only, so the sum of integer payouts never exceeds the
//! weekly budget.

use tracing::debug;

use crate::error::{Result, RewardsError};
use crate::types::RankQuota;

/// Decay constant of the reward curve.
pub const GEM_DECAY: f64 = 0.03;

/// Number of ranked slots that earn points each week.
pub const DEFAULT_MAX_RANKS: u32 = 100;

/// Reward curve parameters.
#[derive(Debug, Clone)]
pub struct CurveConfig {
    /// Geometric decay constant `d`
    pub decay: f64,
    /// Top-N truncation of the ranked set
    pub max_ranks: u32,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            decay: GEM_DECAY,
            max_ranks: DEFAULT_MAX_RANKS,
        }
    }
}

/// Raw (unnormalized) quota for one rank.
pub fn raw_quota(rank: u32, weekly_budget: u64, decay: f64) -> f64 {
    let keep = 1.0 - decay;
    weekly_budget as f64 * (keep.powi(rank as i32 - 1) - keep.powi(rank as i32))
}

/// Normalization factor for one week.
///
/// Sums raw quotas over the actual ranked set (at most `max_ranks`
/// entries) and returns `budget / sum`. Computed once per week and
/// applied uniformly to every rank, so builders in different positions
/// see a consistent effective multiplier.
///
/// An empty ranked set is a distinct no-activity condition, never a
/// division by zero.
pub fn normalization_factor(ranked_count: u32, weekly_budget: u64, config: &CurveConfig) -> Result<f64> {
    if ranked_count == 0 {
        return Err(RewardsError::NoWeeklyActivity);
    }

    let included = ranked_count.min(config.max_ranks);
    let raw_sum: f64 = (1..=included)
        .map(|rank| raw_quota(rank, weekly_budget, config.decay))
        .sum();

    let factor = weekly_budget as f64 / raw_sum;
    debug!(ranked = included, factor, "Computed weekly normalization factor");
    Ok(factor)
}

/// Integer quota for one rank after normalization.
///
/// Floored, not rounded; the flooring residual is not redistributed.
pub fn normalized_quota(rank: u32, weekly_budget: u64, factor: f64, decay: f64) -> u64 {
    (raw_quota(rank, weekly_budget, decay) * factor).floor() as u64
}

/// Full quota table for one week's ranked set.
pub fn rank_quotas(ranked_count: u32, weekly_budget: u64, config: &CurveConfig) -> Result<Vec<RankQuota>> {
    let factor = normalization_factor(ranked_count, weekly_budget, config)?;
    let included = ranked_count.min(config.max_ranks);

    Ok((1..=included)
        .map(|rank| {
            let raw = raw_quota(rank, weekly_budget, config.decay);
            RankQuota {
                rank,
                raw_quota: raw,
                normalized_quota: (raw * factor).floor() as u64,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_quota_reference_values() {
        // d = 0.03, budget = 100: rank 1 gets the first decay slice,
        // rank 100 the last included one.
        let first = raw_quota(1, 100, 0.03);
        assert!((first - 3.0).abs() < 1e-9, "rank 1 quota was {first}");

        let last = raw_quota(100, 100, 0.03);
        assert!((last - 0.147).abs() < 1e-3, "rank 100 quota was {last}");
    }

    #[test]
    fn test_raw_quotas_decrease_with_rank() {
        let quotas: Vec<f64> = (1..=50).map(|r| raw_quota(r, 1000, GEM_DECAY)).collect();
        for pair in quotas.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_normalized_quotas_never_exceed_budget() {
        let config = CurveConfig::default();
        for ranked in [3u32, 17, 100, 250] {
            let quotas = rank_quotas(ranked, 100_000, &config).unwrap();
            let total: u64 = quotas.iter().map(|q| q.normalized_quota).sum();
            assert!(total <= 100_000, "{ranked} ranks paid out {total}");

            // Flooring loses strictly less than one point per rank
            let deficit = 100_000 - total;
            assert!(
                deficit < quotas.len() as u64,
                "{ranked} ranks left a deficit of {deficit}"
            );
        }
    }

    #[test]
    fn test_truncation_is_capped_at_max_ranks() {
        let config = CurveConfig::default();
        let quotas = rank_quotas(250, 100_000, &config).unwrap();
        assert_eq!(quotas.len(), DEFAULT_MAX_RANKS as usize);
    }

    #[test]
    fn test_few_builders_still_consume_the_budget() {
        // With 3 ranked builders the factor stretches their slices to
        // cover (almost all of) the budget.
        let config = CurveConfig::default();
        let quotas = rank_quotas(3, 100_000, &config).unwrap();
        let total: u64 = quotas.iter().map(|q| q.normalized_quota).sum();
        assert!(total > 99_000 && total <= 100_000, "total was {total}");
    }

    #[test]
    fn test_single_builder_takes_the_whole_budget() {
        let quotas = rank_quotas(1, 100_000, &CurveConfig::default()).unwrap();
        assert_eq!(quotas.len(), 1);
        // Floating round-trip through the factor may shave a point
        assert!(quotas[0].normalized_quota >= 99_999);
        assert!(quotas[0].normalized_quota <= 100_000);
    }

    #[test]
    fn test_empty_ranked_set_is_no_activity() {
        let err = normalization_factor(0, 100_000, &CurveConfig::default()).unwrap_err();
        assert!(matches!(err, RewardsError::NoWeeklyActivity));
    }
}
