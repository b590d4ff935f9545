//! Weekly leaderboard ranking.
//!
//! Builders are ranked by gems collected, descending. Ties are broken by
//! the earliest qualifying event timestamp (earlier wins), then by display
//! name ascending, so the resulting order is fully deterministic given the
//! same input rows.

use tracing::debug;

use crate::types::{BuilderStats, LeaderboardEntry};

/// Rank builders for one week.
///
/// Builders with zero gems are dropped before ranking. Ranks are assigned
/// as `index + 1` after the deterministic sort: contiguous, 1-based, no
/// shared ranks even on exact ties. An empty input yields an empty
/// leaderboard; downstream normalization treats that as zero budget.
pub fn rank_builders(mut stats: Vec<BuilderStats>) -> Vec<LeaderboardEntry> {
    stats.retain(|s| s.gems_collected > 0);

    stats.sort_by(|a, b| {
        b.gems_collected
            .cmp(&a.gems_collected)
            .then_with(|| a.earliest_event_at.cmp(&b.earliest_event_at))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    debug!(ranked = stats.len(), "Ranked weekly leaderboard");

    stats
        .into_iter()
        .enumerate()
        .map(|(index, s)| LeaderboardEntry {
            builder_id: s.builder_id,
            rank: (index + 1) as u32,
            gems_collected: s.gems_collected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn stats(name: &str, gems: u64, hour: u32) -> BuilderStats {
        BuilderStats {
            builder_id: Uuid::new_v4(),
            display_name: name.to_string(),
            gems_collected: gems,
            earliest_event_at: Utc.with_ymd_and_hms(2026, 8, 24, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_ranks_by_gems_descending() {
        let ranked = rank_builders(vec![
            stats("alice", 50, 0),
            stats("bob", 200, 0),
            stats("carol", 120, 0),
        ]);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].gems_collected, 200);
        assert_eq!(ranked[1].gems_collected, 120);
        assert_eq!(ranked[2].gems_collected, 50);
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_earlier_event_wins_ties() {
        let early = stats("late-name", 100, 1);
        let late = stats("early-name", 100, 9);
        let early_id = early.builder_id;

        let ranked = rank_builders(vec![late, early]);
        assert_eq!(ranked[0].builder_id, early_id);
    }

    #[test]
    fn test_display_name_breaks_remaining_ties() {
        let a = stats("anna", 100, 3);
        let z = stats("zoe", 100, 3);
        let a_id = a.builder_id;

        let ranked = rank_builders(vec![z, a]);
        assert_eq!(ranked[0].builder_id, a_id);
    }

    #[test]
    fn test_zero_gem_builders_are_dropped() {
        let ranked = rank_builders(vec![stats("idle", 0, 0), stats("active", 10, 0)]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn test_empty_input_yields_empty_leaderboard() {
        assert!(rank_builders(vec![]).is_empty());
    }

    #[test]
    fn test_ranks_are_contiguous_on_exact_ties() {
        let ranked = rank_builders(vec![
            stats("anna", 100, 3),
            stats("zoe", 100, 3),
            stats("mia", 100, 3),
        ]);
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
