//! Cumulative per-identity totals across the full ranked set.
//!
//! The same identity can earn from multiple builders in one week (a
//! builder's own share plus scout shares from every builder they back),
//! so totals are additive across all splits, not per-builder.

use std::collections::HashMap;

use uuid::Uuid;

use crate::types::BuilderSplit;

/// Merge builder and scout shares from every split into one running
/// total per identity. Zero shares are dropped.
pub fn aggregate_splits(splits: &[BuilderSplit]) -> HashMap<Uuid, u64> {
    let mut totals: HashMap<Uuid, u64> = HashMap::new();

    for split in splits {
        if split.points_for_builder > 0 {
            *totals.entry(split.builder_id).or_default() += split.points_for_builder;
        }
        for (scout_id, points) in &split.points_per_scout {
            if *points > 0 {
                *totals.entry(*scout_id).or_default() += points;
            }
        }
    }

    totals
}
