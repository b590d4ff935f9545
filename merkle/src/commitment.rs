//! Persisted weekly commitment: root, totals and the full claim list.

use serde::{Deserialize, Serialize};

use rewards::ClaimEntry;

use crate::error::Result;
use crate::tree::MerkleTree;

/// The committed output of one weekly run.
///
/// Immutable once published: the root may already be referenced by the
/// on-chain distributor, so a week's commitment is never regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleCommitment {
    /// Season the week belongs to
    pub season: String,
    /// Week identifier
    pub week: String,
    /// Merkle root as a 64-character hex digest
    pub merkle_tree_root: String,
    /// Sum of all claim amounts
    pub total_claimable: u64,
    /// The full committed claim set
    pub claims: Vec<ClaimEntry>,
}

impl MerkleCommitment {
    /// Build the commitment for a week's claim set.
    ///
    /// The commitment is over the claim *set*: exact duplicate entries
    /// collapse to one before totals are summed, matching the single
    /// leaf the tree commits to.
    pub fn build(season: &str, week: &str, mut claims: Vec<ClaimEntry>) -> Result<Self> {
        claims.sort_unstable_by_key(|c| (c.address, c.amount));
        claims.dedup();

        let tree = MerkleTree::build(&claims)?;
        Ok(Self {
            season: season.to_string(),
            week: week.to_string(),
            merkle_tree_root: tree.root_hex(),
            total_claimable: claims.iter().map(|c| c.amount).sum(),
            claims,
        })
    }

    /// Rebuild the tree from the stored claim set, e.g. to cross-check
    /// an independently recomputed root against the committed one.
    pub fn rebuild_tree(&self) -> Result<MerkleTree> {
        MerkleTree::build(&self.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards::Address;

    fn claim_set() -> Vec<ClaimEntry> {
        (1u8..=6)
            .map(|i| ClaimEntry {
                address: Address::new([i; 20]),
                amount: 50 * i as u64,
            })
            .collect()
    }

    #[test]
    fn test_commitment_totals_and_root() {
        let commitment = MerkleCommitment::build("2026-S1", "2026-W35", claim_set()).unwrap();
        assert_eq!(commitment.total_claimable, 50 + 100 + 150 + 200 + 250 + 300);
        assert_eq!(commitment.merkle_tree_root.len(), 64);
    }

    #[test]
    fn test_rebuilt_tree_reproduces_the_committed_root() {
        let commitment = MerkleCommitment::build("2026-S1", "2026-W35", claim_set()).unwrap();
        let tree = commitment.rebuild_tree().unwrap();
        assert_eq!(tree.root_hex(), commitment.merkle_tree_root);
    }

    #[test]
    fn test_duplicate_claims_collapse_before_totalling() {
        let mut claims = claim_set();
        claims.push(claims[0]);

        let commitment = MerkleCommitment::build("2026-S1", "2026-W35", claims).unwrap();

        // The stored total agrees with the committed set, which holds
        // the duplicated entry once.
        assert_eq!(commitment.claims.len(), 6);
        assert_eq!(
            commitment.total_claimable,
            commitment.claims.iter().map(|c| c.amount).sum::<u64>()
        );
        assert_eq!(
            commitment.merkle_tree_root,
            MerkleCommitment::build("2026-S1", "2026-W35", claim_set())
                .unwrap()
                .merkle_tree_root
        );
    }

    #[test]
    fn test_commitment_json_shape() {
        let commitment = MerkleCommitment::build("2026-S1", "2026-W35", claim_set()).unwrap();
        let json = serde_json::to_value(&commitment).unwrap();
        assert_eq!(json["week"], "2026-W35");
        assert!(json["claims"].as_array().unwrap().len() == 6);
        assert!(json["merkle_tree_root"].is_string());
    }
}
