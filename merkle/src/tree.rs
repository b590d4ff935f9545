//! Sorted-pair Merkle tree construction, proofs and verification.

use sha2::{Digest, Sha256};
use tracing::debug;

use rewards::ClaimEntry;

use crate::error::{MerkleError, Result};
use crate::leaf::leaf_hash;

/// Hash two sibling digests after sorting them, so a verifier folding a
/// proof never needs left/right position information.
fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// Merkle tree over a weekly claim set.
///
/// Leaves are sorted ascending by digest before construction; an odd node
/// at any level is promoted unchanged rather than paired with itself.
/// Together with sorted-pair hashing this makes the root a pure function
/// of the claim set, independent of input ordering.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// Node digests per level, leaves first
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Build the tree for a claim set.
    ///
    /// Fails on an empty set; a committed week always has at least one
    /// claim or no commitment at all.
    pub fn build(claims: &[ClaimEntry]) -> Result<Self> {
        if claims.is_empty() {
            return Err(MerkleError::EmptyClaimSet);
        }

        let mut leaves: Vec<[u8; 32]> = claims.iter().map(leaf_hash).collect();
        leaves.sort_unstable();
        leaves.dedup();

        let mut levels = vec![leaves];
        while levels.last().map(Vec::len).unwrap_or(0) > 1 {
            let current = levels.last().ok_or(MerkleError::EmptyClaimSet)?;
            let mut next = Vec::with_capacity(current.len().div_ceil(2));

            for pair in current.chunks(2) {
                match pair {
                    [left, right] => next.push(hash_pair(left, right)),
                    // Odd node: promote unchanged
                    [single] => next.push(*single),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                }
            }
            levels.push(next);
        }

        debug!(
            leaves = levels[0].len(),
            depth = levels.len(),
            "Built Merkle tree"
        );
        Ok(Self { levels })
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// The 32-byte root digest.
    pub fn root(&self) -> [u8; 32] {
        // Construction guarantees a final level with exactly one node
        self.levels[self.levels.len() - 1][0]
    }

    /// The root as a 64-character lowercase hex string.
    pub fn root_hex(&self) -> String {
        hex::encode(self.root())
    }

    /// Sibling-hash path from a claim's leaf up to the root.
    ///
    /// Levels where the node was promoted without a sibling contribute
    /// nothing to the proof.
    pub fn proof_for(&self, claim: &ClaimEntry) -> Result<Vec<[u8; 32]>> {
        let target = leaf_hash(claim);
        let mut index = self.levels[0]
            .binary_search(&target)
            .map_err(|_| MerkleError::UnknownLeaf(claim.address.to_string()))?;

        let mut proof = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            index /= 2;
        }
        Ok(proof)
    }
}

/// Recompute the root by folding a proof against the claim's leaf hash
/// and compare it to an expected root.
///
/// Returns `false` for any mismatch (tampered amount, foreign proof,
/// wrong root); never errors.
pub fn verify_proof(proof: &[[u8; 32]], claim: &ClaimEntry, root: &[u8; 32]) -> bool {
    let mut node = leaf_hash(claim);
    for sibling in proof {
        node = hash_pair(&node, sibling);
    }
    node == *root
}
