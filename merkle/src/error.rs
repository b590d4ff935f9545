//! Error types for Merkle commitment construction.

/// Error types for the merkle crate.
#[derive(Debug, thiserror::Error)]
pub enum MerkleError {
    /// A tree was requested over zero claims
    #[error("Cannot build a Merkle tree over an empty claim set")]
    EmptyClaimSet,

    /// A proof was requested for a claim that is not in the tree
    #[error("Claim {0} is not a leaf of this tree")]
    UnknownLeaf(String),
}

pub type Result<T> = std::result::Result<T, MerkleError>;
