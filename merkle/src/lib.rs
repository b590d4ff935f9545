//! Merkle commitment over a weekly claim set.
//!
//! Hashes each `(address, amount)` claim into a fixed-width leaf, builds a
//! sorted-pair Merkle tree, and produces/verifies inclusion proofs against
//! the root. The root is what the on-chain distributor holds; a user's
//! proof lets the contract verify an individual claim without trusting the
//! application server.
//!
//! Two properties the commitment relies on:
//!
//! - **Order independence**: leaves are sorted by hash before construction
//!   and sibling pairs are sorted before hashing at every level, so the
//!   same claim set produces the same root regardless of input order.
//! - **Fixed-width leaf encoding**: leaves hash the packed 20-byte address
//!   followed by the amount as a 32-byte big-endian integer, with no
//!   separators, so an on-chain verifier can re-derive them byte for byte.

pub mod commitment;
pub mod error;
pub mod leaf;
pub mod tree;

// Re-export main types
pub use commitment::MerkleCommitment;
pub use error::{MerkleError, Result};
pub use leaf::leaf_hash;
pub use tree::{verify_proof, MerkleTree};
