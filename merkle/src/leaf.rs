//! Leaf hashing for claim entries.

use rewards::ClaimEntry;
use sha2::{Digest, Sha256};

/// Packed leaf encoding: 20 address bytes followed by the amount as a
/// 32-byte big-endian integer.
const LEAF_WIDTH: usize = 52;

/// Hash one claim into its leaf digest.
///
/// The encoding is fixed-width with no separators so the on-chain
/// verifier can re-derive the identical bytes from `(address, amount)`.
pub fn leaf_hash(claim: &ClaimEntry) -> [u8; 32] {
    let mut packed = [0u8; LEAF_WIDTH];
    packed[..20].copy_from_slice(claim.address.as_bytes());
    // u64 amount occupies the low 8 bytes of the 32-byte big-endian field
    packed[44..].copy_from_slice(&claim.amount.to_be_bytes());

    Sha256::digest(packed).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards::Address;

    fn claim(amount: u64) -> ClaimEntry {
        ClaimEntry {
            address: "0x00112233445566778899aabbccddeeff00112233".parse().unwrap(),
            amount,
        }
    }

    #[test]
    fn test_leaf_hash_is_deterministic() {
        assert_eq!(leaf_hash(&claim(500)), leaf_hash(&claim(500)));
    }

    #[test]
    fn test_amount_changes_the_leaf() {
        assert_ne!(leaf_hash(&claim(500)), leaf_hash(&claim(501)));
    }

    #[test]
    fn test_address_changes_the_leaf() {
        let a = claim(500);
        let b = ClaimEntry {
            address: Address::new([0x42; 20]),
            amount: 500,
        };
        assert_ne!(leaf_hash(&a), leaf_hash(&b));
    }
}
