//! Hashing strategy shared by leaves and internal nodes.

use std::{fmt, str::FromStr};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::MerkleTreeError;

/// Length in bytes of every node hash.
pub const HASH_LENGTH: usize = 32;

/// A node hash.
pub type Hash = [u8; HASH_LENGTH];

/// Hash function used for every node of a tree.
///
/// Picked once when the tree is built and carried by the tree and its dump,
/// so proofs are always checked with the function that produced them.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Ethereum Keccak-256, compatible with on-chain verifiers.
    #[default]
    Keccak256,
    /// Blake3.
    Blake3,
}

impl HashAlgorithm {
    /// Name used in dumps.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Keccak256 => "keccak256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Hash arbitrary bytes.
    pub fn hash(&self, data: &[u8]) -> Hash {
        match self {
            HashAlgorithm::Keccak256 => Keccak256::digest(data).into(),
            HashAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
        }
    }

    /// Leaf value of an encoded record: `H(H(encoded))`.
    ///
    /// The double hash keeps a leaf from ever being a valid 64-byte internal
    /// node preimage.
    pub fn leaf_hash(&self, encoded: &[u8]) -> Hash {
        self.hash(&self.hash(encoded))
    }

    /// Combine two node hashes into their parent: `H(min(a, b) || max(a, b))`.
    ///
    /// `combine(a, b) == combine(b, a)`, which is what lets proofs omit
    /// left/right markers.
    pub fn combine(&self, a: &Hash, b: &Hash) -> Hash {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut input = [0u8; 2 * HASH_LENGTH];
        input[..HASH_LENGTH].copy_from_slice(first);
        input[HASH_LENGTH..].copy_from_slice(second);
        self.hash(&input)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = MerkleTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keccak256" | "keccak" => Ok(HashAlgorithm::Keccak256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            _ => Err(MerkleTreeError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

/// Render a hash as `0x`-prefixed lowercase hex.
pub fn to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Interpret a byte slice as a node hash.
pub fn hash_from_slice(bytes: &[u8]) -> Option<Hash> {
    bytes.try_into().ok()
}

/// Parse a 32-byte hash from hex, with or without the `0x` prefix.
pub fn hash_from_hex(s: &str) -> Result<Hash, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let mut hash = [0u8; HASH_LENGTH];
    hex::decode_to_slice(digits, &mut hash)
        .map_err(|e| format!("invalid hash {:?}: {}", s, e))?;
    Ok(hash)
}

/// Serde adapter storing a list of hashes as hex strings.
pub(crate) mod hex_hashes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{hash_from_hex, to_hex, Hash};

    pub fn serialize<S: Serializer>(hashes: &[Hash], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(hashes.iter().map(to_hex))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Hash>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| hash_from_hex(s).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            to_hex(&HashAlgorithm::Keccak256.hash(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_combine_is_symmetric() {
        for algorithm in [HashAlgorithm::Keccak256, HashAlgorithm::Blake3] {
            let a = algorithm.hash(b"a");
            let b = algorithm.hash(b"b");
            assert_eq!(algorithm.combine(&a, &b), algorithm.combine(&b, &a));
            assert_ne!(algorithm.combine(&a, &b), algorithm.combine(&a, &a));
        }
    }

    #[test]
    fn test_combine_hashes_sorted_concatenation() {
        let low = [0x01u8; 32];
        let high = [0xffu8; 32];
        let mut input = Vec::with_capacity(64);
        input.extend_from_slice(&low);
        input.extend_from_slice(&high);
        let expected = *blake3::hash(&input).as_bytes();
        assert_eq!(HashAlgorithm::Blake3.combine(&high, &low), expected);
    }

    #[test]
    fn test_algorithms_differ() {
        assert_ne!(
            HashAlgorithm::Keccak256.hash(b"leaf"),
            HashAlgorithm::Blake3.hash(b"leaf")
        );
    }

    #[test]
    fn test_hex_roundtrip_and_errors() {
        let hash = HashAlgorithm::Blake3.hash(b"x");
        assert_eq!(hash_from_hex(&to_hex(&hash)), Ok(hash));
        assert_eq!(hash_from_hex(&hex::encode(hash)), Ok(hash));
        assert!(hash_from_hex("0x1234").is_err());
        assert!(hash_from_hex(&format!("0x{}", "zz".repeat(32))).is_err());
    }

    #[test]
    fn test_algorithm_names() {
        for algorithm in [HashAlgorithm::Keccak256, HashAlgorithm::Blake3] {
            assert_eq!(algorithm.name().parse::<HashAlgorithm>().ok(), Some(algorithm));
        }
        assert_matches!(
            "sha256".parse::<HashAlgorithm>(),
            Err(MerkleTreeError::UnknownHashAlgorithm(name)) if name == "sha256"
        );
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Keccak256);
    }
}
