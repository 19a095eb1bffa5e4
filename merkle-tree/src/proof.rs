//! Inclusion proofs.
//!
//! A proof is the list of sibling hashes met on the way from a leaf to the
//! root, lowest level first. Levels where the path node was promoted have no
//! sibling and contribute nothing. Since parents hash their children in
//! sorted order, no left/right markers are needed.

use airdrop_costs::{CostContext, CostResult, CostsExt, OperationCost};
use bincode::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::{
    encoding::Record,
    hash::{hash_from_hex, hex_hashes, to_hex, Hash},
    verify::{process_proof, MAX_PROOF_LENGTH},
    HashAlgorithm, MerkleTreeError, StandardMerkleTree,
};

/// Ordered sibling hashes proving one leaf against a root.
///
/// A proof does not borrow the tree it was generated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct MerkleProof {
    siblings: Vec<Hash>,
}

impl MerkleProof {
    /// Proof from sibling hashes, lowest level first.
    pub fn new(siblings: Vec<Hash>) -> Self {
        MerkleProof { siblings }
    }

    /// Sibling hashes, lowest level first.
    pub fn siblings(&self) -> &[Hash] {
        &self.siblings
    }

    /// Take the sibling hashes out.
    pub fn into_siblings(self) -> Vec<Hash> {
        self.siblings
    }

    /// Number of sibling hashes.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Whether the proof has no siblings (single-leaf tree).
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Siblings as `0x`-prefixed hex strings.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.siblings.iter().map(to_hex).collect()
    }

    /// Proof from hex strings.
    pub fn from_hex_strings<S: AsRef<str>>(strings: &[S]) -> Result<Self, MerkleTreeError> {
        if strings.len() > MAX_PROOF_LENGTH {
            return Err(MerkleTreeError::MalformedProof(format!(
                "proof has {} siblings, at most {} are possible",
                strings.len(),
                MAX_PROOF_LENGTH
            )));
        }
        strings
            .iter()
            .map(|s| hash_from_hex(s.as_ref()).map_err(MerkleTreeError::MalformedProof))
            .collect::<Result<Vec<Hash>, _>>()
            .map(MerkleProof::new)
    }

    /// Root obtained by folding this proof onto `leaf`.
    pub fn compute_root(&self, algorithm: HashAlgorithm, leaf: &Hash) -> CostContext<Hash> {
        process_proof(algorithm, leaf, &self.siblings)
    }

    /// Whether this proof links `leaf` to `root`.
    pub fn verify(&self, algorithm: HashAlgorithm, leaf: &Hash, root: &Hash) -> CostContext<bool> {
        self.compute_root(algorithm, leaf)
            .map(|computed| &computed == root)
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, MerkleTreeError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| MerkleTreeError::MalformedProof(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, MerkleTreeError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 64 * 1024 }>();
        let (proof, _): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| MerkleTreeError::MalformedProof(format!("decode error: {}", e)))?;
        if proof.len() > MAX_PROOF_LENGTH {
            return Err(MerkleTreeError::MalformedProof(format!(
                "proof has {} siblings, at most {} are possible",
                proof.len(),
                MAX_PROOF_LENGTH
            )));
        }
        Ok(proof)
    }
}

impl Serialize for MerkleProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex_hashes::serialize(&self.siblings, serializer)
    }
}

impl<'de> Deserialize<'de> for MerkleProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        hex_hashes::deserialize(deserializer).map(MerkleProof::new)
    }
}

impl StandardMerkleTree {
    /// Proof for the leaf at position `index`.
    pub fn prove_index(&self, index: usize) -> Result<MerkleProof, MerkleTreeError> {
        if index >= self.leaf_count() {
            return Err(MerkleTreeError::IndexOutOfRange {
                index,
                leaf_count: self.leaf_count(),
            });
        }

        let mut siblings = Vec::with_capacity(self.height());
        let mut position = index;
        for level in 0..self.height() {
            if let Some(sibling) = self.layout.sibling(level, position) {
                siblings.push(self.nodes[self.layout.node_index(level, sibling)]);
            }
            match self.layout.parent(level, position) {
                Some(parent) => position = parent,
                None => break,
            }
        }

        trace!(index, siblings = siblings.len(), "generated proof");
        Ok(MerkleProof::new(siblings))
    }

    /// Proof for `record`, located through the leaf lookup.
    pub fn prove_record(&self, record: &Record) -> Result<MerkleProof, MerkleTreeError> {
        self.prove_index(self.index_of(record)?)
    }

    /// One proof result per record; a failure for one record does not stop
    /// the others.
    pub fn prove_records<'a>(
        &self,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> Vec<Result<MerkleProof, MerkleTreeError>> {
        records
            .into_iter()
            .map(|record| self.prove_record(record))
            .collect()
    }

    /// Whether `proof` proves the leaf at `index` against this tree's root.
    pub fn verify_index(
        &self,
        index: usize,
        proof: &MerkleProof,
    ) -> CostResult<bool, MerkleTreeError> {
        match self.leaf(index) {
            Some(leaf) => proof
                .verify(self.algorithm, &leaf, &self.root())
                .map(Ok),
            None => Err(MerkleTreeError::IndexOutOfRange {
                index,
                leaf_count: self.leaf_count(),
            })
            .wrap_with_cost(OperationCost::default()),
        }
    }
}
