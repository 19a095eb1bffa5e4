//! Proof verification.
//!
//! Pure functions, no tree required: the root is recomputed by folding the
//! siblings onto the leaf with the pair-sorted combine and compared to the
//! expected root. A mismatch is a normal `false`; only structurally invalid
//! input is an error.

use airdrop_costs::{cost_return_on_error_no_add, CostContext, CostResult, CostsExt, OperationCost};

use crate::{
    encoding::{LeafSchema, Record},
    hash::{hash_from_hex, hash_from_slice, Hash, HASH_LENGTH},
    HashAlgorithm, MerkleProof, MerkleTreeError,
};

/// Longest proof any tree addressable on this platform can produce.
pub const MAX_PROOF_LENGTH: usize = usize::BITS as usize;

/// Fold `siblings` onto `leaf`: `acc = combine(acc, sibling)` for each
/// sibling in order.
pub fn process_proof(algorithm: HashAlgorithm, leaf: &Hash, siblings: &[Hash]) -> CostContext<Hash> {
    let root = siblings
        .iter()
        .fold(*leaf, |acc, sibling| algorithm.combine(&acc, sibling));
    root.wrap_with_cost(OperationCost::with_hash_node_calls(siblings.len() as u64))
}

fn exact_hash(bytes: &[u8], what: &str) -> Result<Hash, MerkleTreeError> {
    hash_from_slice(bytes).ok_or_else(|| {
        MerkleTreeError::MalformedProof(format!(
            "{} must be {} bytes, got {}",
            what,
            HASH_LENGTH,
            bytes.len()
        ))
    })
}

fn check_proof_length(len: usize) -> Result<(), MerkleTreeError> {
    if len > MAX_PROOF_LENGTH {
        return Err(MerkleTreeError::MalformedProof(format!(
            "proof has {} siblings, at most {} are possible",
            len, MAX_PROOF_LENGTH
        )));
    }
    Ok(())
}

/// Verify a proof given as raw byte slices.
///
/// Fails with [`MerkleTreeError::MalformedProof`] if the leaf, the root or any
/// sibling is not exactly 32 bytes.
pub fn verify_proof<S: AsRef<[u8]>>(
    algorithm: HashAlgorithm,
    leaf: &[u8],
    proof: &[S],
    root: &[u8],
) -> CostResult<bool, MerkleTreeError> {
    let cost = OperationCost::default();
    let leaf = cost_return_on_error_no_add!(&cost, exact_hash(leaf, "leaf"));
    let root = cost_return_on_error_no_add!(&cost, exact_hash(root, "root"));
    cost_return_on_error_no_add!(&cost, check_proof_length(proof.len()));
    let siblings = cost_return_on_error_no_add!(
        &cost,
        proof
            .iter()
            .enumerate()
            .map(|(i, sibling)| exact_hash(sibling.as_ref(), &format!("sibling {}", i)))
            .collect::<Result<Vec<Hash>, _>>()
    );
    process_proof(algorithm, &leaf, &siblings).map(|computed| Ok(computed == root))
}

/// Verify a proof given as hex strings, as published next to an airdrop root.
pub fn verify_hex<S: AsRef<str>>(
    algorithm: HashAlgorithm,
    leaf: &str,
    proof: &[S],
    root: &str,
) -> CostResult<bool, MerkleTreeError> {
    let cost = OperationCost::default();
    let proof = cost_return_on_error_no_add!(&cost, MerkleProof::from_hex_strings(proof));
    let leaf = cost_return_on_error_no_add!(
        &cost,
        hash_from_hex(leaf).map_err(MerkleTreeError::MalformedProof)
    );
    let root = cost_return_on_error_no_add!(
        &cost,
        hash_from_hex(root).map_err(MerkleTreeError::MalformedProof)
    );
    proof.verify(algorithm, &leaf, &root).map(Ok)
}

/// Verify that `record`, encoded with `schema`, is included under `root`.
pub fn verify_record(
    algorithm: HashAlgorithm,
    schema: &LeafSchema,
    root: &Hash,
    record: &Record,
    proof: &MerkleProof,
) -> CostResult<bool, MerkleTreeError> {
    let cost = OperationCost::default();
    let leaf = cost_return_on_error_no_add!(&cost, schema.leaf_hash(algorithm, record));
    proof
        .verify(algorithm, &leaf, root)
        .map(Ok)
        .add_cost(OperationCost::with_hash_byte_calls(2))
}
