use thiserror::Error;

/// Errors from Merkle tree construction, proving, verification and loading.
#[derive(Debug, Error)]
pub enum MerkleTreeError {
    /// A record could not be encoded with the declared field types.
    #[error("encoding error: {0}")]
    Encoding(String),
    /// A tree was requested for zero records.
    #[error("cannot build a tree from zero records")]
    EmptyInput,
    /// Two records produced the same leaf hash.
    #[error("records {first} and {second} produce the same leaf {leaf}")]
    DuplicateLeaf {
        /// Position of the first occurrence.
        first: usize,
        /// Position of the repeated record.
        second: usize,
        /// The shared leaf hash, as hex.
        leaf: String,
    },
    /// A proof was requested for a leaf position the tree does not have.
    #[error("leaf index {index} out of range (leaf count {leaf_count})")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },
    /// A proof was requested for a record the tree does not contain.
    #[error("record not found in tree")]
    RecordNotFound,
    /// A proof, leaf or root supplied to the verifier is structurally invalid.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// A hash algorithm name is neither `keccak256` nor `blake3`.
    #[error("unknown hash algorithm {0:?}")]
    UnknownHashAlgorithm(String),
    /// Serialized tree data failed its consistency checks.
    #[error("corrupt tree: {0}")]
    CorruptTree(String),
}
