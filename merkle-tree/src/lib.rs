//! Merkle tree over airdrop eligibility records.
//!
//! Records are tuples of statically typed fields (the airdrop schema is
//! `(address, uint256 index, uint256 amount)`), encoded one 32-byte word per
//! field. A leaf is the double hash of the encoding, parents hash their two
//! children in sorted order:
//!
//! `leaf = H(H(encode(record)))`, `parent = H(min(a, b) || max(a, b))`
//!
//! Levels with an odd number of nodes promote the last node unchanged. The
//! hash function (Keccak-256 by default, or Blake3) is chosen when the tree
//! is built and travels with the tree and its dump.
//!
//! Operations that hash return a [`CostResult`] reporting how many hash calls
//! they made.

#![warn(missing_docs)]

mod codec;
mod encoding;
mod error;
pub(crate) mod hash;
mod proof;
pub(crate) mod tree;
mod verify;


pub use airdrop_costs::{CostContext, CostResult, OperationCost};
pub use codec::{DumpedValue, TreeDump, DUMP_FORMAT};
pub use encoding::{FieldType, LeafSchema, Record, Value, Word, WORD_LENGTH};
pub use error::MerkleTreeError;
pub use hash::{hash_from_hex, to_hex, Hash, HashAlgorithm, HASH_LENGTH};
pub use primitive_types::U256;
pub use proof::MerkleProof;
pub use tree::{StandardMerkleTree, TreeLayout};
pub use verify::{process_proof, verify_hex, verify_proof, verify_record, MAX_PROOF_LENGTH};
