//! Persisted tree format.
//!
//! A [`TreeDump`] carries the flat node array, the hash function, the field
//! types of the leaf encoding and every record with the flat index of its
//! leaf. Loading recomputes nothing it does not have to check: every leaf is
//! re-derived from its record and every internal node from its children
//! before the tree is handed out.

use airdrop_costs::{cost_return_on_error, cost_return_on_error_no_add, CostResult, CostsExt, OperationCost};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    encoding::{LeafSchema, Record},
    hash::{hash_from_hex, to_hex, Hash},
    tree::{index_leaves, TreeLayout},
    HashAlgorithm, MerkleTreeError, StandardMerkleTree,
};

/// Format tag written into every dump.
pub const DUMP_FORMAT: &str = "promoted-v1";

/// One record of a dump and the flat index of its leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct DumpedValue {
    /// String form of every field.
    pub value: Vec<String>,
    /// Flat index of the record's leaf in `tree`.
    pub tree_index: usize,
}

/// Serializable form of a [`StandardMerkleTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct TreeDump {
    /// Always [`DUMP_FORMAT`].
    pub format: String,
    /// Hash function of the tree.
    #[serde(default)]
    pub hash: HashAlgorithm,
    /// Solidity type names of the record fields.
    pub leaf_encoding: Vec<String>,
    /// Flat node array, root first, as hex.
    pub tree: Vec<String>,
    /// Records in leaf order.
    pub values: Vec<DumpedValue>,
}

fn corrupt(e: impl std::fmt::Display) -> MerkleTreeError {
    MerkleTreeError::CorruptTree(e.to_string())
}

impl TreeDump {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, MerkleTreeError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MerkleTreeError::Encoding(format!("json encode error: {}", e)))
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, MerkleTreeError> {
        serde_json::from_str(json).map_err(|e| corrupt(format!("json decode error: {}", e)))
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, MerkleTreeError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| MerkleTreeError::Encoding(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, MerkleTreeError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 1024 * 1024 * 1024 }>(); // 1GB limit
        let (dump, _): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| corrupt(format!("decode error: {}", e)))?;
        Ok(dump)
    }
}

impl StandardMerkleTree {
    /// Serializable form of this tree.
    pub fn dump(&self) -> TreeDump {
        TreeDump {
            format: DUMP_FORMAT.to_string(),
            hash: self.algorithm,
            leaf_encoding: self.schema.type_names(),
            tree: self.nodes.iter().map(to_hex).collect(),
            values: self
                .entries()
                .map(|(index, record)| DumpedValue {
                    value: record.to_strings(),
                    tree_index: self.layout.leaf_node_index(index),
                })
                .collect(),
        }
    }

    /// Rebuild a tree from its dump.
    ///
    /// Every inconsistency fails with [`MerkleTreeError::CorruptTree`]: an
    /// unknown format, unparseable fields or hashes, a node count that does
    /// not fit the number of records, records pointing outside the leaf level
    /// or at the same leaf, duplicate leaves, leaves that are not the hash of
    /// their record and internal nodes that are not the hash of their
    /// children.
    pub fn load(dump: TreeDump) -> CostResult<Self, MerkleTreeError> {
        let mut cost = OperationCost::default();

        if dump.format != DUMP_FORMAT {
            return Err(corrupt(format!("unknown format {:?}", dump.format))).wrap_with_cost(cost);
        }
        let schema = cost_return_on_error_no_add!(
            &cost,
            LeafSchema::parse(&dump.leaf_encoding).map_err(corrupt)
        );
        if dump.values.is_empty() {
            return Err(corrupt("dump has no values")).wrap_with_cost(cost);
        }

        let layout = TreeLayout::new(dump.values.len());
        if dump.tree.len() != layout.node_count() {
            return Err(corrupt(format!(
                "{} values need {} nodes, dump has {}",
                dump.values.len(),
                layout.node_count(),
                dump.tree.len()
            )))
            .wrap_with_cost(cost);
        }
        let nodes = cost_return_on_error_no_add!(
            &cost,
            dump.tree
                .iter()
                .map(|s| hash_from_hex(s).map_err(corrupt))
                .collect::<Result<Vec<Hash>, _>>()
        );

        let mut slots: Vec<Option<Record>> = vec![None; layout.leaf_count()];
        for entry in &dump.values {
            let leaf = cost_return_on_error_no_add!(
                &cost,
                layout.leaf_of_node(entry.tree_index).ok_or_else(|| corrupt(format!(
                    "tree index {} is not a leaf",
                    entry.tree_index
                )))
            );
            if slots[leaf].is_some() {
                return Err(corrupt(format!(
                    "tree index {} is used twice",
                    entry.tree_index
                )))
                .wrap_with_cost(cost);
            }
            let record = cost_return_on_error_no_add!(
                &cost,
                schema.parse_record(&entry.value).map_err(corrupt)
            );
            slots[leaf] = Some(record);
        }
        let values = cost_return_on_error_no_add!(
            &cost,
            slots
                .into_iter()
                .collect::<Option<Vec<Record>>>()
                .ok_or_else(|| corrupt("a leaf has no record"))
        );

        let leaf_lookup = cost_return_on_error_no_add!(
            &cost,
            index_leaves(&nodes[layout.leaf_node_index(0)..]).map_err(corrupt)
        );

        let tree = StandardMerkleTree {
            algorithm: dump.hash,
            schema,
            layout,
            nodes,
            values,
            leaf_lookup,
        };
        cost_return_on_error!(&mut cost, tree.validate());

        debug!(
            leaf_count = tree.leaf_count(),
            algorithm = %tree.algorithm,
            root = %tree.root_hex(),
            "loaded merkle tree"
        );
        Ok(tree).wrap_with_cost(cost)
    }
}
