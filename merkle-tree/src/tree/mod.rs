//! Tree construction.
//!
//! Leaves are the double hashes of the encoded records, kept in input order.
//! Each level is reduced to the next by combining adjacent pairs; the last
//! node of an odd-sized level is promoted to the next level unchanged (never
//! duplicated). The reduction stops at a single node, the root.

mod layout;

use std::collections::HashMap;

use airdrop_costs::{cost_return_on_error_no_add, CostContext, CostResult, CostsExt, OperationCost};
use itertools::Itertools;
pub use layout::TreeLayout;
use tracing::{debug, trace};

use crate::{
    encoding::{LeafSchema, Record},
    hash::{to_hex, Hash},
    HashAlgorithm, MerkleTreeError,
};

/// An immutable Merkle tree over a sequence of records.
///
/// Nodes are stored in one flat array, root first, with the shape given by
/// [`TreeLayout`]. The tree also keeps the records in leaf order and a
/// reverse map from leaf hash to leaf position.
#[derive(Debug, Clone)]
pub struct StandardMerkleTree {
    pub(crate) algorithm: HashAlgorithm,
    pub(crate) schema: LeafSchema,
    pub(crate) layout: TreeLayout,
    pub(crate) nodes: Vec<Hash>,
    pub(crate) values: Vec<Record>,
    pub(crate) leaf_lookup: HashMap<Hash, usize>,
}

impl StandardMerkleTree {
    /// Build a Keccak-256 tree over `values`, in the given order.
    pub fn of(values: Vec<Record>, schema: LeafSchema) -> CostResult<Self, MerkleTreeError> {
        Self::of_with_algorithm(values, schema, HashAlgorithm::Keccak256)
    }

    /// Build a tree over `values` hashed with `algorithm`.
    ///
    /// Fails with [`MerkleTreeError::EmptyInput`] for zero records, with
    /// [`MerkleTreeError::Encoding`] if a record does not fit the schema and
    /// with [`MerkleTreeError::DuplicateLeaf`] if two records share a leaf.
    pub fn of_with_algorithm(
        values: Vec<Record>,
        schema: LeafSchema,
        algorithm: HashAlgorithm,
    ) -> CostResult<Self, MerkleTreeError> {
        let mut cost = OperationCost::default();
        if values.is_empty() {
            return Err(MerkleTreeError::EmptyInput).wrap_with_cost(cost);
        }

        let leaves = cost_return_on_error_no_add!(&cost, hash_leaves(algorithm, &schema, &values));
        cost.hash_byte_calls += 2 * leaves.len() as u64;
        let leaf_lookup = cost_return_on_error_no_add!(&cost, index_leaves(&leaves));

        let layout = TreeLayout::new(leaves.len());
        let nodes = build_nodes(algorithm, &layout, leaves).unwrap_add_cost(&mut cost);

        debug!(
            leaf_count = layout.leaf_count(),
            height = layout.height(),
            algorithm = %algorithm,
            root = %to_hex(&nodes[0]),
            "built merkle tree"
        );

        Ok(StandardMerkleTree {
            algorithm,
            schema,
            layout,
            nodes,
            values,
            leaf_lookup,
        })
        .wrap_with_cost(cost)
    }

    /// The root hash.
    pub fn root(&self) -> Hash {
        self.nodes[0]
    }

    /// The root hash as `0x`-prefixed hex.
    pub fn root_hex(&self) -> String {
        to_hex(&self.root())
    }

    /// Hash function of this tree.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Schema used to encode the records.
    pub fn schema(&self) -> &LeafSchema {
        &self.schema
    }

    /// Shape of the tree.
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Number of leaves (records).
    pub fn leaf_count(&self) -> usize {
        self.layout.leaf_count()
    }

    /// Number of levels above the leaves.
    pub fn height(&self) -> usize {
        self.layout.height()
    }

    /// The flat node array, root first.
    pub fn nodes(&self) -> &[Hash] {
        &self.nodes
    }

    /// Record at leaf position `index`.
    pub fn record(&self, index: usize) -> Option<&Record> {
        self.values.get(index)
    }

    /// Leaf hash at leaf position `index`.
    pub fn leaf(&self, index: usize) -> Option<Hash> {
        (index < self.leaf_count()).then(|| self.nodes[self.layout.leaf_node_index(index)])
    }

    /// Records with their leaf positions, in leaf order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.values.iter().enumerate()
    }

    /// Leaf hash `record` would have in this tree.
    pub fn leaf_hash(&self, record: &Record) -> Result<Hash, MerkleTreeError> {
        self.schema.leaf_hash(self.algorithm, record)
    }

    /// Leaf position of `record`.
    pub fn index_of(&self, record: &Record) -> Result<usize, MerkleTreeError> {
        let leaf = self.leaf_hash(record)?;
        self.leaf_lookup
            .get(&leaf)
            .copied()
            .ok_or(MerkleTreeError::RecordNotFound)
    }

    /// Check every leaf against its record and every internal node against
    /// its children.
    pub fn validate(&self) -> CostResult<(), MerkleTreeError> {
        let mut cost = OperationCost::default();

        for (index, record) in self.values.iter().enumerate() {
            let leaf = cost_return_on_error_no_add!(
                &cost,
                self.leaf_hash(record).map_err(|e| MerkleTreeError::CorruptTree(format!(
                    "record {} cannot be encoded: {}",
                    index, e
                )))
            );
            cost.hash_byte_calls += 2;
            if leaf != self.nodes[self.layout.leaf_node_index(index)] {
                return Err(MerkleTreeError::CorruptTree(format!(
                    "leaf {} does not match its record",
                    index
                )))
                .wrap_with_cost(cost);
            }
        }

        for level in 1..self.layout.level_count() {
            let below = self.layout.level_size(level - 1);
            for position in 0..self.layout.level_size(level) {
                let left = self.nodes[self.layout.node_index(level - 1, 2 * position)];
                let expected = if 2 * position + 1 < below {
                    let right = self.nodes[self.layout.node_index(level - 1, 2 * position + 1)];
                    cost.hash_node_calls += 1;
                    self.algorithm.combine(&left, &right)
                } else {
                    left
                };
                let index = self.layout.node_index(level, position);
                if self.nodes[index] != expected {
                    return Err(MerkleTreeError::CorruptTree(format!(
                        "node {} does not match its children",
                        index
                    )))
                    .wrap_with_cost(cost);
                }
            }
        }

        Ok(()).wrap_with_cost(cost)
    }

    /// Draw the tree level by level, root first, one `index) hash` per line.
    pub fn render(&self) -> String {
        (0..self.layout.level_count())
            .rev()
            .map(|level| {
                let indent = "  ".repeat(self.layout.height() - level);
                (0..self.layout.level_size(level))
                    .map(|position| {
                        let index = self.layout.node_index(level, position);
                        format!("{}{}) {}", indent, index, to_hex(&self.nodes[index]))
                    })
                    .join("\n")
            })
            .join("\n")
    }
}

/// Leaf hashes of `values`, in order.
fn hash_leaves(
    algorithm: HashAlgorithm,
    schema: &LeafSchema,
    values: &[Record],
) -> Result<Vec<Hash>, MerkleTreeError> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        values
            .par_iter()
            .map(|record| schema.leaf_hash(algorithm, record))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        values
            .iter()
            .map(|record| schema.leaf_hash(algorithm, record))
            .collect()
    }
}

/// Reverse map from leaf hash to leaf position; rejects repeated leaves.
pub(crate) fn index_leaves(leaves: &[Hash]) -> Result<HashMap<Hash, usize>, MerkleTreeError> {
    let mut lookup = HashMap::with_capacity(leaves.len());
    for (index, leaf) in leaves.iter().enumerate() {
        if let Some(first) = lookup.insert(*leaf, index) {
            return Err(MerkleTreeError::DuplicateLeaf {
                first,
                second: index,
                leaf: to_hex(leaf),
            });
        }
    }
    Ok(lookup)
}

/// Combine adjacent pairs of `level`; an odd last node is carried over as is.
fn reduce_level(algorithm: HashAlgorithm, level: &[Hash]) -> Vec<Hash> {
    let parent = |pair: &[Hash]| match pair {
        [left, right] => algorithm.combine(left, right),
        _ => pair[0],
    };
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        level.par_chunks(2).map(parent).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        level.chunks(2).map(parent).collect()
    }
}

/// Build every level above `leaves` and flatten them root first.
fn build_nodes(
    algorithm: HashAlgorithm,
    layout: &TreeLayout,
    leaves: Vec<Hash>,
) -> CostContext<Vec<Hash>> {
    let mut cost = OperationCost::default();
    let mut levels = vec![leaves];
    while let Some(current) = levels.last().filter(|level| level.len() > 1) {
        cost.hash_node_calls += (current.len() / 2) as u64;
        let next = reduce_level(algorithm, current);
        trace!(level = levels.len(), size = next.len(), "reduced level");
        levels.push(next);
    }

    let mut nodes = Vec::with_capacity(layout.node_count());
    for level in levels.iter().rev() {
        nodes.extend_from_slice(level);
    }
    nodes.wrap_with_cost(cost)
}
