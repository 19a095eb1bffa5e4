//! Index arithmetic for the flat node array.
//!
//! Levels are numbered from the leaves: level 0 holds the leaves, the last
//! level holds only the root. Each level has `ceil(n / 2)` nodes where `n` is
//! the size of the level below; an odd last node is promoted unchanged. The
//! flat array stores the levels root first, so the root is node 0 and the
//! leaves occupy the tail of the array in input order.

/// Shape of a tree with a given number of leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    /// Size of each level, leaves first.
    level_sizes: Vec<usize>,
    /// Flat index of the first node of each level, leaves first.
    level_offsets: Vec<usize>,
}

impl TreeLayout {
    /// Layout for `leaf_count` leaves. `leaf_count` must be at least 1.
    pub fn new(leaf_count: usize) -> Self {
        debug_assert!(leaf_count > 0, "a layout needs at least one leaf");
        let mut level_sizes = vec![leaf_count];
        let mut size = leaf_count;
        while size > 1 {
            size = size.div_ceil(2);
            level_sizes.push(size);
        }

        let mut level_offsets = vec![0; level_sizes.len()];
        let mut offset = 0;
        for (level, size) in level_sizes.iter().enumerate().rev() {
            level_offsets[level] = offset;
            offset += size;
        }

        TreeLayout {
            level_sizes,
            level_offsets,
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.level_sizes[0]
    }

    /// Number of levels above the leaves; the length of the longest proof.
    pub fn height(&self) -> usize {
        self.level_sizes.len() - 1
    }

    /// Number of levels including leaves and root.
    pub fn level_count(&self) -> usize {
        self.level_sizes.len()
    }

    /// Total number of nodes in the flat array.
    pub fn node_count(&self) -> usize {
        self.level_sizes.iter().sum()
    }

    /// Number of nodes on `level`.
    pub fn level_size(&self, level: usize) -> usize {
        self.level_sizes[level]
    }

    /// Flat index of node `position` on `level`.
    pub fn node_index(&self, level: usize, position: usize) -> usize {
        self.level_offsets[level] + position
    }

    /// Flat index of leaf `leaf`.
    pub fn leaf_node_index(&self, leaf: usize) -> usize {
        self.node_index(0, leaf)
    }

    /// Leaf position of a flat index, if the index lies on the leaf level.
    pub fn leaf_of_node(&self, node_index: usize) -> Option<usize> {
        node_index
            .checked_sub(self.level_offsets[0])
            .filter(|leaf| *leaf < self.leaf_count())
    }

    /// Position on `level + 1` of the parent of `position` on `level`, or
    /// `None` for the root.
    pub fn parent(&self, level: usize, position: usize) -> Option<usize> {
        (level < self.height()).then_some(position / 2)
    }

    /// Whether `position` on `level` is carried up unchanged because it is the
    /// unpaired last node of an odd-sized level below the root.
    pub fn is_promoted(&self, level: usize, position: usize) -> bool {
        let size = self.level_sizes[level];
        level < self.height() && size % 2 == 1 && position == size - 1
    }

    /// Position of the sibling of `position` on `level`, or `None` for the
    /// root and for promoted nodes.
    pub fn sibling(&self, level: usize, position: usize) -> Option<usize> {
        if level >= self.height() || self.is_promoted(level, position) {
            return None;
        }
        Some(position ^ 1)
    }
}
