//! Containment hierarchy types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of the containment forest over blocks.
///
/// Invariants maintained by the builder: the parent relation is acyclic,
/// roots have `parent_id = None` and `depth = 0`, and every child's depth
/// is exactly its parent's depth plus one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Id of the block this node represents
    pub block_id: u32,

    /// Direct parent block id, `None` for roots
    pub parent_id: Option<u32>,

    /// Directly contained block ids, in ascending id order
    pub children: Vec<u32>,

    /// Distance from the root of this node's tree
    pub depth: u32,
}

impl HierarchyNode {
    /// Create a root node for a block.
    pub fn root(block_id: u32) -> Self {
        Self {
            block_id,
            parent_id: None,
            children: Vec::new(),
            depth: 0,
        }
    }

    /// Whether this node is a tree root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Summary statistics over the containment forest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchyStats {
    /// Number of blocks in the forest
    pub total_blocks: usize,

    /// Number of roots (blocks contained by nothing)
    pub root_blocks: usize,

    /// Deepest node depth, 0 for an empty or flat page
    pub max_depth: u32,

    /// Mean child count over non-leaf nodes, 0.0 when there are none
    pub avg_children: f32,

    /// Node count per depth level
    pub blocks_by_level: BTreeMap<u32, usize>,
}
