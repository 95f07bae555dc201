//! Containment tree construction over blocks.
//!
//! O(n²) in block count per page, which stays acceptable because per-page
//! block counts after merging are bounded (typically well under a
//! thousand).

use crate::model::{Block, HierarchyNode, HierarchyStats};
use std::collections::{BTreeMap, VecDeque};

/// Pixel slack allowed per edge when testing containment.
const CONTAINMENT_TOLERANCE_PX: f32 = 2.0;

/// Build the containment forest and its statistics.
///
/// The direct parent of a block is the smallest-area block enclosing it
/// within tolerance; blocks enclosed by nothing become roots. When two
/// blocks mutually contain each other (identical bboxes within
/// tolerance), the lower id is treated as the parent, keeping the forest
/// acyclic and deterministic.
pub fn build_tree(blocks: &[Block]) -> (BTreeMap<u32, HierarchyNode>, HierarchyStats) {
    let mut nodes: BTreeMap<u32, HierarchyNode> = blocks
        .iter()
        .map(|b| (b.id, HierarchyNode::root(b.id)))
        .collect();

    for child in blocks {
        let parent = blocks
            .iter()
            .filter(|candidate| is_parent_candidate(candidate, child))
            .min_by(|a, b| {
                a.bbox
                    .area()
                    .partial_cmp(&b.bbox.area())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            });

        if let Some(parent) = parent {
            if let Some(node) = nodes.get_mut(&child.id) {
                node.parent_id = Some(parent.id);
            }
            if let Some(node) = nodes.get_mut(&parent.id) {
                node.children.push(child.id);
            }
        }
    }

    for node in nodes.values_mut() {
        node.children.sort_unstable();
    }

    assign_depths(&mut nodes);

    let stats = compute_stats(&nodes);
    log::debug!(
        "build_tree: {} blocks, {} roots, max depth {}",
        stats.total_blocks,
        stats.root_blocks,
        stats.max_depth
    );

    (nodes, stats)
}

/// Whether `candidate` may be the parent of `child`: it encloses the
/// child within tolerance, and for mutually containing pairs only the
/// lower id may act as parent.
fn is_parent_candidate(candidate: &Block, child: &Block) -> bool {
    if candidate.id == child.id {
        return false;
    }
    if !candidate
        .bbox
        .contains_with_tolerance(&child.bbox, CONTAINMENT_TOLERANCE_PX)
    {
        return false;
    }
    // Symmetric containment: lower id wins, the other becomes a leaf
    if child
        .bbox
        .contains_with_tolerance(&candidate.bbox, CONTAINMENT_TOLERANCE_PX)
        && child.id < candidate.id
    {
        return false;
    }
    true
}

/// Breadth-first depth assignment from the roots.
fn assign_depths(nodes: &mut BTreeMap<u32, HierarchyNode>) {
    let mut queue: VecDeque<(u32, u32)> = nodes
        .values()
        .filter(|n| n.is_root())
        .map(|n| (n.block_id, 0))
        .collect();
    let mut visited = 0usize;

    while let Some((id, depth)) = queue.pop_front() {
        let children = match nodes.get_mut(&id) {
            Some(node) => {
                node.depth = depth;
                node.children.clone()
            }
            None => continue,
        };
        visited += 1;
        for child in children {
            queue.push_back((child, depth + 1));
        }
    }

    // Tolerance slack cannot normally leave nodes unreachable, but a node
    // stranded by a containment cycle would otherwise keep a stale depth;
    // promote any such node to a root.
    if visited < nodes.len() {
        let mut seen: std::collections::HashSet<u32> = std::collections::HashSet::new();
        let mut queue: VecDeque<u32> = nodes
            .values()
            .filter(|n| n.is_root())
            .map(|n| n.block_id)
            .collect();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = nodes.get(&id) {
                queue.extend(node.children.iter().copied());
            }
        }
        let stranded: Vec<u32> = nodes
            .keys()
            .filter(|id| !seen.contains(id))
            .copied()
            .collect();
        for id in stranded {
            log::warn!("build_tree: promoting stranded block {} to root", id);
            if let Some(node) = nodes.get_mut(&id) {
                node.parent_id = None;
                node.depth = 0;
            }
        }
    }
}

/// Summary statistics over the finished forest.
fn compute_stats(nodes: &BTreeMap<u32, HierarchyNode>) -> HierarchyStats {
    let mut stats = HierarchyStats {
        total_blocks: nodes.len(),
        ..HierarchyStats::default()
    };

    let mut children_total = 0usize;
    let mut parents = 0usize;

    for node in nodes.values() {
        if node.is_root() {
            stats.root_blocks += 1;
        }
        if !node.is_leaf() {
            parents += 1;
            children_total += node.children.len();
        }
        stats.max_depth = stats.max_depth.max(node.depth);
        *stats.blocks_by_level.entry(node.depth).or_insert(0) += 1;
    }

    stats.avg_children = if parents > 0 {
        children_total as f32 / parents as f32
    } else {
        0.0
    };

    stats
}
