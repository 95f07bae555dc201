//! The per-page result envelope produced for the persistence/API layer.

use super::{Block, BlockType, HierarchyNode, HierarchyStats, Section};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a recoverable per-item anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A detection with non-positive width or height was excluded
    InvalidGeometry,
    /// A confidence outside `[0, 1]` was clamped
    ConfidenceClamped,
}

/// A recoverable anomaly attached to the page result.
///
/// Anomalies are surfaced here rather than failing the page or being
/// silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    /// What happened
    pub kind: WarningKind,

    /// Human-readable description
    pub message: String,

    /// Index of the offending detection in the input, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_index: Option<usize>,
}

impl Warning {
    /// Create a warning tied to an input detection.
    pub fn for_detection(kind: WarningKind, message: impl Into<String>, index: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            detection_index: Some(index),
        }
    }
}

/// The structured result for one page.
///
/// Optional members are present exactly when the corresponding pipeline
/// flag was enabled: `sections` and `section_summary` with
/// `create_sections`, `hierarchical_blocks` and `hierarchy_statistics`
/// with `build_hierarchy_tree`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Final blocks in reading order
    pub blocks: Vec<Block>,

    /// Number of final blocks
    pub total_blocks: usize,

    /// Mean confidence over final blocks, 0.0 for an empty page
    pub average_confidence: f32,

    /// Positional sections, when section grouping was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,

    /// Block count per resolved block type, when section grouping was
    /// requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_summary: Option<BTreeMap<BlockType, usize>>,

    /// Containment forest keyed by block id, when tree building was
    /// requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchical_blocks: Option<BTreeMap<u32, HierarchyNode>>,

    /// Forest statistics, when tree building was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_statistics: Option<HierarchyStats>,

    /// Recoverable anomalies encountered while processing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl PageResult {
    /// A zero-valued result for an empty page.
    pub fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            total_blocks: 0,
            average_confidence: 0.0,
            sections: None,
            section_summary: None,
            hierarchical_blocks: None,
            hierarchy_statistics: None,
            warnings: Vec::new(),
        }
    }

    /// Whether the page produced no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    #[test]
    fn test_empty_result() {
        let result = PageResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.total_blocks, 0);
        assert_eq!(result.average_confidence, 0.0);
    }

    #[test]
    fn test_optional_members_omitted() {
        let result = PageResult::empty();
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("sections"));
        assert!(!json.contains("hierarchical_blocks"));
        assert!(!json.contains("warnings"));
    }

    #[test]
    fn test_hierarchical_blocks_keyed_by_id_string() {
        let mut result = PageResult::empty();
        let mut nodes = BTreeMap::new();
        nodes.insert(7, HierarchyNode::root(7));
        result.hierarchical_blocks = Some(nodes);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"7\":{"));
    }

    #[test]
    fn test_warnings_roundtrip() {
        let mut result = PageResult::empty();
        result.blocks.push(Block::new(
            0,
            "x",
            1.0,
            BBox::new(0.0, 0.0, 1.0, 1.0),
        ));
        result.total_blocks = 1;
        result.warnings.push(Warning::for_detection(
            WarningKind::InvalidGeometry,
            "zero-height detection dropped",
            2,
        ));
        let json = serde_json::to_string(&result).unwrap();
        let back: PageResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.warnings.len(), 1);
        assert_eq!(back.warnings[0].detection_index, Some(2));
    }
}
