//! Positional section grouping types.

use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// Positional type of a section, assigned from the page-height split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    /// Top band of the page (y < 15% of page height)
    Header,
    /// Middle band
    Body,
    /// Bottom band (bottom edge past 85% of page height)
    Footer,
}

/// A run of consecutive blocks sharing the same positional type.
///
/// Block ids appear in reading order (top-to-bottom, then left-to-right);
/// every block of a page belongs to exactly one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section id, `"section_0"`, `"section_1"`, ... in reading order
    pub id: String,

    /// Positional type of this section
    #[serde(rename = "type")]
    pub section_type: SectionType,

    /// Member block ids in reading order
    pub block_ids: Vec<u32>,

    /// Minimal rectangle enclosing all member blocks
    pub bbox: BBox,

    /// Mean confidence over member blocks
    pub avg_confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_type_serialized_as_type() {
        let section = Section {
            id: "section_0".to_string(),
            section_type: SectionType::Header,
            block_ids: vec![0, 1],
            bbox: BBox::new(0.0, 0.0, 100.0, 30.0),
            avg_confidence: 0.9,
        };
        let json = serde_json::to_string(&section).unwrap();
        assert!(json.contains("\"type\":\"header\""));
        assert!(json.contains("\"block_ids\":[0,1]"));
    }
}
