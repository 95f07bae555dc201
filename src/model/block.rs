//! Block types — the unit of all downstream structure.

use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// Semantic type of a block.
///
/// A closed enum validated at construction time; the serialized form uses
/// `snake_case` strings (`"list_item"`, `"header"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// A short, prominent block opening a body section
    Title,
    /// Regular body text
    Paragraph,
    /// Tabular content (separator glyphs or aligned columns)
    Table,
    /// A bulleted or numbered list entry
    ListItem,
    /// Content in the top page band
    Header,
    /// Content in the bottom page band
    Footer,
    /// Unclassified content
    Other,
}

impl BlockType {
    /// The serialized name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Title => "title",
            BlockType::Paragraph => "paragraph",
            BlockType::Table => "table",
            BlockType::ListItem => "list_item",
            BlockType::Header => "header",
            BlockType::Footer => "footer",
            BlockType::Other => "other",
        }
    }
}

/// A merged, classified unit of text with a bounding box.
///
/// Blocks are created by the merger from one or more detections, receive
/// ids that are unique within a page and stable once assigned, and are
/// never mutated afterwards except by the classifier resolving
/// `block_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Page-unique id, assigned sequentially in reading order
    pub id: u32,

    /// Text content (space-joined when merged from several detections)
    pub text: String,

    /// Confidence in `[0, 1]`, length-weighted across merged detections
    pub confidence: f32,

    /// Minimal enclosing rectangle of the contributing detections
    pub bbox: BBox,

    /// Resolved semantic type
    pub block_type: BlockType,

    /// Advisory layout hint carried over from the input, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_label: Option<String>,
}

impl Block {
    /// Create a new block with the default `Other` type.
    pub fn new(id: u32, text: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            id,
            text: text.into(),
            confidence,
            bbox,
            block_type: BlockType::Other,
            layout_label: None,
        }
    }

    /// Text length in characters, the weight used for confidence averaging.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}
