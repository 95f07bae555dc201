//! Input records consumed from the external OCR/layout engine.

use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// One raw text-line detection produced by the upstream OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Recognized text content
    pub text: String,

    /// Recognition confidence in `[0, 1]`; out-of-range values are
    /// clamped by the pipeline rather than rejected
    pub confidence: f32,

    /// Bounding box in pixel space, origin top-left
    pub bbox: BBox,

    /// Optional layout hint from the upstream ML model (advisory only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_label: Option<String>,
}

impl Detection {
    /// Create a new detection.
    pub fn new(text: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
            layout_label: None,
        }
    }

    /// Attach a layout hint.
    pub fn with_layout_label(mut self, label: impl Into<String>) -> Self {
        self.layout_label = Some(label.into());
        self
    }
}

/// A page of detections as exchanged with the OCR collaborator.
///
/// This is the file format the CLI adapter reads: page pixel dimensions
/// plus the detection list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInput {
    /// Page width in pixels, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_width: Option<f32>,

    /// Page height in pixels, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_height: Option<f32>,

    /// Raw detections for this page
    pub detections: Vec<Detection>,
}
