//! Block merging — clusters adjacent raw detections into coherent blocks.
//!
//! Merging runs as repeated passes over the candidate set until a pass
//! produces no merges or the pass cap is reached; the cap bounds cascading
//! bbox growth.

use crate::geometry::BBox;
use crate::model::{Block, Detection, Warning, WarningKind};

/// Maximum number of merge passes per page.
const MAX_MERGE_PASSES: usize = 5;

/// A block under construction, before ids are assigned.
#[derive(Debug, Clone)]
struct ProtoBlock {
    text: String,
    confidence: f32,
    bbox: BBox,
    /// Character count, the weight used for confidence averaging
    weight: usize,
    layout_label: Option<String>,
}

impl ProtoBlock {
    fn from_detection(det: &Detection, confidence: f32) -> Self {
        Self {
            text: det.text.clone(),
            confidence,
            bbox: det.bbox,
            weight: det.text.chars().count(),
            layout_label: det.layout_label.clone(),
        }
    }

    /// Fold `other` into this proto block. `other` follows this block in
    /// reading order, so its text is appended.
    fn absorb(&mut self, other: ProtoBlock) {
        if !self.text.is_empty() && !other.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&other.text);

        let total = self.weight + other.weight;
        self.confidence = if total == 0 {
            (self.confidence + other.confidence) / 2.0
        } else {
            (self.confidence * self.weight as f32 + other.confidence * other.weight as f32)
                / total as f32
        };
        self.weight = total;

        self.bbox = self.bbox.union(&other.bbox);
        if self.layout_label.is_none() {
            self.layout_label = other.layout_label;
        }
    }
}

/// Merge raw detections into blocks.
///
/// Detections with non-positive extent, or extending past the page
/// height when one is given, are dropped with an `InvalidGeometry`
/// warning; confidences outside `[0, 1]` are clamped with a
/// `ConfidenceClamped` warning. Output blocks receive sequential ids in
/// reading order; input detection identity is not preserved.
pub fn merge(
    detections: &[Detection],
    threshold_px: u32,
    alignment_threshold: f32,
    page_height: Option<f32>,
) -> (Vec<Block>, Vec<Warning>) {
    let (mut items, warnings) = validate(detections, page_height);

    let threshold = threshold_px as f32;
    for pass in 0..MAX_MERGE_PASSES {
        sort_reading_order(&mut items);
        if !merge_pass(&mut items, threshold, alignment_threshold) {
            log::debug!("merge: fixed point after {} pass(es)", pass + 1);
            break;
        }
    }

    sort_reading_order(&mut items);
    (assign_ids(items), warnings)
}

/// Turn each valid detection into one block without merging, preserving
/// its text, confidence, and bbox unchanged.
pub fn pass_through(
    detections: &[Detection],
    page_height: Option<f32>,
) -> (Vec<Block>, Vec<Warning>) {
    let (mut items, warnings) = validate(detections, page_height);
    sort_reading_order(&mut items);
    (assign_ids(items), warnings)
}

/// Validate detections: drop degenerate or out-of-page geometry, clamp
/// confidence.
fn validate(
    detections: &[Detection],
    page_height: Option<f32>,
) -> (Vec<ProtoBlock>, Vec<Warning>) {
    let mut items = Vec::with_capacity(detections.len());
    let mut warnings = Vec::new();

    for (index, det) in detections.iter().enumerate() {
        if !det.bbox.is_valid() {
            log::warn!(
                "dropping detection {} with degenerate bbox {}x{}",
                index,
                det.bbox.width,
                det.bbox.height
            );
            warnings.push(Warning::for_detection(
                WarningKind::InvalidGeometry,
                format!(
                    "detection with non-positive extent ({}x{}) excluded",
                    det.bbox.width, det.bbox.height
                ),
                index,
            ));
            continue;
        }

        if let Some(height) = page_height {
            if det.bbox.bottom() > height {
                log::warn!(
                    "dropping detection {} extending to {} past page height {}",
                    index,
                    det.bbox.bottom(),
                    height
                );
                warnings.push(Warning::for_detection(
                    WarningKind::InvalidGeometry,
                    format!(
                        "detection extending to {} exceeds page height {}",
                        det.bbox.bottom(),
                        height
                    ),
                    index,
                ));
                continue;
            }
        }

        let mut confidence = det.confidence;
        if !(0.0..=1.0).contains(&confidence) {
            warnings.push(Warning::for_detection(
                WarningKind::ConfidenceClamped,
                format!("confidence {} clamped to [0, 1]", confidence),
                index,
            ));
            confidence = confidence.clamp(0.0, 1.0);
        }

        items.push(ProtoBlock::from_detection(det, confidence));
    }

    (items, warnings)
}

/// One merge pass. Scans items in reading order, folding each into the
/// first earlier survivor it is a candidate for. Returns whether any merge
/// happened.
fn merge_pass(items: &mut Vec<ProtoBlock>, threshold: f32, alignment_threshold: f32) -> bool {
    let mut merged_any = false;
    let mut out: Vec<ProtoBlock> = Vec::with_capacity(items.len());

    'items: for item in items.drain(..) {
        for existing in out.iter_mut() {
            if is_merge_candidate(&existing.bbox, &item.bbox, threshold, alignment_threshold) {
                existing.absorb(item);
                merged_any = true;
                continue 'items;
            }
        }
        out.push(item);
    }

    *items = out;
    merged_any
}

/// Two boxes are merge candidates when their vertical bands overlap or sit
/// within the threshold gap, and they are horizontally compatible: either
/// a same-line continuation (overlapping bands, small horizontal gap) or
/// stacked lines whose horizontal alignment score meets the threshold.
fn is_merge_candidate(a: &BBox, b: &BBox, threshold: f32, alignment_threshold: f32) -> bool {
    let v_gap = a.vertical_gap(b);
    if v_gap > threshold {
        return false;
    }

    if v_gap == 0.0 && a.horizontal_gap(b) <= threshold {
        return true;
    }

    a.horizontal_overlap_ratio(b) >= alignment_threshold
}

/// Sort proto blocks top-to-bottom, then left-to-right.
fn sort_reading_order(items: &mut [ProtoBlock]) {
    items.sort_by(|a, b| {
        let y_cmp = a
            .bbox
            .y
            .partial_cmp(&b.bbox.y)
            .unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.bbox
                .x
                .partial_cmp(&b.bbox.x)
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });
}

/// Assign fresh sequential ids in final reading order.
fn assign_ids(items: Vec<ProtoBlock>) -> Vec<Block> {
    items
        .into_iter()
        .enumerate()
        .map(|(id, item)| {
            let mut block = Block::new(id as u32, item.text, item.confidence, item.bbox);
            block.layout_label = item.layout_label;
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(text: &str, x: f32, y: f32, w: f32, h: f32) -> Detection {
        Detection::new(text, 0.9, BBox::new(x, y, w, h))
    }

    #[test]
    fn test_same_line_merge() {
        // Two words on one line, 5px apart, threshold 30
        let detections = vec![
            det("Hello", 0.0, 0.0, 50.0, 20.0),
            det("World", 55.0, 0.0, 50.0, 20.0),
        ];
        let (blocks, warnings) = merge(&detections, 30, 0.8, None);
        assert!(warnings.is_empty());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Hello World");
        assert_eq!(blocks[0].bbox, BBox::new(0.0, 0.0, 105.0, 20.0));
        assert_eq!(blocks[0].id, 0);
    }

    #[test]
    fn test_distant_detections_not_merged() {
        let detections = vec![
            det("Top", 0.0, 0.0, 50.0, 20.0),
            det("Bottom", 0.0, 500.0, 50.0, 20.0),
        ];
        let (blocks, _) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "Top");
        assert_eq!(blocks[1].text, "Bottom");
    }

    #[test]
    fn test_stacked_aligned_lines_merge() {
        // Two lines of one paragraph: 10px vertical gap, same column
        let detections = vec![
            det("first line of text", 0.0, 0.0, 200.0, 20.0),
            det("second line of text", 0.0, 30.0, 190.0, 20.0),
        ];
        let (blocks, _) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "first line of text second line of text");
    }

    #[test]
    fn test_stacked_misaligned_lines_not_merged() {
        // Close vertically but in different columns
        let detections = vec![
            det("left column", 0.0, 0.0, 100.0, 20.0),
            det("right column", 300.0, 30.0, 100.0, 20.0),
        ];
        let (blocks, _) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_single_detection_unchanged() {
        let detections = vec![Detection::new(
            "Only",
            0.7,
            BBox::new(5.0, 5.0, 40.0, 15.0),
        )];
        let (blocks, warnings) = merge(&detections, 30, 0.8, None);
        assert!(warnings.is_empty());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Only");
        assert_eq!(blocks[0].confidence, 0.7);
        assert_eq!(blocks[0].bbox, BBox::new(5.0, 5.0, 40.0, 15.0));
    }

    #[test]
    fn test_empty_input() {
        let (blocks, warnings) = merge(&[], 30, 0.8, None);
        assert!(blocks.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_invalid_geometry_dropped_with_warning() {
        let detections = vec![
            det("ok", 0.0, 0.0, 50.0, 20.0),
            det("flat", 0.0, 100.0, 50.0, 0.0),
            det("inverted", 0.0, 200.0, -10.0, 20.0),
        ];
        let (blocks, warnings) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks.len(), 1);
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|w| w.kind == WarningKind::InvalidGeometry));
        assert_eq!(warnings[0].detection_index, Some(1));
        assert_eq!(warnings[1].detection_index, Some(2));
    }

    #[test]
    fn test_detection_past_page_height_dropped() {
        let detections = vec![
            det("inside", 0.0, 100.0, 50.0, 20.0),
            det("outside", 0.0, 990.0, 50.0, 20.0),
        ];
        let (blocks, warnings) = merge(&detections, 30, 0.8, Some(1000.0));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "inside");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::InvalidGeometry);
        assert_eq!(warnings[0].detection_index, Some(1));
    }

    #[test]
    fn test_out_of_range_confidence_clamped() {
        let detections = vec![
            Detection::new("hot", 1.4, BBox::new(0.0, 0.0, 50.0, 20.0)),
            Detection::new("cold", -0.2, BBox::new(0.0, 500.0, 50.0, 20.0)),
        ];
        let (blocks, warnings) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].confidence, 1.0);
        assert_eq!(blocks[1].confidence, 0.0);
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|w| w.kind == WarningKind::ConfidenceClamped));
    }

    #[test]
    fn test_length_weighted_confidence() {
        let detections = vec![
            Detection::new("aaaaaaaa", 1.0, BBox::new(0.0, 0.0, 80.0, 20.0)), // 8 chars
            Detection::new("bb", 0.5, BBox::new(85.0, 0.0, 20.0, 20.0)),      // 2 chars
        ];
        let (blocks, _) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks.len(), 1);
        // (1.0 * 8 + 0.5 * 2) / 10 = 0.9
        assert!((blocks[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_merge_idempotent() {
        let detections = vec![
            det("Hello", 0.0, 0.0, 50.0, 20.0),
            det("World", 55.0, 0.0, 50.0, 20.0),
            det("• Apple", 0.0, 300.0, 80.0, 20.0),
            det("Footer text", 0.0, 900.0, 120.0, 20.0),
        ];
        let (blocks, _) = merge(&detections, 30, 0.8, None);

        // Re-run merge on its own output: no further merges
        let reinput: Vec<Detection> = blocks
            .iter()
            .map(|b| Detection::new(b.text.clone(), b.confidence, b.bbox))
            .collect();
        let (blocks2, _) = merge(&reinput, 30, 0.8, None);
        assert_eq!(blocks2.len(), blocks.len());
        for (a, b) in blocks.iter().zip(blocks2.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.bbox, b.bbox);
        }
    }

    #[test]
    fn test_pass_through_keeps_detections_separate() {
        let detections = vec![
            det("Hello", 0.0, 0.0, 50.0, 20.0),
            det("World", 55.0, 0.0, 50.0, 20.0),
        ];
        let (blocks, _) = pass_through(&detections, None);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id, 0);
        assert_eq!(blocks[1].id, 1);
    }

    #[test]
    fn test_ids_sequential_in_reading_order() {
        let detections = vec![
            det("below", 0.0, 600.0, 50.0, 20.0),
            det("above", 0.0, 0.0, 50.0, 20.0),
        ];
        let (blocks, _) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks[0].text, "above");
        assert_eq!(blocks[0].id, 0);
        assert_eq!(blocks[1].text, "below");
        assert_eq!(blocks[1].id, 1);
    }

    #[test]
    fn test_layout_label_carried_from_first_labeled() {
        let detections = vec![
            det("Hello", 0.0, 0.0, 50.0, 20.0),
            Detection::new("World", 0.9, BBox::new(55.0, 0.0, 50.0, 20.0))
                .with_layout_label("text"),
        ];
        let (blocks, _) = merge(&detections, 30, 0.8, None);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].layout_label.as_deref(), Some("text"));
    }
}
