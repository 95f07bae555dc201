//! The block structuring pipeline.
//!
//! Raw detections flow through up to three stages: block merging,
//! section classification, and hierarchy construction. Merging always
//! resolves first because the later stages consume its output; the two
//! analysis stages are independent of each other and run in parallel
//! when both are requested.

pub mod classifier;
pub mod hierarchy;
pub mod merger;

use crate::error::{Error, Result};
use crate::model::{Detection, PageResult};
use std::collections::BTreeMap;
use std::time::Instant;

/// Options controlling which stages run and how.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Whether to merge nearby detections into blocks
    pub merge_blocks: bool,

    /// Maximum pixel gap bridged by merging (valid range 1-100)
    pub merge_threshold: u32,

    /// Minimum horizontal overlap ratio for merging stacked lines
    pub alignment_threshold: f32,

    /// Whether to group blocks into positional sections
    pub create_sections: bool,

    /// Whether to build the containment hierarchy
    pub build_hierarchy_tree: bool,

    /// Abort processing once this instant has passed
    pub deadline: Option<Instant>,
}

impl PipelineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable block merging.
    pub fn with_merging(mut self, merge: bool) -> Self {
        self.merge_blocks = merge;
        self
    }

    /// Skip block merging entirely.
    pub fn no_merge(mut self) -> Self {
        self.merge_blocks = false;
        self
    }

    /// Set the merge distance threshold in pixels.
    pub fn with_merge_threshold(mut self, px: u32) -> Self {
        self.merge_threshold = px;
        self
    }

    /// Set the horizontal alignment ratio required to merge stacked lines.
    pub fn with_alignment_threshold(mut self, ratio: f32) -> Self {
        self.alignment_threshold = ratio;
        self
    }

    /// Enable section grouping.
    pub fn with_sections(mut self) -> Self {
        self.create_sections = true;
        self
    }

    /// Enable hierarchy construction.
    pub fn with_hierarchy(mut self) -> Self {
        self.build_hierarchy_tree = true;
        self
    }

    /// Set a processing deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Validate option ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.merge_threshold) {
            return Err(Error::InvalidThreshold(self.merge_threshold));
        }
        Ok(())
    }

    fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            merge_blocks: true,
            merge_threshold: 30,
            alignment_threshold: 0.8,
            create_sections: false,
            build_hierarchy_tree: false,
            deadline: None,
        }
    }
}

/// Run the pipeline over one page of detections.
///
/// `page_height` bounds the input (detections extending past it are
/// dropped with a warning) and anchors the header/footer bands; when
/// `None` it is derived from the lowest block edge.
pub fn process(
    detections: &[Detection],
    page_height: Option<f32>,
    options: &PipelineOptions,
) -> Result<PageResult> {
    options.validate()?;
    options.check_deadline()?;

    let (blocks, warnings) = if options.merge_blocks {
        merger::merge(
            detections,
            options.merge_threshold,
            options.alignment_threshold,
            page_height,
        )
    } else {
        merger::pass_through(detections, page_height)
    };

    log::debug!(
        "pipeline: {} detections -> {} blocks ({} warnings)",
        detections.len(),
        blocks.len(),
        warnings.len()
    );

    if blocks.is_empty() {
        return Ok(empty_result(options, warnings));
    }

    // Validation capped every block at the page height, so the effective
    // height covers the full content extent either way.
    let effective_height = page_height.unwrap_or_else(|| {
        blocks
            .iter()
            .map(|b| b.bbox.bottom())
            .fold(0.0_f32, f32::max)
    });

    options.check_deadline()?;

    let average_confidence =
        blocks.iter().map(|b| b.confidence).sum::<f32>() / blocks.len() as f32;

    let mut result = PageResult {
        total_blocks: blocks.len(),
        average_confidence,
        blocks,
        sections: None,
        section_summary: None,
        hierarchical_blocks: None,
        hierarchy_statistics: None,
        warnings,
    };

    match (options.create_sections, options.build_hierarchy_tree) {
        (true, true) => {
            let (classified, (tree, stats)) = rayon::join(
                || classifier::classify(&result.blocks, effective_height),
                || hierarchy::build_tree(&result.blocks),
            );
            result.blocks = classified.blocks;
            result.sections = Some(classified.sections);
            result.section_summary = Some(classified.summary);
            result.hierarchical_blocks = Some(tree);
            result.hierarchy_statistics = Some(stats);
        }
        (true, false) => {
            let classified = classifier::classify(&result.blocks, effective_height);
            result.blocks = classified.blocks;
            result.sections = Some(classified.sections);
            result.section_summary = Some(classified.summary);
        }
        (false, true) => {
            let (tree, stats) = hierarchy::build_tree(&result.blocks);
            result.hierarchical_blocks = Some(tree);
            result.hierarchy_statistics = Some(stats);
        }
        (false, false) => {}
    }

    options.check_deadline()?;

    Ok(result)
}

/// Zero-valued result for a page with no valid detections. Requested
/// collections are present but empty so the output shape stays stable.
fn empty_result(options: &PipelineOptions, warnings: Vec<crate::model::Warning>) -> PageResult {
    let mut result = PageResult::empty();
    result.warnings = warnings;
    if options.create_sections {
        result.sections = Some(Vec::new());
        result.section_summary = Some(BTreeMap::new());
    }
    if options.build_hierarchy_tree {
        result.hierarchical_blocks = Some(BTreeMap::new());
        result.hierarchy_statistics = Some(Default::default());
    }
    result
}
