//! # docblocks
//!
//! Structuring library for OCR text detections.
//!
//! This library takes raw per-page text detections (text, confidence,
//! bounding box) and organizes them into logical blocks, positional
//! sections, and a containment hierarchy.
//!
//! ## Quick Start
//!
//! ```
//! use docblocks::{process_detections, BBox, Detection};
//!
//! fn main() -> docblocks::Result<()> {
//!     let detections = vec![
//!         Detection::new("Hello", 0.98, BBox::new(10.0, 10.0, 50.0, 20.0)),
//!         Detection::new("World", 0.95, BBox::new(65.0, 10.0, 50.0, 20.0)),
//!     ];
//!
//!     let result = process_detections(&detections)?;
//!     println!("{} blocks", result.total_blocks);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Block merging**: Clusters nearby detections into logical blocks
//! - **Section classification**: Header/body/footer bands plus pattern
//!   refinement (titles, list items, tables)
//! - **Hierarchy construction**: Containment forest with statistics
//! - **Parallel analysis**: Uses Rayon when sections and hierarchy are
//!   both requested
//! - **JSON output**: Pretty or compact result serialization

pub mod error;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::BBox;
pub use model::{
    Block, BlockType, Detection, HierarchyNode, HierarchyStats, PageInput, PageResult, Section,
    SectionType, Warning, WarningKind,
};
pub use pipeline::{process, PipelineOptions};
pub use render::JsonFormat;

/// Structure a page of detections with default options.
///
/// Merging is enabled with a 30px threshold; sections and hierarchy are
/// not produced. Use [`process_detections_with_options`] or the
/// [`Docblocks`] builder for control over the stages.
///
/// # Example
///
/// ```
/// use docblocks::{process_detections, BBox, Detection};
///
/// let detections = vec![Detection::new("Hi", 0.9, BBox::new(0.0, 0.0, 20.0, 10.0))];
/// let result = process_detections(&detections).unwrap();
/// assert_eq!(result.total_blocks, 1);
/// ```
pub fn process_detections(detections: &[Detection]) -> Result<PageResult> {
    pipeline::process(detections, None, &PipelineOptions::default())
}

/// Structure a page of detections with custom options.
///
/// # Example
///
/// ```
/// use docblocks::{process_detections_with_options, BBox, Detection, PipelineOptions};
///
/// let detections = vec![Detection::new("Hi", 0.9, BBox::new(0.0, 0.0, 20.0, 10.0))];
/// let options = PipelineOptions::new().with_sections().with_hierarchy();
/// let result = process_detections_with_options(&detections, None, &options).unwrap();
/// assert!(result.sections.is_some());
/// ```
pub fn process_detections_with_options(
    detections: &[Detection],
    page_height: Option<f32>,
    options: &PipelineOptions,
) -> Result<PageResult> {
    pipeline::process(detections, page_height, options)
}

/// Builder for structuring pages of detections.
///
/// # Example
///
/// ```
/// use docblocks::{BBox, Detection, Docblocks};
///
/// let detections = vec![Detection::new("Hi", 0.9, BBox::new(0.0, 0.0, 20.0, 10.0))];
/// let json = Docblocks::new()
///     .with_sections()
///     .with_hierarchy()
///     .process(&detections)?
///     .to_json()?;
/// # Ok::<(), docblocks::Error>(())
/// ```
pub struct Docblocks {
    options: PipelineOptions,
    page_height: Option<f32>,
    format: JsonFormat,
}

impl Docblocks {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: PipelineOptions::default(),
            page_height: None,
            format: JsonFormat::default(),
        }
    }

    /// Skip block merging.
    pub fn no_merge(mut self) -> Self {
        self.options = self.options.no_merge();
        self
    }

    /// Set the merge distance threshold in pixels.
    pub fn with_merge_threshold(mut self, px: u32) -> Self {
        self.options = self.options.with_merge_threshold(px);
        self
    }

    /// Enable section grouping.
    pub fn with_sections(mut self) -> Self {
        self.options = self.options.with_sections();
        self
    }

    /// Enable hierarchy construction.
    pub fn with_hierarchy(mut self) -> Self {
        self.options = self.options.with_hierarchy();
        self
    }

    /// Set the page height used for the header/footer bands.
    pub fn with_page_height(mut self, height: f32) -> Self {
        self.page_height = Some(height);
        self
    }

    /// Set a processing deadline.
    pub fn with_deadline(mut self, deadline: std::time::Instant) -> Self {
        self.options = self.options.with_deadline(deadline);
        self
    }

    /// Emit compact JSON from [`StructuredPage::to_json`].
    pub fn compact(mut self) -> Self {
        self.format = JsonFormat::Compact;
        self
    }

    /// Run the pipeline and return a result wrapper.
    pub fn process(self, detections: &[Detection]) -> Result<StructuredPage> {
        let result = pipeline::process(detections, self.page_height, &self.options)?;
        Ok(StructuredPage {
            result,
            format: self.format,
        })
    }
}

impl Default for Docblocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of structuring a page.
pub struct StructuredPage {
    /// The structured page result
    pub result: PageResult,
    format: JsonFormat,
}

impl StructuredPage {
    /// Convert to JSON using the builder's format.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(&self.result, self.format)
    }

    /// Get the page result.
    pub fn result(&self) -> &PageResult {
        &self.result
    }
}
