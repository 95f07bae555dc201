//! Data model for the block structuring pipeline.
//!
//! All types here are plain values derived fresh per page: the pipeline
//! owns no resources and keeps no state between invocations.

mod block;
mod detection;
mod hierarchy;
mod result;
mod section;

pub use block::{Block, BlockType};
pub use detection::{Detection, PageInput};
pub use hierarchy::{HierarchyNode, HierarchyStats};
pub use result::{PageResult, Warning, WarningKind};
pub use section::{Section, SectionType};
