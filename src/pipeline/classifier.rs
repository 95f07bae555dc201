//! Section classification — positional grouping plus block-type refinement.
//!
//! The position pass splits the page into header/body/footer bands at 15%
//! and 85% of the page height. The pattern pass then refines block types
//! within body sections only; header/footer assignments are never
//! overridden. All tie-breaking is by ascending block id, keeping the
//! output deterministic for identical input.

use crate::geometry::BBox;
use crate::model::{Block, BlockType, Section, SectionType};
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

/// Blocks starting above this fraction of the page height are headers.
const HEADER_BAND_RATIO: f32 = 0.15;
/// Blocks ending below this fraction of the page height are footers.
const FOOTER_BAND_RATIO: f32 = 0.85;
/// Left edges within one bucket are considered aligned.
const COLUMN_BUCKET_PX: f32 = 5.0;
/// A column edge must recur across this many multi-block rows.
const MIN_ALIGNED_ROWS: usize = 3;

/// Bullet glyph or ordinal marker (`1.`, `12)`) followed by whitespace.
fn list_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[•\-*]|\d+[.)])\s+").expect("list marker regex"))
}

/// Output of the classifier: blocks with resolved types, the section
/// grouping, and the per-type summary.
#[derive(Debug, Clone)]
pub struct Classified {
    /// Blocks with `block_type` resolved, in reading order
    pub blocks: Vec<Block>,
    /// Positional sections covering every block exactly once
    pub sections: Vec<Section>,
    /// Block count per resolved type
    pub summary: BTreeMap<BlockType, usize>,
}

/// Classify blocks into sections and refine their types.
///
/// `page_height` must cover the full content extent; the pipeline
/// validates or computes it before calling here.
pub fn classify(blocks: &[Block], page_height: f32) -> Classified {
    if blocks.is_empty() {
        return Classified {
            blocks: Vec::new(),
            sections: Vec::new(),
            summary: BTreeMap::new(),
        };
    }

    let mut blocks = blocks.to_vec();

    // Position pass
    let positions: Vec<SectionType> = blocks
        .iter()
        .map(|b| position_type(&b.bbox, page_height))
        .collect();

    for (block, position) in blocks.iter_mut().zip(positions.iter()) {
        match position {
            SectionType::Header => block.block_type = BlockType::Header,
            SectionType::Footer => block.block_type = BlockType::Footer,
            SectionType::Body => {}
        }
    }

    // Section runs over the reading order; needed before the title rule,
    // which only applies to the first block of its section.
    let runs = section_runs(&positions);

    // Pattern pass over body blocks
    let body_indices: Vec<usize> = positions
        .iter()
        .enumerate()
        .filter(|(_, p)| **p == SectionType::Body)
        .map(|(i, _)| i)
        .collect();

    let aligned = aligned_table_blocks(&blocks, &body_indices);
    let (area_threshold, median_len) = body_statistics(&blocks, &body_indices);
    let section_firsts: HashSet<usize> = runs.iter().map(|r| r.0).collect();

    for &i in &body_indices {
        let block = &blocks[i];
        let block_type = if list_marker_regex().is_match(&block.text) {
            BlockType::ListItem
        } else if has_column_separator(&block.text) || aligned.contains(&i) {
            BlockType::Table
        } else if section_firsts.contains(&i)
            && block.bbox.area() >= area_threshold
            && block.text_len() < median_len
        {
            BlockType::Title
        } else {
            BlockType::Paragraph
        };
        blocks[i].block_type = block_type;
    }

    // Build sections from the runs with the refined blocks
    let sections = runs
        .iter()
        .enumerate()
        .map(|(idx, &(start, end))| build_section(idx, &blocks[start..=end], positions[start]))
        .collect();

    let mut summary: BTreeMap<BlockType, usize> = BTreeMap::new();
    for block in &blocks {
        *summary.entry(block.block_type).or_insert(0) += 1;
    }

    log::debug!(
        "classify: {} blocks into {} sections",
        blocks.len(),
        runs.len()
    );

    Classified {
        blocks,
        sections,
        summary,
    }
}

/// Positional band of a block.
fn position_type(bbox: &BBox, page_height: f32) -> SectionType {
    if bbox.y < HEADER_BAND_RATIO * page_height {
        SectionType::Header
    } else if bbox.bottom() > FOOTER_BAND_RATIO * page_height {
        SectionType::Footer
    } else {
        SectionType::Body
    }
}

/// Runs of consecutive blocks sharing a positional type, as inclusive
/// `(start, end)` index ranges in reading order.
fn section_runs(positions: &[SectionType]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..positions.len() {
        if positions[i] != positions[start] {
            runs.push((start, i - 1));
            start = i;
        }
    }
    if !positions.is_empty() {
        runs.push((start, positions.len() - 1));
    }
    runs
}

/// Whether the text carries an explicit column separator.
fn has_column_separator(text: &str) -> bool {
    text.contains('|') || text.contains("\t\t")
}

/// Body blocks that form a repeating row pattern: members of rows with at
/// least two blocks whose left edge recurs, bucketed within a small
/// tolerance, across [`MIN_ALIGNED_ROWS`] such rows.
fn aligned_table_blocks(blocks: &[Block], body_indices: &[usize]) -> HashSet<usize> {
    if body_indices.len() < MIN_ALIGNED_ROWS * 2 {
        return HashSet::new();
    }

    let rows = group_into_rows(blocks, body_indices);
    let multi_rows: Vec<&Vec<usize>> = rows.iter().filter(|r| r.len() >= 2).collect();
    if multi_rows.len() < MIN_ALIGNED_ROWS {
        return HashSet::new();
    }

    // Count each left-edge bucket at most once per row.
    let mut bucket_rows: HashMap<i32, usize> = HashMap::new();
    for row in &multi_rows {
        let row_buckets: HashSet<i32> = row.iter().map(|&i| x_bucket(&blocks[i].bbox)).collect();
        for bucket in row_buckets {
            *bucket_rows.entry(bucket).or_insert(0) += 1;
        }
    }

    let mut aligned = HashSet::new();
    for row in &multi_rows {
        for &i in row.iter() {
            let bucket = x_bucket(&blocks[i].bbox);
            if bucket_rows.get(&bucket).copied().unwrap_or(0) >= MIN_ALIGNED_ROWS {
                aligned.insert(i);
            }
        }
    }

    if !aligned.is_empty() {
        log::debug!("classify: {} blocks in repeating row pattern", aligned.len());
    }
    aligned
}

/// Group body blocks into visual rows by vertical-center proximity.
fn group_into_rows(blocks: &[Block], body_indices: &[usize]) -> Vec<Vec<usize>> {
    let mut heights: Vec<f32> = body_indices.iter().map(|&i| blocks[i].bbox.height).collect();
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_height = heights[heights.len() / 2];
    let tolerance = median_height * 0.6;

    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut current_row: Vec<usize> = Vec::new();
    let mut current_center: Option<f32> = None;

    // Body indices are already in reading order
    for &i in body_indices {
        let center = blocks[i].bbox.y + blocks[i].bbox.height / 2.0;
        match current_center {
            Some(y) if (center - y).abs() <= tolerance => current_row.push(i),
            _ => {
                if !current_row.is_empty() {
                    rows.push(std::mem::take(&mut current_row));
                }
                current_center = Some(center);
                current_row.push(i);
            }
        }
    }
    if !current_row.is_empty() {
        rows.push(current_row);
    }

    rows
}

fn x_bucket(bbox: &BBox) -> i32 {
    (bbox.x / COLUMN_BUCKET_PX).round() as i32
}

/// Area threshold (top quartile, nearest rank) and median text length of
/// the body blocks.
fn body_statistics(blocks: &[Block], body_indices: &[usize]) -> (f32, usize) {
    if body_indices.is_empty() {
        return (f32::MAX, 0);
    }

    let mut areas: Vec<f32> = body_indices.iter().map(|&i| blocks[i].bbox.area()).collect();
    areas.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let quartile_idx = (3 * (areas.len() - 1)).div_ceil(4);
    let area_threshold = areas[quartile_idx];

    let mut lengths: Vec<usize> = body_indices.iter().map(|&i| blocks[i].text_len()).collect();
    lengths.sort_unstable();
    let median_len = lengths[lengths.len() / 2];

    (area_threshold, median_len)
}

/// Assemble one section from a run of blocks.
fn build_section(index: usize, blocks: &[Block], section_type: SectionType) -> Section {
    let mut bbox = blocks[0].bbox;
    let mut confidence_sum = 0.0;
    for block in blocks {
        bbox = bbox.union(&block.bbox);
        confidence_sum += block.confidence;
    }

    Section {
        id: format!("section_{}", index),
        section_type,
        block_ids: blocks.iter().map(|b| b.id).collect(),
        bbox,
        avg_confidence: confidence_sum / blocks.len() as f32,
    }
}
