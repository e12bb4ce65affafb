//! Coordinate normalization.
//!
//! Raw extraction geometry arrives in any of four combinations of two
//! conventions: axis origin (top-left vs bottom-left) and page scope
//! (per-page vs cumulative across the document). This module rewrites
//! blocks into the canonical form used everywhere else in the library:
//! top-left origin, page-relative coordinates.
//!
//! Both detections are heuristic. They have no ground truth to check
//! against, so they are best-effort and overridable: a caller with
//! out-of-band knowledge forces the origin through [`OriginHint`].

use std::collections::HashMap;

use crate::model::{LayoutBlock, Page};

/// Y slack allowed between consecutive pages before cumulative stacking
/// is ruled out. Extraction noise commonly produces a few units of
/// negative overlap at page boundaries.
const PAGE_OVERLAP_TOLERANCE: f32 = 10.0;

/// Y delta below which two blocks are not counted as a trend signal.
const TREND_EPSILON: f32 = 0.5;

/// First-block Y threshold for the fallback origin heuristic: blocks that
/// start near the top edge suggest a top-left origin.
const NEAR_TOP_THRESHOLD: f32 = 100.0;

/// Coordinate axis origin convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Y grows downward from the top edge (canonical)
    TopLeft,
    /// Y grows upward from the bottom edge (PDF-native)
    BottomLeft,
}

/// How the axis origin should be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginHint {
    /// Detect from the geometry (best-effort)
    #[default]
    Detected,
    /// Skip detection; the caller knows the convention
    Forced(Origin),
}

/// Options for coordinate normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Axis origin strategy
    pub origin: OriginHint,
}

impl NormalizeOptions {
    /// Create options with defaults (full detection).
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a known axis origin, bypassing detection.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = OriginHint::Forced(origin);
        self
    }
}

/// Per-page geometry observations used by the detection heuristics.
struct PageStats {
    min_y: f32,
    max_y: f32,
}

/// Rewrite block geometry into canonical form: top-left origin,
/// page-relative coordinates.
///
/// Blocks whose Y range ends up entirely outside `[0, page_height]` are
/// flagged `out_of_bounds`, never discarded. Blocks referencing a page id
/// not present in `pages` pass through untransformed but flagged.
///
/// Idempotent on canonical input: re-detection concludes the geometry is
/// already canonical and the pass is a no-op (anomaly flags are
/// recomputed to the same values).
pub fn normalize(
    pages: &[Page],
    blocks: &[LayoutBlock],
    options: &NormalizeOptions,
) -> Vec<LayoutBlock> {
    if blocks.is_empty() {
        return Vec::new();
    }

    // Running sum of prior page heights, in document order.
    let mut offsets: HashMap<u32, f32> = HashMap::new();
    let mut heights: HashMap<u32, f32> = HashMap::new();
    let mut running = 0.0;
    for page in pages {
        offsets.insert(page.id, running);
        heights.insert(page.id, page.height);
        running += page.height;
    }

    let stats = collect_page_stats(blocks);
    let cumulative = detect_cumulative(pages, &stats);
    log::debug!(
        "scope detection: {}",
        if cumulative { "cumulative" } else { "page-relative" }
    );

    // Scope correction first, so origin detection sees page-local Y values.
    let scoped: Vec<LayoutBlock> = blocks
        .iter()
        .map(|block| {
            let mut block = block.clone();
            if cumulative {
                if let Some(&offset) = offsets.get(&block.page_id) {
                    block.bbox = block.bbox.translate_y(-offset);
                }
            }
            block
        })
        .collect();

    let origin = match options.origin {
        OriginHint::Forced(origin) => {
            log::debug!("origin forced to {:?}", origin);
            origin
        }
        OriginHint::Detected => {
            let origin = detect_origin(&scoped);
            log::debug!("origin detected as {:?}", origin);
            origin
        }
    };

    scoped
        .into_iter()
        .map(|mut block| {
            let height = match heights.get(&block.page_id) {
                Some(&h) => h,
                None => {
                    log::warn!(
                        "block {} references unknown page {}; geometry left untouched",
                        block.id,
                        block.page_id
                    );
                    block.out_of_bounds = true;
                    return block;
                }
            };

            if origin == Origin::BottomLeft {
                block.bbox = block.bbox.flip_y(height);
            }

            block.out_of_bounds = block.bbox.y1 < 0.0 || block.bbox.y0 > height;
            if block.out_of_bounds {
                log::warn!(
                    "block {} on page {} is out of bounds after normalization \
                     (y range {:.1}..{:.1}, page height {:.1})",
                    block.id,
                    block.page_id,
                    block.bbox.y0,
                    block.bbox.y1,
                    height
                );
            }
            block
        })
        .collect()
}

fn collect_page_stats(blocks: &[LayoutBlock]) -> HashMap<u32, PageStats> {
    let mut stats: HashMap<u32, PageStats> = HashMap::new();
    for block in blocks {
        let entry = stats.entry(block.page_id).or_insert(PageStats {
            min_y: f32::MAX,
            max_y: f32::MIN,
        });
        entry.min_y = entry.min_y.min(block.bbox.y0);
        entry.max_y = entry.max_y.max(block.bbox.y1);
    }
    stats
}

/// Decide whether geometry is cumulative across pages.
///
/// Two conditions must both hold: the global maximum Y exceeds the
/// tallest single page (per-page geometry can never do that), and page Y
/// ranges stack monotonically in document order, within the
/// negative-overlap tolerance. The second condition alone would
/// misdetect sparse already-canonical documents.
fn detect_cumulative(pages: &[Page], stats: &HashMap<u32, PageStats>) -> bool {
    let max_page_height = pages.iter().map(|p| p.height).fold(0.0, f32::max);
    let global_max_y = stats.values().map(|s| s.max_y).fold(f32::MIN, f32::max);
    if global_max_y <= max_page_height {
        return false;
    }

    let mut prev: Option<&PageStats> = None;
    for page in pages {
        let Some(current) = stats.get(&page.id) else {
            continue; // page without blocks carries no signal
        };
        if let Some(prev) = prev {
            if current.min_y < prev.max_y - PAGE_OVERLAP_TOLERANCE {
                return false;
            }
        }
        prev = Some(current);
    }
    true
}

/// Decide the axis origin from scope-corrected geometry.
///
/// Primary signal: the Y trend of blocks in document order within each
/// page. Extraction tools emit blocks in reading order, so top-left
/// geometry trends upward in Y and bottom-left trends downward. When
/// fewer than two comparable blocks exist, fall back to the prototype
/// rule that first blocks near the top edge imply a top-left origin.
fn detect_origin(blocks: &[LayoutBlock]) -> Origin {
    let mut increasing = 0usize;
    let mut decreasing = 0usize;
    let mut prev: Option<(u32, f32)> = None;

    for block in blocks {
        if let Some((page_id, prev_y)) = prev {
            if page_id == block.page_id {
                let delta = block.bbox.y0 - prev_y;
                if delta > TREND_EPSILON {
                    increasing += 1;
                } else if delta < -TREND_EPSILON {
                    decreasing += 1;
                }
            }
        }
        prev = Some((block.page_id, block.bbox.y0));
    }

    log::debug!(
        "origin trend: {} increasing, {} decreasing",
        increasing,
        decreasing
    );

    if increasing > decreasing {
        return Origin::TopLeft;
    }
    if decreasing > increasing {
        return Origin::BottomLeft;
    }

    // Inconclusive trend; use the first few blocks' distance from the
    // top edge instead.
    let first_ys: Vec<f32> = blocks.iter().take(3).map(|b| b.bbox.y0).collect();
    if first_ys.is_empty() {
        return Origin::TopLeft;
    }
    let mean = first_ys.iter().sum::<f32>() / first_ys.len() as f32;
    if mean < NEAR_TOP_THRESHOLD {
        Origin::TopLeft
    } else {
        Origin::BottomLeft
    }
}
