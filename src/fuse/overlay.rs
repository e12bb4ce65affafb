//! Style overlay matching.
//!
//! Layout blocks and style spans come from two independent extraction
//! passes with independently drawn bounding boxes, so the relationship
//! between them is many-to-many. This module fuses the two sets by
//! geometric overlap and annotates each block with the dominant style of
//! the text it contains.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{LayoutBlock, StyleSpan, TextStyle};

/// Options for style overlay matching.
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    /// Minimum intersection-over-union for a span to count toward a
    /// block's style.
    pub overlap_threshold: f32,
}

impl OverlayOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overlap threshold.
    pub fn with_overlap_threshold(mut self, threshold: f32) -> Self {
        self.overlap_threshold = threshold;
        self
    }
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
        }
    }
}

/// Annotate each block with the dominant style of the spans that overlap
/// it, returning new records in input order.
///
/// Spans qualify when their intersection-over-union with the block
/// exceeds the threshold and they sit on the same page. Qualifying spans
/// are grouped by style tuple and weighted by total character count, so
/// the typography of the longest text wins over short fragments such as
/// superscripts. Ties break to the first-encountered group in span
/// iteration order, which keeps the result deterministic.
///
/// A block with no qualifying span keeps `style = None`. An entirely
/// empty span set is a typed error; the caller decides whether that means
/// "no style information" for the document.
pub fn attach_style(
    blocks: &[LayoutBlock],
    spans: &[StyleSpan],
    options: &OverlayOptions,
) -> Result<Vec<LayoutBlock>> {
    if spans.is_empty() {
        return Err(Error::EmptySpanSet);
    }

    // Independent per block; rayon fan-out preserves input order.
    Ok(blocks
        .par_iter()
        .map(|block| {
            let style = dominant_style(block, spans, options.overlap_threshold);
            block.styled(style)
        })
        .collect())
}

/// Pick the character-weighted dominant style among qualifying spans.
fn dominant_style(
    block: &LayoutBlock,
    spans: &[StyleSpan],
    threshold: f32,
) -> Option<TextStyle> {
    // Groups keyed by style tuple, in first-encounter order.
    let mut groups: Vec<(TextStyle, usize)> = Vec::new();

    for span in spans {
        if span.page_id != block.page_id {
            continue;
        }
        let ratio = block.bbox.overlap_ratio(&span.bbox);
        if ratio <= threshold {
            continue;
        }
        log::trace!(
            "block {} <- span '{}' ({}), overlap {:.3}",
            block.id,
            span.font_name,
            span.char_weight(),
            ratio
        );

        let style = span.style();
        let weight = span.char_weight();
        match groups.iter_mut().find(|(s, _)| *s == style) {
            Some((_, w)) => *w += weight,
            None => groups.push((style, weight)),
        }
    }

    // Strictly-greater comparison keeps the earliest group on ties.
    groups
        .into_iter()
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
        .map(|(style, _)| style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn block(id: u32, bbox: BoundingBox) -> LayoutBlock {
        LayoutBlock::new(id, 1, bbox, "text")
    }

    fn span(bbox: BoundingBox, font: &str, size: f32, text: &str) -> StyleSpan {
        StyleSpan::new(1, bbox, font, size, text)
    }

    #[test]
    fn test_empty_span_set_is_typed_error() {
        let blocks = vec![block(1, BoundingBox::new(0.0, 0.0, 10.0, 10.0))];
        let result = attach_style(&blocks, &[], &OverlayOptions::new());
        assert!(matches!(result, Err(Error::EmptySpanSet)));
    }

    #[test]
    fn test_no_qualifying_span_leaves_style_unknown() {
        let blocks = vec![block(1, BoundingBox::new(0.0, 0.0, 100.0, 20.0))];
        // Far away from the block.
        let spans = vec![span(
            BoundingBox::new(0.0, 500.0, 100.0, 520.0),
            "Helvetica",
            12.0,
            "elsewhere",
        )];
        let out = attach_style(&blocks, &spans, &OverlayOptions::new()).unwrap();
        assert!(out[0].style.is_none());
    }

    #[test]
    fn test_char_weight_beats_span_count() {
        let bbox = BoundingBox::new(0.0, 0.0, 200.0, 20.0);
        let blocks = vec![block(1, bbox)];

        // One 200-char span of style A against five 5-char spans of style B,
        // all coincident with the block.
        let mut spans = vec![span(bbox, "Georgia", 11.0, &"a".repeat(200))];
        for _ in 0..5 {
            spans.push(span(bbox, "Courier-Bold", 9.0, "bbbbb"));
        }

        let out = attach_style(&blocks, &spans, &OverlayOptions::new()).unwrap();
        let style = out[0].style.as_ref().unwrap();
        assert_eq!(style.font_name, "Georgia");
        assert!(!style.is_bold);
    }

    #[test]
    fn test_tie_breaks_to_first_encountered() {
        let bbox = BoundingBox::new(0.0, 0.0, 200.0, 20.0);
        let blocks = vec![block(1, bbox)];
        let spans = vec![
            span(bbox, "First", 10.0, "12345"),
            span(bbox, "Second", 10.0, "12345"),
        ];
        let out = attach_style(&blocks, &spans, &OverlayOptions::new()).unwrap();
        assert_eq!(out[0].style.as_ref().unwrap().font_name, "First");
    }

    #[test]
    fn test_same_style_spans_accumulate() {
        let bbox = BoundingBox::new(0.0, 0.0, 200.0, 20.0);
        let blocks = vec![block(1, bbox)];
        let spans = vec![
            span(bbox, "Dominant", 10.0, "abc"),
            span(bbox, "Loner", 10.0, "abcd"),
            span(bbox, "Dominant", 10.0, "de"),
        ];
        // Dominant accumulates 5 chars, beating Loner's 4.
        let out = attach_style(&blocks, &spans, &OverlayOptions::new()).unwrap();
        assert_eq!(out[0].style.as_ref().unwrap().font_name, "Dominant");
    }

    #[test]
    fn test_page_boundary_respected() {
        let bbox = BoundingBox::new(0.0, 0.0, 200.0, 20.0);
        let blocks = vec![block(1, bbox)];
        let mut other_page = span(bbox, "WrongPage", 10.0, &"x".repeat(100));
        other_page.page_id = 2;
        let spans = vec![other_page, span(bbox, "RightPage", 10.0, "short")];

        let out = attach_style(&blocks, &spans, &OverlayOptions::new()).unwrap();
        assert_eq!(out[0].style.as_ref().unwrap().font_name, "RightPage");
    }

    #[test]
    fn test_inputs_not_mutated() {
        let bbox = BoundingBox::new(0.0, 0.0, 200.0, 20.0);
        let blocks = vec![block(1, bbox)];
        let spans = vec![span(bbox, "Helvetica", 12.0, "body text here")];
        let out = attach_style(&blocks, &spans, &OverlayOptions::new()).unwrap();
        assert!(blocks[0].style.is_none());
        assert!(out[0].style.is_some());
    }

    #[test]
    fn test_threshold_configurable() {
        let blocks = vec![block(1, BoundingBox::new(0.0, 0.0, 100.0, 100.0))];
        // Span covering a quarter of the block: IoU = 0.25.
        let spans = vec![span(
            BoundingBox::new(0.0, 0.0, 50.0, 50.0),
            "Quarter",
            10.0,
            "q",
        )];

        let strict = attach_style(&blocks, &spans, &OverlayOptions::new()).unwrap();
        assert!(strict[0].style.is_none());

        let loose = OverlayOptions::new().with_overlap_threshold(0.2);
        let out = attach_style(&blocks, &spans, &loose).unwrap();
        assert_eq!(out[0].style.as_ref().unwrap().font_name, "Quarter");
    }
}
