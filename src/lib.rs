//! # docfuse
//!
//! Document reconstruction pipeline for heterogeneous extraction output.
//!
//! Extraction tools are good at their own slice of the problem and
//! inconsistent about everything else: layout blocks arrive in mixed
//! coordinate conventions, font information comes from a separate pass
//! with its own bounding boxes, and table cells are sparse spanning
//! records rather than grids. This library fuses those partial views into
//! one internally consistent structured document, and decides when
//! extraction output is unusable and must be retried through a heavier
//! OCR path.
//!
//! ## Quick Start
//!
//! ```
//! use docfuse::{Reconstructor, RawDocument, TableCell};
//!
//! fn main() -> docfuse::Result<()> {
//!     let raw = RawDocument::from_json(r#"{
//!         "pages": [{"id": 1, "width": 612.0, "height": 792.0}],
//!         "blocks": [{
//!             "id": 1, "pages_id": 1,
//!             "bbox": {"x0": 72.0, "y0": 72.0, "x1": 540.0, "y1": 120.0},
//!             "kind": {"title": "Annual Report"}
//!         }]
//!     }"#)?;
//!
//!     let cells = vec![
//!         TableCell::spanning(0, 0, 1, 2, "Header").header(),
//!         TableCell::new(1, 0, "A"),
//!         TableCell::new(1, 1, "B"),
//!     ];
//!
//!     let doc = Reconstructor::new().reconstruct(&raw, &[], &[cells])?;
//!     assert_eq!(doc.tables[0].num_rows, 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **[`fuse::normalize`]** — rewrites raw geometry (possibly cumulative
//!   across pages, possibly bottom-left origin) into canonical top-left,
//!   page-relative coordinates.
//! - **[`fuse::attach_style`]** — fuses independently extracted style
//!   spans onto layout blocks by area overlap, picking the
//!   character-weighted dominant style.
//! - **[`fuse::assemble`]** — builds dense rectangular table grids from
//!   sparse spanning cells.
//! - **[`fallback`]** — a staged extraction controller that escalates
//!   from the primary tool through OCR to enhanced-image OCR when results
//!   are garbage.

pub mod error;
pub mod fallback;
pub mod fuse;
pub mod model;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fallback::{
    CommandTool, ExternalTool, FallbackController, FallbackOptions, FailureReason,
    GarbageConfig, Outcome, Stage, ToolError, ToolOutput,
};
pub use fuse::{
    assemble, attach_style, normalize, NormalizeOptions, Origin, OriginHint, OverlayOptions,
};
pub use model::{
    BlockContent, BlockKind, BoundingBox, Grid, GridCell, LayoutBlock, Page, RawBlock,
    RawDocument, ReconstructedDocument, StyleSpan, TableCell, TextStyle,
};

/// Run the full reconstruction pipeline with default options.
///
/// See [`Reconstructor`] for configuration.
pub fn reconstruct(
    raw: &RawDocument,
    spans: &[StyleSpan],
    tables: &[Vec<TableCell>],
) -> Result<ReconstructedDocument> {
    Reconstructor::new().reconstruct(raw, spans, tables)
}

/// Builder tying the pure pipeline stages together.
///
/// # Example
///
/// ```no_run
/// use docfuse::{Origin, RawDocument, Reconstructor};
///
/// let raw = RawDocument::from_json("...")?;
/// let doc = Reconstructor::new()
///     .with_origin(Origin::BottomLeft)
///     .with_overlap_threshold(0.4)
///     .reconstruct(&raw, &[], &[])?;
/// # Ok::<(), docfuse::Error>(())
/// ```
pub struct Reconstructor {
    normalize_options: NormalizeOptions,
    overlay_options: OverlayOptions,
}

impl Reconstructor {
    /// Create a reconstructor with default options: detected origin,
    /// overlap threshold 0.5.
    pub fn new() -> Self {
        Self {
            normalize_options: NormalizeOptions::default(),
            overlay_options: OverlayOptions::default(),
        }
    }

    /// Force a known coordinate origin, bypassing detection.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.normalize_options = self.normalize_options.with_origin(origin);
        self
    }

    /// Set the span/block overlap threshold for style fusion.
    pub fn with_overlap_threshold(mut self, threshold: f32) -> Self {
        self.overlay_options = self.overlay_options.with_overlap_threshold(threshold);
        self
    }

    /// Run normalize → style fusion → grid assembly over one document.
    ///
    /// An empty span set degrades to unstyled blocks rather than failing
    /// the document; an empty table-cell set is skipped as "no table".
    /// Geometric anomalies are flagged on the blocks, never dropped.
    pub fn reconstruct(
        &self,
        raw: &RawDocument,
        spans: &[StyleSpan],
        tables: &[Vec<TableCell>],
    ) -> Result<ReconstructedDocument> {
        let blocks = raw.layout_blocks();
        let blocks = normalize(&raw.pages, &blocks, &self.normalize_options);

        let blocks = match attach_style(&blocks, spans, &self.overlay_options) {
            Ok(styled) => styled,
            Err(Error::EmptySpanSet) => {
                log::debug!("no style spans available, blocks stay unstyled");
                blocks
            }
            Err(err) => return Err(err),
        };

        let mut grids = Vec::with_capacity(tables.len());
        for cells in tables {
            if cells.is_empty() {
                log::debug!("empty table cell set skipped");
                continue;
            }
            grids.push(assemble(cells)?);
        }

        Ok(ReconstructedDocument {
            pages: raw.pages.clone(),
            blocks,
            tables: grids,
        })
    }
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawDocument {
        RawDocument::from_json(
            r#"{
                "pages": [{"id": 1, "width": 612.0, "height": 792.0}],
                "blocks": [
                    {"id": 1, "pages_id": 1,
                     "bbox": {"x0": 72.0, "y0": 72.0, "x1": 540.0, "y1": 120.0},
                     "kind": {"title": "Report"}},
                    {"id": 2, "pages_id": 1,
                     "bbox": {"x0": 72.0, "y0": 140.0, "x1": 540.0, "y1": 300.0},
                     "kind": {"text": "Body paragraph."}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_reconstruct_without_spans_or_tables() {
        let doc = reconstruct(&sample_raw(), &[], &[]).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert!(doc.blocks.iter().all(|b| b.style.is_none()));
        assert!(doc.tables.is_empty());
        assert_eq!(doc.anomaly_count(), 0);
    }

    #[test]
    fn test_reconstruct_attaches_styles() {
        let raw = sample_raw();
        let spans = vec![StyleSpan::new(
            1,
            BoundingBox::new(72.0, 72.0, 540.0, 120.0),
            "Helvetica-Bold",
            24.0,
            "Report",
        )];
        let doc = reconstruct(&raw, &spans, &[]).unwrap();
        let style = doc.blocks[0].style.as_ref().unwrap();
        assert!(style.is_bold);
        assert!(doc.blocks[1].style.is_none());
    }

    #[test]
    fn test_reconstruct_skips_empty_table_sets() {
        let tables = vec![vec![], vec![TableCell::new(0, 0, "x")]];
        let doc = reconstruct(&sample_raw(), &[], &tables).unwrap();
        assert_eq!(doc.tables.len(), 1);
    }

    #[test]
    fn test_builder_options() {
        let r = Reconstructor::new()
            .with_origin(Origin::TopLeft)
            .with_overlap_threshold(0.3);
        assert!(matches!(
            r.normalize_options.origin,
            OriginHint::Forced(Origin::TopLeft)
        ));
        assert_eq!(r.overlay_options.overlap_threshold, 0.3);
    }
}
