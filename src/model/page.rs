//! Page and layout block types.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, TextStyle};

/// A single physical page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page identifier (1-indexed in typical extraction output)
    pub id: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(id: u32, width: f32, height: f32) -> Self {
        Self { id, width, height }
    }

    /// Create a page with standard Letter size (8.5 x 11 inches).
    pub fn letter(id: u32) -> Self {
        Self::new(id, 612.0, 792.0)
    }

    /// Create a page with standard A4 size (210 x 297 mm).
    pub fn a4(id: u32) -> Self {
        Self::new(id, 595.0, 842.0)
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Kind of content a layout block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Body text paragraph
    #[default]
    Text,
    /// Heading / title
    Title,
    /// Table region
    Table,
    /// Figure or image region
    Figure,
    /// Anything the layout tool could not classify
    Unknown,
}

/// A coarse content unit produced by a layout/extraction tool.
///
/// Enrichment passes never mutate a block in place; they produce new
/// records with additional fields set (see [`crate::fuse::overlay`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Block identifier, unique within a document
    pub id: u32,

    /// The page this block belongs to
    pub page_id: u32,

    /// Bounding box, canonical after normalization
    pub bbox: BoundingBox,

    /// Extracted text content
    pub text: String,

    /// Block classification
    pub kind: BlockKind,

    /// Fused dominant style, attached by the overlay matcher.
    /// `None` is an explicit "unknown style" state, not a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,

    /// Set when normalization left the block entirely outside the page.
    /// Flagged, never discarded; the caller decides how to report it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub out_of_bounds: bool,
}

impl LayoutBlock {
    /// Create a text block.
    pub fn new(id: u32, page_id: u32, bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            id,
            page_id,
            bbox,
            text: text.into(),
            kind: BlockKind::Text,
            style: None,
            out_of_bounds: false,
        }
    }

    /// Set the block kind and return self.
    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }

    /// Return a copy of this block annotated with a fused style.
    pub fn styled(&self, style: Option<TextStyle>) -> Self {
        Self {
            style,
            ..self.clone()
        }
    }

    /// Check if the block carries any non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
