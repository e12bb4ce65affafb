//! Data model for document reconstruction.
//!
//! This module defines the intermediate representation shared by the
//! pipeline stages: pages and layout blocks from the extraction tool,
//! style spans from the font extraction pass, sparse table cells and the
//! dense grids assembled from them, and the persisted document forms.

mod document;
mod geometry;
mod page;
mod span;
mod table;

pub use document::{BlockContent, RawBlock, RawDocument, ReconstructedDocument};
pub use geometry::BoundingBox;
pub use page::{BlockKind, LayoutBlock, Page};
pub use span::{StyleSpan, TextStyle};
pub use table::{Grid, GridCell, TableCell};
