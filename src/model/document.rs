//! Persisted document forms.
//!
//! [`RawDocument`] mirrors the exact serialized shape produced by the
//! extraction stage; [`ReconstructedDocument`] is the pipeline output
//! consumed by downstream collaborators (storage, UI).

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{BlockKind, BoundingBox, Grid, LayoutBlock, Page};

/// Block content as persisted: an externally tagged enum, so a text block
/// serializes as `"kind": {"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockContent {
    /// Body text
    Text(String),
    /// Heading / title text
    Title(String),
    /// Raw text of a table region
    Table(String),
    /// Caption or alt text of a figure region
    Figure(String),
    /// Unclassified content
    Unknown(String),
}

impl BlockContent {
    /// The text payload, whatever the classification.
    pub fn text(&self) -> &str {
        match self {
            BlockContent::Text(t)
            | BlockContent::Title(t)
            | BlockContent::Table(t)
            | BlockContent::Figure(t)
            | BlockContent::Unknown(t) => t,
        }
    }

    /// The corresponding block kind.
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Title(_) => BlockKind::Title,
            BlockContent::Table(_) => BlockKind::Table,
            BlockContent::Figure(_) => BlockKind::Figure,
            BlockContent::Unknown(_) => BlockKind::Unknown,
        }
    }
}

/// A layout block exactly as persisted by the extraction stage.
///
/// The wire field for the owning page is `pages_id`; it is kept verbatim
/// so round-trips are byte-compatible with existing dumps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Block identifier
    pub id: u32,

    /// Owning page identifier
    #[serde(rename = "pages_id")]
    pub page_id: u32,

    /// Bounding box in whatever convention the extractor used
    pub bbox: BoundingBox,

    /// Classified content
    pub kind: BlockContent,
}

impl RawBlock {
    /// Convert to the internal working representation.
    pub fn to_layout_block(&self) -> LayoutBlock {
        LayoutBlock::new(self.id, self.page_id, self.bbox, self.kind.text())
            .with_kind(self.kind.kind())
    }
}

/// A document as persisted by the extraction stage, prior to any
/// normalization or fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Physical pages
    pub pages: Vec<Page>,

    /// Layout blocks in extraction order
    pub blocks: Vec<RawBlock>,
}

impl RawDocument {
    /// Parse a persisted document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    /// Convert blocks to the internal working representation,
    /// preserving extraction order.
    pub fn layout_blocks(&self) -> Vec<LayoutBlock> {
        self.blocks.iter().map(RawBlock::to_layout_block).collect()
    }

    /// Concatenated text of all blocks, in extraction order.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.kind.text())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// The final, internally consistent pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedDocument {
    /// Physical pages (unchanged from input)
    pub pages: Vec<Page>,

    /// Normalized, style-annotated layout blocks
    pub blocks: Vec<LayoutBlock>,

    /// Assembled table grids, one per table sub-result
    pub tables: Vec<Grid>,
}

impl ReconstructedDocument {
    /// Serialize to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    /// Count of blocks flagged as geometric anomalies.
    pub fn anomaly_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.out_of_bounds).count()
    }
}
