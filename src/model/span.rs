//! Style span types from the low-level font extraction pass.

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// A fine-grained run of text sharing one font and style.
///
/// Many spans typically fall within one layout block. Spans are produced
/// by a separate low-level extraction pass and are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpan {
    /// The page this span belongs to
    pub page_id: u32,

    /// Bounding box in the same canonical space as layout blocks
    pub bbox: BoundingBox,

    /// Font name as reported by the extractor (e.g., "Helvetica-Bold")
    pub font_name: String,

    /// Font size in points
    pub font_size: f32,

    /// Whether the font appears to be bold
    pub is_bold: bool,

    /// Whether the font appears to be italic
    pub is_italic: bool,

    /// The text covered by this span
    pub text: String,
}

impl StyleSpan {
    /// Create a new span, inferring bold/italic from the font name the way
    /// most extractors report them.
    pub fn new(
        page_id: u32,
        bbox: BoundingBox,
        font_name: impl Into<String>,
        font_size: f32,
        text: impl Into<String>,
    ) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let is_bold =
            lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            page_id,
            bbox,
            font_name,
            font_size,
            is_bold,
            is_italic,
            text: text.into(),
        }
    }

    /// The style tuple this span contributes to.
    pub fn style(&self) -> TextStyle {
        TextStyle {
            font_name: self.font_name.clone(),
            font_size: self.font_size,
            is_bold: self.is_bold,
            is_italic: self.is_italic,
        }
    }

    /// Character count of the span's text, the dominance weight.
    pub fn char_weight(&self) -> usize {
        self.text.chars().count()
    }
}

/// The fused style tuple attached to a layout block.
///
/// Equality on all four fields is the grouping key during style fusion;
/// `font_size` compares exactly because all sizes originate from the same
/// extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font name
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Bold flag
    pub is_bold: bool,
    /// Italic flag
    pub is_italic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bold_italic_detection() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let span = StyleSpan::new(1, b, "Helvetica-Bold", 12.0, "Test");
        assert!(span.is_bold);
        assert!(!span.is_italic);

        let span = StyleSpan::new(1, b, "Times-Oblique", 10.0, "Test");
        assert!(!span.is_bold);
        assert!(span.is_italic);
    }

    #[test]
    fn test_char_weight_counts_chars_not_bytes() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let span = StyleSpan::new(1, b, "Batang", 10.0, "한글");
        assert_eq!(span.char_weight(), 2);
    }

    #[test]
    fn test_style_tuple_equality() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let a = StyleSpan::new(1, b, "Helvetica", 12.0, "one");
        let c = StyleSpan::new(2, b, "Helvetica", 12.0, "two");
        assert_eq!(a.style(), c.style());
    }
}
