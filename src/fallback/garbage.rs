//! Garbage-result heuristic.
//!
//! Extraction tools fail in characteristic ways: near-empty output,
//! image-description boilerplate standing in for real text, or structural
//! scaffolding (table rules, separators) with nothing between the
//! markers. The heuristic flags those so the controller can escalate to a
//! heavier extraction path.

use regex::Regex;

/// Configuration for the garbage-result heuristic.
///
/// Everything here is data, not control flow: the phrase list and marker
/// pattern can evolve without touching the escalation logic.
#[derive(Debug, Clone)]
pub struct GarbageConfig {
    /// Minimum trimmed character count for output to be plausible.
    pub min_chars: usize,

    /// Boilerplate phrases (matched case-insensitively) that mark
    /// image-description stand-ins rather than extracted text.
    pub boilerplate_phrases: Vec<String>,

    /// Pattern for structural markers (table rules, separators).
    pub structural_marker: Regex,

    /// Minimum alphanumeric characters that must remain once structural
    /// markers are stripped.
    pub min_marker_residue: usize,
}

impl Default for GarbageConfig {
    fn default() -> Self {
        Self {
            min_chars: 50,
            boilerplate_phrases: vec![
                "in this image".to_string(),
                "this image shows".to_string(),
                "image of a document".to_string(),
                "no text found".to_string(),
                "unable to extract text".to_string(),
            ],
            structural_marker: Regex::new(r"[|+]|[-=_]{2,}").unwrap(),
            min_marker_residue: 20,
        }
    }
}

impl GarbageConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum plausible character count.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Replace the boilerplate phrase list.
    pub fn with_phrases<S: Into<String>>(mut self, phrases: impl IntoIterator<Item = S>) -> Self {
        self.boilerplate_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the structural marker pattern.
    pub fn with_structural_marker(mut self, marker: Regex) -> Self {
        self.structural_marker = marker;
        self
    }

    /// Judge whether extracted text is garbage.
    ///
    /// Garbage when any of: trimmed length below `min_chars`, a
    /// boilerplate phrase appears, or the content is predominantly
    /// structural markers with almost no real text between them.
    pub fn is_garbage(&self, text: &str) -> bool {
        let trimmed = text.trim();

        let char_count = trimmed.chars().count();
        if char_count < self.min_chars {
            log::debug!(
                "garbage: {} chars below minimum {}",
                char_count,
                self.min_chars
            );
            return true;
        }

        let lower = trimmed.to_lowercase();
        for phrase in &self.boilerplate_phrases {
            if lower.contains(phrase.as_str()) {
                log::debug!("garbage: boilerplate phrase {:?}", phrase);
                return true;
            }
        }

        if self.structural_marker.is_match(trimmed) {
            let residue = self.structural_marker.replace_all(trimmed, "");
            let real_chars = residue.chars().filter(|c| c.is_alphanumeric()).count();
            if real_chars < self.min_marker_residue {
                log::debug!(
                    "garbage: {} real chars between structural markers",
                    real_chars
                );
                return true;
            }
        }

        false
    }
}
