//! Staged extraction fallback.
//!
//! Extraction runs as a bounded escalation ladder: the cheap primary tool
//! first, basic OCR on a rendered page image when the primary result is
//! garbage, and OCR on an enhanced image as the last resort. Higher-cost
//! stages only run on demonstrated failure, a stage never runs twice, and
//! the best text seen is never silently dropped.

mod garbage;
mod tool;

pub use garbage::GarbageConfig;
pub use tool::{
    CommandTool, ExternalTool, StdoutKind, ToolError, ToolOutput, DEFAULT_TOOL_TIMEOUT,
};

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::model::RawDocument;

/// An escalation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// The primary structured extraction tool
    Primary,
    /// OCR on a rendered page image
    BasicOcr,
    /// OCR on an enhanced page image
    EnhancedOcr,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Primary => write!(f, "primary"),
            Stage::BasicOcr => write!(f, "basic_ocr"),
            Stage::EnhancedOcr => write!(f, "enhanced_ocr"),
        }
    }
}

/// One extraction attempt and what it produced.
#[derive(Debug, Clone)]
pub struct ExtractionAttempt {
    /// Which stage ran
    pub stage: Stage,
    /// The text the stage produced (empty on tool failure)
    pub output: String,
    /// Wall-clock time the stage took
    pub elapsed: Duration,
}

/// Why a run terminally failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Escalation was needed but no OCR tooling is configured.
    NoFallbackAvailable,
    /// Every stage ran (or was blocked by tool failure) and none produced
    /// acceptable output.
    AllStagesExhausted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoFallbackAvailable => write!(f, "no_fallback_available"),
            FailureReason::AllStagesExhausted => write!(f, "all_stages_exhausted"),
        }
    }
}

/// Terminal result of a fallback run.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A stage produced acceptable output.
    Accepted {
        /// The stage that succeeded
        stage: Stage,
        /// The accepted text
        text: String,
        /// Structured output, present when the primary stage succeeded
        document: Option<RawDocument>,
        /// Time spent in the accepting stage
        elapsed: Duration,
    },
    /// All available stages were exhausted.
    Failed {
        /// Why the run failed
        reason: FailureReason,
        /// The best (longest) attempt output, for diagnostics
        best: Option<ExtractionAttempt>,
    },
}

impl Outcome {
    /// Whether the run produced acceptable output.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }
}

/// Options for a fallback run.
#[derive(Debug, Clone, Default)]
pub struct FallbackOptions {
    /// The garbage-result heuristic configuration
    pub garbage: GarbageConfig,
}

impl FallbackOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the garbage heuristic configuration.
    pub fn with_garbage(mut self, garbage: GarbageConfig) -> Self {
        self.garbage = garbage;
        self
    }
}

/// Orchestrates the bounded escalation ladder over a set of external
/// tools.
///
/// The controller itself is stateless between runs; all per-document
/// retry state lives inside [`run`](FallbackController::run), so one
/// controller can serve independent documents concurrently.
pub struct FallbackController {
    primary: Box<dyn ExternalTool>,
    renderer: Option<Box<dyn ExternalTool>>,
    ocr: Option<Box<dyn ExternalTool>>,
    enhancer: Option<Box<dyn ExternalTool>>,
    options: FallbackOptions,
}

impl FallbackController {
    /// Create a controller with only the primary tool configured.
    pub fn new(primary: Box<dyn ExternalTool>) -> Self {
        Self {
            primary,
            renderer: None,
            ocr: None,
            enhancer: None,
            options: FallbackOptions::default(),
        }
    }

    /// Configure the page renderer (document path in, image path out).
    pub fn with_renderer(mut self, renderer: Box<dyn ExternalTool>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Configure the OCR tool (image path in, text out).
    pub fn with_ocr(mut self, ocr: Box<dyn ExternalTool>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Configure the image enhancer (image path in, image path out).
    pub fn with_enhancer(mut self, enhancer: Box<dyn ExternalTool>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Set run options.
    pub fn with_options(mut self, options: FallbackOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the escalation ladder over one document.
    ///
    /// `Primary → BasicOcr → EnhancedOcr`, stopping at the first
    /// acceptable output. A tool error or timeout triggers escalation
    /// rather than aborting, except at the last stage. Never invokes the
    /// same stage twice.
    pub fn run(&self, document: &Path) -> Outcome {
        let mut attempts: Vec<ExtractionAttempt> = Vec::new();

        // Stage 1: primary structured extraction.
        let start = Instant::now();
        match self.primary.invoke(document) {
            Ok(output) => {
                let elapsed = start.elapsed();
                let text = output.text().unwrap_or_default();
                log::info!(
                    "stage {} finished in {:.2}s ({} chars)",
                    Stage::Primary,
                    elapsed.as_secs_f64(),
                    text.chars().count()
                );
                if !self.options.garbage.is_garbage(&text) {
                    let document = match output {
                        ToolOutput::Structured(doc) => Some(doc),
                        _ => None,
                    };
                    return Outcome::Accepted {
                        stage: Stage::Primary,
                        text,
                        document,
                        elapsed,
                    };
                }
                log::info!("stage {} produced garbage, escalating", Stage::Primary);
                attempts.push(ExtractionAttempt {
                    stage: Stage::Primary,
                    output: text,
                    elapsed,
                });
            }
            Err(err) => {
                let elapsed = start.elapsed();
                log::warn!(
                    "stage {} failed after {:.2}s: {}",
                    Stage::Primary,
                    elapsed.as_secs_f64(),
                    err
                );
                attempts.push(ExtractionAttempt {
                    stage: Stage::Primary,
                    output: String::new(),
                    elapsed,
                });
            }
        }

        let (Some(renderer), Some(ocr)) = (self.renderer.as_deref(), self.ocr.as_deref())
        else {
            log::warn!("escalation needed but no OCR tooling configured");
            return Outcome::Failed {
                reason: FailureReason::NoFallbackAvailable,
                best: best_attempt(attempts),
            };
        };

        // Render the page once; both OCR stages consume the image.
        let image = match renderer.invoke(document) {
            Ok(output) => match output.file() {
                Some(path) => path.to_path_buf(),
                None => {
                    log::warn!("renderer '{}' returned no image path", renderer.name());
                    return Outcome::Failed {
                        reason: FailureReason::AllStagesExhausted,
                        best: best_attempt(attempts),
                    };
                }
            },
            Err(err) => {
                log::warn!("renderer '{}' failed: {}", renderer.name(), err);
                return Outcome::Failed {
                    reason: FailureReason::AllStagesExhausted,
                    best: best_attempt(attempts),
                };
            }
        };

        // Stage 2: OCR on the rendered image.
        if let Some(outcome) = self.ocr_stage(Stage::BasicOcr, ocr, &image, &mut attempts) {
            return outcome;
        }

        // Stage 3: enhance the image, then OCR once more.
        let Some(enhancer) = self.enhancer.as_deref() else {
            log::warn!("enhanced stage needed but no image enhancer configured");
            return Outcome::Failed {
                reason: FailureReason::NoFallbackAvailable,
                best: best_attempt(attempts),
            };
        };

        let enhanced = match enhancer.invoke(&image) {
            Ok(output) => match output.file() {
                Some(path) => path.to_path_buf(),
                None => {
                    log::warn!("enhancer '{}' returned no image path", enhancer.name());
                    return Outcome::Failed {
                        reason: FailureReason::AllStagesExhausted,
                        best: best_attempt(attempts),
                    };
                }
            },
            Err(err) => {
                log::warn!("enhancer '{}' failed: {}", enhancer.name(), err);
                return Outcome::Failed {
                    reason: FailureReason::AllStagesExhausted,
                    best: best_attempt(attempts),
                };
            }
        };

        if let Some(outcome) =
            self.ocr_stage(Stage::EnhancedOcr, ocr, &enhanced, &mut attempts)
        {
            return outcome;
        }

        log::warn!("all extraction stages exhausted");
        Outcome::Failed {
            reason: FailureReason::AllStagesExhausted,
            best: best_attempt(attempts),
        }
    }

    /// Run one OCR stage. Returns the terminal outcome when the stage
    /// output is acceptable, `None` when escalation should continue.
    fn ocr_stage(
        &self,
        stage: Stage,
        ocr: &dyn ExternalTool,
        image: &Path,
        attempts: &mut Vec<ExtractionAttempt>,
    ) -> Option<Outcome> {
        let start = Instant::now();
        match ocr.invoke(image) {
            Ok(output) => {
                let elapsed = start.elapsed();
                let text = output.text().unwrap_or_default();
                log::info!(
                    "stage {} finished in {:.2}s ({} chars)",
                    stage,
                    elapsed.as_secs_f64(),
                    text.chars().count()
                );
                if !self.options.garbage.is_garbage(&text) {
                    return Some(Outcome::Accepted {
                        stage,
                        text,
                        document: None,
                        elapsed,
                    });
                }
                log::info!("stage {} produced garbage, escalating", stage);
                attempts.push(ExtractionAttempt {
                    stage,
                    output: text,
                    elapsed,
                });
                None
            }
            Err(err) => {
                let elapsed = start.elapsed();
                log::warn!(
                    "stage {} failed after {:.2}s: {}",
                    stage,
                    elapsed.as_secs_f64(),
                    err
                );
                attempts.push(ExtractionAttempt {
                    stage,
                    output: String::new(),
                    elapsed,
                });
                None
            }
        }
    }
}

/// The longest attempt output, kept for diagnostics.
fn best_attempt(attempts: Vec<ExtractionAttempt>) -> Option<ExtractionAttempt> {
    attempts
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.output.chars().count() > best.output.chars().count() {
                candidate
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Tool returning a canned result and counting invocations through a
    /// shared counter.
    struct FixedTool {
        name: &'static str,
        result: fn() -> Result<ToolOutput, ToolError>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedTool {
        fn new(name: &'static str, result: fn() -> Result<ToolOutput, ToolError>) -> Self {
            Self {
                name,
                result,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ExternalTool for FixedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn invoke(&self, _input: &Path) -> Result<ToolOutput, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn good_text() -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::Text(
            "A long and perfectly plausible body of extracted document text \
             that comfortably clears the minimum character threshold for the \
             garbage heuristic to accept it as real content."
                .to_string(),
        ))
    }

    fn garbage_text() -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::Text("In this image, there is a document".to_string()))
    }

    fn image_file() -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::File("page.png".into()))
    }

    #[test]
    fn test_primary_accepted_runs_nothing_else() {
        let ocr = FixedTool::new("ocr", good_text);
        let ocr_calls = Arc::clone(&ocr.calls);
        let controller = FallbackController::new(Box::new(FixedTool::new("primary", good_text)))
            .with_renderer(Box::new(FixedTool::new("render", image_file)))
            .with_ocr(Box::new(ocr));

        let outcome = controller.run(Path::new("doc.pdf"));
        match outcome {
            Outcome::Accepted { stage, .. } => assert_eq!(stage, Stage::Primary),
            other => panic!("expected acceptance, got {other:?}"),
        }
        // Cost avoidance: OCR never ran.
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_fallback_available() {
        let controller =
            FallbackController::new(Box::new(FixedTool::new("primary", garbage_text)));
        let outcome = controller.run(Path::new("doc.pdf"));
        match outcome {
            Outcome::Failed { reason, best } => {
                assert_eq!(reason, FailureReason::NoFallbackAvailable);
                // The garbage attempt is still carried for diagnostics.
                assert!(best.unwrap().output.contains("In this image"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_escalates_to_basic_ocr() {
        let controller =
            FallbackController::new(Box::new(FixedTool::new("primary", garbage_text)))
                .with_renderer(Box::new(FixedTool::new("render", image_file)))
                .with_ocr(Box::new(FixedTool::new("ocr", good_text)));

        let outcome = controller.run(Path::new("doc.pdf"));
        match outcome {
            Outcome::Accepted { stage, .. } => assert_eq!(stage, Stage::BasicOcr),
            other => panic!("expected basic OCR acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_primary_tool_error_triggers_escalation() {
        fn failing() -> Result<ToolOutput, ToolError> {
            Err(ToolError::Failed {
                tool: "primary".to_string(),
                code: Some(1),
                stderr: "segfault".to_string(),
            })
        }
        let controller = FallbackController::new(Box::new(FixedTool::new("primary", failing)))
            .with_renderer(Box::new(FixedTool::new("render", image_file)))
            .with_ocr(Box::new(FixedTool::new("ocr", good_text)));

        let outcome = controller.run(Path::new("doc.pdf"));
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_all_stages_exhausted_keeps_best() {
        let controller =
            FallbackController::new(Box::new(FixedTool::new("primary", garbage_text)))
                .with_renderer(Box::new(FixedTool::new("render", image_file)))
                .with_ocr(Box::new(FixedTool::new("ocr", garbage_text)))
                .with_enhancer(Box::new(FixedTool::new("enhance", image_file)));

        let outcome = controller.run(Path::new("doc.pdf"));
        match outcome {
            Outcome::Failed { reason, best } => {
                assert_eq!(reason, FailureReason::AllStagesExhausted);
                assert!(best.is_some());
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(Stage::Primary.to_string(), "primary");
        assert_eq!(Stage::EnhancedOcr.to_string(), "enhanced_ocr");
        assert_eq!(
            FailureReason::AllStagesExhausted.to_string(),
            "all_stages_exhausted"
        );
    }
}
