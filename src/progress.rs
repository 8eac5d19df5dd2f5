//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::ReformatConfigBuilder::progress_callback`] to receive an
//! event as each stage (extract → map → render) starts, finishes or hits a
//! non-fatal problem. The CLI uses this to drive its spinner and print one
//! human-readable status line per stage.
//!
//! # Example
//!
//! ```rust
//! use resume2docx::{PipelineProgressCallback, ReformatConfig, Stage};
//! use std::sync::{Arc, Mutex};
//!
//! struct StageLog(Mutex<Vec<Stage>>);
//!
//! impl PipelineProgressCallback for StageLog {
//!     fn on_stage_complete(&self, stage: Stage, _detail: &str) {
//!         self.0.lock().unwrap().push(stage);
//!     }
//! }
//!
//! let log = Arc::new(StageLog(Mutex::new(Vec::new())));
//! let config = ReformatConfig::builder()
//!     .progress_callback(log as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// PDF/DOCX → plain text.
    Extract,
    /// Plain text → canonical record via the LLM.
    Map,
    /// Canonical record → DOCX file.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Extract => "Extracting text",
            Stage::Map => "Mapping to schema",
            Stage::Render => "Rendering DOCX",
        })
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called just before a stage starts.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes. `detail` is a short human-readable
    /// summary (e.g. "2 431 chars", "Jane_Doe_resume.docx").
    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        let _ = (stage, detail);
    }

    /// Called for a non-fatal problem inside a stage, e.g. the mapper
    /// degrading to an empty record or an unwritable debug artifact.
    fn on_stage_warning(&self, stage: Stage, message: &str) {
        let _ = (stage, message);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReformatConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage:?}"));
        }

        fn on_stage_warning(&self, stage: Stage, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("warn {stage:?} {message}"));
        }
    }

    #[test]
    fn test_default_methods_are_noops() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Extract);
        cb.on_stage_complete(Stage::Map, "ok");
        cb.on_stage_warning(Stage::Render, "x");
    }

    #[test]
    fn test_overridden_methods_fire() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Map);
        rec.on_stage_complete(Stage::Map, "ignored");
        rec.on_stage_warning(Stage::Map, "empty record");
        let events = rec.events.lock().unwrap();
        assert_eq!(*events, vec!["start Map", "warn Map empty record"]);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Render.to_string(), "Rendering DOCX");
    }
}
