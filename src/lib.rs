//! # resume2docx
//!
//! Reformat resumes (PDF or DOCX) into one fixed, branded DOCX template using
//! an LLM to read the source.
//!
//! ## Pipeline Overview
//!
//! ```text
//! resume.pdf / resume.docx
//!  │
//!  ├─ 1. Input    validate path, detect PDF vs DOCX by extension + magic bytes
//!  ├─ 2. Extract  text layer via pdf-extract / docx-rs (spawn_blocking)
//!  ├─ 3. Map      one LLM call → JSON → CanonicalResumeRecord
//!  ├─ 4. Layout   fixed template as a pure function of the record
//!  └─ 5. Render   docx-rs package, written atomically as <Name>_resume.docx
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume2docx::{reformat, ReformatConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY
//!     let config = ReformatConfig::default();
//!     let output = reformat("cv.pdf", ".", &config).await?;
//!     println!("wrote {}", output.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a provider
//!
//! The mapper talks to a [`TextGenerator`], not to a vendor SDK. Supply your
//! own through [`ReformatConfigBuilder::generator`] to run the pipeline on
//! canned responses.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MappingPolicy, ReformatConfig, ReformatConfigBuilder, TemplateAssets};
pub use convert::{
    extract_only, output_file_name, reformat, reformat_bytes, reformat_sync, render_to_file,
};
pub use error::{GenerateError, ResumeError};
pub use model::{
    Award, CanonicalResumeRecord, Certification, Education, Experience, Project, SkillMatrixEntry,
};
pub use output::{MappedRecord, MappingStatus, ReformatOutput, ReformatStats};
pub use pipeline::generate::{TextGenerator, TextStream};
pub use pipeline::grounding::UngroundedValue;
pub use pipeline::input::DocumentFormat;
pub use pipeline::mapper::map_text;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
