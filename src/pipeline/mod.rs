//! Pipeline stages for resume reformatting.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ mapper ──▶ layout ──▶ docx
//! (path)    (pdf/docx)   (LLM)     (pure)     (docx-rs)
//!                          │
//!                          ├─▶ artifact   (debug JSON, best effort)
//!                          └─▶ grounding  (optional cross-check)
//! ```
//!
//! 1. [`input`]: validate the path and detect PDF vs DOCX
//! 2. [`extract`]: container → plain text on `spawn_blocking`
//! 3. [`mapper`]: prompt the [`generate::TextGenerator`], clean and parse
//!    the JSON answer; the only stage with network I/O
//! 4. [`layout`]: the fixed template as a pure function of the record
//! 5. [`docx`]: write the layout as an Office Open XML package
//!
//! [`postprocess`] holds the cleanup rules used by `extract` and `mapper`.

pub mod artifact;
pub mod docx;
pub mod extract;
pub mod generate;
pub mod grounding;
pub mod input;
pub mod layout;
pub mod mapper;
pub mod postprocess;
