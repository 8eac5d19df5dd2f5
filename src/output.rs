//! Result types returned by the reformatting entry points.

use crate::model::CanonicalResumeRecord;
use crate::pipeline::grounding::UngroundedValue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the schema mapper arrived at its record.
///
/// Lets callers tell a genuinely empty resume (`Parsed` with an empty
/// record) from a mapping that degraded to the empty record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MappingStatus {
    /// The service answered with JSON that fits the schema.
    Parsed,
    /// The service answered, but not with usable JSON.
    ParseFailed {
        detail: String,
        raw_response: String,
    },
    /// The service call itself failed.
    ServiceFailed { detail: String },
}

impl MappingStatus {
    pub fn is_parsed(&self) -> bool {
        matches!(self, MappingStatus::Parsed)
    }
}

/// The record produced by the mapper plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRecord {
    pub record: CanonicalResumeRecord,
    pub status: MappingStatus,
    /// Characters in the accumulated service response (0 if the call failed).
    #[serde(default)]
    pub response_chars: usize,
}

/// Timings and sizes for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformatStats {
    /// Characters of extracted source text.
    pub text_chars: usize,
    /// Characters of the accumulated service response.
    pub response_chars: usize,
    pub extract_duration_ms: u64,
    pub map_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReformatOutput {
    /// The canonical record the document was rendered from.
    pub record: CanonicalResumeRecord,
    pub mapping_status: MappingStatus,
    /// Cleaned text extracted from the source document.
    pub source_text: String,
    /// Path of the written DOCX.
    pub output_path: PathBuf,
    /// Values that could not be found in the source text. Always empty
    /// unless `verify_grounding` is enabled.
    pub ungrounded: Vec<UngroundedValue>,
    pub stats: ReformatStats,
}
