//! Error types for the resume2docx library.
//!
//! Two error types reflect two failure scopes:
//!
//! * [`ResumeError`]: **Fatal** for a run: bad input file, no text layer,
//!   provider not configured, or the output document cannot be written.
//!   Returned as `Err(ResumeError)` from the top-level `reformat*` functions.
//!
//! * [`GenerateError`]: a single call to the text-understanding service
//!   failed. The mapper decides whether this is fatal: under
//!   [`crate::config::MappingPolicy::Lenient`] it degrades to an empty record
//!   and records the failure in [`crate::output::MappingStatus`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume2docx library.
#[derive(Debug, Error)]
pub enum ResumeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file is neither a PDF nor a DOCX.
    #[error("Unsupported file type '{extension}' for '{path}'. Please provide a PDF or DOCX file.")]
    UnsupportedFormat { path: PathBuf, extension: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The container could not be opened or decoded.
    #[error("Failed to extract text from '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// The document opened fine but carries no text (e.g. a scanned PDF).
    #[error("No text extracted from '{path}'. The document may be scanned or empty.")]
    NoTextExtracted { path: PathBuf },

    // ── Service errors ────────────────────────────────────────────────────
    /// No text-understanding service is configured (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The service call failed and the strict mapping policy is active.
    #[error("LLM service call failed: {0}")]
    ServiceFailed(#[from] GenerateError),

    /// The response could not be read as the resume schema and the strict
    /// mapping policy is active.
    #[error("Could not map the LLM response onto the resume schema: {detail}\nResponse starts with: {response_head:?}")]
    MappingFailed {
        detail: String,
        response_head: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Building or packing the DOCX failed.
    #[error("Failed to render DOCX: {0}")]
    RenderFailed(String),

    /// Could not create or write the output DOCX file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed call to the text-understanding service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// Transport, authentication or provider-side failure.
    #[error("{provider}: {detail}")]
    Service { provider: String, detail: String },

    /// The call did not finish within the configured timeout.
    #[error("{provider}: call timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    /// The service returned no text at all.
    #[error("{provider}: empty response")]
    EmptyResponse { provider: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_display() {
        let e = ResumeError::UnsupportedFormat {
            path: PathBuf::from("cv.txt"),
            extension: ".txt".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains(".txt"), "got: {msg}");
        assert!(msg.contains("PDF or DOCX"));
    }

    #[test]
    fn test_service_failed_wraps_generate_error() {
        let e: ResumeError = GenerateError::Timeout {
            provider: "gemini".into(),
            secs: 60,
        }
        .into();
        let msg = e.to_string();
        assert!(msg.contains("gemini"), "got: {msg}");
        assert!(msg.contains("60s"), "got: {msg}");
    }

    #[test]
    fn test_mapping_failed_display() {
        let e = ResumeError::MappingFailed {
            detail: "expected value at line 1 column 1".into(),
            response_head: "Sorry, I".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("line 1 column 1"));
        assert!(msg.contains("Sorry, I"));
    }

    #[test]
    fn test_provider_not_configured_display() {
        let e = ResumeError::ProviderNotConfigured {
            provider: "auto".into(),
            hint: "Set GEMINI_API_KEY".into(),
        };
        assert!(e.to_string().contains("GEMINI_API_KEY"));
    }
}
