//! Input resolution: validate a user-supplied resume path and detect its format.
//!
//! The format is chosen by extension (as users expect) and then confirmed by
//! magic bytes, so a renamed file fails here with a clear message instead of
//! deep inside a parser.

use crate::error::ResumeError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source document container formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Format for a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    /// Leading bytes every file of this format starts with.
    fn magic(self) -> &'static [u8] {
        match self {
            DocumentFormat::Pdf => b"%PDF",
            // DOCX is a ZIP container.
            DocumentFormat::Docx => b"PK\x03\x04",
        }
    }
}

/// A validated local input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub format: DocumentFormat,
}

/// Resolve a local resume path, validating existence, readability, extension
/// and magic bytes.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<ResolvedInput, ResumeError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(ResumeError::FileNotFound { path });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let format = DocumentFormat::from_extension(&extension).ok_or_else(|| {
        ResumeError::UnsupportedFormat {
            path: path.clone(),
            extension: format!(".{}", extension.to_ascii_lowercase()),
        }
    })?;

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic[..] != format.magic() {
                return Err(ResumeError::ExtractionFailed {
                    path,
                    detail: format!(
                        "file has a .{} extension but starts with {:?}",
                        extension, magic
                    ),
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ResumeError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ResumeError::FileNotFound { path });
        }
    }

    debug!("Resolved {:?} input: {}", format, path.display());
    Ok(ResolvedInput { path, format })
}
