//! Text extraction: PDF/DOCX container → flat plain text.
//!
//! Both parsers are synchronous and CPU-bound, so [`extract_text`] runs them
//! on `spawn_blocking`. The result is cleaned with
//! [`postprocess::clean_extracted_text`] and an empty result is a terminal
//! condition for the run ([`ResumeError::NoTextExtracted`]).
//!
//! DOCX text is read in document order: paragraphs and table cells interleave
//! as they appear, one line per paragraph.

use crate::error::ResumeError;
use crate::pipeline::input::{DocumentFormat, ResolvedInput};
use crate::pipeline::postprocess;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use tracing::{debug, info, warn};

/// Converts the raw bytes of one container format into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract all text. Errors are human-readable parser messages.
    fn extract(&self, bytes: &[u8]) -> Result<String, String>;
}

/// PDF text layer via `pdf-extract`.
#[derive(Debug, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
    }
}

/// DOCX body text (paragraphs, hyperlinks, tables) via `docx-rs`.
#[derive(Debug, Default)]
pub struct DocxTextExtractor;

impl TextExtractor for DocxTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, String> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;
        let mut lines = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => lines.push(paragraph_text(p)),
                DocumentChild::Table(t) => table_lines(t, &mut lines),
                _ => {}
            }
        }
        Ok(lines.join("\n"))
    }
}

/// The extractor for a detected format.
pub fn extractor_for(format: DocumentFormat) -> Box<dyn TextExtractor> {
    match format {
        DocumentFormat::Pdf => Box::new(PdfTextExtractor),
        DocumentFormat::Docx => Box::new(DocxTextExtractor),
    }
}

/// Read and extract a resolved input file.
pub async fn extract_text(input: &ResolvedInput) -> Result<String, ResumeError> {
    let path = input.path.clone();
    let format = input.format;
    info!("Extracting text from {:?}: {}", format, path.display());

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ResumeError::ExtractionFailed {
            path: path.clone(),
            detail: e.to_string(),
        })?;

    let raw = tokio::task::spawn_blocking(move || extractor_for(format).extract(&bytes))
        .await
        .map_err(|e| ResumeError::Internal(format!("Extraction task panicked: {e}")))?
        .map_err(|detail| ResumeError::ExtractionFailed {
            path: path.clone(),
            detail,
        })?;

    let text = postprocess::clean_extracted_text(&raw);
    if text.is_empty() {
        if format == DocumentFormat::Pdf {
            warn!("PDF appears to be scanned or contains no text: {}", path.display());
        }
        return Err(ResumeError::NoTextExtracted { path });
    }

    debug!("Extracted {} chars ({} raw)", text.len(), raw.len());
    Ok(text)
}

// ── DOCX walking ─────────────────────────────────────────────────────────

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for child in &paragraph.children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, &mut out),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut out);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn push_run_text(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

fn table_lines(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => lines.push(paragraph_text(p)),
                    TableCellContent::Table(t) => table_lines(t, lines),
                    _ => {}
                }
            }
        }
    }
}
