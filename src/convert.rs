//! Top-level entry points: resume file in, templated DOCX out.
//!
//! [`reformat`] runs the whole pipeline. [`render_to_file`] is the renderer
//! on its own, for callers that already hold a [`CanonicalResumeRecord`], and
//! [`extract_only`] is the extractor on its own.

use crate::config::{ReformatConfig, TemplateAssets};
use crate::error::ResumeError;
use crate::model::CanonicalResumeRecord;
use crate::output::{MappingStatus, ReformatOutput, ReformatStats};
use crate::pipeline::input::DocumentFormat;
use crate::pipeline::{docx, extract, generate, grounding, input, layout, mapper};
use crate::progress::Stage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reformat one resume into `output_dir`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ReformatOutput)` whenever a document was written, including when the
/// mapping degraded to the empty record under the lenient policy (check
/// `output.mapping_status`).
///
/// # Errors
/// Returns `Err(ResumeError)` for fatal errors:
/// - No LLM provider configured (checked before the input is touched)
/// - File not found / unsupported / no extractable text
/// - Mapping failure under [`crate::MappingPolicy::Strict`]
/// - The DOCX cannot be written
pub async fn reformat(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ReformatConfig,
) -> Result<ReformatOutput, ResumeError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting reformat: {}", input_path.display());

    // ── Step 1: Credentials first ────────────────────────────────────────
    let generator = generate::resolve_generator(config)?;

    // ── Step 2: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_path)?;

    // ── Step 3: Extract text ─────────────────────────────────────────────
    stage_start(config, Stage::Extract);
    let extract_start = Instant::now();
    let text = extract::extract_text(&resolved).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    let text_chars = text.chars().count();
    stage_complete(config, Stage::Extract, &format!("{text_chars} chars"));

    // ── Step 4: Map onto the schema ──────────────────────────────────────
    stage_start(config, Stage::Map);
    let map_start = Instant::now();
    let mapped = mapper::map_text(&text, generator.as_ref(), config).await?;
    let map_duration_ms = map_start.elapsed().as_millis() as u64;
    let map_detail = match &mapped.status {
        MappingStatus::Parsed => format!("parsed via {}", generator.name()),
        MappingStatus::ParseFailed { .. } => "unparseable response, empty record".to_string(),
        MappingStatus::ServiceFailed { .. } => "service failed, empty record".to_string(),
    };
    stage_complete(config, Stage::Map, &map_detail);

    // ── Step 5: Optional grounding check ─────────────────────────────────
    let ungrounded = if config.verify_grounding {
        let found = grounding::find_ungrounded(&mapped.record, &text);
        for u in &found {
            let msg = format!("{} {:?} not found in source text", u.field, u.value);
            warn!("{}", msg);
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_warning(Stage::Map, &msg);
            }
        }
        found
    } else {
        Vec::new()
    };

    // ── Step 6: Render ───────────────────────────────────────────────────
    stage_start(config, Stage::Render);
    let render_start = Instant::now();
    let output_path = output_path_for(output_dir, &mapped.record.name);
    render_to_file(&mapped.record, &output_path, &config.template).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    stage_complete(config, Stage::Render, &output_path.display().to_string());

    let stats = ReformatStats {
        text_chars,
        response_chars: mapped.response_chars,
        extract_duration_ms,
        map_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Reformat complete: {} in {}ms",
        output_path.display(),
        stats.total_duration_ms
    );

    Ok(ReformatOutput {
        record: mapped.record,
        mapping_status: mapped.status,
        source_text: text,
        output_path,
        ungrounded,
        stats,
    })
}

/// Synchronous wrapper around [`reformat`].
///
/// Creates a temporary tokio runtime internally.
pub fn reformat_sync(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ReformatConfig,
) -> Result<ReformatOutput, ResumeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ResumeError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(reformat(input_path, output_dir, config))
}

/// Reformat a resume held in memory.
///
/// The bytes are written to a managed [`tempfile`] with the extension of
/// `format`, which is removed on return.
pub async fn reformat_bytes(
    bytes: &[u8],
    format: DocumentFormat,
    output_dir: impl AsRef<Path>,
    config: &ReformatConfig,
) -> Result<ReformatOutput, ResumeError> {
    let suffix = match format {
        DocumentFormat::Pdf => ".pdf",
        DocumentFormat::Docx => ".docx",
    };
    let mut tmp = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .map_err(|e| ResumeError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ResumeError::Internal(format!("tempfile write: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `reformat` returns
    reformat(tmp.path(), output_dir, config).await
}

/// Extract the cleaned text of a resume without mapping it.
///
/// Does not require an LLM provider or API key.
pub async fn extract_only(input_path: impl AsRef<Path>) -> Result<String, ResumeError> {
    let resolved = input::resolve_input(input_path)?;
    extract::extract_text(&resolved).await
}

/// Render a record on the fixed template and write it to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn render_to_file(
    record: &CanonicalResumeRecord,
    path: impl AsRef<Path>,
    template: &TemplateAssets,
) -> Result<(), ResumeError> {
    let path = path.as_ref();
    let layout = layout::build_layout(record, template);
    debug!("Layout has {} blocks", layout.blocks.len());

    let bytes = tokio::task::spawn_blocking(move || docx::render_bytes(&layout))
        .await
        .map_err(|e| ResumeError::Internal(format!("Render task panicked: {e}")))??;

    let write_err = |e| ResumeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("docx.tmp");
    tokio::fs::write(&tmp_path, &bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Output file name for a candidate: the capitalized name with every run of
/// non-alphanumeric characters replaced by `_`, plus `_resume.docx`.
///
/// A name with no usable characters becomes `resume`.
pub fn output_file_name(name: &str) -> String {
    let safe = RE_NON_ALNUM
        .replace_all(&layout::capitalize_words(name), "_")
        .into_owned();
    let safe = if safe.trim_matches('_').is_empty() {
        "resume".to_string()
    } else {
        safe
    };
    format!("{safe}_resume.docx")
}

/// Output path for `name` inside `dir`.
pub fn output_path_for(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    dir.as_ref().join(output_file_name(name))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn stage_start(config: &ReformatConfig, stage: Stage) {
    info!("{}...", stage);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
}

fn stage_complete(config: &ReformatConfig, stage: Stage, detail: &str) {
    info!("{}: {}", stage, detail);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_name() {
        assert_eq!(output_file_name("john q. public"), "John_Q_Public_resume.docx");
        assert_eq!(output_file_name("JANE   DOE"), "Jane_Doe_resume.docx");
        assert_eq!(output_file_name("Ana-María López"), "Ana_mar_a_L_pez_resume.docx");
    }

    #[test]
    fn test_empty_name_falls_back() {
        assert_eq!(output_file_name(""), "resume_resume.docx");
        assert_eq!(output_file_name(" ?? "), "resume_resume.docx");
    }

    #[test]
    fn test_output_path_joins_dir() {
        assert_eq!(
            output_path_for("/tmp/out", "jane doe"),
            PathBuf::from("/tmp/out/Jane_Doe_resume.docx")
        );
    }

    #[tokio::test]
    async fn test_render_to_file_writes_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("Jane_Doe_resume.docx");
        let record = CanonicalResumeRecord {
            name: "jane doe".into(),
            ..Default::default()
        };
        let template = TemplateAssets {
            logo_path: None,
            ..Default::default()
        };

        render_to_file(&record, &path, &template).await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        assert!(!path.with_extension("docx.tmp").exists());
    }

    #[tokio::test]
    async fn test_extract_only_reports_missing_file() {
        let err = extract_only("/no/such/resume.pdf").await.unwrap_err();
        assert!(matches!(err, ResumeError::FileNotFound { .. }));
    }
}
