//! Integration tests for the full reformat pipeline.
//!
//! A canned [`TextGenerator`] stands in for the LLM, so these run offline.
//! Input resumes are generated as DOCX files with `docx-rs` in a tempdir.

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run};
use futures::stream::{self, StreamExt};
use resume2docx::pipeline::extract::{DocxTextExtractor, TextExtractor};
use resume2docx::{
    reformat, reformat_bytes, DocumentFormat, GenerateError, MappingPolicy, MappingStatus,
    PipelineProgressCallback, ReformatConfig, ResumeError, Stage, TextGenerator, TextStream,
};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Answers every prompt with a fixed response, split into small chunks.
struct CannedGenerator {
    response: Result<String, GenerateError>,
    prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    fn ok(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: GenerateError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(err),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let text = self.response.clone()?;
        let chunks: Vec<Result<String, GenerateError>> = text
            .chars()
            .collect::<Vec<_>>()
            .chunks(16)
            .map(|c| Ok(c.iter().collect()))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }
}

#[derive(Default)]
struct StageRecorder {
    events: Mutex<Vec<String>>,
}

impl PipelineProgressCallback for StageRecorder {
    fn on_stage_start(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("start:{stage:?}"));
    }
    fn on_stage_complete(&self, stage: Stage, _detail: &str) {
        self.events.lock().unwrap().push(format!("done:{stage:?}"));
    }
    fn on_stage_warning(&self, stage: Stage, _message: &str) {
        self.events.lock().unwrap().push(format!("warn:{stage:?}"));
    }
}

fn write_source_docx(dir: &Path, lines: &[&str]) -> PathBuf {
    let mut docx = Docx::new();
    for line in lines {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    let path = dir.join("source.docx");
    std::fs::write(&path, buf.into_inner()).unwrap();
    path
}

fn config_with(generator: Arc<dyn TextGenerator>, dir: &Path) -> ReformatConfig {
    ReformatConfig::builder()
        .generator(generator)
        .debug_artifact(Some(dir.join("parsed_resume.json")))
        .logo_path(None)
        .build()
        .unwrap()
}

fn docx_lines(path: &Path) -> Vec<String> {
    let bytes = std::fs::read(path).unwrap();
    DocxTextExtractor
        .extract(&bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

const SOURCE: &[&str] = &[
    "JOHN Q. PUBLIC",
    "john@example.org | linkedin.com/in/jqp",
    "Summary: Platform engineer with a decade of distributed systems work.",
    "Experience: Staff Engineer, Initech, 2018 - Present",
    "Built the billing pipeline.",
];

const RESPONSE: &str = r#"Here you go:
```json
{
  "name": "john q. public",
  "email": "john@example.org",
  "phone": "",
  "linkedin": "linkedin.com/in/jqp",
  "skills": ["Rust", "Kubernetes"],
  "summary": "Platform engineer with a decade of distributed systems work.",
  "experience": [
    {"job_title": "Staff Engineer", "company": "Initech", "start_date": "2018",
     "end_date": "Present", "description": ["Built the billing pipeline."]}
  ],
  "awards": []
}
```"#;

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_docx_resume_is_reformatted() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source_docx(dir.path(), SOURCE);
    let generator = CannedGenerator::ok(RESPONSE);
    let out_dir = dir.path().join("out");

    let output = reformat(&input, &out_dir, &config_with(generator.clone(), dir.path()))
        .await
        .unwrap();

    assert_eq!(output.mapping_status, MappingStatus::Parsed);
    assert_eq!(output.output_path, out_dir.join("John_Q_Public_resume.docx"));
    assert!(output.stats.text_chars > 0);
    assert!(output.stats.response_chars > 0);

    // The prompt carried the extracted text.
    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Built the billing pipeline."));

    let lines = docx_lines(&output.output_path);
    for expected in [
        "John Q. Public",
        "john@example.org",
        "linkedin.com/in/jqp",
        "Candidate Strengths",
        "Skill Matrix",
        "Kubernetes",
        "Professional Experience",
        "Staff Engineer - Initech (2018 - Present)",
        "Built the billing pipeline.",
    ] {
        assert!(lines.iter().any(|l| l == expected), "missing {expected:?} in {lines:?}");
    }
    assert!(!lines.iter().any(|l| l == "Awards"));

    // Debug artifact written on success.
    assert!(dir.path().join("parsed_resume.json").exists());
}

#[tokio::test]
async fn test_unparseable_response_still_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source_docx(dir.path(), SOURCE);
    let generator = CannedGenerator::ok("Sorry, I can't help with that.");

    let output = reformat(&input, dir.path(), &config_with(generator, dir.path()))
        .await
        .unwrap();

    assert!(matches!(output.mapping_status, MappingStatus::ParseFailed { .. }));
    assert!(output.record.is_empty());
    assert_eq!(output.output_path, dir.path().join("resume_resume.docx"));
    let lines = docx_lines(&output.output_path);
    assert_eq!(lines, vec!["Name Not Found", "Skill Matrix"]);
    assert!(!dir.path().join("parsed_resume.json").exists());
}

#[tokio::test]
async fn test_strict_policy_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source_docx(dir.path(), SOURCE);
    let config = ReformatConfig::builder()
        .generator(CannedGenerator::ok("not json"))
        .mapping_policy(MappingPolicy::Strict)
        .debug_artifact(None)
        .build()
        .unwrap();
    let out_dir = dir.path().join("out");

    let err = reformat(&input, &out_dir, &config).await.unwrap_err();
    assert!(matches!(err, ResumeError::MappingFailed { .. }));
    assert!(!out_dir.exists());
}

#[tokio::test]
async fn test_service_failure_is_lenient_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source_docx(dir.path(), SOURCE);
    let generator = CannedGenerator::failing(GenerateError::Service {
        provider: "canned".into(),
        detail: "503 unavailable".into(),
    });
    let recorder = Arc::new(StageRecorder::default());
    let config = ReformatConfig::builder()
        .generator(generator)
        .debug_artifact(None)
        .logo_path(None)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    let output = reformat(&input, dir.path(), &config).await.unwrap();
    assert!(matches!(output.mapping_status, MappingStatus::ServiceFailed { .. }));

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start:Extract",
            "done:Extract",
            "start:Map",
            "warn:Map",
            "done:Map",
            "start:Render",
            "done:Render",
        ]
    );
}

#[tokio::test]
async fn test_grounding_flags_invented_company() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source_docx(dir.path(), SOURCE);
    let invented = RESPONSE.replace("Initech", "Globex");
    let config = ReformatConfig::builder()
        .generator(CannedGenerator::ok(&invented))
        .debug_artifact(None)
        .logo_path(None)
        .verify_grounding(true)
        .build()
        .unwrap();

    let output = reformat(&input, dir.path(), &config).await.unwrap();
    let fields: Vec<&str> = output.ungrounded.iter().map(|u| u.field.as_str()).collect();
    assert_eq!(fields, vec!["experience[0].company"]);
}

#[tokio::test]
async fn test_unsupported_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cv.txt");
    std::fs::write(&input, "plain text resume").unwrap();
    let generator = CannedGenerator::ok(RESPONSE);

    let err = reformat(&input, dir.path(), &config_with(generator.clone(), dir.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResumeError::UnsupportedFormat { .. }));
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_in_memory_docx_is_reformatted() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source_docx(dir.path(), SOURCE);
    let bytes = std::fs::read(&source).unwrap();
    let out_dir = dir.path().join("mem");

    let output = reformat_bytes(
        &bytes,
        DocumentFormat::Docx,
        &out_dir,
        &config_with(CannedGenerator::ok(RESPONSE), dir.path()),
    )
    .await
    .unwrap();
    assert!(output.output_path.exists());
}

#[test]
fn test_callback_types_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StageRecorder>();
    assert_send_sync::<resume2docx::NoopProgressCallback>();
    assert_send_sync::<ReformatConfig>();
}
