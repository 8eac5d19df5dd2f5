//! Configuration types for resume reformatting.
//!
//! All pipeline behaviour is controlled through [`ReformatConfig`], built via
//! its [`ReformatConfigBuilder`]. Rendering assets (logo, footer, brand
//! colour, typeface) are grouped in [`TemplateAssets`] because the renderer
//! is a pure function of the record and these values.

use crate::error::ResumeError;
use crate::pipeline::generate::TextGenerator;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default location of the persisted debug record, relative to the working directory.
pub const DEFAULT_DEBUG_ARTIFACT: &str = "parsed_resume.json";

/// Default logo location, relative to the working directory.
pub const DEFAULT_LOGO_PATH: &str = "logo.png";

/// Organisation contact line printed in every page footer.
pub const DEFAULT_FOOTER_TEXT: &str = "www.quadranttechnologies.com                             \
5020, 148th Avenue NE, Suite-250, Redmond, WA-98052";

/// Skill-matrix header fill (RGB hex, no `#`).
pub const DEFAULT_HEADER_FILL: &str = "5A2A82";

/// Body typeface used for every run in the document.
pub const DEFAULT_BODY_FONT: &str = "Calibri";

/// Configuration for one resume reformatting run.
///
/// # Example
/// ```rust
/// use resume2docx::{MappingPolicy, ReformatConfig};
///
/// let config = ReformatConfig::builder()
///     .model("gemini-2.5-pro")
///     .mapping_policy(MappingPolicy::Strict)
///     .debug_artifact(None)
///     .build()
///     .unwrap();
/// assert!(config.debug_artifact.is_none());
/// ```
#[derive(Clone)]
pub struct ReformatConfig {
    /// LLM model identifier, e.g. "gemini-2.5-pro", "gpt-4.1-mini".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic", "ollama").
    /// If None along with `generator`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed text generator. Takes precedence over `provider_name`.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Sampling temperature for the extraction call. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 8192.
    ///
    /// A long resume with many projects serialises to several thousand
    /// tokens of JSON; a truncated answer is unparseable.
    pub max_tokens: usize,

    /// Retry attempts on a failed service call. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds. Default: 180.
    pub api_timeout_secs: u64,

    /// Custom system prompt. If None, uses [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// What to do when the service fails or answers with something that is
    /// not the schema. Default: [`MappingPolicy::Lenient`].
    pub mapping_policy: MappingPolicy,

    /// Cross-check identity fields against the source text and warn about
    /// values that do not appear in it. Default: false.
    pub verify_grounding: bool,

    /// Where to persist the mapped record as JSON. `None` disables the
    /// artifact. Default: `parsed_resume.json`.
    pub debug_artifact: Option<PathBuf>,

    /// Fixed template assets for the renderer.
    pub template: TemplateAssets,

    /// Optional per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReformatConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            generator: None,
            temperature: 0.1,
            max_tokens: 8192,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 180,
            system_prompt: None,
            mapping_policy: MappingPolicy::default(),
            verify_grounding: false,
            debug_artifact: Some(PathBuf::from(DEFAULT_DEBUG_ARTIFACT)),
            template: TemplateAssets::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReformatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReformatConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("mapping_policy", &self.mapping_policy)
            .field("verify_grounding", &self.verify_grounding)
            .field("debug_artifact", &self.debug_artifact)
            .field("template", &self.template)
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl ReformatConfig {
    /// Create a new builder for `ReformatConfig`.
    pub fn builder() -> ReformatConfigBuilder {
        ReformatConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReformatConfig`].
#[derive(Debug)]
pub struct ReformatConfigBuilder {
    config: ReformatConfig,
}

impl ReformatConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn mapping_policy(mut self, policy: MappingPolicy) -> Self {
        self.config.mapping_policy = policy;
        self
    }

    pub fn verify_grounding(mut self, v: bool) -> Self {
        self.config.verify_grounding = v;
        self
    }

    pub fn debug_artifact(mut self, path: Option<PathBuf>) -> Self {
        self.config.debug_artifact = path;
        self
    }

    pub fn template(mut self, template: TemplateAssets) -> Self {
        self.config.template = template;
        self
    }

    pub fn logo_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.template.logo_path = path;
        self
    }

    pub fn footer_text(mut self, text: impl Into<String>) -> Self {
        self.config.template.footer_text = text.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReformatConfig, ResumeError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(ResumeError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ResumeError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if !is_hex_color(&c.template.header_fill) {
            return Err(ResumeError::InvalidConfig(format!(
                "header fill must be a 6-digit hex colour, got '{}'",
                c.template.header_fill
            )));
        }
        if c.template.body_font.trim().is_empty() {
            return Err(ResumeError::InvalidConfig("body font must not be empty".into()));
        }
        Ok(self.config)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
}

// ── Policy & assets ──────────────────────────────────────────────────────

/// How the mapper reacts to an unusable service answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MappingPolicy {
    /// Print diagnostics and continue with an empty record, so the run
    /// still produces a (near-empty) document. (default)
    #[default]
    Lenient,
    /// Fail the run with [`ResumeError::MappingFailed`] or
    /// [`ResumeError::ServiceFailed`].
    Strict,
}

/// Fixed assets of the single output template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateAssets {
    /// Logo placed top-right on the first page. Skipped when the file is missing.
    pub logo_path: Option<PathBuf>,
    /// Footer line repeated on every page.
    pub footer_text: String,
    /// Skill-matrix header background, RGB hex without `#`.
    pub header_fill: String,
    /// Typeface for every run.
    pub body_font: String,
}

impl Default for TemplateAssets {
    fn default() -> Self {
        Self {
            logo_path: Some(PathBuf::from(DEFAULT_LOGO_PATH)),
            footer_text: DEFAULT_FOOTER_TEXT.to_string(),
            header_fill: DEFAULT_HEADER_FILL.to_string(),
            body_font: DEFAULT_BODY_FONT.to_string(),
        }
    }
}
