//! CLI binary for resume2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ReformatConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume2docx::config::DEFAULT_DEBUG_ARTIFACT;
use resume2docx::{
    reformat, MappingPolicy, MappingStatus, PipelineProgressCallback, ProgressCallback,
    ReformatConfig, ReformatOutput, Stage,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner plus one status line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
    stage_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            stage_started: Mutex::new(None),
        })
    }

    fn elapsed(&self) -> String {
        let secs = self
            .stage_started
            .lock()
            .map(|t| (*t).map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0))
            .unwrap_or(0.0);
        format!("{secs:.1}s")
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        if let Ok(mut t) = self.stage_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        self.bar.println(format!(
            "  {} {:<18} {}  {}",
            green("✓"),
            stage.to_string(),
            detail,
            dim(&self.elapsed()),
        ));
        if stage == Stage::Render {
            self.bar.finish_and_clear();
        }
    }

    fn on_stage_warning(&self, stage: Stage, message: &str) {
        self.bar
            .println(format!("  {} {:<18} {}", yellow("⚠"), stage.to_string(), message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Reformat into the current directory
  resume2docx cv.pdf

  # Reformat a DOCX into ./out, failing on an unusable LLM answer
  resume2docx --strict -o out cv.docx

  # Show what was extracted and mapped
  resume2docx --print-text --json cv.pdf

  # Use a specific provider/model and flag values not found in the source
  resume2docx --provider openai --model gpt-4.1 --verify-grounding cv.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default provider)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter, e.g. resume2docx=debug

  A .env file in the working directory is loaded on startup.
"#;

/// Reformat PDF/DOCX resumes into a fixed DOCX template using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "resume2docx",
    version,
    about = "Reformat PDF/DOCX resumes into a fixed DOCX template using an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Resume to reformat (.pdf or .docx).
    input: PathBuf,

    /// Directory the `<Name>_resume.docx` is written to.
    #[arg(short, long, env = "RESUME2DOCX_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// LLM model ID (default depends on provider; gemini-2.5-pro for Gemini).
    #[arg(long, env = "RESUME2DOCX_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama.
    #[arg(long, env = "RESUME2DOCX_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "RESUME2DOCX_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "RESUME2DOCX_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Retries on a failed LLM call.
    #[arg(long, env = "RESUME2DOCX_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// LLM call timeout in seconds.
    #[arg(long, env = "RESUME2DOCX_API_TIMEOUT", default_value_t = 180)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "RESUME2DOCX_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Fail instead of writing an empty document when the LLM answer is unusable.
    #[arg(long, env = "RESUME2DOCX_STRICT")]
    strict: bool,

    /// Report mapped values that do not appear in the source text.
    #[arg(long, env = "RESUME2DOCX_VERIFY_GROUNDING")]
    verify_grounding: bool,

    /// Logo image placed top-right on the first page.
    #[arg(long, env = "RESUME2DOCX_LOGO", default_value = "logo.png")]
    logo: PathBuf,

    /// Footer text repeated on every page.
    #[arg(long, env = "RESUME2DOCX_FOOTER")]
    footer: Option<String>,

    /// Where to write the mapped record as JSON.
    #[arg(long, env = "RESUME2DOCX_DEBUG_JSON", default_value = DEFAULT_DEBUG_ARTIFACT)]
    debug_json: PathBuf,

    /// Do not write the debug JSON.
    #[arg(long, env = "RESUME2DOCX_NO_DEBUG_JSON")]
    no_debug_json: bool,

    /// Print the extracted text to stdout.
    #[arg(long)]
    print_text: bool,

    /// Print the mapped record as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "RESUME2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME2DOCX_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs; -v brings them back.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    let output = reformat(&cli.input, &cli.output_dir, &config)
        .await
        .with_context(|| format!("Failed to reformat {}", cli.input.display()))?;

    if cli.print_text {
        println!("{}", output.source_text);
    }
    if cli.json {
        let json =
            serde_json::to_string_pretty(&output.record).context("Failed to serialise record")?;
        println!("{json}");
    }

    if !cli.quiet {
        print_summary(&output);
    }

    Ok(())
}

fn print_summary(output: &ReformatOutput) {
    match &output.mapping_status {
        MappingStatus::Parsed => {}
        MappingStatus::ParseFailed {
            detail,
            raw_response,
        } => {
            eprintln!("{} LLM response was not valid JSON: {}", red("✗"), detail);
            eprintln!("{}", dim("Raw response:"));
            eprintln!("{raw_response}");
        }
        MappingStatus::ServiceFailed { detail } => {
            eprintln!("{} LLM call failed: {}", red("✗"), detail);
        }
    }

    for u in &output.ungrounded {
        eprintln!(
            "{} {} {:?} does not appear in the source text",
            yellow("⚠"),
            u.field,
            u.value
        );
    }

    eprintln!(
        "{}  {}ms  →  {}",
        if output.mapping_status.is_parsed() {
            green("✔")
        } else {
            yellow("⚠")
        },
        output.stats.total_duration_ms,
        bold(&output.output_path.display().to_string()),
    );
}

/// Map CLI args to `ReformatConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReformatConfig> {
    let mut builder = ReformatConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .verify_grounding(cli.verify_grounding)
        .logo_path(Some(cli.logo.clone()))
        .debug_artifact((!cli.no_debug_json).then(|| cli.debug_json.clone()))
        .mapping_policy(if cli.strict {
            MappingPolicy::Strict
        } else {
            MappingPolicy::Lenient
        });

    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref footer) = cli.footer {
        builder = builder.footer_text(footer);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
