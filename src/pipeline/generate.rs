//! The text-understanding capability: `prompt → text`.
//!
//! The mapper only ever sees [`TextGenerator`], so its JSON-contract logic is
//! testable with a canned implementation and independent of any vendor.
//! Responses arrive as a [`TextStream`] of chunks; [`collect_stream`]
//! consumes the whole stream before anything is parsed.
//!
//! [`LlmGenerator`] is the production implementation over an `edgequake-llm`
//! provider. Timeout and retry live here, in the adapter, not in the mapper.
//! Retrying is off by default (`max_retries = 0`); when enabled the wait
//! doubles per attempt (`retry_backoff_ms * 2^attempt`).

use crate::config::ReformatConfig;
use crate::error::{GenerateError, ResumeError};
use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// A response delivered in chunks.
pub type TextStream = BoxStream<'static, Result<String, GenerateError>>;

/// Anything that can answer a prompt with text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short label for logs and errors, e.g. `"gemini/gemini-2.5-pro"`.
    fn name(&self) -> &str;

    /// Start generating; chunks arrive on the returned stream.
    async fn generate_stream(&self, prompt: &str) -> Result<TextStream, GenerateError>;

    /// Generate and accumulate the full response.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let stream = self.generate_stream(prompt).await?;
        collect_stream(stream).await
    }
}

/// Drain a chunk stream into one string. The first failed chunk aborts.
pub async fn collect_stream(mut stream: TextStream) -> Result<String, GenerateError> {
    let mut text = String::new();
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk?);
        chunks += 1;
    }
    debug!("Collected {} chunks, {} chars", chunks, text.len());
    Ok(text)
}

// ── LLM-backed generator ─────────────────────────────────────────────────

/// [`TextGenerator`] over an `edgequake-llm` chat provider.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
    label: String,
    system_prompt: String,
    options: CompletionOptions,
    max_retries: u32,
    retry_backoff_ms: u64,
    api_timeout_secs: u64,
}

impl LlmGenerator {
    /// Wrap a provider, taking prompt/sampling/timeout settings from `config`.
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>, config: &ReformatConfig) -> Self {
        Self {
            provider,
            label: label.into(),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            options: build_options(config),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            api_timeout_secs: config.api_timeout_secs,
        }
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String, GenerateError> {
        let call = self.provider.chat(messages, Some(&self.options));
        match timeout(Duration::from_secs(self.api_timeout_secs), call).await {
            Err(_) => Err(GenerateError::Timeout {
                provider: self.label.clone(),
                secs: self.api_timeout_secs,
            }),
            Ok(Err(e)) => Err(GenerateError::Service {
                provider: self.label.clone(),
                detail: format!("{}", e),
            }),
            Ok(Ok(response)) => {
                debug!(
                    "{}: {} input tokens, {} output tokens",
                    self.label, response.prompt_tokens, response.completion_tokens
                );
                if response.content.trim().is_empty() {
                    Err(GenerateError::EmptyResponse {
                        provider: self.label.clone(),
                    })
                } else {
                    Ok(response.content)
                }
            }
        }
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream, GenerateError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];
        let start = Instant::now();
        let mut last_err: Option<GenerateError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "{}: retry {}/{} after {}ms",
                    self.label, attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.chat_once(&messages).await {
                Ok(content) => {
                    debug!("{}: answered in {:?}", self.label, start.elapsed());
                    return Ok(stream::once(async move { Ok::<_, GenerateError>(content) }).boxed());
                }
                Err(e) => {
                    warn!("{}: attempt {} failed: {}", self.label, attempt + 1, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| GenerateError::EmptyResponse {
            provider: self.label.clone(),
        }))
    }
}

/// Build `CompletionOptions` from the config.
fn build_options(config: &ReformatConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Model used when a provider is named without a model.
pub fn default_model(provider_name: &str) -> &'static str {
    match provider_name {
        "gemini" => "gemini-2.5-pro",
        "anthropic" => "claude-sonnet-4-20250514",
        "ollama" => "llama3.1",
        _ => "gpt-4.1-mini",
    }
}

fn create_generator(
    provider_name: &str,
    model: &str,
    config: &ReformatConfig,
) -> Result<Arc<dyn TextGenerator>, ResumeError> {
    let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ResumeError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    info!("Using LLM {}/{}", provider_name, model);
    Ok(Arc::new(LlmGenerator::new(
        provider,
        format!("{provider_name}/{model}"),
        config,
    )))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve the text generator, from most-specific to least-specific:
///
/// 1. **Pre-built generator** (`config.generator`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`); the factory reads
///    the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **`GEMINI_API_KEY`** present → Gemini.
/// 5. **Full auto-detection** via `ProviderFactory::from_env`.
///
/// Fails with [`ResumeError::ProviderNotConfigured`] when no credential is
/// available, before any file is read.
pub fn resolve_generator(config: &ReformatConfig) -> Result<Arc<dyn TextGenerator>, ResumeError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or_else(|| default_model(name));
        return create_generator(name, model, config);
    }

    if let (Some(prov), Some(model)) = (
        non_empty_env("EDGEQUAKE_LLM_PROVIDER"),
        non_empty_env("EDGEQUAKE_MODEL"),
    ) {
        return create_generator(&prov, &model, config);
    }

    if non_empty_env("GEMINI_API_KEY").is_some() {
        let model = config.model.as_deref().unwrap_or(default_model("gemini"));
        return create_generator("gemini", model, config);
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ResumeError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;
    info!("Using auto-detected LLM provider");
    Ok(Arc::new(LlmGenerator::new(provider, "auto", config)))
}
