//! Schema mapping: plain text → [`CanonicalResumeRecord`] via a [`TextGenerator`].
//!
//! One call per resume. The full response is accumulated before parsing; a
//! fenced or prose-wrapped answer is cleaned by
//! [`postprocess::clean_json_response`] first. The top-level JSON value must
//! be an object; anything else counts as a parse failure.
//!
//! Under [`MappingPolicy::Lenient`] both failure kinds degrade to the empty
//! record, and the returned [`MappingStatus`] says which one happened. Under
//! [`MappingPolicy::Strict`] they become [`ResumeError::ServiceFailed`] and
//! [`ResumeError::MappingFailed`].

use crate::config::{MappingPolicy, ReformatConfig};
use crate::error::ResumeError;
use crate::model::CanonicalResumeRecord;
use crate::output::{MappedRecord, MappingStatus};
use crate::pipeline::artifact;
use crate::pipeline::generate::TextGenerator;
use crate::pipeline::postprocess;
use crate::progress::Stage;
use crate::prompts::extraction_prompt;
use serde::de::Error as _;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Characters of the raw response kept in [`ResumeError::MappingFailed`].
const RESPONSE_HEAD_CHARS: usize = 200;

/// Map extracted resume text onto the canonical schema.
pub async fn map_text(
    text: &str,
    generator: &dyn TextGenerator,
    config: &ReformatConfig,
) -> Result<MappedRecord, ResumeError> {
    let prompt = extraction_prompt(text);
    debug!("Prompt for {}: {} chars", generator.name(), prompt.len());

    let raw = match generator.generate(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Error calling LLM: {}", e);
            if config.mapping_policy == MappingPolicy::Strict {
                return Err(ResumeError::ServiceFailed(e));
            }
            warn_progress(config, &format!("LLM call failed, continuing with empty record: {e}"));
            return Ok(MappedRecord {
                record: CanonicalResumeRecord::default(),
                status: MappingStatus::ServiceFailed {
                    detail: e.to_string(),
                },
                response_chars: 0,
            });
        }
    };

    let response_chars = raw.chars().count();
    match parse_response(&raw) {
        Ok(record) => {
            info!("Mapped resume for {:?}", record.name);
            if let Some(ref path) = config.debug_artifact {
                artifact::persist_best_effort(&record, path, config.progress_callback.as_ref())
                    .await;
            }
            Ok(MappedRecord {
                record,
                status: MappingStatus::Parsed,
                response_chars,
            })
        }
        Err(e) => {
            error!("Failed to parse JSON from LLM response: {}", e);
            error!("Raw response:\n{}", raw);
            if config.mapping_policy == MappingPolicy::Strict {
                return Err(ResumeError::MappingFailed {
                    detail: e.to_string(),
                    response_head: raw.chars().take(RESPONSE_HEAD_CHARS).collect(),
                });
            }
            warn_progress(config, &format!("Response was not valid resume JSON: {e}"));
            Ok(MappedRecord {
                record: CanonicalResumeRecord::default(),
                status: MappingStatus::ParseFailed {
                    detail: e.to_string(),
                    raw_response: raw,
                },
                response_chars,
            })
        }
    }
}

/// Clean a raw response and read it as a record.
pub fn parse_response(raw: &str) -> Result<CanonicalResumeRecord, serde_json::Error> {
    let cleaned = postprocess::clean_json_response(raw);
    let value: Value = serde_json::from_str(&cleaned)?;
    if !value.is_object() {
        return Err(serde_json::Error::custom(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn warn_progress(config: &ReformatConfig, message: &str) {
    warn!("{}", message);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_warning(Stage::Map, message);
    }
}
