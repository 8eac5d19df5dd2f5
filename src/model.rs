//! The canonical resume record: the single contract between the schema
//! mapper and the document renderer.
//!
//! Every struct here deserialises with `#[serde(default)]`, so a key the
//! service leaves out simply takes its default. Scalars are always `String`
//! and lists are always `Vec`; after deserialisation nothing is ever absent.
//!
//! The service is asked for strings, but models regularly answer
//! `"years_experience": 5` or `"technologies": ["Rust", "Go"]`. The
//! `lenient_*` helpers below keep such answers instead of rejecting the whole
//! record: numbers and booleans keep their JSON text, arrays of scalars are
//! joined with `", "`, and `null` becomes the default.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured representation of one resume, independent of source format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalResumeRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(deserialize_with = "lenient_string")]
    pub github: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills_matrix: Vec<SkillMatrixEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub certifications: Vec<Certification>,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "null_as_default")]
    pub awards: Vec<Award>,
}

impl CanonicalResumeRecord {
    /// `true` when every field is at its default: the record the mapper
    /// falls back to when the service response cannot be used.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One row of the skill matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillMatrixEntry {
    /// Older prompts asked for `skills` (plural) here.
    #[serde(alias = "skills", deserialize_with = "lenient_string")]
    pub skill: String,
    #[serde(deserialize_with = "lenient_string")]
    pub years_experience: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_used: String,
    #[serde(deserialize_with = "lenient_string")]
    pub proficiency: String,
}

impl SkillMatrixEntry {
    /// A row carrying only the skill name, used when the resume lists skills
    /// but no matrix.
    pub fn from_skill(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub issuer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub major: String,
    #[serde(deserialize_with = "lenient_string")]
    pub university: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    #[serde(deserialize_with = "lenient_string")]
    pub job_title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    /// Older prompts asked for `Description` (capitalised).
    #[serde(alias = "Description", deserialize_with = "lenient_string_list")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "lenient_string")]
    pub date_range: String,
    #[serde(deserialize_with = "lenient_string")]
    pub project_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub client: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub content: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub technologies: String,
    #[serde(deserialize_with = "lenient_string")]
    pub environment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub issuer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
}

// ── Lenient deserialisers ────────────────────────────────────────────────

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => {
            let parts = items
                .into_iter()
                .map(|item| {
                    scalar_text(item)
                        .ok_or_else(|| de::Error::custom("nested list or object in a text field"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(", "))
        }
        other => scalar_text(other).ok_or_else(|| de::Error::custom("object in a text field")),
    }
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                scalar_text(item).ok_or_else(|| de::Error::custom("nested value in a text list"))
            })
            .collect(),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        other => Err(de::Error::custom(format!("expected a list of strings, got {other}"))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
