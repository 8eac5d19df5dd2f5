//! Prompts for mapping resume text onto the canonical schema.
//!
//! The schema description below is the contract the service is asked to fill
//! in. Its keys must match the serde names in [`crate::model`]; the
//! `schema_keys_match_record` test enforces that. Bump
//! [`SCHEMA_VERSION`] whenever a key or its meaning changes so persisted
//! debug artifacts can be told apart.
//!
//! Callers can override the system prompt via
//! [`crate::config::ReformatConfig::system_prompt`]; the schema and rules in
//! the user prompt are always sent.

use serde_json::{json, Value};

/// Version tag of the schema description embedded in every request.
pub const SCHEMA_VERSION: &str = "resume-schema/v1";

/// Default system prompt for the extraction call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a resume parser. You read the plain text of a \
resume and return a single JSON object that follows the schema you are given. You never add \
commentary.";

/// Rules appended after the resume text.
pub const EXTRACTION_RULES: &str = r#"Rules:
- Return ONLY valid JSON.
- Do not include any text outside the JSON.
- If a field is missing, return an empty string or empty list as appropriate.
- Do not invent new information; extract only what is explicitly present in the resume.
- Keep list entries in the order they appear in the resume."#;

/// Field names, types and one-line semantics for every record field.
pub fn schema_description() -> Value {
    json!({
        "name": "string: full name of the candidate",
        "email": "string: primary email address",
        "phone": "string: primary phone number",
        "linkedin": "string: LinkedIn URL if available",
        "github": "string: GitHub URL if available",
        "skills": ["string: one skill per entry"],
        "skills_matrix": [{
            "skill": "string: skill name (only if the resume has a skill matrix/table)",
            "years_experience": "string: years of experience",
            "last_used": "string: most recent year or clients where used",
            "proficiency": "string: Beginner/Intermediate/Advanced"
        }],
        "certifications": [{
            "name": "string: certification name",
            "issuer": "string: issuing organization"
        }],
        "summary": "string: professional summary, objective or candidate strengths if available",
        "education": [{
            "degree": "string: degree name",
            "major": "string: major/field of study",
            "university": "string: university/institution",
            "start_date": "string: YYYY or MM/YYYY if available",
            "end_date": "string: YYYY or MM/YYYY if available",
            "gpa": "string: GPA if mentioned"
        }],
        "experience": [{
            "job_title": "string: title of the position",
            "company": "string: employer name",
            "start_date": "string: YYYY or MM/YYYY",
            "end_date": "string: YYYY or MM/YYYY or 'Present'",
            "description": ["string: one responsibility or achievement per entry"]
        }],
        "projects": [{
            "date_range": "string: e.g. YYYY-YYYY or MM/YYYY - MM/YYYY",
            "project_name": "string: project title or heading",
            "client": "string: company or client if mentioned",
            "content": ["string: one point per entry"],
            "technologies": "string: technologies used, if available",
            "environment": "string: environment if mentioned"
        }],
        "awards": [{
            "name": "string: award name",
            "issuer": "string: issuing organization",
            "year": "string: YYYY"
        }]
    })
}

/// Build the user prompt: schema, resume text, then rules.
pub fn extraction_prompt(resume_text: &str) -> String {
    // Pretty-printing a `json!` value cannot fail.
    let schema = serde_json::to_string_pretty(&schema_description()).unwrap_or_default();
    format!(
        "Extract the following structured JSON data from the given resume text if available.\n\n\
         JSON schema ({SCHEMA_VERSION}):\n{schema}\n\n\
         Resume text:\n\"\"\"\n{resume_text}\n\"\"\"\n\n\
         {EXTRACTION_RULES}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalResumeRecord;

    #[test]
    fn test_schema_keys_match_record() {
        let record = serde_json::to_value(CanonicalResumeRecord::default()).unwrap();
        let mut record_keys: Vec<_> = record.as_object().unwrap().keys().cloned().collect();
        let mut schema_keys: Vec<_> = schema_description()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        record_keys.sort();
        schema_keys.sort();
        assert_eq!(record_keys, schema_keys);
    }

    #[test]
    fn test_prompt_embeds_text_schema_and_rules() {
        let prompt = extraction_prompt("Jane Doe\njane@example.org");
        assert!(prompt.contains("jane@example.org"));
        assert!(prompt.contains(SCHEMA_VERSION));
        assert!(prompt.contains("\"job_title\""));
        assert!(prompt.contains("Return ONLY valid JSON"));
        assert!(prompt.contains("Do not invent new information"));
        // Rules come after the resume text so they are read last.
        assert!(prompt.find("Resume text").unwrap() < prompt.find("Rules:").unwrap());
    }
}
