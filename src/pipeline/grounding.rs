//! Optional cross-check of mapped values against the source text.
//!
//! The prompt tells the service not to invent data, but nothing verifies it.
//! This pass looks for identity-bearing values (name, contact details,
//! employers, institutions, certifications) in the extracted text and
//! reports the ones it cannot find. It only reports; the record is never
//! modified.
//!
//! Matching is deliberately forgiving: case and whitespace are ignored,
//! phone numbers compare by digits only, and URLs compare without scheme,
//! `www.` or trailing slash.

use crate::model::CanonicalResumeRecord;
use serde::{Deserialize, Serialize};

/// A mapped value with no counterpart in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UngroundedValue {
    /// Field path, e.g. `experience[1].company`.
    pub field: String,
    pub value: String,
}

/// Check a record against the text it was mapped from.
pub fn find_ungrounded(record: &CanonicalResumeRecord, source_text: &str) -> Vec<UngroundedValue> {
    let source = SourceIndex::new(source_text);
    let mut out = Vec::new();

    let mut check = |field: String, value: &str, kind: MatchKind| {
        if !value.trim().is_empty() && !source.contains(value, kind) {
            out.push(UngroundedValue {
                field,
                value: value.to_string(),
            });
        }
    };

    check("name".into(), &record.name, MatchKind::Text);
    check("email".into(), &record.email, MatchKind::Text);
    check("phone".into(), &record.phone, MatchKind::Digits);
    check("linkedin".into(), &record.linkedin, MatchKind::Url);
    check("github".into(), &record.github, MatchKind::Url);
    for (i, exp) in record.experience.iter().enumerate() {
        check(format!("experience[{i}].company"), &exp.company, MatchKind::Text);
    }
    for (i, edu) in record.education.iter().enumerate() {
        check(format!("education[{i}].university"), &edu.university, MatchKind::Text);
    }
    for (i, cert) in record.certifications.iter().enumerate() {
        check(format!("certifications[{i}].name"), &cert.name, MatchKind::Text);
    }

    out
}

#[derive(Clone, Copy)]
enum MatchKind {
    Text,
    Digits,
    Url,
}

struct SourceIndex {
    text: String,
    digits: String,
}

impl SourceIndex {
    fn new(source: &str) -> Self {
        Self {
            text: normalise_text(source),
            digits: source.chars().filter(char::is_ascii_digit).collect(),
        }
    }

    fn contains(&self, value: &str, kind: MatchKind) -> bool {
        match kind {
            MatchKind::Text => self.text.contains(&normalise_text(value)),
            MatchKind::Digits => {
                let digits: String = value.chars().filter(char::is_ascii_digit).collect();
                // A phone with no digits cannot be checked.
                digits.is_empty() || self.digits.contains(&digits)
            }
            MatchKind::Url => self.text.contains(&normalise_url(value)),
        }
    }
}

fn normalise_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalise_url(url: &str) -> String {
    let u = normalise_text(url);
    let u = u
        .strip_prefix("https://")
        .or_else(|| u.strip_prefix("http://"))
        .unwrap_or(&u);
    let u = u.strip_prefix("www.").unwrap_or(u);
    u.trim_end_matches('/').to_string()
}
