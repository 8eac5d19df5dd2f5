//! Post-processing: deterministic cleanup of extracted text and LLM responses.
//!
//! Two entry points, each a chain of small pure `&str → String` rules:
//!
//! * [`clean_extracted_text`]: normalises what the PDF/DOCX parsers hand us
//!   before it is embedded in the prompt.
//! * [`clean_json_response`]: strips the formatting noise models wrap around
//!   JSON despite being told not to (```` ```json ```` fences, a sentence of
//!   preamble, a trailing remark) so the mapper can parse the object.
//!
//! Both are idempotent: running them on their own output changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Clean raw extractor output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Trim the whole text
pub fn clean_extracted_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

/// Clean a raw service response down to the JSON text it carries.
///
/// Rules (applied in order):
/// 1. Strip invisible Unicode and surrounding whitespace
/// 2. Unwrap a ```` ```json ```` / ```` ``` ```` fenced block. The opening
///    fence must start the response or sit on its own line; it pairs with the
///    last closing fence, so backticks inside string values survive.
/// 3. Cut to the outermost `{ … }` span when prose surrounds the object
pub fn clean_json_response(input: &str) -> String {
    let s = remove_invisible_chars(input);
    let s = unwrap_fenced_block(s.trim());
    outermost_object(s.trim()).to_string()
}

// ── Text rules ───────────────────────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── JSON rules ───────────────────────────────────────────────────────────────

static RE_OPENING_FENCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*```[A-Za-z]*[ \t\r]*$").unwrap());

static RE_CLOSING_FENCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*```[ \t\r]*$").unwrap());

fn unwrap_fenced_block(input: &str) -> String {
    let Some(body_start) = opening_fence_end(input) else {
        return input.to_string();
    };
    let body = &input[body_start..];
    let body = match body.trim_end().strip_suffix("```") {
        Some(inner) => inner,
        None => match RE_CLOSING_FENCE_LINE.find_iter(body).last() {
            Some(m) => &body[..m.start()],
            // Unclosed fence: keep everything after the opener.
            None => body,
        },
    };
    body.trim().to_string()
}

/// Byte offset just past the opening fence and its language tag.
fn opening_fence_end(input: &str) -> Option<usize> {
    if let Some(rest) = input.strip_prefix("```") {
        let tag_len = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()).len();
        return Some(3 + tag_len);
    }
    RE_OPENING_FENCE_LINE.find(input).map(|m| m.end())
}

fn outermost_object(input: &str) -> &str {
    match (input.find('{'), input.rfind('}')) {
        (Some(start), Some(end)) if start < end => &input[start..=end],
        _ => input,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
