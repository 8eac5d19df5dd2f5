//! The fixed resume template as a pure function: record → [`DocumentLayout`].
//!
//! No I/O happens here. The layout is a flat list of styled [`Block`]s in
//! reading order, which [`super::docx`] turns into a DOCX package. Tests diff
//! this structure instead of binary file bytes.
//!
//! Section order is fixed:
//!
//! ```text
//! name, contact lines
//! Candidate Strengths      (omitted if summary is empty)
//! Skill Matrix             (heading always; table only when there are rows)
//! Certifications           (omitted if empty)
//! Education                (omitted if empty)
//! Professional Experience  (omitted if empty)
//! Projects                 (omitted if empty)
//! Awards                   (omitted if empty)
//! ```

use crate::config::TemplateAssets;
use crate::model::{CanonicalResumeRecord, SkillMatrixEntry};
use serde::Serialize;
use std::path::PathBuf;

/// Rows kept in the skill matrix; later rows are dropped.
pub const SKILL_MATRIX_MAX_ROWS: usize = 10;

/// Header text when the record has no name.
pub const NAME_PLACEHOLDER: &str = "Name Not Found";

pub const SKILL_TABLE_HEADER: [&str; 4] = ["Area", "Years", "Latest Clients Used", "Level"];

pub const HEADING_STRENGTHS: &str = "Candidate Strengths";
pub const HEADING_SKILL_MATRIX: &str = "Skill Matrix";
pub const HEADING_CERTIFICATIONS: &str = "Certifications";
pub const HEADING_EDUCATION: &str = "Education";
pub const HEADING_EXPERIENCE: &str = "Professional Experience";
pub const HEADING_PROJECTS: &str = "Projects";
pub const HEADING_AWARDS: &str = "Awards";

/// One unit of the vertical flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Block {
    Name(String),
    Contact(String),
    Heading(String),
    Paragraph(String),
    Bullet(String),
    /// Bold line introducing an experience or project entry.
    EntryHeader(String),
    /// Plain `Label: value` line under a project.
    DetailLine(String),
    /// Skill-matrix data rows; the header row is [`SKILL_TABLE_HEADER`].
    SkillTable(Vec<[String; 4]>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
}

/// Run/paragraph formatting for a block. Sizes are in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub size_pt: usize,
    pub bold: bool,
    pub underline: bool,
    pub align: Align,
}

impl TextStyle {
    const fn body() -> Self {
        Self {
            size_pt: 12,
            bold: false,
            underline: false,
            align: Align::Left,
        }
    }
}

/// Table header cells: bold white text on the brand fill.
pub const TABLE_HEADER_STYLE: TextStyle = TextStyle {
    bold: true,
    ..TextStyle::body()
};

pub const FOOTER_STYLE: TextStyle = TextStyle {
    size_pt: 10,
    ..TextStyle::body()
};

/// Logo width on the page, in inches.
pub const LOGO_WIDTH_IN: f64 = 1.5;

impl Block {
    /// The style this block is rendered with. For [`Block::SkillTable`] this
    /// is the style of the data cells.
    pub fn style(&self) -> TextStyle {
        match self {
            Block::Name(_) => TextStyle {
                size_pt: 14,
                bold: true,
                align: Align::Center,
                ..TextStyle::body()
            },
            Block::Contact(_) => TextStyle {
                align: Align::Center,
                ..TextStyle::body()
            },
            Block::Heading(_) => TextStyle {
                size_pt: 14,
                bold: true,
                underline: true,
                ..TextStyle::body()
            },
            Block::EntryHeader(_) => TextStyle {
                bold: true,
                ..TextStyle::body()
            },
            Block::Paragraph(_) | Block::Bullet(_) | Block::DetailLine(_) | Block::SkillTable(_) => {
                TextStyle::body()
            }
        }
    }

    /// Plain text of the block; table cells are joined by tabs and rows by
    /// newlines.
    pub fn text(&self) -> String {
        match self {
            Block::Name(s)
            | Block::Contact(s)
            | Block::Heading(s)
            | Block::Paragraph(s)
            | Block::Bullet(s)
            | Block::EntryHeader(s)
            | Block::DetailLine(s) => s.clone(),
            Block::SkillTable(rows) => rows
                .iter()
                .map(|r| r.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Everything needed to write the document, with no I/O performed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLayout {
    /// Logo for the top-right of page one; may not exist on disk.
    pub logo: Option<PathBuf>,
    pub footer: String,
    /// RGB hex fill of the skill-table header row.
    pub header_fill: String,
    pub font: String,
    pub blocks: Vec<Block>,
}

/// Lay out `record` on the fixed template.
pub fn build_layout(record: &CanonicalResumeRecord, assets: &TemplateAssets) -> DocumentLayout {
    let mut blocks = Vec::new();

    // ── Header ───────────────────────────────────────────────────────────
    blocks.push(Block::Name(display_name(&record.name)));
    for contact in [&record.phone, &record.email, &record.linkedin] {
        if !contact.trim().is_empty() {
            blocks.push(Block::Contact(contact.clone()));
        }
    }

    // ── Candidate Strengths ──────────────────────────────────────────────
    if !record.summary.trim().is_empty() {
        blocks.push(Block::Heading(HEADING_STRENGTHS.into()));
        blocks.push(Block::Paragraph(record.summary.clone()));
    }

    // ── Skill Matrix ─────────────────────────────────────────────────────
    blocks.push(Block::Heading(HEADING_SKILL_MATRIX.into()));
    let rows = skill_rows(record);
    if !rows.is_empty() {
        blocks.push(Block::SkillTable(rows));
    }

    // ── Certifications / Education ───────────────────────────────────────
    if !record.certifications.is_empty() {
        blocks.push(Block::Heading(HEADING_CERTIFICATIONS.into()));
        for cert in &record.certifications {
            blocks.push(Block::Bullet(format!("{} - {}", cert.name, cert.issuer)));
        }
    }

    if !record.education.is_empty() {
        blocks.push(Block::Heading(HEADING_EDUCATION.into()));
        for edu in &record.education {
            blocks.push(Block::Bullet(format!(
                "{} in {} - {}",
                edu.degree, edu.major, edu.university
            )));
        }
    }

    // ── Professional Experience ──────────────────────────────────────────
    if !record.experience.is_empty() {
        blocks.push(Block::Heading(HEADING_EXPERIENCE.into()));
        for exp in &record.experience {
            blocks.push(Block::EntryHeader(format!(
                "{} - {} ({} - {})",
                exp.job_title, exp.company, exp.start_date, exp.end_date
            )));
            blocks.extend(exp.description.iter().cloned().map(Block::Bullet));
        }
    }

    // ── Projects ─────────────────────────────────────────────────────────
    if !record.projects.is_empty() {
        blocks.push(Block::Heading(HEADING_PROJECTS.into()));
        for project in &record.projects {
            blocks.push(Block::EntryHeader(format!(
                "{} - {} ({})",
                project.project_name, project.client, project.date_range
            )));
            blocks.extend(project.content.iter().cloned().map(Block::Bullet));
            if !project.technologies.trim().is_empty() {
                blocks.push(Block::DetailLine(format!(
                    "Technologies: {}",
                    project.technologies
                )));
            }
            if !project.environment.trim().is_empty() {
                blocks.push(Block::DetailLine(format!(
                    "Environment: {}",
                    project.environment
                )));
            }
        }
    }

    // ── Awards ───────────────────────────────────────────────────────────
    if !record.awards.is_empty() {
        blocks.push(Block::Heading(HEADING_AWARDS.into()));
        for award in &record.awards {
            let mut line = format!("{} - {}", award.name, award.issuer);
            if !award.year.trim().is_empty() {
                line.push_str(&format!(" ({})", award.year));
            }
            blocks.push(Block::Bullet(line));
        }
    }

    DocumentLayout {
        logo: assets.logo_path.clone(),
        footer: assets.footer_text.clone(),
        header_fill: assets.header_fill.clone(),
        font: assets.body_font.clone(),
        blocks,
    }
}

/// The header name: capitalized, or the placeholder when empty.
pub fn display_name(name: &str) -> String {
    let name = capitalize_words(name);
    if name.is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        name
    }
}

/// Split on whitespace, upper-case each word's first letter and lower-case
/// the rest, then join with single spaces.
pub fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn skill_rows(record: &CanonicalResumeRecord) -> Vec<[String; 4]> {
    let entries: Vec<SkillMatrixEntry> = if !record.skills_matrix.is_empty() {
        record
            .skills_matrix
            .iter()
            .take(SKILL_MATRIX_MAX_ROWS)
            .cloned()
            .collect()
    } else {
        record
            .skills
            .iter()
            .take(SKILL_MATRIX_MAX_ROWS)
            .map(SkillMatrixEntry::from_skill)
            .collect()
    };

    entries
        .into_iter()
        .map(|e| [e.skill, e.years_experience, e.last_used, e.proficiency])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Award, Certification, Education, Experience, Project};

    fn headings(l: &DocumentLayout) -> Vec<&str> {
        l.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    fn layout(record: &CanonicalResumeRecord) -> DocumentLayout {
        build_layout(record, &TemplateAssets::default())
    }

    fn full_record() -> CanonicalResumeRecord {
        CanonicalResumeRecord {
            name: "JANE doe".into(),
            email: "jane@example.org".into(),
            phone: "555-0100".into(),
            linkedin: "linkedin.com/in/jane".into(),
            summary: "Systems engineer.".into(),
            skills: vec!["Rust".into()],
            certifications: vec![Certification {
                name: "CKA".into(),
                issuer: "CNCF".into(),
            }],
            education: vec![Education {
                degree: "BSc".into(),
                major: "CS".into(),
                university: "MIT".into(),
                ..Default::default()
            }],
            experience: vec![Experience {
                job_title: "Engineer".into(),
                company: "Acme".into(),
                start_date: "2015".into(),
                end_date: "Present".into(),
                description: vec!["Built a compiler".into(), "Led a team".into()],
            }],
            projects: vec![Project {
                date_range: "2020-2021".into(),
                project_name: "Atlas".into(),
                client: "Globex".into(),
                content: vec!["Designed storage".into()],
                technologies: "Rust, Tokio".into(),
                environment: String::new(),
            }],
            awards: vec![Award {
                name: "MVP".into(),
                issuer: "Acme".into(),
                year: "2021".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_capitalizes_each_word() {
        assert_eq!(capitalize_words("john q. public"), "John Q. Public");
        assert_eq!(capitalize_words("  mARY   o'neil "), "Mary O'neil");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_empty_name_uses_placeholder() {
        let l = layout(&CanonicalResumeRecord::default());
        assert_eq!(l.blocks[0], Block::Name(NAME_PLACEHOLDER.into()));
    }

    #[test]
    fn test_full_record_section_order() {
        let l = layout(&full_record());
        assert_eq!(
            headings(&l),
            vec![
                HEADING_STRENGTHS,
                HEADING_SKILL_MATRIX,
                HEADING_CERTIFICATIONS,
                HEADING_EDUCATION,
                HEADING_EXPERIENCE,
                HEADING_PROJECTS,
                HEADING_AWARDS,
            ]
        );
        assert_eq!(l.blocks[0], Block::Name("Jane Doe".into()));
    }

    #[test]
    fn test_entry_lines_are_formatted() {
        let l = layout(&full_record());
        let texts: Vec<String> = l.blocks.iter().map(Block::text).collect();
        for expected in [
            "CKA - CNCF",
            "BSc in CS - MIT",
            "Engineer - Acme (2015 - Present)",
            "Atlas - Globex (2020-2021)",
            "Technologies: Rust, Tokio",
            "MVP - Acme (2021)",
        ] {
            assert!(texts.iter().any(|t| t == expected), "missing {expected:?}");
        }
        assert!(!texts.iter().any(|t| t.starts_with("Environment:")));
    }

    #[test]
    fn test_experience_bullets_follow_header_in_order() {
        let l = layout(&full_record());
        let pos = l
            .blocks
            .iter()
            .position(|b| matches!(b, Block::EntryHeader(h) if h.starts_with("Engineer")))
            .unwrap();
        assert_eq!(l.blocks[pos + 1], Block::Bullet("Built a compiler".into()));
        assert_eq!(l.blocks[pos + 2], Block::Bullet("Led a team".into()));
    }

    #[test]
    fn test_empty_summary_omits_strengths() {
        let record = CanonicalResumeRecord {
            summary: String::new(),
            ..full_record()
        };
        assert!(!headings(&layout(&record)).contains(&HEADING_STRENGTHS));
    }

    #[test]
    fn test_only_non_empty_contacts_rendered() {
        let record = CanonicalResumeRecord {
            email: "a@b.com".into(),
            ..Default::default()
        };
        let l = layout(&record);
        let contacts: Vec<&Block> = l
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Contact(_)))
            .collect();
        assert_eq!(contacts, vec![&Block::Contact("a@b.com".into())]);
        assert_eq!(contacts[0].style().align, Align::Center);
    }

    #[test]
    fn test_skill_matrix_truncated_to_ten() {
        let record = CanonicalResumeRecord {
            skills_matrix: (0..15)
                .map(|i| SkillMatrixEntry::from_skill(format!("skill-{i}")))
                .collect(),
            ..Default::default()
        };
        let l = layout(&record);
        let rows = l
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::SkillTable(rows) => Some(rows),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows.len(), SKILL_MATRIX_MAX_ROWS);
        let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("skill-{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_skill_rows_synthesized_from_skills() {
        let record = CanonicalResumeRecord {
            skills: (0..12).map(|i| format!("s{i}")).collect(),
            ..Default::default()
        };
        let l = layout(&record);
        let Some(Block::SkillTable(rows)) = l.blocks.iter().find(|b| matches!(b, Block::SkillTable(_)))
        else {
            panic!("no table");
        };
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0], ["s0".to_string(), String::new(), String::new(), String::new()]);
    }

    #[test]
    fn test_no_skills_renders_heading_without_table() {
        let l = layout(&CanonicalResumeRecord::default());
        assert_eq!(headings(&l), vec![HEADING_SKILL_MATRIX]);
        assert!(!l.blocks.iter().any(|b| matches!(b, Block::SkillTable(_))));
    }

    #[test]
    fn test_award_without_year() {
        let record = CanonicalResumeRecord {
            awards: vec![Award {
                name: "Hackathon winner".into(),
                issuer: "Acme".into(),
                year: String::new(),
            }],
            ..Default::default()
        };
        assert!(layout(&record)
            .blocks
            .contains(&Block::Bullet("Hackathon winner - Acme".into())));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let record = full_record();
        assert_eq!(layout(&record), layout(&record));
    }

    #[test]
    fn test_styles() {
        assert_eq!(Block::Name(String::new()).style().size_pt, 14);
        let heading = Block::Heading(String::new()).style();
        assert!(heading.bold && heading.underline);
        assert!(Block::EntryHeader(String::new()).style().bold);
        assert!(!Block::Bullet(String::new()).style().bold);
        assert_eq!(FOOTER_STYLE.size_pt, 10);
    }
}
