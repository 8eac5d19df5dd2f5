//! DOCX writer: [`DocumentLayout`] → Office Open XML package via `docx-rs`.
//!
//! Every run carries the layout's font on all script slots, so the document
//! renders in one typeface regardless of the reader's defaults. Bullets use
//! a single numbering definition with a `•` level-0 glyph.
//!
//! The logo is read here rather than in the layout. A missing or undecodable
//! logo is skipped with a log line.

use crate::error::ResumeError;
use crate::pipeline::layout::{
    Align, Block, DocumentLayout, TextStyle, FOOTER_STYLE, LOGO_WIDTH_IN, SKILL_TABLE_HEADER,
    TABLE_HEADER_STYLE,
};
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, Footer, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Pic, Run, RunFonts, Shading,
    SpecialIndentType, Start, Table, TableCell, TableRow,
};
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use tracing::{debug, warn};

const BULLET_NUMBERING_ID: usize = 1;
const EMU_PER_INCH: f64 = 914_400.0;
const HEADER_TEXT_COLOR: &str = "FFFFFF";

/// Write `layout` as a DOCX package to `writer`.
pub fn write_docx<W: Write + Seek>(layout: &DocumentLayout, writer: W) -> Result<(), ResumeError> {
    let font = layout.font.as_str();
    let mut docx = Docx::new()
        .default_fonts(fonts(font))
        .add_abstract_numbering(bullet_definition())
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

    if let Some(logo) = layout.logo.as_deref().and_then(load_logo) {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_image(logo))
                .align(AlignmentType::Right),
        );
    }

    for block in &layout.blocks {
        docx = match block {
            Block::SkillTable(rows) => docx.add_table(skill_table(rows, layout)),
            Block::Bullet(text) => docx.add_paragraph(
                styled_paragraph(text, block.style(), font)
                    .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
            ),
            other => docx.add_paragraph(styled_paragraph(&other.text(), other.style(), font)),
        };
    }

    if !layout.footer.is_empty() {
        docx = docx.footer(
            Footer::new().add_paragraph(styled_paragraph(&layout.footer, FOOTER_STYLE, font)),
        );
    }

    docx.build()
        .pack(writer)
        .map_err(|e| ResumeError::RenderFailed(format!("{e}")))?;
    debug!("Packed DOCX with {} blocks", layout.blocks.len());
    Ok(())
}

/// Render `layout` into an in-memory DOCX.
pub fn render_bytes(layout: &DocumentLayout) -> Result<Vec<u8>, ResumeError> {
    let mut buf = Cursor::new(Vec::new());
    write_docx(layout, &mut buf)?;
    Ok(buf.into_inner())
}

// ── Building blocks ──────────────────────────────────────────────────────

fn fonts(font: &str) -> RunFonts {
    RunFonts::new()
        .ascii(font)
        .hi_ansi(font)
        .east_asia(font)
        .cs(font)
}

fn styled_run(text: &str, style: TextStyle, font: &str) -> Run {
    let mut run = Run::new()
        .add_text(text)
        .size(style.size_pt * 2)
        .fonts(fonts(font));
    if style.bold {
        run = run.bold();
    }
    if style.underline {
        run = run.underline("single");
    }
    run
}

fn styled_paragraph(text: &str, style: TextStyle, font: &str) -> Paragraph {
    let p = Paragraph::new().add_run(styled_run(text, style, font));
    match style.align {
        Align::Center => p.align(AlignmentType::Center),
        Align::Left => p,
    }
}

fn bullet_definition() -> AbstractNumbering {
    AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    )
}

fn skill_table(rows: &[[String; 4]], layout: &DocumentLayout) -> Table {
    let font = layout.font.as_str();
    let header = TableRow::new(
        SKILL_TABLE_HEADER
            .iter()
            .map(|title| {
                TableCell::new()
                    .add_paragraph(Paragraph::new().add_run(
                        styled_run(title, TABLE_HEADER_STYLE, font).color(HEADER_TEXT_COLOR),
                    ))
                    .shading(Shading::new().fill(layout.header_fill.as_str()))
            })
            .collect(),
    );

    let cell_style = Block::SkillTable(Vec::new()).style();
    let body = rows.iter().map(|row| {
        TableRow::new(
            row.iter()
                .map(|value| {
                    TableCell::new().add_paragraph(styled_paragraph(value, cell_style, font))
                })
                .collect(),
        )
    });

    Table::new(std::iter::once(header).chain(body).collect())
}

/// Read and size the logo, or `None` when it cannot be used.
fn load_logo(path: &Path) -> Option<Pic> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            debug!("No logo at {}: {}", path.display(), e);
            return None;
        }
    };
    // Validate before handing the bytes to docx-rs.
    let image = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!("Skipping unreadable logo {}: {}", path.display(), e);
            return None;
        }
    };
    let (w, h) = (image.width().max(1), image.height().max(1));
    let width_emu = LOGO_WIDTH_IN * EMU_PER_INCH;
    let height_emu = width_emu * f64::from(h) / f64::from(w);
    Some(Pic::new(&bytes).size(width_emu.round() as u32, height_emu.round() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateAssets;
    use crate::model::{CanonicalResumeRecord, Experience, SkillMatrixEntry};
    use crate::pipeline::extract::{DocxTextExtractor, TextExtractor};
    use crate::pipeline::layout::build_layout;

    fn record() -> CanonicalResumeRecord {
        CanonicalResumeRecord {
            name: "john q. public".into(),
            email: "john@example.org".into(),
            summary: "Backend engineer.".into(),
            skills_matrix: vec![SkillMatrixEntry {
                skill: "Rust".into(),
                years_experience: "5".into(),
                last_used: "2024".into(),
                proficiency: "Expert".into(),
            }],
            experience: vec![Experience {
                job_title: "Engineer".into(),
                company: "Acme".into(),
                start_date: "2019".into(),
                end_date: "Present".into(),
                description: vec!["Shipped the parser".into()],
            }],
            ..Default::default()
        }
    }

    fn assets_without_logo() -> TemplateAssets {
        TemplateAssets {
            logo_path: None,
            ..Default::default()
        }
    }

    fn lines(bytes: &[u8]) -> Vec<String> {
        DocxTextExtractor
            .extract(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_output_is_a_zip_package() {
        let bytes = render_bytes(&build_layout(&record(), &assets_without_logo())).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_body_text_round_trips() {
        let bytes = render_bytes(&build_layout(&record(), &assets_without_logo())).unwrap();
        let lines = lines(&bytes);
        for expected in [
            "John Q. Public",
            "john@example.org",
            "Candidate Strengths",
            "Backend engineer.",
            "Skill Matrix",
            "Area",
            "Latest Clients Used",
            "Rust",
            "Expert",
            "Engineer - Acme (2019 - Present)",
            "Shipped the parser",
        ] {
            assert!(lines.iter().any(|l| l == expected), "missing {expected:?} in {lines:?}");
        }
    }

    #[test]
    fn test_rendering_twice_gives_same_structure() {
        let layout = build_layout(&record(), &assets_without_logo());
        let a = lines(&render_bytes(&layout).unwrap());
        let b = lines(&render_bytes(&layout).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_logo_is_not_an_error() {
        let assets = TemplateAssets {
            logo_path: Some("/definitely/not/here/logo.png".into()),
            ..Default::default()
        };
        assert!(render_bytes(&build_layout(&record(), &assets)).is_ok());
    }

    #[test]
    fn test_logo_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        image::RgbImage::new(8, 4).save(&logo).unwrap();

        let assets = TemplateAssets {
            logo_path: Some(logo),
            ..Default::default()
        };
        let bytes = render_bytes(&build_layout(&record(), &assets)).unwrap();
        assert!(bytes.windows(6).any(|w| w == b"media/"));
    }

    #[test]
    fn test_undecodable_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, b"not an image").unwrap();
        assert!(load_logo(&logo).is_none());
    }
}
