//! Pure Rust receipt renderer.
//!
//! Walks the receipt Markdown with pulldown-cmark and lays it out as text on
//! a single US-letter page using the standard PDF base fonts. Used when
//! Pandoc is not installed.

use async_trait::async_trait;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

use crate::domain::payment::Receipt;
use crate::ports::{ReceiptRenderer, RenderError};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const TABLE_LABEL_WIDTH: usize = 48;
const TABLE_AMOUNT_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Mono => "F3",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    font: Font,
    size: f32,
}

/// Renders receipts without external tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPdfRenderer;

impl BuiltinPdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReceiptRenderer for BuiltinPdfRenderer {
    async fn render_pdf(&self, receipt: &Receipt) -> Result<Vec<u8>, RenderError> {
        let lines = layout(&receipt.to_markdown());
        if lines.is_empty() {
            return Err(RenderError::Failed("receipt has no content".to_string()));
        }
        Ok(write_pdf(&lines))
    }
}

/// Flattens Markdown into styled lines. Tables become fixed-width rows.
fn layout(markdown: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut buffer = String::new();
    let mut style = (Font::Regular, 11.0_f32);
    let mut cells: Vec<String> = Vec::new();
    let mut in_table = false;

    let flush = |lines: &mut Vec<Line>, buffer: &mut String, style: (Font, f32)| {
        let text = buffer.trim().to_string();
        buffer.clear();
        if !text.is_empty() {
            lines.push(Line {
                text,
                font: style.0,
                size: style.1,
            });
        }
    };

    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                style = match level {
                    HeadingLevel::H1 => (Font::Bold, 18.0),
                    HeadingLevel::H2 => (Font::Bold, 14.0),
                    _ => (Font::Bold, 12.0),
                };
            }
            Event::End(Tag::Heading(..)) | Event::End(Tag::Paragraph) => {
                flush(&mut lines, &mut buffer, style);
                style = (Font::Regular, 11.0);
            }
            Event::Start(Tag::Table(_)) => in_table = true,
            Event::End(Tag::Table(_)) => in_table = false,
            Event::End(Tag::TableCell) => {
                cells.push(buffer.trim().to_string());
                buffer.clear();
            }
            Event::End(Tag::TableHead) | Event::End(Tag::TableRow) => {
                let row = table_row(&cells);
                cells.clear();
                lines.push(Line {
                    text: row,
                    font: Font::Mono,
                    size: 10.0,
                });
            }
            Event::Text(text) | Event::Code(text) => buffer.push_str(&text),
            Event::SoftBreak => buffer.push(' '),
            Event::HardBreak if !in_table => flush(&mut lines, &mut buffer, style),
            _ => {}
        }
    }
    flush(&mut lines, &mut buffer, style);
    lines
}

fn table_row(cells: &[String]) -> String {
    match cells {
        [] => String::new(),
        [only] => only.clone(),
        [label, .., amount] => {
            let label: String = label.chars().take(TABLE_LABEL_WIDTH).collect();
            format!(
                "{:<label_w$}{:>amount_w$}",
                label,
                amount,
                label_w = TABLE_LABEL_WIDTH,
                amount_w = TABLE_AMOUNT_WIDTH
            )
        }
    }
}

/// Escapes a PDF literal string. Characters outside printable ASCII become `?`.
fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(lines: &[Line]) -> String {
    let mut stream = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        let leading = line.size * 1.6;
        if y - leading < MARGIN {
            break;
        }
        y -= leading;
        stream.push_str(&format!(
            "BT /{} {} Tf {} {} Td ({}) Tj ET\n",
            line.font.resource(),
            line.size,
            MARGIN,
            y,
            escape_pdf_text(&line.text)
        ));
    }
    stream
}

/// Writes a one-page PDF 1.4 document with a cross-reference table.
fn write_pdf(lines: &[Line]) -> Vec<u8> {
    let stream = content_stream(lines);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 5 0 R /F2 6 0 R /F3 7 0 R >> >> /Contents 4 0 R >>",
            PAGE_WIDTH, PAGE_HEIGHT
        ),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ),
        base_font("Helvetica"),
        base_font("Helvetica-Bold"),
        base_font("Courier"),
    ];

    let mut pdf: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.extend_from_slice(xref.as_bytes());
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    pdf
}

fn base_font(name: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKDOWN: &str = "# Riverside Club\n\n## Receipt R-20240105-ABCD1234\n\n\
        **Date:** 2024-01-05\n\n| Item | Amount |\n|---|---:|\n\
        | Annual membership | $50.00 |\n| **Total paid** | **$50.00** |\n";

    #[test]
    fn headings_are_bold_and_tables_monospaced() {
        let lines = layout(MARKDOWN);
        assert_eq!(lines[0].text, "Riverside Club");
        assert_eq!(lines[0].font, Font::Bold);
        assert_eq!(lines[0].size, 18.0);
        assert_eq!(lines[2].text, "Date: 2024-01-05");

        let rows: Vec<_> = lines.iter().filter(|l| l.font == Font::Mono).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].text.starts_with("Annual membership"));
        assert!(rows[1].text.ends_with("$50.00"));
    }

    #[test]
    fn escapes_delimiters_and_non_ascii() {
        assert_eq!(escape_pdf_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_pdf_text("café"), "caf?");
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = write_pdf(&layout(MARKDOWN));
        let text = String::from_utf8(pdf.clone()).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));

        let xref_start = text.find("xref\n").unwrap();
        let first_entry = text[xref_start..].lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(text[offset..].starts_with("1 0 obj"));

        let startxref: usize = text
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_start);
    }
}
