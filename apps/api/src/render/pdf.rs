//! Simple paginated PDF rendering using printpdf builtin fonts.
//!
//! Text is laid onto fixed-size A4 pages: every source line is word-wrapped to the usable
//! width and a new page starts when the next line would cross the bottom margin.

use std::io::BufWriter;

use anyhow::Result;
use printpdf::*;

use crate::render::metrics::measure_mm;

/// Fixed page geometry, all lengths in millimetres.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_x_mm: f32,
    pub margin_top_mm: f32,
    /// Auto page break threshold measured from the bottom edge.
    pub margin_bottom_mm: f32,
    pub font_size_pt: f32,
    pub line_height_mm: f32,
}

impl Default for PageLayout {
    /// A4, Helvetica 12pt, 10mm lines, 10mm margins, 15mm page-break margin.
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_x_mm: 10.0,
            margin_top_mm: 10.0,
            margin_bottom_mm: 15.0,
            font_size_pt: 12.0,
            line_height_mm: 10.0,
        }
    }
}

impl PageLayout {
    pub fn usable_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_x_mm
    }

    pub fn lines_per_page(&self) -> usize {
        let usable = self.height_mm - self.margin_top_mm - self.margin_bottom_mm;
        ((usable / self.line_height_mm).floor() as usize).max(1)
    }

    /// Baseline of line `index` on a page, measured from the bottom edge (PDF space).
    fn baseline_mm(&self, index: usize) -> f32 {
        let font_mm = self.font_size_pt * 25.4 / 72.0;
        let cell_top = self.margin_top_mm + index as f32 * self.line_height_mm;
        self.height_mm - (cell_top + self.line_height_mm / 2.0 + 0.3 * font_mm)
    }
}

/// Splits `text` into pages of wrapped lines. Always returns at least one page.
pub fn layout_pages(text: &str, layout: &PageLayout) -> Vec<Vec<String>> {
    let max_width = layout.usable_width_mm();
    let lines: Vec<String> = text
        .lines()
        .flat_map(|line| wrap_line(line, max_width, layout.font_size_pt))
        .collect();

    if lines.is_empty() {
        return vec![Vec::new()];
    }

    lines
        .chunks(layout.lines_per_page())
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Greedy word wrap by measured width. Words wider than a line are split by character.
/// Leading indentation and the spacing between words are kept; only the whitespace at
/// a break point is dropped. A blank source line yields one empty output line.
fn wrap_line(line: &str, max_width_mm: f32, font_size_pt: f32) -> Vec<String> {
    let fits = |s: &str| measure_mm(s, font_size_pt) <= max_width_mm;

    let mut lines = Vec::new();
    let mut current = String::new();

    for (i, (gap, word)) in split_words(line).into_iter().enumerate() {
        let candidate = if i == 0 {
            format!("{gap}{word}")
        } else if current.is_empty() {
            word.to_string()
        } else {
            format!("{current}{gap}{word}")
        };

        if fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        let piece = if i == 0 { candidate } else { word.to_string() };
        if fits(&piece) {
            current = piece;
        } else {
            for c in piece.chars() {
                current.push(c);
                if !fits(&current) {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

/// Splits a line into `(preceding whitespace, word)` pairs. Trailing whitespace is dropped.
fn split_words(line: &str) -> Vec<(&str, &str)> {
    let mut words = Vec::new();
    let mut rest = line.trim_end();

    while !rest.is_empty() {
        let gap_len = rest.len() - rest.trim_start().len();
        let (gap, tail) = rest.split_at(gap_len);
        let word_len = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let (word, after) = tail.split_at(word_len);
        words.push((gap, word));
        rest = after;
    }

    words
}

/// Maps typographic punctuation to ASCII; other characters outside Latin-1 become '?'.
fn to_pdf_safe(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            '\t' => ' ',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

/// Renders `text` as a PDF document and returns its bytes.
pub fn render_pdf(text: &str) -> Result<Vec<u8>> {
    let layout = PageLayout::default();
    let pages = layout_pages(&to_pdf_safe_text(text), &layout);

    let (doc, page1, layer1) = PdfDocument::new(
        "Pet Sitting Runbook",
        Mm(layout.width_mm),
        Mm(layout.height_mm),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let mut current_layer = doc.get_page(page1).get_layer(layer1);

    for (page_index, lines) in pages.iter().enumerate() {
        if page_index > 0 {
            let (next_page, next_layer) = doc.add_page(
                Mm(layout.width_mm),
                Mm(layout.height_mm),
                format!("Page {}", page_index + 1),
            );
            current_layer = doc.get_page(next_page).get_layer(next_layer);
        }

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            current_layer.use_text(
                line.as_str(),
                layout.font_size_pt,
                Mm(layout.margin_x_mm),
                Mm(layout.baseline_mm(i)),
                &font,
            );
        }
    }

    // Save to bytes
    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)?;
    let bytes = buf.into_inner()?;

    Ok(bytes)
}

fn to_pdf_safe_text(text: &str) -> String {
    text.lines().map(to_pdf_safe).collect::<Vec<_>>().join("\n")
}
