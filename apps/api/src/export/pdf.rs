//! Block-based PDF writer.
//!
//! Callers describe a document as a flat list of `Block`s; `render_blocks`
//! lays them out top-to-bottom on US Letter pages with `printpdf`, wrapping
//! text with the static font metrics and starting a new page whenever the
//! cursor would cross the bottom margin.
//!
//! `printpdf` documents are `!Send`, so rendering is synchronous and callers
//! run it inside `tokio::task::spawn_blocking`.

use printpdf::{
    Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb,
};

use crate::export::font_metrics::{get_metrics, FontMetricTable, BOLD_WIDTH_FACTOR};
use crate::export::style::{HeaderAlign, PdfStyle};
use crate::export::ExportError;

pub const PAGE_WIDTH_MM: f32 = 215.9;
pub const PAGE_HEIGHT_MM: f32 = 279.4;
const PT_TO_MM: f32 = 0.352_778;
const LAYER_NAME: &str = "Content";
const BULLET_INDENT_MM: f32 = 4.0;
const DATE_GUTTER_MM: f32 = 4.0;
const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);

/// One layout unit of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Large accent-colored line at the top (the person's name, the report title).
    Title(String),
    /// Muted line under the title.
    Subtitle(String),
    /// Contact details and links; follows the header alignment.
    HeaderLine(String),
    SectionHeading(String),
    /// Bold entry line with an optional right-aligned date range.
    EntryHeading { text: String, dates: String },
    /// Muted detail line under an entry heading.
    Meta(String),
    /// Body text; embedded newlines start new lines.
    Paragraph(String),
    Bullet(String),
    Gap(f32),
}

#[derive(Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

pub fn render_blocks(
    blocks: &[Block],
    style: &PdfStyle,
    doc_title: &str,
) -> Result<RenderedPdf, ExportError> {
    let mut canvas = Canvas::new(doc_title, style)?;

    for block in blocks {
        match block {
            Block::Title(text) => {
                canvas.write_wrapped(text, style.name_size_pt, true, style.accent, 0.0, style.header_align);
            }
            Block::Subtitle(text) => {
                canvas.write_wrapped(
                    text,
                    style.body_size_pt + 2.0,
                    false,
                    style.muted,
                    0.0,
                    style.header_align,
                );
            }
            Block::HeaderLine(text) => {
                canvas.write_wrapped(text, style.body_size_pt, false, BLACK, 0.0, style.header_align);
            }
            Block::SectionHeading(text) => {
                canvas.gap(style.section_gap_mm);
                // Keep the heading on the same page as the first line beneath it.
                let needed = canvas.line_height(style.heading_size_pt)
                    + canvas.line_height(style.body_size_pt);
                canvas.ensure_space(needed);
                canvas.write_wrapped(
                    &style.heading_text(text),
                    style.heading_size_pt,
                    true,
                    style.accent,
                    0.0,
                    HeaderAlign::Left,
                );
                canvas.gap(1.0);
            }
            Block::EntryHeading { text, dates } => canvas.entry_heading(text, dates),
            Block::Meta(text) => {
                canvas.write_wrapped(text, style.body_size_pt, false, style.muted, 0.0, HeaderAlign::Left);
            }
            Block::Paragraph(text) => {
                for line in text.lines().filter(|l| !l.trim().is_empty()) {
                    canvas.write_wrapped(line, style.body_size_pt, false, BLACK, 0.0, HeaderAlign::Left);
                }
            }
            Block::Bullet(text) => canvas.bullet(text),
            Block::Gap(mm) => canvas.gap(*mm),
        }
    }

    canvas.finish()
}

struct Canvas<'a> {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    style: &'a PdfStyle,
    metrics: &'static FontMetricTable,
    /// Baseline of the last written line, in mm from the bottom edge.
    y_mm: f32,
    pages: usize,
}

impl<'a> Canvas<'a> {
    fn new(doc_title: &str, style: &'a PdfStyle) -> Result<Self, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            pdf_safe(doc_title),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME.to_string(),
        );
        let regular = doc
            .add_builtin_font(style.family.regular())
            .map_err(|e| ExportError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(style.family.bold())
            .map_err(|e| ExportError::Render(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            style,
            metrics: get_metrics(style.family),
            y_mm: PAGE_HEIGHT_MM - style.margin_mm,
            pages: 1,
        })
    }

    fn line_height(&self, size_pt: f32) -> f32 {
        size_pt * self.style.leading * PT_TO_MM
    }

    fn text_width_mm(&self) -> f32 {
        PAGE_WIDTH_MM - 2.0 * self.style.margin_mm
    }

    fn measure_mm(&self, text: &str, size_pt: f32, bold: bool) -> f32 {
        let scale = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
        self.metrics.measure_str(text) * scale * size_pt * PT_TO_MM
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME.to_string(),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y_mm = PAGE_HEIGHT_MM - self.style.margin_mm;
        self.pages += 1;
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y_mm - needed_mm < self.style.margin_mm {
            self.new_page();
        }
    }

    /// Moves the cursor down one line, breaking the page first if needed.
    fn advance(&mut self, height_mm: f32) {
        self.ensure_space(height_mm);
        self.y_mm -= height_mm;
    }

    fn gap(&mut self, mm: f32) {
        // A gap never forces a page break; the next line does that if needed.
        self.y_mm = (self.y_mm - mm).max(self.style.margin_mm);
    }

    fn draw(&self, text: &str, size_pt: f32, bold: bool, color: (f32, f32, f32), x_mm: f32) {
        let (r, g, b) = color;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(pdf_safe(text), size_pt, Mm(x_mm), Mm(self.y_mm), font);
    }

    fn write_wrapped(
        &mut self,
        text: &str,
        size_pt: f32,
        bold: bool,
        color: (f32, f32, f32),
        indent_mm: f32,
        align: HeaderAlign,
    ) {
        let width_mm = self.text_width_mm() - indent_mm;
        let width_em = width_mm / (size_pt * PT_TO_MM);
        for line in self.metrics.wrap(text, width_em, bold) {
            self.advance(self.line_height(size_pt));
            let x = match align {
                HeaderAlign::Left => self.style.margin_mm + indent_mm,
                HeaderAlign::Center => {
                    (PAGE_WIDTH_MM - self.measure_mm(&line, size_pt, bold)) / 2.0
                }
            };
            self.draw(&line, size_pt, bold, color, x);
        }
    }

    fn entry_heading(&mut self, text: &str, dates: &str) {
        let size = self.style.body_size_pt;
        let dates_mm = if dates.is_empty() {
            0.0
        } else {
            self.measure_mm(dates, size, false) + DATE_GUTTER_MM
        };
        let width_em = (self.text_width_mm() - dates_mm) / (size * PT_TO_MM);

        let mut lines = self.metrics.wrap(text, width_em, true);
        if lines.is_empty() && !dates.is_empty() {
            lines.push(String::new());
        }

        // Keep the heading with at least one line of its body.
        self.ensure_space(self.line_height(size) * 2.0);
        for (i, line) in lines.iter().enumerate() {
            self.advance(self.line_height(size));
            self.draw(line, size, true, BLACK, self.style.margin_mm);
            if i == 0 && !dates.is_empty() {
                let x = PAGE_WIDTH_MM
                    - self.style.margin_mm
                    - self.measure_mm(dates, size, false);
                self.draw(dates, size, false, self.style.muted, x);
            }
        }
    }

    fn bullet(&mut self, text: &str) {
        let size = self.style.body_size_pt;
        let width_em = (self.text_width_mm() - BULLET_INDENT_MM) / (size * PT_TO_MM);
        for (i, line) in self.metrics.wrap(text, width_em, false).iter().enumerate() {
            self.advance(self.line_height(size));
            if i == 0 {
                self.draw("-", size, false, BLACK, self.style.margin_mm + 1.0);
            }
            self.draw(line, size, false, BLACK, self.style.margin_mm + BULLET_INDENT_MM);
        }
    }

    fn finish(self) -> Result<RenderedPdf, ExportError> {
        let pages = self.pages;
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| ExportError::Render(e.to_string()))?;
        Ok(RenderedPdf { bytes, pages })
    }
}

/// Maps text onto the ASCII range the base-14 fonts render reliably.
///
/// Typographic punctuation is transliterated; anything else outside ASCII
/// becomes `?`. Control characters are dropped.
pub fn pdf_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' | '\u{00B7}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2009}' | '\u{202F}' | '\t' => out.push(' '),
            c if c.is_ascii_control() => {}
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
