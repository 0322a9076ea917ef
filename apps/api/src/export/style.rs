use crate::export::font_metrics::FontFamily;
use crate::models::resume::TemplateKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderAlign {
    Left,
    Center,
}

/// Everything a template decides about the look of the exported PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStyle {
    pub family: FontFamily,
    /// RGB, 0.0 to 1.0.
    pub accent: (f32, f32, f32),
    pub muted: (f32, f32, f32),
    pub header_align: HeaderAlign,
    pub uppercase_headings: bool,
    pub name_size_pt: f32,
    pub heading_size_pt: f32,
    pub body_size_pt: f32,
    /// Line height as a multiple of the font size.
    pub leading: f32,
    pub section_gap_mm: f32,
    pub margin_mm: f32,
}

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const GRAY: (f32, f32, f32) = (0.38, 0.38, 0.38);

impl PdfStyle {
    pub fn for_template(template: TemplateKind) -> Self {
        match template {
            TemplateKind::Modern => PdfStyle {
                family: FontFamily::Helvetica,
                accent: (0.13, 0.35, 0.69),
                muted: GRAY,
                header_align: HeaderAlign::Left,
                uppercase_headings: true,
                name_size_pt: 22.0,
                heading_size_pt: 12.0,
                body_size_pt: 10.0,
                leading: 1.35,
                section_gap_mm: 5.0,
                margin_mm: 18.0,
            },
            TemplateKind::Classic => PdfStyle {
                family: FontFamily::Times,
                accent: BLACK,
                muted: GRAY,
                header_align: HeaderAlign::Center,
                uppercase_headings: true,
                name_size_pt: 20.0,
                heading_size_pt: 12.5,
                body_size_pt: 11.0,
                leading: 1.3,
                section_gap_mm: 5.0,
                margin_mm: 20.0,
            },
            TemplateKind::Minimal => PdfStyle {
                family: FontFamily::Courier,
                accent: BLACK,
                muted: GRAY,
                header_align: HeaderAlign::Left,
                uppercase_headings: false,
                name_size_pt: 18.0,
                heading_size_pt: 11.0,
                body_size_pt: 9.5,
                leading: 1.45,
                section_gap_mm: 7.0,
                margin_mm: 22.0,
            },
            TemplateKind::Compact => PdfStyle {
                family: FontFamily::Helvetica,
                accent: (0.12, 0.45, 0.35),
                muted: GRAY,
                header_align: HeaderAlign::Left,
                uppercase_headings: true,
                name_size_pt: 17.0,
                heading_size_pt: 10.5,
                body_size_pt: 9.0,
                leading: 1.2,
                section_gap_mm: 3.0,
                margin_mm: 14.0,
            },
        }
    }

    /// Style for analysis reports, which have no template selector.
    pub fn report() -> Self {
        Self::for_template(TemplateKind::Modern)
    }

    pub fn heading_text(&self, heading: &str) -> String {
        if self.uppercase_headings {
            heading.to_uppercase()
        } else {
            heading.to_string()
        }
    }
}
