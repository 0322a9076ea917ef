//! Text extraction for uploaded resumes.
//!
//! - PDF: `pdf-extract`.
//! - DOCX: the `word/document.xml` part, read with `zip` + `quick-xml`.
//! - DOC (Word 97-2003): best-effort scan for printable runs in the binary,
//!   both as single-byte text and as UTF-16LE; whichever yields more wins.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

/// Shortest run of printable characters kept when scanning a legacy .doc.
const MIN_DOC_RUN: usize = 6;

/// Stream and font names that show up as printable runs in every .doc file.
const DOC_STRUCTURAL_NOISE: &[&str] = &[
    "Root Entry",
    "WordDocument",
    "SummaryInformation",
    "DocumentSummaryInformation",
    "CompObj",
    "1Table",
    "0Table",
    "Microsoft Word",
    "Microsoft Office Word",
    "Normal.dot",
    "Times New Roman",
    "Default Paragraph Font",
    "Table Normal",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
}

impl DocumentFormat {
    /// Case-insensitive match on the file extension; anything else is unsupported.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "doc" => Some(DocumentFormat::Doc),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX archive is unreadable: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("DOCX body is malformed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error while reading document: {0}")]
    Io(#[from] std::io::Error),

    #[error("no readable text found in the document")]
    Empty,
}

/// Extracts and normalizes the text of an uploaded document. CPU-bound; call from `spawn_blocking`.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = match format {
        DocumentFormat::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?
        }
        DocumentFormat::Docx => extract_docx(bytes)?,
        DocumentFormat::Doc => extract_doc(bytes),
    };

    let text = normalize_text(&raw);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;
    docx_xml_to_text(&xml)
}

/// Walks WordprocessingML: text lives in `<w:t>`, paragraphs end at `</w:p>`.
/// Tabs and breaks count only inside a run (`<w:r>`); `<w:tab/>` under
/// `<w:pPr><w:tabs>` defines a tab stop and emits nothing.
fn docx_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    let mut in_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:r" => in_run = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if in_run => out.push('\t'),
                b"w:br" | b"w:cr" if in_run => out.push('\n'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

fn extract_doc(bytes: &[u8]) -> String {
    let single_byte = printable_runs(bytes.iter().map(|&b| u16::from(b)));
    let utf16 = printable_runs(
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
    );
    if utf16.len() > single_byte.len() {
        utf16
    } else {
        single_byte
    }
}

/// Collects runs of printable text (Word's `\r` paragraph marks become newlines).
fn printable_runs(units: impl Iterator<Item = u16>) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String| {
        let run = current.trim();
        let letters = run.chars().filter(|c| c.is_alphabetic()).count();
        if run.chars().count() >= MIN_DOC_RUN
            && letters * 2 >= run.len()
            && !DOC_STRUCTURAL_NOISE.iter().any(|noise| run.contains(noise))
        {
            runs.push(run.to_string());
        }
        current.clear();
    };

    for unit in units {
        match char::from_u32(u32::from(unit)) {
            Some('\r') | Some('\n') => {
                current.push('\n');
            }
            Some(c) if c == ' ' || c == '\t' || c.is_ascii_graphic() => current.push(c),
            _ => flush(&mut current),
        }
    }
    flush(&mut current);

    runs.join("\n")
}

/// Unifies line endings, strips trailing spaces, and collapses blank-line runs.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut out: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in unified.lines() {
        let line = line.trim_end();
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(if blank { "" } else { line });
        previous_blank = blank;
    }

    out.join("\n").trim().to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Builds a minimal .docx containing the given document.xml body.
    pub(crate) fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(DocumentFormat::from_filename("cv.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_filename("cv.docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_filename("old.Doc"), Some(DocumentFormat::Doc));
        assert_eq!(DocumentFormat::from_filename("cv.txt"), None);
        assert_eq!(DocumentFormat::from_filename("pdf"), None);
        assert_eq!(DocumentFormat::from_filename("cv.pdf.exe"), None);
    }

    #[test]
    fn test_docx_paragraphs_tabs_and_entities() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>Grace Hopper</w:t></w:r></w:p>
               <w:p><w:r><w:t xml:space="preserve">Engineer </w:t></w:r><w:r><w:tab/><w:t>R&amp;D</w:t></w:r></w:p>
               <w:p/>
               <w:p><w:r><w:t>Line one</w:t><w:br/><w:t>Line two</w:t></w:r></w:p>"#,
        );
        let text = extract_text(DocumentFormat::Docx, &bytes).unwrap();
        assert_eq!(text, "Grace Hopper\nEngineer \tR&D\n\nLine one\nLine two");
    }

    #[test]
    fn test_docx_tab_stop_definitions_emit_nothing() {
        let bytes = docx_with_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="right" w:pos="9360"/><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
                 <w:r><w:t>Engineer</w:t></w:r><w:r><w:tab/><w:t>2019</w:t></w:r></w:p>"#,
        );
        let text = extract_text(DocumentFormat::Docx, &bytes).unwrap();
        assert_eq!(text, "Engineer\t2019");
    }

    #[test]
    fn test_docx_without_text_is_empty_error() {
        let bytes = docx_with_body("<w:p/>");
        assert!(matches!(
            extract_text(DocumentFormat::Docx, &bytes),
            Err(ExtractError::Empty)
        ));
    }

    #[test]
    fn test_garbage_docx_is_zip_error() {
        assert!(matches!(
            extract_text(DocumentFormat::Docx, b"definitely not a zip"),
            Err(ExtractError::Zip(_))
        ));
    }

    #[test]
    fn test_doc_scan_finds_utf16_text_and_skips_noise() {
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        for unit in "Root Entry".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0, 0xFF, 0xFF]);
        for unit in "Grace Hopper\rSenior Engineer at the Navy".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);

        let text = extract_text(DocumentFormat::Doc, &bytes).unwrap();
        assert!(text.contains("Grace Hopper\nSenior Engineer at the Navy"), "got {text:?}");
        assert!(!text.contains("Root Entry"));
    }

    #[test]
    fn test_doc_with_no_text_is_empty_error() {
        let bytes = vec![0u8, 1, 2, 3, 0xFF, 0xFE, 7, 8];
        assert!(matches!(
            extract_text(DocumentFormat::Doc, &bytes),
            Err(ExtractError::Empty)
        ));
    }

    #[test]
    fn test_normalize_text_collapses_blank_runs() {
        let raw = "\r\n\r\nName   \r\n\r\n\r\n\r\nExperience\n  \n\t\nSkills  \n\n";
        assert_eq!(normalize_text(raw), "Name\n\nExperience\n\nSkills");
    }
}
