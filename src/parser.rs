//! Resume text extraction.
//!
//! Turns uploaded bytes (PDF or plain text) into cleaned text plus a map of
//! named sections. Section detection runs on the raw text because headers
//! are recognized only when they occupy a whole line.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const SECTION_HEADERS: &[&str] = &[
    "education",
    "experience",
    "work experience",
    "projects",
    "skills",
    "technical skills",
    "certifications",
    "achievements",
    "summary",
    "profile",
];

const GENERAL_SECTION: &str = "general";

static SECTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    let alternatives = SECTION_HEADERS
        .iter()
        .map(|h| regex::escape(h))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?mi)^[ \t]*({alternatives})[ \t]*:?[ \t]*\r?$"))
        .expect("section header pattern is valid")
});

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("pdf extraction failed: {0}")]
    Pdf(String),

    #[error("pdf support is not compiled in")]
    PdfUnsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// `.pdf` (any case) is a PDF; everything else is decoded as text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedResume {
    /// Whitespace-collapsed text used for scoring
    pub raw_text: String,
    /// Section name (lower-cased header) -> cleaned section body
    pub sections: BTreeMap<String, String>,
}

pub fn parse_file(path: &Path) -> Result<ParsedResume, ParseError> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_resume(&bytes, DocumentKind::from_path(path))
}

pub fn parse_resume(bytes: &[u8], kind: DocumentKind) -> Result<ParsedResume, ParseError> {
    let text = match kind {
        DocumentKind::Pdf => read_pdf(bytes)?,
        DocumentKind::Text => decode_text(bytes),
    };

    Ok(ParsedResume {
        raw_text: clean_text(&text),
        sections: split_sections(&text),
    })
}

#[cfg(feature = "pdf")]
pub fn read_pdf(bytes: &[u8]) -> Result<String, ParseError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ParseError::Pdf(e.to_string()))
}

#[cfg(not(feature = "pdf"))]
pub fn read_pdf(_bytes: &[u8]) -> Result<String, ParseError> {
    Err(ParseError::PdfUnsupported)
}

/// Lossy UTF-8 decode; invalid sequences are dropped, valid text is kept as is.
pub fn decode_text(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Collapse all whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// Split on lines that consist only of a known header.
///
/// Text before the first header is dropped; with no headers at all the
/// whole text becomes the `general` section.
pub fn split_sections(text: &str) -> BTreeMap<String, String> {
    let headers: Vec<(String, usize, usize)> = SECTION_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_lowercase();
            Some((name, whole.start(), whole.end()))
        })
        .collect();

    let mut sections = BTreeMap::new();
    if headers.is_empty() {
        sections.insert(GENERAL_SECTION.to_string(), clean_text(text));
        return sections;
    }

    for (i, (name, _, body_start)) in headers.iter().enumerate() {
        let body_end = headers.get(i + 1).map_or(text.len(), |next| next.1);
        // a repeated header overwrites the earlier body
        sections.insert(name.clone(), clean_text(&text[*body_start..body_end]));
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\nSummary:\nData scientist.\n\nSkills\nPython, SQL\r\n\tstatistics\nWork Experience\nAcme Corp 2019-2024\n";

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a\r\n\tb   c \n"), "a b c");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_split_sections() {
        let sections = split_sections(RESUME);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections["summary"], "Data scientist.");
        assert_eq!(sections["skills"], "Python, SQL statistics");
        assert_eq!(sections["work experience"], "Acme Corp 2019-2024");
    }

    #[test]
    fn test_header_must_fill_line() {
        let sections = split_sections("I have experience in sales\nand skills in talking");
        assert_eq!(sections.len(), 1);
        assert!(sections.contains_key("general"));
    }

    #[test]
    fn test_parse_text_resume() {
        let parsed = parse_resume(RESUME.as_bytes(), DocumentKind::Text).unwrap();
        assert!(parsed.raw_text.starts_with("Jane Doe Summary: Data scientist."));
        assert!(!parsed.raw_text.contains('\n'));
        assert_eq!(parsed.sections.len(), 3);
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let bytes = [b'p', b'y', 0xFF, b't', b'h', b'o', b'n'];
        assert_eq!(decode_text(&bytes), "python");

        let mut mixed = "caf\u{FFFD} ".as_bytes().to_vec();
        mixed.extend([0xC3, b'x', 0xE2, 0x82]);
        assert_eq!(decode_text(&mixed), "caf\u{FFFD} x");
    }

    #[test]
    fn test_document_kind() {
        assert_eq!(DocumentKind::from_path(Path::new("cv.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("cv.txt")), DocumentKind::Text);
        assert_eq!(DocumentKind::from_path(Path::new("cv")), DocumentKind::Text);
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(Path::new("/nonexistent/cv.txt"));
        assert!(matches!(result, Err(ParseError::Read { .. })));
    }
}
