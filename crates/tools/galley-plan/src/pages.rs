//! Page range extraction from the first page of the online PDF.

use std::path::Path;
use std::sync::LazyLock;

use lopdf::Document;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

const PATTERNS: [&str; 4] = [
    r"(?i)Vol\.\s*\d+,\s*No\.\s*\d+,\s*pp\.\s*(\d+[-–—]\d+)",
    r"(?i)pp\.\s*(\d+[-–—]\d+)",
    r"(?i)Pages?\s*(\d+[-–—]\d+)",
    r"(?i)S\.\s*(\d+[-–—]\d+)",
];

static RANGE_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect());

/// First page range found in `text`, dashes normalized to `-`.
pub fn page_range_from_text(text: &str) -> Option<String> {
    RANGE_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().replace(['–', '—'], "-"))
    })
}

#[derive(Debug, Error)]
pub enum PagesError {
    #[error("Failed to open {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("PDF has no pages")]
    NoPages,
    #[error("Failed to extract text: {0}")]
    Extract(String),
}

/// Source of first-page text.
pub trait PdfText: Send + Sync {
    fn first_page_text(&self, path: &Path) -> Result<String, PagesError>;
}

/// [`PdfText`] backed by lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfText;

impl PdfText for LopdfText {
    fn first_page_text(&self, path: &Path) -> Result<String, PagesError> {
        let document = Document::load(path).map_err(|e| PagesError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let first = document
            .get_pages()
            .keys()
            .next()
            .copied()
            .ok_or(PagesError::NoPages)?;
        document
            .extract_text(&[first])
            .map_err(|e| PagesError::Extract(e.to_string()))
    }
}

/// Page range printed on the first page of `path`, if any.
pub fn extract_page_range(pdf: &dyn PdfText, path: &Path) -> Result<Option<String>, PagesError> {
    let text = pdf.first_page_text(path)?;
    let preview: String = text.chars().take(200).collect();
    debug!(path = %path.display(), text = %preview, "First page text");
    Ok(page_range_from_text(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_citation_line() {
        assert_eq!(
            page_range_from_text("Survey Research Methods\nVol. 5, No. 2, pp. 100–110\n"),
            Some("100-110".into())
        );
    }

    #[test]
    fn patterns_in_order() {
        assert_eq!(page_range_from_text("PP. 7-9"), Some("7-9".into()));
        assert_eq!(page_range_from_text("Pages 12—30"), Some("12-30".into()));
        assert_eq!(page_range_from_text("page 3-4"), Some("3-4".into()));
        assert_eq!(page_range_from_text("Heft 2, S. 45–67"), Some("45-67".into()));
    }

    #[test]
    fn earlier_pattern_wins() {
        let text = "Pages 1-2 ... Vol. 9, No. 1, pp. 200-210";
        assert_eq!(page_range_from_text(text), Some("200-210".into()));
    }

    #[test]
    fn no_range() {
        assert_eq!(page_range_from_text("Vol. 5, No. 2"), None);
        assert_eq!(page_range_from_text(""), None);
    }

    #[test]
    fn unreadable_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = extract_page_range(&LopdfText, &path).unwrap_err();
        assert!(matches!(err, PagesError::Open { .. }));
    }
}
