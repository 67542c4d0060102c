//! PDF to plain-text conversion.
//!
//! A PDF goes through `open → parse pages → extract each page → concatenate →
//! persist`. Any stage may fail the file, except page extraction: a page that
//! cannot be read, or that has no text, is logged and skipped.
//!
//! The result is a sibling `.txt` file with the same stem as the PDF. It is
//! never cleaned up; the caller uploads it in place of the PDF.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::discovery::extension_of;

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("not a PDF: {0}")]
    NotAPdf(PathBuf),
    #[error("could not parse PDF {path}: {reason}")]
    CorruptPdf { path: PathBuf, reason: String },
    #[error("no extractable text in {0}")]
    NoExtractableText(PathBuf),
    #[error("failed to write {path}: {source}")]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Converts PDFs into sibling text artifacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs the full conversion for `pdf_path` and returns the path of the
    /// written text artifact.
    pub fn extract(&self, pdf_path: &Path) -> Result<PathBuf, ExtractionError> {
        info!(path = %pdf_path.display(), "Converting PDF to text");

        if !pdf_path.exists() {
            error!(path = %pdf_path.display(), "PDF not found");
            return Err(ExtractionError::NotFound(pdf_path.to_path_buf()));
        }
        if extension_of(pdf_path) != ".pdf" {
            error!(path = %pdf_path.display(), "Refusing to extract text from non-PDF file");
            return Err(ExtractionError::NotAPdf(pdf_path.to_path_buf()));
        }

        let pages = self.extract_pages(pdf_path)?;
        let text = join_pages(&pages);
        if text.is_empty() {
            error!(path = %pdf_path.display(), "PDF yielded no text on any page");
            return Err(ExtractionError::NoExtractableText(pdf_path.to_path_buf()));
        }

        let artifact = artifact_path(pdf_path);
        std::fs::write(&artifact, text.as_bytes()).map_err(|e| {
            error!(path = %artifact.display(), error = ?e, "Failed to persist extracted text");
            ExtractionError::PersistFailure {
                path: artifact.clone(),
                source: e,
            }
        })?;

        info!(
            pdf = %pdf_path.display(),
            artifact = %artifact.display(),
            chars = text.chars().count(),
            "Successfully converted PDF to text"
        );
        Ok(artifact)
    }

    /// Parses the document and returns the trimmed text of each page, in page
    /// order, with unreadable pages reported as empty strings.
    pub fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError> {
        let document = lopdf::Document::load(pdf_path).map_err(|e| {
            error!(path = %pdf_path.display(), error = %e, "Could not parse PDF");
            ExtractionError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        info!(path = %pdf_path.display(), pages = page_numbers.len(), "PDF parsed");

        let texts = page_numbers
            .into_iter()
            .map(|page| {
                // lopdf can panic on malformed font tables; treat that like a
                // failed page.
                let extracted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    document.extract_text(&[page])
                }));
                match extracted {
                    Ok(Ok(text)) => {
                        let text = text.trim().to_string();
                        if text.is_empty() {
                            debug!(path = %pdf_path.display(), page, "Page yielded no text");
                        }
                        text
                    }
                    Ok(Err(e)) => {
                        warn!(path = %pdf_path.display(), page, error = %e, "Failed to extract page text, skipping page");
                        String::new()
                    }
                    Err(_) => {
                        warn!(path = %pdf_path.display(), page, "Page extraction panicked, skipping page");
                        String::new()
                    }
                }
            })
            .collect();
        Ok(texts)
    }
}

/// Joins non-empty page texts with [`PAGE_SEPARATOR`], preserving order.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// `dir/report.pdf` → `dir/report.txt`.
pub fn artifact_path(pdf_path: &Path) -> PathBuf {
    pdf_path.with_extension("txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_empty_pages_and_keeps_order() {
        let pages = vec![
            "first".to_string(),
            String::new(),
            "second".to_string(),
            "third".to_string(),
        ];
        assert_eq!(join_pages(&pages), "first\n\nsecond\n\nthird");
        assert_eq!(join_pages(&[String::new(), String::new()]), "");
    }

    #[test]
    fn artifact_replaces_extension() {
        assert_eq!(
            artifact_path(Path::new("/docs/a/Report.PDF")),
            PathBuf::from("/docs/a/Report.txt")
        );
    }
}
