//! Concrete text extractors.

use super::{Document, TextExtractor};
use crate::error::{FinsightError, Result};

/// Treats the whole document as one page of UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_pages(&self, document: &Document) -> Result<Vec<String>> {
        let text = std::str::from_utf8(&document.bytes).map_err(|e| {
            FinsightError::Document(format!("{} is not valid UTF-8 text: {}", document.name, e))
        })?;
        Ok(vec![text.to_string()])
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Extracts page text from PDFs with `lopdf`.
///
/// Pages whose text cannot be decoded contribute an empty string; a file
/// that cannot be loaded as a PDF at all is a document error.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfExtractor {
    fn extract_pages(&self, document: &Document) -> Result<Vec<String>> {
        let pdf = lopdf::Document::load_mem(&document.bytes).map_err(|e| {
            FinsightError::Document(format!("failed to load PDF {}: {}", document.name, e))
        })?;

        let pages = pdf
            .get_pages()
            .keys()
            .map(|number| pdf.extract_text(&[*number]).unwrap_or_default())
            .collect();
        Ok(pages)
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

/// Picks the PDF or plain-text extractor per document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoExtractor;

impl TextExtractor for AutoExtractor {
    fn extract_pages(&self, document: &Document) -> Result<Vec<String>> {
        if document.is_pdf() {
            extract_pdf(document)
        } else {
            PlainTextExtractor.extract_pages(document)
        }
    }

    fn name(&self) -> &str {
        "auto"
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf(document: &Document) -> Result<Vec<String>> {
    PdfExtractor.extract_pages(document)
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(document: &Document) -> Result<Vec<String>> {
    Err(FinsightError::Document(format!(
        "cannot read {}: PDF extraction requires the 'pdf' build feature. \
         Rebuild with: cargo build --features pdf",
        document.name
    )))
}
