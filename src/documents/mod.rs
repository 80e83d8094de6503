//! Documents module - turning uploaded statements into plain text
//!
//! A [`TextExtractor`] yields the text of each page of a [`Document`];
//! [`extract_text`] concatenates the non-empty pages of several documents,
//! each followed by a newline, in input order. Documents with no text
//! contribute nothing; documents that cannot be parsed at all are errors.
//!
//! PDF parsing uses `lopdf` and requires the `pdf` feature (on by default).
//! Parsing is blocking; async callers should run it on
//! `tokio::task::spawn_blocking`.

mod extractors;

pub use extractors::{AutoExtractor, PlainTextExtractor};

#[cfg(feature = "pdf")]
pub use extractors::PdfExtractor;

use std::path::Path;

use crate::error::{FinsightError, Result};
use crate::log_component;

/// Maximum size of a single document accepted for extraction (50 MB).
pub const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// An uploaded or on-disk statement file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name, used for type detection and error messages
    pub name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a document from disk, rejecting files over [`MAX_DOCUMENT_BYTES`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| {
            FinsightError::Document(format!("cannot read {}: {}", path.display(), e))
        })?;
        if meta.len() > MAX_DOCUMENT_BYTES {
            return Err(FinsightError::Document(format!(
                "{} is too large: {} bytes (max {}MB)",
                path.display(),
                meta.len(),
                MAX_DOCUMENT_BYTES / 1024 / 1024
            )));
        }

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// Whether this looks like a PDF, by extension or magic bytes.
    pub fn is_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
            || Path::new(&self.name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    }
}

/// Extracts per-page text from a document.
pub trait TextExtractor: Send + Sync {
    /// Text of each page, in page order. Pages without text are empty strings.
    fn extract_pages(&self, document: &Document) -> Result<Vec<String>>;

    /// Extractor name for logs.
    fn name(&self) -> &str;
}

/// Concatenate the text of `documents` in order.
///
/// Every non-empty page contributes its text followed by `\n`.
///
/// # Example
/// ```
/// use finsight::documents::{extract_text, Document, PlainTextExtractor};
///
/// let docs = vec![
///     Document::new("empty.txt", Vec::new()),
///     Document::new("march.txt", b"03/01 RENT -1200.00".to_vec()),
/// ];
/// let text = extract_text(&PlainTextExtractor, &docs).unwrap();
/// assert_eq!(text, "03/01 RENT -1200.00\n");
/// ```
pub fn extract_text(extractor: &dyn TextExtractor, documents: &[Document]) -> Result<String> {
    let mut text = String::new();
    for document in documents {
        let pages = extractor.extract_pages(document)?;
        let mut kept = 0usize;
        for page in pages.iter().filter(|p| !p.is_empty()) {
            text.push_str(page);
            text.push('\n');
            kept += 1;
        }
        log_component!(
            debug,
            "documents",
            "extracted document text",
            document = document.name.as_str(),
            extractor = extractor.name(),
            pages = pages.len(),
            pages_with_text = kept
        );
    }
    Ok(text)
}
