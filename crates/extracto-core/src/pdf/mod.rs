//! PDF text acquisition.
//!
//! Only the text layer is read; scanned pages without text are reported as
//! [`PdfType::Empty`] and fail with
//! [`ExtractionError::NoExtractableText`](crate::error::ExtractionError).

mod extractor;

pub use extractor::{extract_text_from_bytes, extract_text_from_file, PdfContent, PdfExtractor, PdfPage};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::PdfError;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains enough extractable text.
    Text,
    /// No usable text layer.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

lazy_static! {
    static ref BLANK_RUN: Regex = Regex::new(r"[ \t\x0B\x0C\u{A0}]+").unwrap();
    static ref SPACED_NEWLINE: Regex = Regex::new(r" ?\n ?").unwrap();
}

/// Normalize extracted text: NUL and tabs become spaces, CR is dropped,
/// runs of spaces collapse and spaces around newlines are trimmed.
pub fn normalize_text(raw: &str) -> String {
    let text: String = raw
        .chars()
        .filter(|&c| c != '\r')
        .map(|c| if c == '\0' { ' ' } else { c })
        .collect();
    let text = BLANK_RUN.replace_all(&text, " ");
    SPACED_NEWLINE.replace_all(&text, "\n").trim().to_string()
}
