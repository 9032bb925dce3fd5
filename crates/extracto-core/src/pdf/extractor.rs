//! PDF text extraction using lopdf and pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use super::{normalize_text, PdfProcessor, PdfType, Result};
use crate::error::{ExtractionError, ExtractoError, PdfError};
use crate::models::PdfConfig;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    config: PdfConfig,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Normalized text of the whole document.
    pub text: String,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Normalized text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self::with_config(PdfConfig::default())
    }

    pub fn with_config(config: PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            config,
        }
    }

    /// Pages to read, honoring `max_pages` (0 = all).
    fn readable_pages(&self) -> u32 {
        let count = self.page_count();
        match self.config.max_pages {
            0 => count,
            max => count.min(max as u32),
        }
    }

    /// Extract and normalize the text of every readable page.
    pub fn extract_all(&self) -> Result<PdfContent> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        let page_count = self.readable_pages();
        let pages: Vec<PdfPage> = (1..=page_count)
            .map(|number| PdfPage {
                number,
                text: self.extract_page_text(number).map(|t| normalize_text(&t)).unwrap_or_default(),
            })
            .collect();

        let join_pages = || {
            pages
                .iter()
                .map(|p| p.text.as_str())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        };
        // Full-text extraction reads every page, so it only applies when none is cut.
        let text = if page_count < self.page_count() {
            join_pages()
        } else {
            match self.extract_text() {
                Ok(text) => normalize_text(&text),
                Err(e) => {
                    warn!("Full-text extraction failed ({}), joining page texts", e);
                    join_pages()
                }
            }
        };

        let pdf_type = if text.chars().count() >= self.config.min_text_length {
            PdfType::Text
        } else {
            PdfType::Empty
        };

        debug!(
            "PDF analysis: {} pages, {} chars text -> {:?}",
            page_count,
            text.len(),
            pdf_type
        );

        Ok(PdfContent { pdf_type, text, pages })
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Extracts are often "protected" with an empty user password.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data).map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", page, e)))
    }
}

/// Load a PDF and return its normalized text.
///
/// Fails with `NoExtractableText` when fewer than `min_text_length`
/// characters survive normalization.
pub fn extract_text_from_bytes(data: &[u8], config: &PdfConfig) -> crate::error::Result<String> {
    let mut extractor = PdfExtractor::with_config(config.clone());
    extractor.load(data)?;
    let content = extractor.extract_all()?;

    match content.pdf_type {
        PdfType::Text => Ok(content.text),
        PdfType::Empty => Err(ExtractoError::Extraction(ExtractionError::NoExtractableText)),
    }
}

pub fn extract_text_from_file(path: &Path, config: &PdfConfig) -> crate::error::Result<String> {
    let data = std::fs::read(path)?;
    extract_text_from_bytes(&data, config)
}
