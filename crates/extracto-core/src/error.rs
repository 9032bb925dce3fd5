//! Error types for the extracto-core library.

use thiserror::Error;

/// Main error type for the extracto library.
#[derive(Error, Debug)]
pub enum ExtractoError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Act extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// External extraction provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to act extraction.
///
/// Heuristic failures are never errors: a document without a recognizable act
/// is reported as a [`ParseOutcome`](crate::models::act::ParseOutcome) with
/// zero confidence.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Upstream text acquisition yielded nothing usable.
    #[error("no extractable text in document")]
    NoExtractableText,

    /// The positioned token list could not be decoded.
    #[error("invalid positioned tokens: {0}")]
    InvalidTokens(String),
}

/// Failures of the external extraction provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The provider answered `success: false` or an unusable payload.
    #[error("provider rejected the document: {0}")]
    Rejected(String),

    /// The provider did not answer in time.
    #[error("provider timed out")]
    Timeout,
}

/// Why the spatial table parser produced no rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableParseIssue {
    /// No table marker was found among the positioned tokens.
    #[error("no table present")]
    NoTable,

    /// Table markers were found but no entity row could be recovered.
    #[error("table malformed ({sections} section(s)): {reason}")]
    Malformed { sections: usize, reason: String },
}

/// Result type for the extracto library.
pub type Result<T> = std::result::Result<T, ExtractoError>;
