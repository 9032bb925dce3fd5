//! Core library for notarial extract processing.
//!
//! This crate provides:
//! - Act extraction from flat text and coordinate tables (act type, grantors,
//!   beneficiaries, notary)
//! - Entity normalization (name ordering, natural/juridical classification)
//! - Hybrid extraction cross-checked against an external provider
//! - Spanish certified-copy rendering with grammatical agreement
//! - PDF text acquisition

pub mod error;
pub mod layout;
pub mod models;
pub mod notarial;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod render;

pub use error::{ExtractoError, Result};
pub use layout::{load_tokens, tokens_from_json, PositionedToken};
pub use models::{
    Act, ActSource, Entity, EntityInput, ExtractoConfig, Lexicon, NotaryInfo, ParseOutcome, PersonType,
    ReferencePatterns, Validation,
};
pub use notarial::{
    ClassificationOrchestrator, ExtractionProvider, HybridAggregator, HybridOutcome, ProviderDocument,
};
#[cfg(feature = "http")]
pub use notarial::HttpExtractionProvider;
#[cfg(feature = "pdf")]
pub use pdf::{extract_text_from_bytes, extract_text_from_file, PdfExtractor, PdfProcessor};
pub use render::{RenderedDocument, TemplateEngine};
