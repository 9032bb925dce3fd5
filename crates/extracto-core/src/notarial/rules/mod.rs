//! Rule-based extractors for Ecuadorian notarial extracts.

pub mod identity;
pub mod normalizer;
pub mod notary;
pub mod patterns;
pub mod sections;

pub use identity::{extract_document_number, validate_cedula, validate_document_number, validate_ruc};
pub use normalizer::{clean_act_type, collapse_whitespace, fold, EntityNormalizer};
pub use notary::{extract_notary_info, ordinal_words, parse_ordinal};
pub use sections::{scan_sections, Section, SectionKind};
