//! Data models for notarial acts, configuration and reference data.

pub mod act;
pub mod config;
pub mod lexicon;
pub mod reference;

pub use act::*;
pub use config::*;
pub use lexicon::Lexicon;
pub use reference::{ReferencePattern, ReferencePatterns};
