//! Certified-copy rendering: grammatical agreement and template substitution.

pub mod grammar;
pub mod template;

pub use grammar::{human_join, Gender, GrammarEngine, Party, TemplateVariables};
pub use template::{
    apply_template, build_act_phrase, copy_ordinal, normalize_act_type_for_display, RenderedDocument,
    TemplateEngine, DEFAULT_TEMPLATE, MAX_COPIES,
};
