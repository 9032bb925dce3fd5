//! Multi-act parser.
//!
//! A document may carry several extracts ("EXTRACTO N°" / "ESCRITURA N°"),
//! and one extract may carry several `ACTO O CONTRATO` headers or a compound
//! title ("PODER GENERAL Y REVOCATORIA DE PODER"). Every recovered title
//! becomes one act sharing the grantors and beneficiaries of its section.

use tracing::{debug, trace};

use super::rules::normalizer::{EntityNormalizer, clean_act_type, fold};
use super::rules::notary::extract_notary_info;
use super::rules::patterns::{DANGLING_CONJUNCTION, NUMBERED_ITEM, SEGMENT_MARKER, TITLE_SEPARATOR};
use super::rules::sections::{
    Section, SectionKind, first_body, first_line, joined_bodies, natural_anchor_block,
    scan_sections,
};
use crate::models::{Act, ActSource, Entity, ExtractionConfig, NotaryInfo};

/// Confidence stated for acts produced by this parser.
pub const SEGMENTED_CONFIDENCE: f32 = 0.6;

/// Splits a document into acts and parses each one.
#[derive(Debug, Clone)]
pub struct SegmentingParser {
    normalizer: EntityNormalizer,
    allowed_act_keywords: Vec<String>,
    indeterminate_act_types: Vec<String>,
}

impl Default for SegmentingParser {
    fn default() -> Self {
        Self::new(EntityNormalizer::default(), &ExtractionConfig::default())
    }
}

impl SegmentingParser {
    pub fn new(normalizer: EntityNormalizer, config: &ExtractionConfig) -> Self {
        Self {
            normalizer,
            allowed_act_keywords: config.allowed_act_keywords.iter().map(|k| fold(k)).collect(),
            indeterminate_act_types: config
                .indeterminate_act_types
                .iter()
                .map(|k| fold(k))
                .collect(),
        }
    }

    /// Parse every act in the document. Empty input gives no acts.
    pub fn parse(&self, text: &str) -> Vec<Act> {
        let upper = text.to_uppercase();
        if upper.trim().is_empty() {
            return Vec::new();
        }

        let notary = extract_notary_info(text);
        let segments = split_segments(&upper);
        debug!("Segmenting parse: {} segment(s)", segments.len());

        let mut acts = Vec::new();
        for segment in segments {
            for block in split_act_blocks(segment) {
                acts.extend(self.parse_block(block, &notary));
            }
        }

        let before = acts.len();
        acts.retain(|act| self.is_supported(act));
        if acts.len() != before {
            debug!("Discarded {} unsupported or incomplete act(s)", before - acts.len());
        }
        acts
    }

    /// Whether an act is complete and of a supported type.
    pub fn is_supported(&self, act: &Act) -> bool {
        if !act.is_valid() {
            return false;
        }
        let act_type = fold(&act.act_type);
        let normalized = act_type.replace('_', " ");
        if self
            .indeterminate_act_types
            .iter()
            .any(|sentinel| act_type == *sentinel || normalized == sentinel.replace('_', " "))
        {
            return false;
        }
        self.allowed_act_keywords
            .iter()
            .any(|keyword| act_type.contains(keyword.as_str()))
    }

    fn parse_block(&self, block: &str, notary: &NotaryInfo) -> Vec<Act> {
        let sections = scan_sections(block);
        let Some(raw_title) = first_body(&sections, SectionKind::Act).map(first_line) else {
            return Vec::new();
        };

        let titles = split_compound_title(&clean_act_type(raw_title));
        if titles.is_empty() {
            return Vec::new();
        }

        let grantors = self.grantors(block, &sections);
        let beneficiaries = self.entities(&joined_bodies(&sections, SectionKind::Beneficiaries));
        trace!(
            "Block titles {:?}: {} grantor(s), {} beneficiary(ies)",
            titles,
            grantors.len(),
            beneficiaries.len()
        );

        titles
            .into_iter()
            .map(|act_type| {
                let mut act = Act::new(ActSource::Segmented).with_notary(notary);
                act.act_type = act_type;
                act.grantors = grantors.clone();
                act.beneficiaries = beneficiaries.clone();
                act.confidence = SEGMENTED_CONFIDENCE;
                act
            })
            .collect()
    }

    /// Grantors from the first anchor that yields any: colon labels,
    /// `OTORGADO(A) POR` labels, bare `OTORGANTES` headers, then `NATURAL`.
    fn grantors(&self, block: &str, sections: &[Section<'_>]) -> Vec<Entity> {
        let labelled = self.entities(&grantor_text(sections, |s| s.has_colon));
        if !labelled.is_empty() {
            return labelled;
        }

        let granted_by = self.entities(&grantor_text(sections, |s| s.label.starts_with("OTORGAD")));
        if !granted_by.is_empty() {
            debug!("Grantors recovered from OTORGADO POR without colon");
            return granted_by;
        }

        let headers = self.entities(&grantor_text(sections, |s| !s.has_colon));
        if !headers.is_empty() {
            debug!("Grantors recovered from a bare OTORGANTES header");
            return headers;
        }

        natural_anchor_block(block, sections)
            .map(|anchor| self.entities(anchor))
            .unwrap_or_default()
    }

    fn entities(&self, text: &str) -> Vec<Entity> {
        self.normalizer
            .extract_entities(text)
            .into_iter()
            .map(|e| e.with_source(ActSource::Segmented.to_string()))
            .collect()
    }
}

/// Bodies of the grantor sections accepted by `accept`, one per line.
fn grantor_text(sections: &[Section<'_>], accept: impl Fn(&Section<'_>) -> bool) -> String {
    sections
        .iter()
        .filter(|s| s.kind == SectionKind::Grantors && accept(s))
        .map(|s| s.body.trim())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split on extract markers. Text before the first marker is kept only
/// when it holds an act header of its own.
fn split_segments(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = SEGMENT_MARKER.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![text];
    }

    let mut segments = Vec::with_capacity(starts.len() + 1);
    let preamble = &text[..starts[0]];
    if scan_sections(preamble).iter().any(|s| s.kind == SectionKind::Act) {
        segments.push(preamble);
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        segments.push(&text[start..end]);
    }
    segments
}

/// Split a segment at every `ACTO O CONTRATO` header after the first.
fn split_act_blocks(segment: &str) -> Vec<&str> {
    let headers: Vec<usize> = scan_sections(segment)
        .iter()
        .filter(|s| s.kind == SectionKind::Act)
        .map(|s| s.start)
        .collect();

    if headers.len() <= 1 {
        return vec![segment];
    }

    let mut blocks = Vec::with_capacity(headers.len());
    for (i, &start) in headers.iter().enumerate() {
        let from = if i == 0 { 0 } else { start };
        let end = headers.get(i + 1).copied().unwrap_or(segment.len());
        blocks.push(&segment[from..end]);
    }
    blocks
}

/// Split a compound act title into its parts.
///
/// Numbered lists win, then `Y/O`, `E`, commas and semicolons; a title
/// with `REVOCATORIA` after its start is split there.
pub fn split_compound_title(title: &str) -> Vec<String> {
    let title = title.trim();
    if title.is_empty() {
        return Vec::new();
    }

    let numbered: Vec<&str> = NUMBERED_ITEM
        .split(title)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let separated: Vec<&str> = TITLE_SEPARATOR
        .split(title)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let parts: Vec<&str> = if NUMBERED_ITEM.find_iter(title).count() >= 2 && numbered.len() >= 2 {
        numbered
    } else if separated.len() >= 2 {
        separated
    } else {
        match title.find("REVOCATORIA") {
            Some(pos) if pos > 0 => vec![&title[..pos], &title[pos..]],
            _ => vec![title],
        }
    };

    let mut titles: Vec<String> = Vec::with_capacity(parts.len());
    for part in parts {
        let trimmed = DANGLING_CONJUNCTION.replace_all(part.trim(), "");
        let cleaned = clean_act_type(&trimmed);
        if !cleaned.is_empty() && !titles.contains(&cleaned) {
            titles.push(cleaned);
        }
    }
    titles
}
