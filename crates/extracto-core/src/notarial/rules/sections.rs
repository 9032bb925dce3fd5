//! Labelled-section scanner.
//!
//! A section runs from its label to the next known label or the end of the
//! text. Spans are byte offsets into the (uppercased) text that was scanned.

use super::normalizer::clean_act_type;
use super::patterns::{NATURAL_ANCHOR, SECTION_LABEL};

/// Kind of a labelled section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Act,
    Grantors,
    Beneficiaries,
    Notary,
    Other,
}

/// One labelled section of an extract.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub kind: SectionKind,
    /// Label as printed, without the colon.
    pub label: &'a str,
    /// Whether the label was followed by a colon.
    pub has_colon: bool,
    /// Offset of the label.
    pub start: usize,
    /// Text between the label and the next label.
    pub body: &'a str,
}

impl Section<'_> {
    /// End offset of the section body.
    pub fn end(&self, text: &str) -> usize {
        self.body.as_ptr() as usize - text.as_ptr() as usize + self.body.len()
    }
}

/// Split uppercased text into labelled sections, in text order.
pub fn scan_sections(text: &str) -> Vec<Section<'_>> {
    let mut labels: Vec<(SectionKind, usize, usize, &str, bool)> = Vec::new();

    for caps in SECTION_LABEL.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (kind, label) = if let Some(m) = caps.name("act") {
            // "FECHA DEL ACTO", "TIPO DE ACTO" describe something else.
            let before = text[..m.start()].trim_end();
            if before.ends_with(" DEL") || before.ends_with(" DE") || before == "DEL" || before == "DE" {
                (SectionKind::Other, m)
            } else {
                (SectionKind::Act, m)
            }
        } else if let Some(m) = caps.name("grantors") {
            (SectionKind::Grantors, m)
        } else if let Some(m) = caps.name("beneficiaries") {
            (SectionKind::Beneficiaries, m)
        } else if let Some(m) = caps.name("notary") {
            (SectionKind::Notary, m)
        } else if let Some(m) = caps.name("other") {
            (SectionKind::Other, m)
        } else {
            continue;
        };

        labels.push((kind, label.start(), whole.end(), label.as_str(), caps.name("colon").is_some()));
    }

    labels
        .iter()
        .enumerate()
        .map(|(i, &(kind, start, body_start, label, has_colon))| {
            let end = labels.get(i + 1).map(|next| next.1).unwrap_or(text.len());
            Section {
                kind,
                label,
                has_colon,
                start,
                body: &text[body_start..end.max(body_start)],
            }
        })
        .collect()
}

/// First non-blank body of the given kind.
pub fn first_body<'a>(sections: &[Section<'a>], kind: SectionKind) -> Option<&'a str> {
    sections
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.body.trim())
        .find(|body| !body.is_empty())
}

/// Every body of the given kind, one per line.
pub fn joined_bodies(sections: &[Section<'_>], kind: SectionKind) -> String {
    sections
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.body.trim())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First non-empty line of a block.
pub fn first_line(block: &str) -> &str {
    block
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

/// Cleaned act type from the first `ACTO O CONTRATO` section.
pub fn act_type_in(sections: &[Section<'_>]) -> String {
    first_body(sections, SectionKind::Act)
        .map(|body| clean_act_type(first_line(body)))
        .unwrap_or_default()
}

/// Clause starting at a bare `NATURAL` token, for extracts whose grantor
/// label is missing or garbled.
///
/// Only anchors before the first beneficiary label are considered; the
/// clause runs to the next label.
pub fn natural_anchor_block<'a>(text: &'a str, sections: &[Section<'_>]) -> Option<&'a str> {
    let limit = sections
        .iter()
        .find(|s| s.kind == SectionKind::Beneficiaries)
        .map(|s| s.start)
        .unwrap_or(text.len());

    let anchor = NATURAL_ANCHOR.find(&text[..limit])?;
    let end = sections
        .iter()
        .map(|s| s.start)
        .find(|&start| start > anchor.start())
        .unwrap_or(text.len());

    let block = text[anchor.start()..end].trim();
    (!block.is_empty()).then_some(block)
}
