//! Table reconstruction from positioned tokens.
//!
//! Used when the text parsers find no grantors: table cells printed in
//! columns come out of text extraction interleaved, but their coordinates
//! still describe the rows.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::rules::identity::extract_document_number;
use super::rules::normalizer::{EntityNormalizer, collapse_whitespace, fold};
use super::rules::notary::extract_notary_info;
use super::rules::patterns::{
    PERSON_TYPE_PREFIX, PERSON_TYPE_WORD, ROW_NAME_TAIL, TABLE_COMMON_WORDS, TABLE_HEADER_WORDS,
    TABLE_JURIDICAL_ROW, TABLE_MARKERS, TABLE_NATURAL_ROW,
};
use super::rules::sections::{act_type_in, scan_sections};
use crate::error::TableParseIssue;
use crate::layout::{PositionedToken, tokens_by_page};
use crate::models::{Act, ActSource, Entity, PersonType, SpatialConfig};

/// Confidence stated for acts produced by this parser.
pub const SPATIAL_CONFIDENCE: f32 = 0.8;

/// Role of a table section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSectionKind {
    Grantors,
    Beneficiaries,
}

impl TableSectionKind {
    fn from_marker(marker: &str) -> Option<Self> {
        if marker.contains("OTORG") || marker.contains("POR") {
            Some(TableSectionKind::Grantors)
        } else if marker.contains("FAVOR") || marker.contains("BENEFICIARIO") {
            Some(TableSectionKind::Beneficiaries)
        } else {
            None
        }
    }
}

/// One reconstructed table section.
#[derive(Debug, Clone)]
pub struct TableSection {
    pub kind: TableSectionKind,
    pub page: u32,
    /// Baseline of the marker row.
    pub marker_y: f32,
    /// Row texts, top to bottom.
    pub rows: Vec<String>,
    /// Distinct column positions seen in the section.
    pub columns: usize,
    pub entities: Vec<Entity>,
}

/// A row of tokens sharing a baseline, left to right.
struct Row<'a> {
    y: f32,
    tokens: Vec<&'a PositionedToken>,
}

impl Row<'_> {
    fn text(&self) -> String {
        let joined: Vec<&str> = self.tokens.iter().map(|t| t.text.trim()).collect();
        collapse_whitespace(&joined.join(" "))
    }
}

/// Rebuilds grantor and beneficiary tables from token coordinates.
#[derive(Debug, Clone, Default)]
pub struct SpatialTableParser {
    config: SpatialConfig,
    normalizer: EntityNormalizer,
}

impl SpatialTableParser {
    pub fn new(config: SpatialConfig, normalizer: EntityNormalizer) -> Self {
        Self { config, normalizer }
    }

    /// Build one act from the tables and the document text.
    ///
    /// The act type and notary come from the text; the parties come from
    /// the tables.
    pub fn parse(&self, text: &str, tokens: &[PositionedToken]) -> Result<Act, TableParseIssue> {
        let sections = self.parse_sections(tokens)?;

        let mut act = Act::new(ActSource::Spatial);
        act.confidence = SPATIAL_CONFIDENCE;
        act.act_type = act_type_in(&scan_sections(&text.to_uppercase()));
        act.grantors = merged_entities(&sections, TableSectionKind::Grantors);
        act.beneficiaries = merged_entities(&sections, TableSectionKind::Beneficiaries);
        act.apply_notary(&extract_notary_info(text));

        if act.grantors.is_empty() {
            return Err(TableParseIssue::Malformed {
                sections: sections.len(),
                reason: "no grantor rows".to_string(),
            });
        }
        Ok(act)
    }

    /// Locate table markers and extract the entities of every section.
    pub fn parse_sections(&self, tokens: &[PositionedToken]) -> Result<Vec<TableSection>, TableParseIssue> {
        let pages = tokens_by_page(tokens);
        let mut sections = Vec::new();

        for (&page, page_tokens) in pages.iter().take(self.config.max_pages as usize) {
            let rows = self.group_rows(page_tokens);
            let markers: Vec<(f32, TableSectionKind)> = rows
                .iter()
                .filter_map(|row| marker_kind(&row.text()).map(|kind| (row.y, kind)))
                .collect();

            for &(marker_y, kind) in &markers {
                let (low, high) = self.window(marker_y, kind, &markers);
                let window: Vec<&PositionedToken> = page_tokens
                    .iter()
                    .copied()
                    .filter(|t| t.y >= low && t.y <= high)
                    .collect();
                sections.push(self.build_section(page, marker_y, kind, &window));
            }
        }

        if sections.is_empty() {
            return Err(TableParseIssue::NoTable);
        }
        if sections.iter().all(|s| s.entities.is_empty()) {
            return Err(TableParseIssue::Malformed {
                sections: sections.len(),
                reason: "no entity rows".to_string(),
            });
        }

        debug!("Spatial parse: {} table section(s)", sections.len());
        Ok(sections)
    }

    /// Vertical window of a marker, clipped above the row of the nearest
    /// marker of the other kind on either side.
    fn window(&self, marker_y: f32, kind: TableSectionKind, markers: &[(f32, TableSectionKind)]) -> (f32, f32) {
        let margin = self.config.row_tolerance;
        let mut low = marker_y - self.config.window_below;
        let mut high = marker_y + self.config.window_above;

        for &(y, _) in markers.iter().filter(|(_, other)| *other != kind) {
            if y < marker_y {
                low = low.max(y + margin);
            } else if y > marker_y {
                high = high.min(y - margin);
            }
        }
        (low, high)
    }

    fn build_section(
        &self,
        page: u32,
        marker_y: f32,
        kind: TableSectionKind,
        tokens: &[&PositionedToken],
    ) -> TableSection {
        let rows = self.group_rows(tokens);
        let columns = self.count_columns(tokens);

        let mut entities: Vec<Entity> = Vec::new();
        let mut texts = Vec::with_capacity(rows.len());
        for row in &rows {
            let text = row.text();
            if let Some(entity) = self.parse_row(&text) {
                if !entities.iter().any(|e| e.name == entity.name) {
                    entities.push(entity);
                }
            }
            texts.push(text);
        }

        trace!(
            "Section {:?} on page {} at y={}: {} row(s), {} column(s), {} entity(ies)",
            kind,
            page,
            marker_y,
            texts.len(),
            columns,
            entities.len()
        );

        TableSection {
            kind,
            page,
            marker_y,
            rows: texts,
            columns,
            entities,
        }
    }

    /// Group tokens into rows (top to bottom), each sorted left to right.
    fn group_rows<'a>(&self, tokens: &[&'a PositionedToken]) -> Vec<Row<'a>> {
        let mut sorted: Vec<&PositionedToken> = tokens.to_vec();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<Row<'a>> = Vec::new();
        for token in sorted {
            match rows.last_mut() {
                Some(row) if (row.y - token.y).abs() <= self.config.row_tolerance => {
                    row.tokens.push(token)
                }
                _ => rows.push(Row {
                    y: token.y,
                    tokens: vec![token],
                }),
            }
        }

        for row in &mut rows {
            row.tokens.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        rows
    }

    /// Distinct column positions: x rounded to buckets, then merged.
    fn count_columns(&self, tokens: &[&PositionedToken]) -> usize {
        let bucket = self.config.column_bucket.max(1.0);
        let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
        for token in tokens {
            let x = (token.x / bucket).round() as i64 * bucket as i64;
            *buckets.entry(x).or_default() += 1;
        }

        let mut merged: Vec<i64> = Vec::new();
        for &x in buckets.keys() {
            match merged.last() {
                Some(&last) if (x - last) as f32 <= self.config.column_merge => {}
                _ => merged.push(x),
            }
        }
        merged.len()
    }

    /// Entity carried by one row, if any.
    fn parse_row(&self, row_text: &str) -> Option<Entity> {
        let upper = row_text.to_uppercase();
        if is_header_row(&upper) {
            return None;
        }

        let (raw_name, person_type) = if let Some(caps) = TABLE_JURIDICAL_ROW.captures(&upper) {
            (caps.get(1)?.as_str().to_string(), PersonType::Juridical)
        } else if let Some(caps) = TABLE_NATURAL_ROW.captures(&upper) {
            (caps.get(1)?.as_str().to_string(), PersonType::Natural)
        } else {
            let name = self.substantial_words(&upper)?;
            let person_type = self.normalizer.classify_person_type(&name);
            (name, person_type)
        };

        let name = clean_row_name(&raw_name);
        let mut entity = self.normalizer.normalize_entity(Entity::new(name, person_type))?;
        entity.document_number = extract_document_number(&upper);
        entity.nationality = upper
            .split_whitespace()
            .map(fold)
            .find(|word| self.normalizer.lexicon().is_nationality(word));
        if entity.person_type.is_juridical() {
            entity.representatives = self.normalizer.representatives(&upper);
        }

        Some(entity.with_source(ActSource::Spatial.to_string()))
    }

    /// Fallback name: the row's words that are neither numbers nor table
    /// vocabulary. Needs two words unless it names a company.
    fn substantial_words(&self, upper: &str) -> Option<String> {
        let lexicon = self.normalizer.lexicon();
        let words: Vec<&str> = upper
            .split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .filter(|w| !w.chars().any(|c| c.is_ascii_digit()))
            .filter(|w| {
                let folded = fold(w);
                let bare = folded.trim_matches(|c: char| !c.is_alphanumeric());
                !TABLE_COMMON_WORDS.iter().any(|common| fold(common) == bare)
                    && !lexicon.is_stopword(bare)
                    && !TABLE_MARKERS.iter().any(|marker| fold(marker) == bare)
            })
            .collect();

        let name = words.join(" ");
        (words.len() >= 2 || (!name.is_empty() && self.normalizer.is_company_name(&name))).then_some(name)
    }
}

/// Kind of the first grantor or beneficiary marker printed in a row.
fn marker_kind(row_text: &str) -> Option<TableSectionKind> {
    let upper = row_text.to_uppercase();
    TABLE_MARKERS
        .iter()
        .filter(|marker| upper.contains(*marker))
        .find_map(|marker| TableSectionKind::from_marker(marker))
}

/// Column titles that also occur inside data rows or name the person-type
/// column; on their own they do not make a header.
const WEAK_HEADER_WORDS: &[&str] = &["PERSONA", "TIPO", "REPRESENTA", "OTORGADO POR", "A FAVOR DE"];

/// Whether `word` occurs in `text` delimited by non-alphanumeric characters.
fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Header rows carry column titles, at least one of them besides the
/// person-type column. A row with a person-type word is data unless most of
/// it is titles.
fn is_header_row(upper: &str) -> bool {
    let titles: Vec<&str> = TABLE_HEADER_WORDS
        .iter()
        .copied()
        .filter(|word| contains_word(upper, word))
        .collect();
    if !titles.iter().any(|title| !WEAK_HEADER_WORDS.contains(title)) {
        return false;
    }
    !PERSON_TYPE_WORD.is_match(upper) || titles.len() >= 3
}

fn clean_row_name(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let without_prefix = PERSON_TYPE_PREFIX.replace(&collapsed, "");
    ROW_NAME_TAIL.replace(&without_prefix, "").trim().to_string()
}

/// Entities of every section of one kind, first occurrence wins.
fn merged_entities(sections: &[TableSection], kind: TableSectionKind) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::new();
    for entity in sections
        .iter()
        .filter(|s| s.kind == kind)
        .flat_map(|s| s.entities.iter())
    {
        if !entities.iter().any(|e| e.name == entity.name) {
            entities.push(entity.clone());
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(text: &str, x: f32, y: f32) -> PositionedToken {
        PositionedToken::new(1, text, x, y).with_size(80.0, 10.0)
    }

    fn extract_table() -> Vec<PositionedToken> {
        vec![
            token("OTORGANTES", 50.0, 700.0),
            token("PERSONA", 50.0, 680.0),
            token("NOMBRES/RAZÓN SOCIAL", 150.0, 680.0),
            token("DOCUMENTO", 350.0, 681.0),
            token("NACIONALIDAD", 450.0, 680.0),
            token("NATURAL", 50.0, 660.0),
            token("PEREZ GOMEZ JUAN", 150.0, 662.0),
            token("1710034065", 350.0, 660.0),
            token("ECUATORIANA", 450.0, 659.0),
            token("JURIDICA", 50.0, 640.0),
            token("COMERCIAL BOLIVAR S.A.", 150.0, 640.0),
            token("REPRESENTADO POR LOPEZ ANA", 250.0, 640.0),
            token("1790012344001", 350.0, 640.0),
            token("A FAVOR DE", 50.0, 560.0),
            token("NATURAL", 50.0, 540.0),
            token("RODRIGUEZ LOPEZ MARIA ELENA", 150.0, 540.0),
            token("1710034065", 350.0, 540.0),
            token("ECUATORIANA", 450.0, 540.0),
        ]
    }

    #[test]
    fn test_parse_sections() {
        let parser = SpatialTableParser::default();
        let sections = parser.parse_sections(&extract_table()).unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].kind, TableSectionKind::Grantors);
        assert_eq!(sections[1].kind, TableSectionKind::Beneficiaries);
        assert!(sections[0].columns >= 3);

        let grantors = &sections[0].entities;
        assert_eq!(grantors.len(), 2);
        assert_eq!(grantors[0].name, "JUAN PEREZ GOMEZ");
        assert_eq!(grantors[0].person_type, PersonType::Natural);
        assert_eq!(grantors[0].document_number.as_deref(), Some("1710034065"));
        assert_eq!(grantors[0].nationality.as_deref(), Some("ECUATORIANA"));

        assert_eq!(grantors[1].name, "COMERCIAL BOLIVAR S.A.");
        assert_eq!(grantors[1].person_type, PersonType::Juridical);
        assert_eq!(grantors[1].representatives, vec!["ANA LOPEZ".to_string()]);
        assert_eq!(grantors[1].document_number.as_deref(), Some("1790012344001"));

        assert_eq!(sections[1].entities[0].name, "MARIA ELENA RODRIGUEZ LOPEZ");
    }

    #[test]
    fn test_parse_builds_act() {
        let parser = SpatialTableParser::default();
        let act = parser
            .parse("ACTO O CONTRATO: PODER ESPECIAL\nOTORGANTES", &extract_table())
            .unwrap();

        assert_eq!(act.act_type, "PODER ESPECIAL");
        assert_eq!(act.source, ActSource::Spatial);
        assert_eq!(act.grantors.len(), 2);
        assert_eq!(act.beneficiaries.len(), 1);
        assert!(act.grantors.iter().all(|g| g.sources.contains("spatial")));
    }

    #[test]
    fn test_no_table() {
        let parser = SpatialTableParser::default();
        let tokens = vec![token("PODER", 50.0, 700.0), token("GENERAL", 120.0, 700.0)];
        assert_eq!(parser.parse_sections(&tokens).unwrap_err(), TableParseIssue::NoTable);
        assert_eq!(parser.parse_sections(&[]).unwrap_err(), TableParseIssue::NoTable);
    }

    #[test]
    fn test_malformed_table() {
        let parser = SpatialTableParser::default();
        let tokens = vec![
            token("OTORGANTES", 50.0, 700.0),
            token("1710034065", 150.0, 680.0),
        ];
        assert!(matches!(
            parser.parse_sections(&tokens),
            Err(TableParseIssue::Malformed { sections: 1, .. })
        ));
    }

    #[test]
    fn test_is_header_row() {
        assert!(is_header_row("PERSONA NOMBRES/RAZÓN SOCIAL DOCUMENTO"));
        assert!(!is_header_row("JURIDICA ACME S.A. REPRESENTADO POR JUAN PEREZ"));
        assert!(!is_header_row("NATURAL JUAN PEREZ 1710034065"));
        assert!(is_header_row("TIPO INTERVINIENTE NACIONALIDAD"));
    }

    #[test]
    fn test_representation_row_without_person_type_is_data() {
        assert!(!is_header_row("ACME S.A. REPRESENTADO POR JUAN PEREZ"));
        assert!(!is_header_row("ACME S.A. REPRESENTA JUAN PEREZ"));
        assert!(!is_header_row("PERSONA"));
        assert!(contains_word("NOMBRES/RAZÓN SOCIAL", "RAZÓN SOCIAL"));
        assert!(!contains_word("REPRESENTADO", "REPRESENTA"));
    }
}
