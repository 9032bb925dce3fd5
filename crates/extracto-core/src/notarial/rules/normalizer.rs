//! Entity normalization: act-type cleanup, name reordering and name
//! extraction from noisy text blocks.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tracing::trace;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::identity::extract_document_number;
use super::patterns::{
    ACT_TYPE_CUT_MARKERS, BUSINESS_NAME, DATE_NOISE, EMBEDDED_PERSON_TYPE, JURIDICAL_ROW,
    NAME_LIST_SEPARATOR, NATURAL_ROW, PERSON_TYPE_PREFIX, PERSON_TYPE_WORD, REPRESENTED_BY,
    ROW_NAME_TAIL, SURNAMES_AND_NAMES, TOKEN, WHITESPACE,
};
use crate::models::{Entity, EntityInput, Lexicon, PersonType, is_valid_name};

/// Header words that disqualify an anchored table-row capture.
const ANCHOR_NOISE: &[&str] = &[
    "PERSONA",
    "NOMBRES",
    "APELLIDOS",
    "INTERVINIENTE",
    "DOCUMENTO",
    "IDENTIDAD",
    "NACIONALIDAD",
    "CALIDAD",
    "OTORGANTE",
    "OTORGANTES",
    "BENEFICIARIO",
    "BENEFICIARIOS",
];

/// Longest token run accepted as a natural person's name.
const MAX_NAME_TOKENS: usize = 6;

/// Longest token run accepted as a company name.
const MAX_COMPANY_TOKENS: usize = 10;

/// Uppercase and strip diacritics (Ñ folds to N).
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Fold a token for dictionary lookups, dropping surrounding punctuation
/// but keeping inner dots (S.A.).
fn fold_token(token: &str) -> String {
    fold(token)
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')' | '"' | '\''))
        .to_string()
}

/// Uppercase an act label and cut it at the first noise marker.
///
/// Dates, location labels and document-type labels end the label;
/// "PERSONA NATURAL/JURÍDICA" is removed. Applying it twice gives the
/// same result as applying it once.
pub fn clean_act_type(text: &str) -> String {
    let upper = collapse_whitespace(&text.replace('_', " ").to_uppercase());
    if upper.is_empty() {
        return String::new();
    }

    let padded = format!(" {}", upper);
    let mut cut = padded.len();
    for marker in ACT_TYPE_CUT_MARKERS {
        if let Some(pos) = padded.find(marker) {
            cut = cut.min(pos);
        }
    }
    if let Some(m) = DATE_NOISE.find(&padded) {
        cut = cut.min(m.start());
    }

    let head = EMBEDDED_PERSON_TYPE.replace_all(&padded[..cut], " ");
    collapse_whitespace(&head)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '-'))
        .to_string()
}

/// A name found in a block, with the byte offset where it starts.
#[derive(Debug, Clone)]
struct Candidate {
    position: usize,
    name: String,
    person_type: PersonType,
}

/// Turns noisy name-bearing fragments into clean entities.
#[derive(Debug, Clone, Default)]
pub struct EntityNormalizer {
    lexicon: Lexicon,
    /// Names this normalizer produced by reordering; shared between clones.
    ordered: Arc<RwLock<HashSet<String>>>,
}

impl EntityNormalizer {
    /// Create a normalizer owning the given dictionaries.
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon,
            ordered: Arc::default(),
        }
    }

    fn is_own_output(&self, name: &str) -> bool {
        self.ordered.read().map(|names| names.contains(name)).unwrap_or(false)
    }

    fn remember_ordered(&self, name: &str) {
        if let Ok(mut names) = self.ordered.write() {
            names.insert(name.to_string());
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn is_given(&self, token: &str) -> bool {
        self.lexicon.is_given_name(fold_token(token).trim_end_matches('.'))
    }

    fn is_particle(&self, token: &str) -> bool {
        self.lexicon.is_particle(&fold_token(token))
    }

    /// Whether a single token is a legal-form suffix (S.A., CIA.LTDA., ...).
    fn is_company_token(&self, token: &str) -> bool {
        let folded = fold_token(token);
        if self.lexicon.is_company_suffix(&folded)
            || self.lexicon.is_company_suffix(folded.trim_end_matches('.'))
        {
            return true;
        }
        folded
            .split('.')
            .filter(|piece| piece.len() >= 3)
            .any(|piece| self.lexicon.is_company_suffix(piece))
    }

    /// Whether a name carries a company suffix or an organisation keyword.
    pub fn is_company_name(&self, name: &str) -> bool {
        name.split_whitespace().any(|token| {
            self.is_company_token(token) || self.lexicon.is_company_keyword(&fold_token(token))
        })
    }

    /// Juridical when the name looks like an organisation, otherwise natural.
    pub fn classify_person_type(&self, name: &str) -> PersonType {
        if self.is_company_name(name) {
            PersonType::Juridical
        } else {
            PersonType::Natural
        }
    }

    /// Put a natural person's name in "GIVEN NAMES SURNAMES" order.
    ///
    /// Company names are returned untouched. Names starting with a known
    /// given name are already ordered, and so is anything this normalizer
    /// returned from an earlier reorder, which keeps the operation
    /// idempotent for names outside the dictionaries. Otherwise the trailing
    /// one or two tokens are taken as given names, keeping surname particles
    /// attached to the surname block.
    pub fn reorder_name(&self, name: &str) -> String {
        if self.is_company_name(name) {
            return name.to_string();
        }

        let cleaned = collapse_whitespace(&name.to_uppercase());
        let tokens: Vec<&str> = cleaned.split(' ').filter(|t| !t.is_empty()).collect();
        let n = tokens.len();
        if n < 2 || self.is_given(tokens[0]) || self.is_own_output(&cleaned) {
            return cleaned;
        }

        let tail_hit = self.is_given(tokens[n - 1]) || self.is_given(tokens[n - 2]);
        if !tail_hit && tokens.iter().take(2).any(|t| self.is_given(t)) {
            return cleaned;
        }

        let mut given = match n {
            2 => 1,
            3 if self.is_given(tokens[1]) && self.is_given(tokens[2]) => 2,
            3 => 1,
            _ => 2,
        };
        while given > 1 && self.is_particle(tokens[n - given - 1]) {
            given -= 1;
        }
        while given < n - 1 && self.is_particle(tokens[n - given]) {
            given += 1;
        }

        let (surnames, given_names) = tokens.split_at(n - given);
        let reordered = format!("{} {}", given_names.join(" "), surnames.join(" "));
        trace!("Reordered '{}' -> '{}'", cleaned, reordered);
        self.remember_ordered(&reordered);
        reordered
    }

    /// Extract clean person and company names from a noisy block.
    ///
    /// Table-row anchors win; the generic token-run scan only runs when no
    /// anchor matched. Order follows the text; exact duplicates are dropped.
    pub fn clean_person_names(&self, block: &str) -> Vec<String> {
        let text = collapse_whitespace(&block.to_uppercase());
        self.candidates(&text).into_iter().map(|c| c.name).collect()
    }

    /// Like [`clean_person_names`](Self::clean_person_names) but typed, with
    /// representatives attached to the juridical entity they represent.
    pub fn extract_entities(&self, block: &str) -> Vec<Entity> {
        let text = collapse_whitespace(&block.to_uppercase());
        if text.is_empty() {
            return Vec::new();
        }

        let representation = self.representatives_in(&text);
        let rep_names: HashSet<&str> = representation
            .iter()
            .flat_map(|(_, names)| names.iter().map(String::as_str))
            .collect();

        let candidates: Vec<Candidate> = self
            .candidates(&text)
            .into_iter()
            .filter(|c| !rep_names.contains(c.name.as_str()))
            .collect();

        let mut entities: Vec<(usize, Entity)> = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let end = candidates
                .get(i + 1)
                .map(|next| next.position)
                .unwrap_or(text.len());
            let row = text.get(candidate.position..end).unwrap_or_default();

            let mut entity = Entity::new(candidate.name.clone(), candidate.person_type);
            entity.document_number = extract_document_number(row);
            entity.nationality = row
                .split_whitespace()
                .map(fold_token)
                .find(|t| self.lexicon.is_nationality(t));
            entities.push((candidate.position, entity));
        }

        for (position, names) in representation {
            let target = entities
                .iter()
                .rposition(|(p, e)| *p < position && e.person_type.is_juridical())
                .or_else(|| entities.iter().position(|(_, e)| e.person_type.is_juridical()));

            if let Some(idx) = target {
                let represented = &mut entities[idx].1;
                for name in names {
                    if !represented.representatives.contains(&name) {
                        represented.representatives.push(name);
                    }
                }
            }
        }

        entities.into_iter().map(|(_, e)| e).collect()
    }

    /// Names following "REPRESENTADO POR" / "REPRESENTANTE LEGAL" in a block.
    pub fn representatives(&self, block: &str) -> Vec<String> {
        let text = collapse_whitespace(&block.to_uppercase());
        let mut names: Vec<String> = Vec::new();
        for (_, found) in self.representatives_in(&text) {
            for name in found {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Resolve a boundary input (bare string or structured record) into an entity.
    pub fn resolve_input(&self, input: &EntityInput) -> Option<Entity> {
        let person_type = input
            .declared_type()
            .unwrap_or_else(|| self.classify_person_type(input.name()));

        let mut entity = self.normalize_entity(Entity::new(input.name(), person_type))?;
        entity.representatives = input
            .representatives()
            .iter()
            .map(|r| self.reorder_name(r))
            .filter(|r| is_valid_name(r))
            .collect();
        Some(entity)
    }

    /// Normalize an entity's name in place; `None` when the name is noise.
    ///
    /// A company-looking name declared natural is upgraded to juridical.
    pub fn normalize_entity(&self, mut entity: Entity) -> Option<Entity> {
        if self.is_company_name(&entity.name) {
            entity.person_type = PersonType::Juridical;
        }
        entity.name = match entity.person_type {
            PersonType::Juridical => collapse_whitespace(&entity.name.to_uppercase()),
            PersonType::Natural => self.reorder_name(&entity.name),
        };
        is_valid_name(&entity.name).then_some(entity)
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut found = self.anchored_candidates(text);
        if found.is_empty() {
            found = self.generic_candidates(text);
        }

        let mut seen = HashSet::new();
        found.retain(|c| is_valid_name(&c.name) && seen.insert(c.name.clone()));
        found
    }

    /// Pattern 1: NATURAL/JURÍDICA table rows and labelled name fields.
    fn anchored_candidates(&self, text: &str) -> Vec<Candidate> {
        let mut found = Vec::new();

        for caps in NATURAL_ROW.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let name = self.tidy_name(after_last_person_type(m.as_str()));
            if self.is_anchor_noise(&name) {
                continue;
            }
            let person_type = self.classify_person_type(&name);
            let name = match person_type {
                PersonType::Natural => self.reorder_name(&name),
                PersonType::Juridical => name,
            };
            found.push(Candidate { position: m.start(), name, person_type });
        }

        for caps in JURIDICAL_ROW.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let name = self.tidy_name(after_last_person_type(m.as_str()));
            if self.is_anchor_noise(&name) {
                continue;
            }
            found.push(Candidate {
                position: m.start(),
                name,
                person_type: PersonType::Juridical,
            });
        }

        for caps in BUSINESS_NAME.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let name = self.tidy_name(m.as_str());
            let person_type = self.classify_person_type(&name);
            found.push(Candidate { position: m.start(), name, person_type });
        }

        for caps in SURNAMES_AND_NAMES.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let name = self.reorder_name(&self.tidy_name(m.as_str()));
            found.push(Candidate {
                position: m.start(),
                name,
                person_type: PersonType::Natural,
            });
        }

        found.sort_by_key(|c| c.position);
        found
    }

    /// Pattern 2: runs of capitalized tokens between stop words.
    fn generic_candidates(&self, text: &str) -> Vec<Candidate> {
        let mut found = Vec::new();
        let mut run: Vec<(usize, &str)> = Vec::new();

        for m in TOKEN.find_iter(text) {
            let raw = m.as_str();
            let token = raw.trim_end_matches([',', ';', ':']);
            let closes_run = token.len() != raw.len();

            if self.is_name_token(token) {
                run.push((m.start(), token));
            } else {
                self.flush_run(&mut run, &mut found);
            }
            if closes_run {
                self.flush_run(&mut run, &mut found);
            }
        }
        self.flush_run(&mut run, &mut found);

        found
    }

    fn is_name_token(&self, token: &str) -> bool {
        if !token.chars().any(char::is_alphabetic) {
            return false;
        }
        if !token
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, '.' | '&' | '\''))
        {
            return false;
        }
        let folded = fold_token(token);
        let bare = folded.trim_end_matches('.');
        !matches!(bare, "Y" | "E") && !self.lexicon.is_stopword(bare)
    }

    fn flush_run(&self, run: &mut Vec<(usize, &str)>, found: &mut Vec<Candidate>) {
        if run.is_empty() {
            return;
        }

        let mut tokens: &[(usize, &str)] = run;
        while let Some(((_, first), rest)) = tokens.split_first() {
            if self.is_particle(first) {
                tokens = rest;
            } else {
                break;
            }
        }
        while let Some(((_, last), rest)) = tokens.split_last() {
            if self.is_particle(last) {
                tokens = rest;
            } else {
                break;
            }
        }

        if let Some(&(position, _)) = tokens.first() {
            let words: Vec<&str> = tokens.iter().map(|(_, t)| *t).collect();
            let name = words.join(" ");
            let is_company = self.is_company_name(&name);
            let real = words.iter().filter(|w| !self.is_particle(w)).count();

            let accepted = if is_company {
                words.len() <= MAX_COMPANY_TOKENS
            } else {
                real >= 2 && words.len() <= MAX_NAME_TOKENS
            };

            if accepted {
                let (name, person_type) = if is_company {
                    (name, PersonType::Juridical)
                } else {
                    (self.reorder_name(&name), PersonType::Natural)
                };
                found.push(Candidate { position, name, person_type });
            }
        }

        run.clear();
    }

    /// Representative names with the offset of their "REPRESENTADO POR" clause.
    fn representatives_in(&self, text: &str) -> Vec<(usize, Vec<String>)> {
        REPRESENTED_BY
            .captures_iter(text)
            .filter_map(|caps| {
                let clause = caps.get(0)?;
                let names: Vec<String> = NAME_LIST_SEPARATOR
                    .split(caps.get(1)?.as_str())
                    .map(|raw| self.reorder_name(&self.tidy_name(raw)))
                    .filter(|name| is_valid_name(name))
                    .collect();
                (!names.is_empty()).then_some((clause.start(), names))
            })
            .collect()
    }

    fn is_anchor_noise(&self, name: &str) -> bool {
        name.split_whitespace()
            .any(|t| ANCHOR_NOISE.contains(&fold_token(t).as_str()))
    }

    /// Strip person-type prefixes, trailing row clauses and edge punctuation.
    fn tidy_name(&self, raw: &str) -> String {
        let collapsed = collapse_whitespace(raw);
        let without_prefix = PERSON_TYPE_PREFIX.replace(&collapsed, "");
        let without_tail = ROW_NAME_TAIL.replace(&without_prefix, "");
        let trimmed = without_tail
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '/' | '|'));

        match trimmed.rsplit(' ').next() {
            Some(last) if trimmed.ends_with('.') && !self.is_company_token(last) => {
                trimmed.trim_end_matches('.').trim_end().to_string()
            }
            _ => trimmed.to_string(),
        }
    }
}

/// Text after the last NATURAL/JURÍDICA word of a capture.
fn after_last_person_type(capture: &str) -> &str {
    match PERSON_TYPE_WORD.find_iter(capture).last() {
        Some(m) => capture[m.end()..].trim(),
        None => capture.trim(),
    }
}
