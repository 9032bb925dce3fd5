//! Single-act parser over flat text.

use tracing::debug;

use super::rules::normalizer::EntityNormalizer;
use super::rules::notary::extract_notary_info;
use super::rules::sections::{
    act_type_in, joined_bodies, natural_anchor_block, scan_sections, SectionKind,
};
use crate::models::{Act, ActSource, Entity};

/// Confidence stated for acts produced by this parser.
pub const LINEAR_CONFIDENCE: f32 = 0.4;

/// Extracts one act from labelled sections (`ACTO O CONTRATO`,
/// `OTORGADO POR`, `A FAVOR DE`, `NOTARIO`).
#[derive(Debug, Clone, Default)]
pub struct LinearTextParser {
    normalizer: EntityNormalizer,
}

impl LinearTextParser {
    pub fn new(normalizer: EntityNormalizer) -> Self {
        Self { normalizer }
    }

    /// Parse a single act. Never fails: empty input gives an act with
    /// empty fields, which callers must reject.
    pub fn parse(&self, text: &str) -> Act {
        let mut act = Act::new(ActSource::Linear);
        act.confidence = LINEAR_CONFIDENCE;

        let upper = text.to_uppercase();
        if upper.trim().is_empty() {
            return act;
        }

        let sections = scan_sections(&upper);
        act.act_type = act_type_in(&sections);

        let grantor_text = joined_bodies(&sections, SectionKind::Grantors);
        act.grantors = self.entities(&grantor_text);
        if act.grantors.is_empty() {
            if let Some(block) = natural_anchor_block(&upper, &sections) {
                debug!("No grantor label, anchoring on NATURAL");
                act.grantors = self.entities(block);
            }
        }

        let beneficiary_text = joined_bodies(&sections, SectionKind::Beneficiaries);
        act.beneficiaries = self.entities(&beneficiary_text);

        act.apply_notary(&extract_notary_info(text));

        debug!(
            "Linear parse: type='{}', {} grantor(s), {} beneficiary(ies)",
            act.act_type,
            act.grantors.len(),
            act.beneficiaries.len()
        );
        act
    }

    fn entities(&self, block: &str) -> Vec<Entity> {
        self.normalizer
            .extract_entities(block)
            .into_iter()
            .map(|e| e.with_source(ActSource::Linear.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_parse_labelled_extract() {
        let text = "ACTO O CONTRATO: PODER GENERAL\n\
                    OTORGADO POR: NATURAL JUAN CARLOS PEREZ GOMEZ POR SUS PROPIOS DERECHOS\n\
                    A FAVOR DE: NATURAL MARIA ELENA RODRIGUEZ LOPEZ POR SUS PROPIOS DERECHOS";
        let act = LinearTextParser::default().parse(text);

        assert_eq!(act.act_type, "PODER GENERAL");
        assert_eq!(names(&act.grantors), vec!["JUAN CARLOS PEREZ GOMEZ"]);
        assert_eq!(names(&act.beneficiaries), vec!["MARIA ELENA RODRIGUEZ LOPEZ"]);
        assert_eq!(act.source, ActSource::Linear);
        assert!(act.grantors[0].sources.contains("linear"));
        assert!(act.is_valid());
    }

    #[test]
    fn test_parse_lowercase_and_notary() {
        let text = "Notario(a): Dr. Pedro Andrade Mora\n\
                    Notaría Décima Octava del cantón Quito\n\
                    Acto o contrato: poder especial\n\
                    Otorgantes: natural Perez Gomez Juan por sus propios derechos";
        let act = LinearTextParser::default().parse(text);

        assert_eq!(act.act_type, "PODER ESPECIAL");
        assert_eq!(names(&act.grantors), vec!["JUAN PEREZ GOMEZ"]);
        assert_eq!(act.notary_name.as_deref(), Some("PEDRO ANDRADE MORA"));
        assert_eq!(act.notary_district_number.as_deref(), Some("18"));
    }

    #[test]
    fn test_parse_falls_back_to_natural_anchor() {
        let text = "ACTO O CONTRATO: PODER GENERAL\n\
                    OTORGADO: NATURAL PEREZ JUAN POR SUS PROPIOS DERECHOS\n\
                    A FAVOR DE: NATURAL LOPEZ ANA POR SUS PROPIOS DERECHOS";
        let act = LinearTextParser::default().parse(text);

        assert_eq!(names(&act.grantors), vec!["JUAN PEREZ"]);
        assert_eq!(names(&act.beneficiaries), vec!["ANA LOPEZ"]);
    }

    #[test]
    fn test_parse_empty() {
        let act = LinearTextParser::default().parse("");
        assert_eq!(act.act_type, "");
        assert!(act.grantors.is_empty());
        assert!(act.beneficiaries.is_empty());
        assert!(!act.is_valid());
    }
}
