//! Spanish agreement for certified-copy prose.
//!
//! Verb number, determiners, collective nouns, the representation clause
//! and the beneficiary contraction are all derived from the parties of an
//! act. Gender comes from the given-name dictionaries for natural persons
//! and from company-type markers for juridical ones.

use serde::Serialize;

use crate::models::{Act, Entity, PersonType};
use crate::notarial::rules::normalizer::{collapse_whitespace, fold, EntityNormalizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Feminine,
    Masculine,
}

/// A party ready for rendering: display name plus agreement features.
#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub name: String,
    pub person_type: PersonType,
    pub gender: Gender,
    pub representatives: Vec<String>,
}

impl Party {
    fn is_natural(&self) -> bool {
        self.person_type == PersonType::Natural
    }
}

/// Values substituted into `{{NAME}}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateVariables {
    #[serde(rename = "NUMERO_COPIA")]
    pub copy_number: String,
    #[serde(rename = "TIPO_ACTO")]
    pub act_type: String,
    #[serde(rename = "VERBO_OTORGAR")]
    pub grant_verb: String,
    #[serde(rename = "TRATAMIENTO_OTORGANTES")]
    pub grantor_treatment: String,
    #[serde(rename = "NOMBRES_OTORGANTES")]
    pub grantor_names: String,
    #[serde(rename = "FRASE_REPRESENTACION")]
    pub representation: String,
    #[serde(rename = "CONTRACCION_A_FAVOR")]
    pub favor_contraction: String,
    #[serde(rename = "TRATAMIENTO_BENEFICIARIOS")]
    pub beneficiary_treatment: String,
    #[serde(rename = "NOMBRES_BENEFICIARIOS")]
    pub beneficiary_names: String,
    #[serde(rename = "NOMBRE_NOTARIO")]
    pub notary_name: String,
    #[serde(rename = "NOTARIA")]
    pub notary_office: String,
}

impl TemplateVariables {
    /// Placeholder name and value pairs, in template order.
    pub fn pairs(&self) -> [(&'static str, &str); 11] {
        [
            ("NUMERO_COPIA", &self.copy_number),
            ("TIPO_ACTO", &self.act_type),
            ("VERBO_OTORGAR", &self.grant_verb),
            ("TRATAMIENTO_OTORGANTES", &self.grantor_treatment),
            ("NOMBRES_OTORGANTES", &self.grantor_names),
            ("FRASE_REPRESENTACION", &self.representation),
            ("CONTRACCION_A_FAVOR", &self.favor_contraction),
            ("TRATAMIENTO_BENEFICIARIOS", &self.beneficiary_treatment),
            ("NOMBRES_BENEFICIARIOS", &self.beneficiary_names),
            ("NOMBRE_NOTARIO", &self.notary_name),
            ("NOTARIA", &self.notary_office),
        ]
    }
}

/// Join names as "A", "A y B" or "A, B y C".
pub fn human_join<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(AsRef::as_ref).filter(|s| !s.is_empty()).collect();
    match items.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} y {}", init.join(", "), last),
    }
}

fn article(gender: Gender) -> &'static str {
    match gender {
        Gender::Feminine => "la señora",
        Gender::Masculine => "el señor",
    }
}

/// Computes agreement variables for an act.
#[derive(Debug, Clone, Default)]
pub struct GrammarEngine {
    normalizer: EntityNormalizer,
}

impl GrammarEngine {
    pub fn new(normalizer: EntityNormalizer) -> Self {
        Self { normalizer }
    }

    /// Gender of a natural person from the given-name dictionaries.
    ///
    /// `name` is already in "GIVEN NAMES SURNAMES" order. A known masculine
    /// first name wins; otherwise any known feminine name, or a first name
    /// ending in "A", makes the person feminine.
    pub fn natural_gender(&self, name: &str) -> Gender {
        let folded = fold(name);
        let tokens: Vec<&str> = folded.split_whitespace().collect();
        let lexicon = self.normalizer.lexicon();

        let Some(first) = tokens.first() else {
            return Gender::Masculine;
        };
        if lexicon.masculine_given_names.contains(*first) {
            return Gender::Masculine;
        }
        if tokens.iter().any(|t| lexicon.feminine_given_names.contains(*t)) || first.ends_with('A') {
            Gender::Feminine
        } else {
            Gender::Masculine
        }
    }

    /// Gender of a company from its type markers; feminine when unmarked.
    pub fn company_gender(&self, name: &str) -> Gender {
        let folded = fold(name);
        let tokens: Vec<&str> = folded
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | '(' | ')')))
            .collect();
        let lexicon = self.normalizer.lexicon();

        if tokens.iter().any(|t| lexicon.feminine_company_markers.contains(*t)) {
            Gender::Feminine
        } else if tokens.iter().any(|t| lexicon.masculine_company_markers.contains(*t)) {
            Gender::Masculine
        } else {
            Gender::Feminine
        }
    }

    /// Display name and agreement features of an entity.
    pub fn party(&self, entity: &Entity) -> Party {
        let (name, gender) = match entity.person_type {
            PersonType::Juridical => {
                let name = collapse_whitespace(&entity.name.to_uppercase());
                let gender = self.company_gender(&name);
                (name, gender)
            }
            PersonType::Natural => (
                collapse_whitespace(&entity.name.to_uppercase()),
                self.natural_gender(&entity.name),
            ),
        };
        Party {
            name,
            person_type: entity.person_type,
            gender,
            representatives: entity.representatives.clone(),
        }
    }

    pub fn grant_verb(grantors: &[Party]) -> &'static str {
        if grantors.len() == 1 { "otorga" } else { "otorgan" }
    }

    /// Determiner plus noun for a group ("el señor", "las compañías", ...).
    ///
    /// Any masculine natural person makes a natural group "los señores";
    /// mixed company and person groups also read "los señores".
    pub fn treatment(parties: &[Party]) -> &'static str {
        match parties {
            [] => "",
            [one] => match (one.person_type, one.gender) {
                (PersonType::Natural, gender) => article(gender),
                (PersonType::Juridical, Gender::Feminine) => "la compañía",
                (PersonType::Juridical, Gender::Masculine) => "el",
            },
            many if many.iter().all(|p| !p.is_natural()) => "las compañías",
            many if many.iter().all(Party::is_natural) => {
                if many.iter().any(|p| p.gender == Gender::Masculine) {
                    "los señores"
                } else {
                    "las señoras"
                }
            }
            _ => "los señores",
        }
    }

    /// Group noun without article, used after a contraction.
    pub fn group_noun(parties: &[Party]) -> &'static str {
        match parties {
            [] => "",
            [one] => match (one.person_type, one.gender) {
                (PersonType::Natural, Gender::Feminine) => "señora",
                (PersonType::Natural, Gender::Masculine) => "señor",
                (PersonType::Juridical, Gender::Feminine) => "compañía",
                (PersonType::Juridical, Gender::Masculine) => "ente",
            },
            many if many.iter().all(|p| !p.is_natural()) => "compañías",
            many if many.iter().all(Party::is_natural) => {
                if many.iter().any(|p| p.gender == Gender::Masculine) {
                    "señores"
                } else {
                    "señoras"
                }
            }
            _ => "señores",
        }
    }

    pub fn join_names(parties: &[Party]) -> String {
        let names: Vec<&str> = parties.iter().map(|p| p.name.as_str()).collect();
        human_join(&names)
    }

    /// " representada por la señora **X**," when a juridical grantor has
    /// representatives, empty otherwise.
    pub fn representation_clause(&self, grantors: &[Party]) -> String {
        let companies: Vec<&Party> = grantors.iter().filter(|p| !p.is_natural()).collect();
        let representatives: Vec<&String> = companies.iter().flat_map(|c| &c.representatives).collect();
        if representatives.is_empty() {
            return String::new();
        }

        let any_masculine = companies.iter().any(|c| c.gender == Gender::Masculine);
        let participle = match (companies.len() > 1, any_masculine) {
            (false, false) => "representada",
            (false, true) => "representado",
            (true, false) => "representadas",
            (true, true) => "representados",
        };

        let named: Vec<String> = representatives
            .iter()
            .map(|r| format!("{} **{}**", article(self.natural_gender(r)), collapse_whitespace(&r.to_uppercase())))
            .collect();

        let mut clause = format!(" {} por {}", participle, human_join(&named));
        if named.len() > 1 && named.len() == companies.len() {
            clause.push_str(" respectivamente");
        }
        clause.push(',');
        clause
    }

    /// Contraction opening the beneficiary clause.
    ///
    /// With a representation clause the sentence reads "... a la señora";
    /// without one it reads "... a favor de la señora".
    pub fn favor_contraction(beneficiaries: &[Party], has_representation: bool) -> &'static str {
        let masculine = match beneficiaries {
            [] => return "",
            [one] => one.gender == Gender::Masculine,
            many => many.iter().any(|p| p.gender == Gender::Masculine),
        };
        match (has_representation, beneficiaries.len() > 1, masculine) {
            (true, false, false) => "a la",
            (true, false, true) => "al",
            (true, true, false) => "a las",
            (true, true, true) => "a los",
            (false, false, false) => "a favor de la",
            (false, false, true) => "a favor del",
            (false, true, false) => "a favor de las",
            (false, true, true) => "a favor de los",
        }
    }

    /// Compute every template variable for an act, copy number "PRIMERA".
    pub fn variables(&self, act: &Act) -> TemplateVariables {
        let grantors: Vec<Party> = act.grantors.iter().map(|e| self.party(e)).collect();
        let beneficiaries: Vec<Party> = act.beneficiaries.iter().map(|e| self.party(e)).collect();

        let representation = self.representation_clause(&grantors);
        let has_representation = !representation.trim().is_empty();

        TemplateVariables {
            copy_number: "PRIMERA".to_string(),
            act_type: crate::notarial::rules::normalizer::clean_act_type(&act.act_type),
            grant_verb: Self::grant_verb(&grantors).to_string(),
            grantor_treatment: Self::treatment(&grantors).to_string(),
            grantor_names: Self::join_names(&grantors),
            favor_contraction: Self::favor_contraction(&beneficiaries, has_representation).to_string(),
            representation,
            beneficiary_treatment: Self::group_noun(&beneficiaries).to_string(),
            beneficiary_names: Self::join_names(&beneficiaries),
            notary_name: notary_display_name(act),
            notary_office: notary_office(act),
        }
    }
}

fn notary_display_name(act: &Act) -> String {
    let base = act.notary_name.as_deref().unwrap_or("").trim();
    if act.notary_is_alternate {
        format!("NOTARIO(A) SUPLENTE {}", base).trim().to_uppercase()
    } else {
        base.to_uppercase()
    }
}

/// District label without accents, or the bare number when no label is known.
fn notary_office(act: &Act) -> String {
    act.notary_district_label
        .as_deref()
        .or(act.notary_district_number.as_deref())
        .map(|raw| fold(raw.trim()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActSource;
    use pretty_assertions::assert_eq;

    fn engine() -> GrammarEngine {
        GrammarEngine::default()
    }

    fn parties(entities: &[Entity]) -> Vec<Party> {
        let engine = engine();
        entities.iter().map(|e| engine.party(e)).collect()
    }

    fn company(name: &str, reps: &[&str]) -> Entity {
        let mut entity = Entity::juridical(name);
        entity.representatives = reps.iter().map(|r| r.to_string()).collect();
        entity
    }

    #[test]
    fn test_human_join() {
        assert_eq!(human_join::<&str>(&[]), "");
        assert_eq!(human_join(&["A"]), "A");
        assert_eq!(human_join(&["A", "B"]), "A y B");
        assert_eq!(human_join(&["A", "B", "C"]), "A, B y C");
    }

    #[test]
    fn test_natural_gender() {
        let engine = engine();
        assert_eq!(engine.natural_gender("JUAN CARLOS PEREZ GOMEZ"), Gender::Masculine);
        assert_eq!(engine.natural_gender("RODRIGUEZ LOPEZ MARIA ELENA"), Gender::Feminine);
        assert_eq!(engine.natural_gender("JOSE MARIA ALVAREZ"), Gender::Masculine);
        assert_eq!(engine.natural_gender("ximena torres"), Gender::Feminine);
        assert_eq!(engine.natural_gender("TORRES VEGA"), Gender::Masculine);
    }

    #[test]
    fn test_company_gender() {
        let engine = engine();
        assert_eq!(engine.company_gender("BANCO DEL PACIFICO S.A."), Gender::Masculine);
        assert_eq!(engine.company_gender("CONSTRUCTORA ANDINA CIA. LTDA."), Gender::Feminine);
        assert_eq!(engine.company_gender("COMERCIAL BOLIVAR S.A."), Gender::Feminine);
        assert_eq!(engine.company_gender("Compañía Minera del Sur"), Gender::Feminine);
    }

    #[test]
    fn test_treatment_and_nouns() {
        let man = parties(&[Entity::natural("JUAN PEREZ")]);
        let woman = parties(&[Entity::natural("ANA LOPEZ")]);
        let couple = parties(&[Entity::natural("ANA LOPEZ"), Entity::natural("JUAN PEREZ")]);
        let women = parties(&[Entity::natural("ANA LOPEZ"), Entity::natural("ROSA MORA")]);
        let bank = parties(&[Entity::juridical("BANCO DEL PACIFICO S.A.")]);
        let mixed = parties(&[Entity::juridical("COMERCIAL BOLIVAR S.A."), Entity::natural("ANA LOPEZ")]);

        assert_eq!(GrammarEngine::treatment(&man), "el señor");
        assert_eq!(GrammarEngine::treatment(&woman), "la señora");
        assert_eq!(GrammarEngine::treatment(&couple), "los señores");
        assert_eq!(GrammarEngine::treatment(&women), "las señoras");
        assert_eq!(GrammarEngine::treatment(&bank), "el");
        assert_eq!(GrammarEngine::treatment(&mixed), "los señores");
        assert_eq!(GrammarEngine::group_noun(&bank), "ente");
        assert_eq!(GrammarEngine::group_noun(&women), "señoras");
        assert_eq!(GrammarEngine::grant_verb(&man), "otorga");
        assert_eq!(GrammarEngine::grant_verb(&couple), "otorgan");
    }

    #[test]
    fn test_representation_clause() {
        let engine = engine();
        let single = parties(&[company("COMERCIAL BOLIVAR S.A.", &["ANA LOPEZ"])]);
        assert_eq!(
            engine.representation_clause(&single),
            " representada por la señora **ANA LOPEZ**,"
        );

        let pair = parties(&[
            company("BANCO DEL PACIFICO S.A.", &["JUAN PEREZ"]),
            company("CONSTRUCTORA ANDINA CIA. LTDA.", &["MARIA LOPEZ"]),
        ]);
        assert_eq!(
            engine.representation_clause(&pair),
            " representados por el señor **JUAN PEREZ** y la señora **MARIA LOPEZ** respectivamente,"
        );

        let without = parties(&[Entity::juridical("COMERCIAL BOLIVAR S.A."), Entity::natural("JUAN PEREZ")]);
        assert_eq!(engine.representation_clause(&without), "");
    }

    #[test]
    fn test_favor_contraction() {
        let woman = parties(&[Entity::natural("ANA LOPEZ")]);
        let man = parties(&[Entity::natural("JUAN PEREZ")]);
        let couple = parties(&[Entity::natural("ANA LOPEZ"), Entity::natural("JUAN PEREZ")]);

        assert_eq!(GrammarEngine::favor_contraction(&woman, false), "a favor de la");
        assert_eq!(GrammarEngine::favor_contraction(&man, false), "a favor del");
        assert_eq!(GrammarEngine::favor_contraction(&couple, false), "a favor de los");
        assert_eq!(GrammarEngine::favor_contraction(&woman, true), "a la");
        assert_eq!(GrammarEngine::favor_contraction(&man, true), "al");
        assert_eq!(GrammarEngine::favor_contraction(&[], true), "");
    }

    #[test]
    fn test_variables() {
        let mut act = Act::new(ActSource::Linear);
        act.act_type = "poder general".to_string();
        act.grantors = vec![Entity::natural("JUAN CARLOS PEREZ GOMEZ")];
        act.beneficiaries = vec![Entity::natural("MARIA ELENA RODRIGUEZ LOPEZ")];
        act.notary_name = Some("María Fernanda López García".to_string());
        act.notary_district_label = Some("DÉCIMA OCTAVA".to_string());
        act.notary_is_alternate = true;

        let vars = engine().variables(&act);
        assert_eq!(vars.copy_number, "PRIMERA");
        assert_eq!(vars.act_type, "PODER GENERAL");
        assert_eq!(vars.grant_verb, "otorga");
        assert_eq!(vars.grantor_treatment, "el señor");
        assert_eq!(vars.grantor_names, "JUAN CARLOS PEREZ GOMEZ");
        assert_eq!(vars.representation, "");
        assert_eq!(vars.favor_contraction, "a favor de la");
        assert_eq!(vars.beneficiary_treatment, "señora");
        assert_eq!(vars.notary_name, "NOTARIO(A) SUPLENTE MARÍA FERNANDA LÓPEZ GARCÍA");
        assert_eq!(vars.notary_office, "DECIMA OCTAVA");

        let json = serde_json::to_value(&vars).unwrap();
        assert_eq!(json["CONTRACCION_A_FAVOR"], "a favor de la");
    }

    #[test]
    fn test_variables_keep_parsed_name_order() {
        use crate::models::{ExtractoConfig, ReferencePatterns};
        use crate::notarial::ClassificationOrchestrator;

        let orchestrator = ClassificationOrchestrator::new(ExtractoConfig::default(), ReferencePatterns::empty());
        let outcome = orchestrator.parse_document(
            "ACTO O CONTRATO: PODER GENERAL\n\
             OTORGADO POR: NATURAL TORRES VEGA XIMENA POR SUS PROPIOS DERECHOS\n\
             A FAVOR DE: NATURAL MARIA ELENA RODRIGUEZ LOPEZ POR SUS PROPIOS DERECHOS",
            None,
        );
        let act = &outcome.acts[0];
        assert_eq!(act.grantors[0].name, "XIMENA TORRES VEGA");

        let vars = engine().variables(act);
        assert_eq!(vars.grantor_names, "XIMENA TORRES VEGA");
        assert_eq!(vars.grantor_treatment, "la señora");
        assert_eq!(vars.beneficiary_names, "MARIA ELENA RODRIGUEZ LOPEZ");
    }
}
