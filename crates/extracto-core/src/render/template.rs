//! Placeholder templates and the act phrase.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::grammar::{GrammarEngine, TemplateVariables};
use crate::error::{ExtractoError, Result};
use crate::models::{Act, ExtractoConfig};
use crate::notarial::rules::normalizer::EntityNormalizer;

/// Certified-copy ("concuerdo") template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "\
Se otorgó ante mí, y en fe de ello confiero esta **{{NUMERO_COPIA}} COPIA CERTIFICADA** \
de la escritura pública de {{FRASE_ACTO}}, la misma que se encuentra debidamente firmada \
y sellada en el mismo lugar y fecha de su celebración.

{{NOMBRE_NOTARIO}}
NOTARIA {{NOTARIA}}
";

/// Placeholder holding the act phrase in addition to the grammar variables.
pub const ACT_PHRASE_PLACEHOLDER: &str = "FRASE_ACTO";

/// Upper bound on numbered copies.
pub const MAX_COPIES: usize = 10;

const COPY_ORDINALS: [&str; MAX_COPIES] = [
    "PRIMERA", "SEGUNDA", "TERCERA", "CUARTA", "QUINTA", "SEXTA", "SÉPTIMA", "OCTAVA", "NOVENA",
    "DÉCIMA",
];

lazy_static! {
    static ref REVOCATION_PREFIX: Regex = Regex::new(r"(?i)^REVOCATORIA(?:\s+DE)?\s+(.+)$").unwrap();
    static ref REVOCATION: Regex = Regex::new(r"(?i)REVOCATORIA").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref SPACE_BEFORE_COMMA: Regex = Regex::new(r"\s+,").unwrap();
    static ref DOUBLE_COMMA: Regex = Regex::new(r",\s*,").unwrap();
    static ref SPACE_BEFORE_SEMICOLON: Regex = Regex::new(r"\s+;").unwrap();
}

/// Uppercase an act label for display; "REVOCATORIA X" reads
/// "REVOCATORIA DE X".
pub fn normalize_act_type_for_display(act_type: &str) -> String {
    let raw = act_type.trim();
    match REVOCATION_PREFIX.captures(raw).and_then(|c| c.get(1)) {
        Some(object) => format!("REVOCATORIA DE {}", object.as_str()).to_uppercase(),
        None => raw.to_uppercase(),
    }
}

fn clean_spaces(text: &str) -> String {
    let text = SPACES.replace_all(text, " ");
    let text = SPACE_BEFORE_COMMA.replace_all(&text, ",");
    let text = DOUBLE_COMMA.replace_all(&text, ", ");
    SPACE_BEFORE_SEMICOLON.replace_all(&text, ";").trim().to_string()
}

/// One-sentence description of the act, with names in bold.
///
/// Revocations read "**TYPE** otorgado por ..., a favor de ..."; every
/// other act reads "**TYPE** que otorga(n) ... a favor de ...".
pub fn build_act_phrase(vars: &TemplateVariables) -> String {
    let act_type = normalize_act_type_for_display(&vars.act_type);

    let beneficiary_part = if clean_spaces(&format!(
        "{} {} {}",
        vars.favor_contraction, vars.beneficiary_treatment, vars.beneficiary_names
    ))
    .is_empty()
    {
        String::new()
    } else {
        format!(
            " {} {} **{}**",
            vars.favor_contraction, vars.beneficiary_treatment, vars.beneficiary_names
        )
    };

    let phrase = if REVOCATION.is_match(&vars.act_type) {
        let comma = if vars.representation.trim().is_empty() { "," } else { "" };
        format!(
            "**{}** otorgado por {} **{}**{}{}{}",
            act_type, vars.grantor_treatment, vars.grantor_names, vars.representation, comma, beneficiary_part
        )
    } else {
        format!(
            "**{}** que {} {} **{}**{}{}",
            act_type,
            vars.grant_verb,
            vars.grantor_treatment,
            vars.grantor_names,
            vars.representation,
            beneficiary_part
        )
    };
    clean_spaces(&phrase)
}

/// Literal `{{NAME}}` substitution. Unknown placeholders are left in place.
pub fn apply_template<K, V>(template: &str, values: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    values.into_iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{{{}}}}}", name.as_ref()), value.as_ref())
    })
}

/// Uppercase ordinal naming the nth copy (1-based), clamped to 1..=10.
pub fn copy_ordinal(n: usize) -> &'static str {
    COPY_ORDINALS[n.clamp(1, MAX_COPIES) - 1]
}

/// Rendered document plus the variables that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub text: String,
    pub act_phrase: String,
    pub variables: TemplateVariables,
}

/// Renders acts into certified-copy text.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    grammar: GrammarEngine,
    template: String,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(GrammarEngine::default())
    }
}

impl TemplateEngine {
    /// Engine with the built-in template.
    pub fn new(grammar: GrammarEngine) -> Self {
        Self {
            grammar,
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Engine configured from the `render` and `lexicon` sections.
    pub fn from_config(config: &ExtractoConfig) -> Result<Self> {
        let grammar = GrammarEngine::new(EntityNormalizer::new(config.lexicon.clone()));
        let engine = Self::new(grammar);
        match &config.render.template_path {
            Some(path) => engine.with_template_file(path),
            None => Ok(engine),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_template_file(self, path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            ExtractoError::Config(format!("cannot read template {}: {}", path.display(), e))
        })?;
        debug!("Loaded template from {}", path.display());
        Ok(self.with_template(template))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn grammar(&self) -> &GrammarEngine {
        &self.grammar
    }

    /// Render the first copy of an act.
    pub fn render(&self, act: &Act) -> RenderedDocument {
        self.render_with(self.grammar.variables(act))
    }

    /// Render `n` numbered copies (clamped to 1..=10) of an act.
    pub fn render_copies(&self, act: &Act, n: usize) -> Vec<RenderedDocument> {
        let base = self.grammar.variables(act);
        (1..=n.clamp(1, MAX_COPIES))
            .map(|i| {
                let mut vars = base.clone();
                vars.copy_number = copy_ordinal(i).to_string();
                self.render_with(vars)
            })
            .collect()
    }

    fn render_with(&self, variables: TemplateVariables) -> RenderedDocument {
        let act_phrase = build_act_phrase(&variables);
        let values = variables
            .pairs()
            .into_iter()
            .chain([(ACT_PHRASE_PLACEHOLDER, act_phrase.as_str())]);
        let text = apply_template(&self.template, values);
        RenderedDocument {
            text,
            act_phrase,
            variables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActSource, Entity};
    use pretty_assertions::assert_eq;

    fn scenario_act() -> Act {
        let mut act = Act::new(ActSource::Linear);
        act.act_type = "PODER GENERAL".to_string();
        act.grantors = vec![Entity::natural("JUAN CARLOS PEREZ GOMEZ")];
        act.beneficiaries = vec![Entity::natural("MARIA ELENA RODRIGUEZ LOPEZ")];
        act.notary_name = Some("PEDRO ANDRADE MORA".to_string());
        act.notary_district_label = Some("DÉCIMA OCTAVA".to_string());
        act
    }

    #[test]
    fn test_normalize_act_type_for_display() {
        assert_eq!(normalize_act_type_for_display("REVOCATORIA PODER"), "REVOCATORIA DE PODER");
        assert_eq!(normalize_act_type_for_display("revocatoria de poder"), "REVOCATORIA DE PODER");
        assert_eq!(normalize_act_type_for_display(" poder general "), "PODER GENERAL");
    }

    #[test]
    fn test_build_act_phrase() {
        let engine = TemplateEngine::default();
        let vars = engine.grammar().variables(&scenario_act());
        assert_eq!(
            build_act_phrase(&vars),
            "**PODER GENERAL** que otorga el señor **JUAN CARLOS PEREZ GOMEZ** \
             a favor de la señora **MARIA ELENA RODRIGUEZ LOPEZ**"
        );
    }

    #[test]
    fn test_build_revocation_phrase_with_representative() {
        let mut company = Entity::juridical("COMERCIAL BOLIVAR S.A.");
        company.representatives = vec!["ANA LOPEZ".to_string()];
        let mut act = Act::new(ActSource::Segmented);
        act.act_type = "REVOCATORIA PODER".to_string();
        act.grantors = vec![company];
        act.beneficiaries = vec![Entity::natural("JUAN PEREZ GOMEZ")];

        let vars = TemplateEngine::default().grammar().variables(&act);
        assert_eq!(
            build_act_phrase(&vars),
            "**REVOCATORIA DE PODER** otorgado por la compañía **COMERCIAL BOLIVAR S.A.** \
             representada por la señora **ANA LOPEZ**, al señor **JUAN PEREZ GOMEZ**"
        );
    }

    #[test]
    fn test_build_revocation_phrase_without_beneficiary() {
        let mut act = Act::new(ActSource::Linear);
        act.act_type = "REVOCATORIA DE PODER".to_string();
        act.grantors = vec![Entity::natural("ANA LOPEZ")];

        let vars = TemplateEngine::default().grammar().variables(&act);
        assert_eq!(
            build_act_phrase(&vars),
            "**REVOCATORIA DE PODER** otorgado por la señora **ANA LOPEZ**,"
        );
    }

    #[test]
    fn test_apply_template() {
        let text = apply_template(
            "{{A}} y {{B}} y {{A}} {{C}}",
            [("A", "uno"), ("B", "dos")],
        );
        assert_eq!(text, "uno y dos y uno {{C}}");
    }

    #[test]
    fn test_render_default_template() {
        let doc = TemplateEngine::default().render(&scenario_act());
        assert!(doc.text.contains("**PRIMERA COPIA CERTIFICADA**"));
        assert!(doc.text.contains(&doc.act_phrase));
        assert!(doc.text.contains("PEDRO ANDRADE MORA\nNOTARIA DECIMA OCTAVA"));
        assert!(!doc.text.contains("{{"));
    }

    #[test]
    fn test_render_copies_clamped() {
        let engine = TemplateEngine::default().with_template("{{NUMERO_COPIA}}");
        let act = scenario_act();

        let texts = |n| -> Vec<String> {
            engine.render_copies(&act, n).into_iter().map(|d| d.text).collect()
        };
        assert_eq!(texts(2), vec!["PRIMERA", "SEGUNDA"]);
        assert_eq!(texts(0), vec!["PRIMERA"]);
        assert_eq!(texts(25).len(), 10);
        assert_eq!(texts(25)[9], "DÉCIMA");
    }

    #[test]
    fn test_template_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concuerdo.txt");
        std::fs::write(&path, "{{TIPO_ACTO}} / {{VERBO_OTORGAR}}").unwrap();

        let mut config = ExtractoConfig::default();
        config.render.template_path = Some(path);
        let engine = TemplateEngine::from_config(&config).unwrap();
        assert_eq!(engine.render(&scenario_act()).text, "PODER GENERAL / otorga");

        config.render.template_path = Some(dir.path().join("missing.txt"));
        assert!(TemplateEngine::from_config(&config).is_err());
    }
}
