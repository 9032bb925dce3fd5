//! Heuristic dictionaries used by the entity normalizer and the grammar engine.
//!
//! Every list is plain data so deployments can extend it from the
//! configuration file without touching code.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Word lists for name ordering, person classification and gender agreement.
///
/// Entries are uppercase without accents; callers fold tokens before lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Common feminine given names.
    pub feminine_given_names: BTreeSet<String>,

    /// Common masculine given names.
    pub masculine_given_names: BTreeSet<String>,

    /// Particles that stay attached to the following surname (DE, DEL, ...).
    pub surname_particles: BTreeSet<String>,

    /// Legal-form suffix tokens (S.A., LTDA, CIA, ...). A name carrying one is
    /// a company and is never reordered.
    pub company_suffixes: BTreeSet<String>,

    /// Words that mark an organisation (FUNDACION, BANCO, ...).
    pub company_keywords: BTreeSet<String>,

    /// Table headers and metadata words that never belong to a name
    /// (stored without accents).
    pub header_stoplist: BTreeSet<String>,

    /// Nationalities recognized next to a name.
    pub nationalities: BTreeSet<String>,

    /// Company-type words that take feminine articles (COMPAÑÍA, FUNDACIÓN, ...).
    pub feminine_company_markers: BTreeSet<String>,

    /// Company-type words that take masculine articles (BANCO, MUNICIPIO, ...).
    pub masculine_company_markers: BTreeSet<String>,
}

fn set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            feminine_given_names: set(&[
                "MARIA", "ANA", "ROSA", "ELENA", "FERNANDA", "LUISA", "VALERIA", "CAMILA",
                "GABRIELA", "SOFIA", "ISABEL", "PATRICIA", "VERONICA", "SUSAN", "MAGDALENA",
                "CARMEN", "TERESA", "BEATRIZ", "ELIZABETH", "ELIZABET", "NOELIA", "PAULA",
                "PAOLA", "MERCEDES", "PILAR", "GUADALUPE",
            ]),
            masculine_given_names: set(&[
                "JOSE", "JUAN", "CARLOS", "DANIEL", "MIGUEL", "DIEGO", "ANDRES", "LUIS",
                "PEDRO", "PABLO", "FRANCISCO", "JAVIER", "FERNANDO", "ROBERTO", "WILLIAM",
                "STALIN", "IGNACIO", "ENRIQUE", "EDUARDO", "ANTONIO", "RAFAEL", "RICARDO",
                "ALFREDO", "MARCO", "OSCAR", "GUSTAVO",
            ]),
            surname_particles: set(&[
                "DE", "DEL", "LA", "LAS", "LOS", "SAN", "SANTA", "VON", "VAN", "DA", "DI",
            ]),
            company_suffixes: set(&[
                "S.A.", "S.A", "SA", "LTDA", "LTDA.", "CIA", "CIA.", "C.A.", "CORP", "CORP.",
                "INC", "INC.", "S.A.S", "S.A.S.", "SAS", "EP", "E.P.",
            ]),
            company_keywords: set(&[
                "FUNDACION", "CORPORACION", "EMPRESA", "ASOCIACION", "COOPERATIVA",
                "UNIVERSIDAD", "MUNICIPIO", "GAD", "BANCO", "COMPANIA", "SOCIEDAD",
                "CONSORCIO", "INSTITUTO", "COMERCIAL", "INDUSTRIAL", "CONSTRUCTORA",
                "INMOBILIARIA", "GOBIERNO", "MINISTERIO",
            ]),
            header_stoplist: set(&[
                "NACIONALIDAD", "DOCUMENTO", "IDENTIDAD", "PROVINCIA", "CANTON", "PARROQUIA",
                "UBICACION", "PERSONA", "NATURAL", "JURIDICA", "NOMBRES", "APELLIDOS",
                "RAZON", "SOCIAL", "TIPO", "INTERVINIENTE", "CALIDAD", "REPRESENTA",
                "REPRESENTADO", "REPRESENTADA", "OTORGANTE", "OTORGANTES", "OTORGADO",
                "BENEFICIARIO", "BENEFICIARIOS", "FAVOR", "CEDULA", "RUC", "PASAPORTE",
                "ECUATORIANA", "ECUATORIANO", "MANDANTE", "MANDATARIO", "PROPIOS",
                "DERECHOS", "POR", "SUS", "FECHA", "CUANTIA", "DESCRIPCION", "ACTO",
                "CONTRATO", "NOTARIO", "NOTARIA", "ESCRITURA", "EXTRACTO", "OBJETO",
                "INDETERMINADA", "APLICA", "QUE", "LE", "DR", "DRA", "AB", "ABG", "ING",
                "LCDO", "LCDA", "SR", "SRA", "SENOR", "SENORA", "APODERADO", "APODERADA",
                "PODERDANTE", "COMPARECIENTE", "VENDEDOR", "COMPRADOR", "SUPLENTE",
            ]),
            nationalities: set(&[
                "ECUATORIANA", "ECUATORIANO", "COLOMBIANA", "COLOMBIANO", "PERUANA", "PERUANO",
                "VENEZOLANA", "VENEZOLANO", "ESTADOUNIDENSE", "ESPANOLA", "ESPANOL",
            ]),
            feminine_company_markers: set(&[
                "COMPANIA", "CIA", "SOCIEDAD", "FUNDACION", "CORPORACION",
                "EMPRESA", "ASOCIACION", "COOPERATIVA", "UNIVERSIDAD", "INSTITUCION",
                "CONSTRUCTORA", "INMOBILIARIA", "COMERCIALIZADORA", "DISTRIBUIDORA",
            ]),
            masculine_company_markers: set(&[
                "BANCO", "MUNICIPIO", "GOBIERNO", "MINISTERIO", "INSTITUTO", "CONSORCIO",
                "GRUPO", "COLEGIO", "CENTRO", "CLUB", "GAD",
            ]),
        }
    }
}

impl Lexicon {
    /// Whether a token is a known given name of either gender.
    pub fn is_given_name(&self, token: &str) -> bool {
        self.feminine_given_names.contains(token) || self.masculine_given_names.contains(token)
    }

    pub fn is_particle(&self, token: &str) -> bool {
        self.surname_particles.contains(token)
    }

    /// Whether a token is a legal-form suffix, ignoring trailing commas.
    pub fn is_company_suffix(&self, token: &str) -> bool {
        let token = token.trim_end_matches(',');
        self.company_suffixes.contains(token)
    }

    pub fn is_company_keyword(&self, token: &str) -> bool {
        self.company_keywords.contains(token)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.header_stoplist.contains(token)
    }

    pub fn is_nationality(&self, token: &str) -> bool {
        self.nationalities.contains(token)
    }

    /// Merge additional words into every list of this lexicon.
    pub fn extend(&mut self, other: &Lexicon) {
        self.feminine_given_names.extend(other.feminine_given_names.iter().cloned());
        self.masculine_given_names.extend(other.masculine_given_names.iter().cloned());
        self.surname_particles.extend(other.surname_particles.iter().cloned());
        self.company_suffixes.extend(other.company_suffixes.iter().cloned());
        self.company_keywords.extend(other.company_keywords.iter().cloned());
        self.header_stoplist.extend(other.header_stoplist.iter().cloned());
        self.nationalities.extend(other.nationalities.iter().cloned());
        self.feminine_company_markers.extend(other.feminine_company_markers.iter().cloned());
        self.masculine_company_markers.extend(other.masculine_company_markers.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dictionaries() {
        let lexicon = Lexicon::default();
        assert!(lexicon.is_given_name("MARIA"));
        assert!(lexicon.is_given_name("JUAN"));
        assert!(!lexicon.is_given_name("PEREZ"));
        assert!(lexicon.is_particle("DEL"));
        assert!(lexicon.is_company_suffix("S.A.,"));
        assert!(lexicon.is_nationality("ECUATORIANA"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let lexicon: Lexicon =
            serde_json::from_str(r#"{"nationalities": ["CHILENA"]}"#).unwrap();
        assert!(lexicon.is_nationality("CHILENA"));
        assert!(!lexicon.is_nationality("ECUATORIANA"));
        assert!(lexicon.is_given_name("ANA"));
    }

    #[test]
    fn test_extend() {
        let mut lexicon = Lexicon::default();
        let mut extra = Lexicon::default();
        extra.masculine_given_names.insert("XAVIER".to_string());
        lexicon.extend(&extra);
        assert!(lexicon.is_given_name("XAVIER"));
    }
}
