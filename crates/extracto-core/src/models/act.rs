//! Notarial act data models.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One legal transaction described in a notarial extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Act {
    /// Cleaned, canonical act label (e.g. "PODER GENERAL").
    pub act_type: String,

    /// Persons or entities granting the act.
    pub grantors: Vec<Entity>,

    /// Persons or entities in whose favor the act is executed.
    pub beneficiaries: Vec<Entity>,

    /// Notary name as printed in the header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notary_name: Option<String>,

    /// Notary district in words (e.g. "DÉCIMA OCTAVA").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notary_district_label: Option<String>,

    /// Notary district number (e.g. "18").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notary_district_number: Option<String>,

    /// Whether the act was authorized by an alternate (suplente) notary.
    #[serde(default)]
    pub notary_is_alternate: bool,

    /// Strategy that produced this act.
    pub source: ActSource,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl Act {
    /// Create an empty act produced by the given strategy.
    pub fn new(source: ActSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// An act is valid when it has a type and at least one grantor.
    pub fn is_valid(&self) -> bool {
        !self.act_type.trim().is_empty() && !self.grantors.is_empty()
    }

    /// Copy notary header fields into the act.
    pub fn with_notary(mut self, notary: &NotaryInfo) -> Self {
        self.apply_notary(notary);
        self
    }

    /// Fill the notary fields that are still missing.
    pub fn apply_notary(&mut self, notary: &NotaryInfo) {
        if self.notary_name.is_none() {
            self.notary_name = notary.name.clone();
        }
        if self.notary_district_label.is_none() {
            self.notary_district_label = notary.district_label.clone();
        }
        if self.notary_district_number.is_none() {
            self.notary_district_number = notary.district_number.map(|n| n.to_string());
        }
        self.notary_is_alternate |= notary.is_alternate;
    }
}

/// Strategy or pipeline that produced an act.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActSource {
    /// Single-pass labelled-section parser.
    #[default]
    Linear,
    /// Multi-act segmenting parser.
    Segmented,
    /// Coordinate-based table parser.
    Spatial,
    /// Merge of the local pipeline with the external provider.
    Hybrid,
}

impl fmt::Display for ActSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActSource::Linear => "linear",
            ActSource::Segmented => "segmented",
            ActSource::Spatial => "spatial",
            ActSource::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Natural or juridical person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonType {
    #[default]
    #[serde(alias = "NATURAL", alias = "natural")]
    Natural,
    #[serde(alias = "JURIDICA", alias = "Jurídica", alias = "JURÍDICA", alias = "juridica")]
    Juridical,
}

impl PersonType {
    /// Parse the loose labels used by extract documents and providers.
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.trim().to_uppercase();
        if upper.contains("JURIDIC") || upper.contains("JURÍDIC") {
            Some(PersonType::Juridical)
        } else if upper.contains("NATURAL") {
            Some(PersonType::Natural)
        } else {
            None
        }
    }

    pub fn is_juridical(&self) -> bool {
        matches!(self, PersonType::Juridical)
    }
}

/// A natural or juridical person participating in an act.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Normalized uppercase name.
    pub name: String,

    /// Natural or juridical person.
    pub person_type: PersonType,

    /// Legal representatives (juridical entities only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub representatives: Vec<String>,

    /// Strategies or providers that contributed this entity.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub sources: BTreeSet<String>,

    /// Cédula (10 digits) or RUC (13 digits) when printed next to the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,

    /// Nationality when printed next to the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, person_type: PersonType) -> Self {
        Self {
            name: name.into(),
            person_type,
            ..Self::default()
        }
    }

    pub fn natural(name: impl Into<String>) -> Self {
        Self::new(name, PersonType::Natural)
    }

    pub fn juridical(name: impl Into<String>) -> Self {
        Self::new(name, PersonType::Juridical)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.insert(source.into());
        self
    }

    /// Names shorter than three characters or carrying digits are noise.
    pub fn has_valid_name(&self) -> bool {
        is_valid_name(&self.name)
    }
}

/// Check the entity name invariant: at least three characters, no digits.
pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 3 && !name.chars().any(|c| c.is_ascii_digit())
}

/// A name as it arrives at the API boundary: either a bare string or a
/// structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityInput {
    NameOnly(String),
    Structured {
        nombre: String,
        #[serde(default, alias = "tipo", alias = "tipoPersona")]
        tipo_persona: Option<String>,
        #[serde(default, alias = "representantes")]
        representante: Option<RepresentativeInput>,
    },
}

/// One representative or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepresentativeInput {
    One(String),
    Many(Vec<EntityInput>),
}

impl EntityInput {
    /// Raw name carried by the input.
    pub fn name(&self) -> &str {
        match self {
            EntityInput::NameOnly(name) => name,
            EntityInput::Structured { nombre, .. } => nombre,
        }
    }

    /// Declared person type, if any.
    pub fn declared_type(&self) -> Option<PersonType> {
        match self {
            EntityInput::NameOnly(_) => None,
            EntityInput::Structured { tipo_persona, .. } => {
                tipo_persona.as_deref().and_then(PersonType::from_label)
            }
        }
    }

    /// Declared representative names.
    pub fn representatives(&self) -> Vec<String> {
        match self {
            EntityInput::Structured {
                representante: Some(RepresentativeInput::One(name)),
                ..
            } => vec![name.clone()],
            EntityInput::Structured {
                representante: Some(RepresentativeInput::Many(list)),
                ..
            } => list.iter().map(|r| r.name().to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Notary identity parsed from the document header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotaryInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_number: Option<u32>,
    #[serde(default)]
    pub is_alternate: bool,
}

impl NotaryInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.district_label.is_none() && self.district_number.is_none()
    }
}

/// Coarse document layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Linear,
    Tabular,
}

/// Per-document classification, created fresh for every parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub layout: Layout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_type_guess: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_type_guess: Option<PersonType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notary_district_guess: Option<String>,
    /// Reference pattern whose applicable act types appear in the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    /// Advisory confidence, never used as a hard gate.
    pub confidence: f32,
}

/// Structural validation of the selected acts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub score: f32,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Result of parsing one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub acts: Vec<Act>,
    pub confidence: f32,
    /// Winning strategy name, or "none".
    pub source: String,
    pub validation: Validation,
    pub classification: ClassificationResult,
}

impl ParseOutcome {
    /// Outcome reported when no strategy produced a valid act.
    pub fn none(classification: ClassificationResult, issue: impl Into<String>) -> Self {
        Self {
            acts: Vec::new(),
            confidence: 0.0,
            source: "none".to_string(),
            validation: Validation {
                score: 0.0,
                issues: vec![issue.into()],
                warnings: Vec::new(),
            },
            classification,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.acts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_act_validity() {
        let mut act = Act::new(ActSource::Linear);
        assert!(!act.is_valid());

        act.act_type = "PODER GENERAL".to_string();
        assert!(!act.is_valid());

        act.grantors.push(Entity::natural("JUAN PEREZ"));
        assert!(act.is_valid());
    }

    #[test]
    fn test_name_invariant() {
        assert!(is_valid_name("ANA"));
        assert!(!is_valid_name("AB"));
        assert!(!is_valid_name("JUAN 1712345678"));
    }

    #[test]
    fn test_entity_input_untagged() {
        let json = r#"["PEREZ JUAN", {"nombre": "ACME S.A.", "tipo": "JURIDICA", "representantes": ["ANA LOPEZ"]}]"#;
        let inputs: Vec<EntityInput> = serde_json::from_str(json).unwrap();

        assert_eq!(inputs[0], EntityInput::NameOnly("PEREZ JUAN".to_string()));
        assert_eq!(inputs[1].name(), "ACME S.A.");
        assert_eq!(inputs[1].declared_type(), Some(PersonType::Juridical));
        assert_eq!(inputs[1].representatives(), vec!["ANA LOPEZ".to_string()]);
    }

    #[test]
    fn test_apply_notary_keeps_existing_fields() {
        let notary = NotaryInfo {
            name: Some("MARIA LOPEZ".to_string()),
            district_label: Some("DÉCIMA OCTAVA".to_string()),
            district_number: Some(18),
            is_alternate: true,
        };
        let mut act = Act::new(ActSource::Segmented);
        act.notary_name = Some("OTRO".to_string());
        act.apply_notary(&notary);

        assert_eq!(act.notary_name.as_deref(), Some("OTRO"));
        assert_eq!(act.notary_district_number.as_deref(), Some("18"));
        assert!(act.notary_is_alternate);
    }
}
