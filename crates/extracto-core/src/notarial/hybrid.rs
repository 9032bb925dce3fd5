//! Hybrid extraction: the local pipeline cross-checked against an external
//! provider.
//!
//! Both sides run concurrently and neither can cancel the other. A side that
//! fails is recorded as [`SideOutcome::Failed`] and the merge proceeds with
//! whatever the other side produced.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::orchestrator::ClassificationOrchestrator;
use super::provider::{ExtractionProvider, ProviderAct, ProviderDocument, ProviderResponse};
use super::rules::normalizer::{clean_act_type, fold};
use crate::layout::PositionedToken;
use crate::models::{Act, ActSource, Entity, EntityInput, HybridConfig, ParseOutcome, PersonType};

/// Source tag for entities coming from the local pipeline.
pub const LOCAL_SOURCE: &str = "local";
/// Source tag for entities coming from the external provider.
pub const EXTERNAL_SOURCE: &str = "external";

const BASE_CONFIDENCE: f32 = 0.5;
const CONFIRMED_GRANTOR_BONUS: f32 = 0.2;
const CONFIRMED_BENEFICIARY_BONUS: f32 = 0.15;
const MAX_CONFIDENCE: f32 = 0.95;

/// Result of one side of the hybrid run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SideOutcome<T> {
    Ok(T),
    Failed(String),
}

impl<T> SideOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, SideOutcome::Ok(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SideOutcome::Ok(value) => Some(value),
            SideOutcome::Failed(_) => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for SideOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => SideOutcome::Ok(value),
            Err(e) => SideOutcome::Failed(e.to_string()),
        }
    }
}

/// One merged act with the agreement counts behind its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedAct {
    pub act: Act,
    pub confidence: f32,
    pub confirmed_grantors: usize,
    pub confirmed_beneficiaries: usize,
}

/// Final hybrid result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct HybridOutcome {
    /// Zero or one merged act.
    pub acts: Vec<Act>,
    pub confidence: f32,
    pub confirmed_grantors: usize,
    pub confirmed_beneficiaries: usize,
    pub local: SideOutcome<ParseOutcome>,
    pub external: SideOutcome<ProviderResponse>,
}

/// A group of entities judged to name the same party.
#[derive(Debug, Clone)]
pub struct EntityBucket {
    /// Merged view: first member's name, unioned sources and representatives.
    pub entity: Entity,
    members: Vec<Entity>,
}

impl EntityBucket {
    fn new(entity: Entity) -> Self {
        Self {
            entity: entity.clone(),
            members: vec![entity],
        }
    }

    /// Single-linkage similarity: the best match against any member.
    fn similarity(&self, entity: &Entity) -> f32 {
        self.members
            .iter()
            .map(|m| jaccard(&m.name, &entity.name))
            .fold(0.0, f32::max)
    }

    fn absorb(&mut self, entity: Entity) {
        let merged = &mut self.entity;
        if entity.person_type.is_juridical() {
            merged.person_type = PersonType::Juridical;
        }
        merged.sources.extend(entity.sources.iter().cloned());
        for rep in &entity.representatives {
            if !merged.representatives.contains(rep) {
                merged.representatives.push(rep.clone());
            }
        }
        if merged.document_number.is_none() {
            merged.document_number = entity.document_number.clone();
        }
        if merged.nationality.is_none() {
            merged.nationality = entity.nationality.clone();
        }
        self.members.push(entity);
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    fn members_from<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.members.iter().filter(move |m| m.sources.contains(tag))
    }

    /// Whether a local member and an external member agree at `threshold`.
    pub fn is_confirmed(&self, threshold: f32) -> bool {
        self.members_from(LOCAL_SOURCE).any(|local| {
            self.members_from(EXTERNAL_SOURCE)
                .any(|external| jaccard(&local.name, &external.name) >= threshold)
        })
    }
}

/// Token-set Jaccard similarity of two names, accent- and case-insensitive.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let (a, b) = (fold(a), fold(b));
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f32 / union as f32
}

/// Greedily fold entities into buckets, in input order.
pub fn bucket_entities(entities: impl IntoIterator<Item = Entity>, threshold: f32) -> Vec<EntityBucket> {
    let mut buckets: Vec<EntityBucket> = Vec::new();
    for entity in entities {
        match buckets.iter_mut().find(|b| b.similarity(&entity) >= threshold) {
            Some(bucket) => bucket.absorb(entity),
            None => buckets.push(EntityBucket::new(entity)),
        }
    }
    buckets
}

/// Deduplicate entities by name similarity, one entity per bucket.
pub fn dedupe_entities(entities: impl IntoIterator<Item = Entity>, threshold: f32) -> Vec<Entity> {
    bucket_entities(entities, threshold)
        .into_iter()
        .map(|b| b.entity)
        .collect()
}

/// Runs the local orchestrator and an external provider side by side.
pub struct HybridAggregator<P> {
    orchestrator: Arc<ClassificationOrchestrator>,
    provider: P,
    config: HybridConfig,
}

impl<P: ExtractionProvider> HybridAggregator<P> {
    /// Thresholds are taken from the orchestrator's configuration.
    pub fn new(orchestrator: Arc<ClassificationOrchestrator>, provider: P) -> Self {
        let config = orchestrator.config().hybrid.clone();
        Self {
            orchestrator,
            provider,
            config,
        }
    }

    pub fn with_config(mut self, config: HybridConfig) -> Self {
        self.config = config;
        self
    }

    /// Run both pipelines and merge their first acts.
    pub async fn process(
        &self,
        text: String,
        tokens: Option<Vec<PositionedToken>>,
        document: &ProviderDocument,
    ) -> HybridOutcome {
        let orchestrator = Arc::clone(&self.orchestrator);
        let local = async move {
            tokio::task::spawn_blocking(move || orchestrator.parse_document(&text, tokens.as_deref())).await
        };
        let external = self.provider.extract(document);

        let (local, external) = tokio::join!(local, external);
        let local: SideOutcome<ParseOutcome> = local.into();
        let external: SideOutcome<ProviderResponse> = external.into();

        if let SideOutcome::Failed(reason) = &local {
            warn!("Local pipeline failed: {}", reason);
        }
        if let SideOutcome::Failed(reason) = &external {
            warn!("External provider failed: {}", reason);
        }

        let merged = self.merge(
            local.value().and_then(|o| o.acts.first()),
            external.value().and_then(|r| r.actos.first()),
        );

        let (acts, confidence, confirmed_grantors, confirmed_beneficiaries) = match merged {
            Some(m) => {
                info!(
                    "Hybrid merge: '{}' with {} grantor(s), {} confirmed, confidence {:.2}",
                    m.act.act_type,
                    m.act.grantors.len(),
                    m.confirmed_grantors,
                    m.confidence
                );
                (vec![m.act], m.confidence, m.confirmed_grantors, m.confirmed_beneficiaries)
            }
            None => {
                info!("Hybrid merge produced no act");
                (Vec::new(), 0.0, 0, 0)
            }
        };

        HybridOutcome {
            acts,
            confidence,
            confirmed_grantors,
            confirmed_beneficiaries,
            local,
            external,
        }
    }

    /// Merge one local act and one provider act into a hybrid act.
    ///
    /// Returns `None` when the merged act would have no type or no grantor.
    pub fn merge(&self, local: Option<&Act>, external: Option<&ProviderAct>) -> Option<MergedAct> {
        let act_type = external
            .map(|a| clean_act_type(&a.tipo_acto))
            .filter(|t| !t.is_empty())
            .or_else(|| local.map(|a| a.act_type.clone()).filter(|t| !t.is_empty()))?;

        let threshold = self.config.similarity_threshold;
        let grantors = bucket_entities(
            self.tagged(
                local.map_or(&[][..], |a| a.grantors.as_slice()),
                external.map_or(&[][..], |a| a.otorgantes.as_slice()),
            ),
            threshold,
        );
        let beneficiaries = bucket_entities(
            self.tagged(
                local.map_or(&[][..], |a| a.beneficiaries.as_slice()),
                external.map_or(&[][..], |a| a.beneficiarios.as_slice()),
            ),
            threshold,
        );

        let confirm = self.config.confirmation_threshold;
        let confirmed_grantors = grantors.iter().filter(|b| b.is_confirmed(confirm)).count();
        let confirmed_beneficiaries = beneficiaries.iter().filter(|b| b.is_confirmed(confirm)).count();
        let confidence = (BASE_CONFIDENCE
            + CONFIRMED_GRANTOR_BONUS * confirmed_grantors as f32
            + CONFIRMED_BENEFICIARY_BONUS * confirmed_beneficiaries as f32)
            .min(MAX_CONFIDENCE);

        let mut act = Act::new(ActSource::Hybrid);
        act.act_type = act_type;
        act.grantors = grantors.into_iter().map(|b| b.entity).collect();
        act.beneficiaries = beneficiaries.into_iter().map(|b| b.entity).collect();
        act.confidence = confidence;
        if let Some(local) = local {
            act.notary_name = local.notary_name.clone();
            act.notary_district_label = local.notary_district_label.clone();
            act.notary_district_number = local.notary_district_number.clone();
            act.notary_is_alternate = local.notary_is_alternate;
        }

        act.is_valid().then_some(MergedAct {
            act,
            confidence,
            confirmed_grantors,
            confirmed_beneficiaries,
        })
    }

    /// Tag both sides' entities with their side, local first.
    ///
    /// Local entities come out of the parsers already normalized and keep
    /// their names; provider entities are resolved here.
    fn tagged(&self, local: &[Entity], external: &[EntityInput]) -> Vec<Entity> {
        let normalizer = self.orchestrator.normalizer();

        let local = local.iter().map(|e| Entity {
            sources: BTreeSet::from([LOCAL_SOURCE.to_string()]),
            ..e.clone()
        });
        let external = external
            .iter()
            .filter_map(|input| normalizer.resolve_input(input))
            .map(|e| e.with_source(EXTERNAL_SOURCE));

        local.chain(external).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use pretty_assertions::assert_eq;

    struct StaticProvider(ProviderResponse);

    impl ExtractionProvider for StaticProvider {
        async fn extract(&self, _document: &ProviderDocument) -> Result<ProviderResponse, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    impl ExtractionProvider for FailingProvider {
        async fn extract(&self, _document: &ProviderDocument) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Timeout)
        }
    }

    const SCENARIO: &str = "ACTO O CONTRATO: PODER GENERAL\n\
        OTORGADO POR: NATURAL JUAN CARLOS PEREZ GOMEZ POR SUS PROPIOS DERECHOS\n\
        A FAVOR DE: NATURAL MARIA ELENA RODRIGUEZ LOPEZ POR SUS PROPIOS DERECHOS";

    fn aggregator<P: ExtractionProvider>(provider: P) -> HybridAggregator<P> {
        HybridAggregator::new(Arc::new(ClassificationOrchestrator::default()), provider)
    }

    fn structured(name: &str, kind: &str) -> EntityInput {
        serde_json::from_value(serde_json::json!({ "nombre": name, "tipo": kind })).unwrap()
    }

    fn sources(entity: &Entity) -> Vec<&str> {
        entity.sources.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard("JUAN PEREZ", "JUAN PEREZ"), 1.0);
        assert_eq!(jaccard("JUAN PEREZ", "PEREZ JUAN"), 1.0);
        assert_eq!(jaccard("PATIÑO JUAN", "patino juan"), 1.0);
        assert!((jaccard("JUAN PEREZ", "JUAN GOMEZ") - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(jaccard("", ""), 0.0);
    }

    #[test]
    fn test_merge_same_grantor_from_both_sides() {
        let aggregator = aggregator(FailingProvider);
        let mut local = Act::new(ActSource::Segmented);
        local.act_type = "PODER GENERAL".to_string();
        local.grantors = vec![Entity::natural("JAVIER GUSTAVO PATIÑO CHUNI")];
        let external = ProviderAct {
            tipo_acto: "PODER GENERAL".to_string(),
            otorgantes: vec![structured("PATIÑO CHUNI JAVIER GUSTAVO", "NATURAL")],
            beneficiarios: Vec::new(),
        };

        let merged = aggregator.merge(Some(&local), Some(&external)).unwrap();

        assert_eq!(merged.act.grantors.len(), 1);
        assert_eq!(sources(&merged.act.grantors[0]), vec!["external", "local"]);
        assert_eq!(merged.confirmed_grantors, 1);
        assert!(merged.confidence > 0.5);
        assert_eq!(merged.act.source, ActSource::Hybrid);
    }

    #[test]
    fn test_merge_keeps_parsed_name_order() {
        let aggregator = aggregator(FailingProvider);
        let outcome = aggregator.orchestrator.parse_document(
            "ACTO O CONTRATO: PODER GENERAL\n\
             OTORGADO POR: NATURAL TORRES VEGA XIMENA POR SUS PROPIOS DERECHOS\n\
             A FAVOR DE: NATURAL VEGA XIMENA POR SUS PROPIOS DERECHOS",
            None,
        );
        let local = &outcome.acts[0];
        let grantor = local.grantors[0].name.clone();
        let beneficiary = local.beneficiaries[0].name.clone();

        let merged = aggregator.merge(Some(local), None).unwrap();
        assert_eq!(merged.act.grantors[0].name, grantor);
        assert_eq!(merged.act.beneficiaries[0].name, beneficiary);

        let external = ProviderAct {
            tipo_acto: "PODER GENERAL".to_string(),
            otorgantes: vec![structured("TORRES VEGA XIMENA", "NATURAL")],
            beneficiarios: Vec::new(),
        };
        let merged = aggregator.merge(Some(local), Some(&external)).unwrap();
        assert_eq!(merged.act.grantors.len(), 1);
        assert_eq!(merged.act.grantors[0].name, "XIMENA TORRES VEGA");
        assert_eq!(merged.confirmed_grantors, 1);
    }

    #[test]
    fn test_merge_prefers_external_act_type() {
        let aggregator = aggregator(FailingProvider);
        let mut local = Act::new(ActSource::Linear);
        local.act_type = "PODER".to_string();
        local.grantors = vec![Entity::natural("JUAN PEREZ GOMEZ")];
        local.notary_name = Some("PEDRO ANDRADE MORA".to_string());
        let external = ProviderAct {
            tipo_acto: "poder especial".to_string(),
            ..ProviderAct::default()
        };

        let merged = aggregator.merge(Some(&local), Some(&external)).unwrap();
        assert_eq!(merged.act.act_type, "PODER ESPECIAL");
        assert_eq!(merged.act.notary_name.as_deref(), Some("PEDRO ANDRADE MORA"));
        assert_eq!(merged.confirmed_grantors, 0);
        assert_eq!(merged.confidence, 0.5);
    }

    #[test]
    fn test_merge_without_grantors_is_rejected() {
        let aggregator = aggregator(FailingProvider);
        let external = ProviderAct {
            tipo_acto: "PODER GENERAL".to_string(),
            ..ProviderAct::default()
        };
        assert!(aggregator.merge(None, Some(&external)).is_none());
        assert!(aggregator.merge(None, None).is_none());
    }

    #[test]
    fn test_dedupe_covered_list_adds_no_bucket() {
        let a = vec![
            Entity::natural("JUAN CARLOS PEREZ GOMEZ").with_source(LOCAL_SOURCE),
            Entity::natural("COMERCIAL BOLIVAR S.A.").with_source(LOCAL_SOURCE),
            Entity::natural("MARIA ELENA RODRIGUEZ LOPEZ").with_source(LOCAL_SOURCE),
        ];
        let b = vec![
            Entity::natural("JUAN PEREZ GOMEZ").with_source(EXTERNAL_SOURCE),
            Entity::juridical("COMERCIAL BOLIVAR S.A. ECUADOR").with_source(EXTERNAL_SOURCE),
        ];

        let alone = dedupe_entities(a.clone(), 0.6);
        let combined = dedupe_entities(a.into_iter().chain(b), 0.6);

        assert_eq!(alone.len(), 3);
        assert_eq!(combined.len(), alone.len());
        assert_eq!(combined[0].name, "JUAN CARLOS PEREZ GOMEZ");
        assert_eq!(sources(&combined[0]), vec!["external", "local"]);
        // Juridical wins even when the first member said natural.
        assert_eq!(combined[1].person_type, PersonType::Juridical);
        assert_eq!(sources(&combined[2]), vec!["local"]);
    }

    #[test]
    fn test_confirmation_needs_both_sides() {
        let buckets = bucket_entities(
            vec![
                Entity::natural("JUAN PEREZ GOMEZ").with_source(LOCAL_SOURCE),
                Entity::natural("JUAN PEREZ GOMEZ").with_source(LOCAL_SOURCE),
                Entity::natural("ANA LOPEZ MORA").with_source(LOCAL_SOURCE),
                Entity::natural("ANA LOPEZ").with_source(EXTERNAL_SOURCE),
            ],
            0.6,
        );

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].members().len(), 2);
        assert!(!buckets[0].is_confirmed(0.7));
        // 2/3 similarity: same bucket, but below the confirmation threshold.
        assert!(!buckets[1].is_confirmed(0.7));
        assert!(buckets[1].is_confirmed(0.6));
    }

    #[tokio::test]
    async fn test_process_with_agreeing_provider() {
        let response = ProviderResponse {
            success: true,
            actos: vec![ProviderAct {
                tipo_acto: "PODER GENERAL".to_string(),
                otorgantes: vec![structured("PEREZ GOMEZ JUAN CARLOS", "NATURAL")],
                beneficiarios: vec![EntityInput::NameOnly("MARIA ELENA RODRIGUEZ LOPEZ".to_string())],
            }],
            error: None,
        };
        let aggregator = aggregator(StaticProvider(response));
        let outcome = aggregator
            .process(SCENARIO.to_string(), None, &ProviderDocument::new("extract.pdf", Vec::new()))
            .await;

        assert!(outcome.local.is_ok());
        assert!(outcome.external.is_ok());
        assert_eq!(outcome.acts.len(), 1);
        assert_eq!(outcome.acts[0].grantors.len(), 1);
        assert_eq!(outcome.acts[0].grantors[0].name, "JUAN CARLOS PEREZ GOMEZ");
        assert_eq!(outcome.confirmed_grantors, 1);
        assert_eq!(outcome.confirmed_beneficiaries, 1);
        assert!((outcome.confidence - 0.85).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_process_survives_provider_failure() {
        let aggregator = aggregator(FailingProvider);
        let outcome = aggregator
            .process(SCENARIO.to_string(), None, &ProviderDocument::default())
            .await;

        assert!(outcome.local.is_ok());
        assert!(matches!(outcome.external, SideOutcome::Failed(_)));
        assert_eq!(outcome.acts.len(), 1);
        assert_eq!(outcome.acts[0].act_type, "PODER GENERAL");
        assert_eq!(sources(&outcome.acts[0].grantors[0]), vec!["local"]);
        assert_eq!(outcome.confidence, 0.5);
    }

    #[test]
    fn test_side_outcome_serializes_tagged() {
        let failed: SideOutcome<u8> = SideOutcome::Failed("timeout".to_string());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({ "status": "failed", "value": "timeout" })
        );
    }
}
