//! Document-level pipeline: analyze, classify, run every applicable
//! strategy, then validate and merge the best result.

use std::fmt;

use tracing::{debug, info, warn};

use super::linear::{LINEAR_CONFIDENCE, LinearTextParser};
use super::rules::identity::validate_document_number;
use super::rules::normalizer::{EntityNormalizer, fold};
use super::rules::notary::extract_notary_info;
use super::rules::patterns::{PERSON_JURIDICAL_KEYWORD, PERSON_NATURAL_KEYWORD};
use super::rules::sections::{SectionKind, act_type_in, scan_sections};
use super::segmenting::{SEGMENTED_CONFIDENCE, SegmentingParser};
use super::spatial::{SPATIAL_CONFIDENCE, SpatialTableParser};
use crate::layout::{PositionedToken, aligned_columns};
use crate::models::{
    Act, ClassificationResult, Entity, ExtractoConfig, Layout, NotaryInfo, ParseOutcome,
    PersonType, ReferencePatterns, Validation,
};

/// Act-type keywords recognized during classification, in priority order.
const ACT_TYPE_SIGNALS: &[&str] = &["PODER GENERAL", "PODER ESPECIAL", "REVOCATORIA"];

/// A parsing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Coordinate-based table reconstruction.
    Tabular,
    /// Multi-act segmenting parser.
    AdvancedText,
    /// Single-act labelled-section parser.
    SimpleText,
}

impl Strategy {
    /// Static priority used for ranking.
    pub fn priority(&self) -> f32 {
        match self {
            Strategy::Tabular => 0.8,
            Strategy::AdvancedText => 0.6,
            Strategy::SimpleText => 0.4,
        }
    }

    /// Confidence stated for this strategy's results.
    pub fn confidence(&self) -> f32 {
        match self {
            Strategy::Tabular => SPATIAL_CONFIDENCE,
            Strategy::AdvancedText => SEGMENTED_CONFIDENCE,
            Strategy::SimpleText => LINEAR_CONFIDENCE,
        }
    }

    /// Name reported as the outcome source.
    pub fn source(&self) -> &'static str {
        match self {
            Strategy::Tabular => "table",
            Strategy::AdvancedText => "advanced_text",
            Strategy::SimpleText => "simple_text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Acts produced by one strategy.
#[derive(Debug, Clone)]
pub struct StrategyResult {
    pub strategy: Strategy,
    pub confidence: f32,
    pub acts: Vec<Act>,
}

/// Structural signals gathered before classification.
#[derive(Debug, Clone, Default)]
pub struct DocumentAnalysis {
    pub layout: Layout,
    /// Number of labelled sections (act, grantors, beneficiaries, notary).
    pub labelled_sections: usize,
    /// Act type printed after the `ACTO O CONTRATO` label, if any.
    pub labelled_act_type: Option<String>,
    /// Columns with more than three aligned tokens.
    pub aligned_columns: usize,
    pub has_tokens: bool,
    pub notary: NotaryInfo,
}

impl DocumentAnalysis {
    pub fn has_table(&self) -> bool {
        self.layout == Layout::Tabular
    }
}

/// Runs the parsing strategies over one document and keeps the best result.
///
/// Holds no per-document state; one instance can parse documents from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct ClassificationOrchestrator {
    config: ExtractoConfig,
    patterns: ReferencePatterns,
    normalizer: EntityNormalizer,
    linear: LinearTextParser,
    segmenting: SegmentingParser,
    spatial: SpatialTableParser,
}

impl Default for ClassificationOrchestrator {
    fn default() -> Self {
        Self::new(ExtractoConfig::default(), ReferencePatterns::empty())
    }
}

impl ClassificationOrchestrator {
    /// Create an orchestrator from a configuration and a loaded pattern set.
    pub fn new(config: ExtractoConfig, patterns: ReferencePatterns) -> Self {
        let normalizer = EntityNormalizer::new(config.lexicon.clone());
        Self {
            linear: LinearTextParser::new(normalizer.clone()),
            segmenting: SegmentingParser::new(normalizer.clone(), &config.extraction),
            spatial: SpatialTableParser::new(config.spatial.clone(), normalizer.clone()),
            normalizer,
            patterns,
            config,
        }
    }

    pub fn config(&self) -> &ExtractoConfig {
        &self.config
    }

    pub fn patterns(&self) -> &ReferencePatterns {
        &self.patterns
    }

    pub fn normalizer(&self) -> &EntityNormalizer {
        &self.normalizer
    }

    /// Parse one document. Never fails: a document without a valid act is
    /// reported with `confidence = 0` and `source = "none"`.
    pub fn parse_document(&self, text: &str, tokens: Option<&[PositionedToken]>) -> ParseOutcome {
        info!(
            "Parsing document ({} chars, {} tokens)",
            text.chars().count(),
            tokens.map_or(0, |t| t.len())
        );

        let analysis = self.analyze(text, tokens);
        let classification = self.classify(text, &analysis);
        let strategies = self.select_strategies(&analysis, &classification);
        let results = self.execute(&strategies, text, tokens);

        self.validate_and_merge(results, classification, &analysis.notary)
    }

    /// Collect section markers and the coarse layout.
    pub fn analyze(&self, text: &str, tokens: Option<&[PositionedToken]>) -> DocumentAnalysis {
        let upper = text.to_uppercase();
        let sections = scan_sections(&upper);
        let labelled_sections = sections.iter().filter(|s| s.kind != SectionKind::Other).count();
        let labelled_act_type = Some(act_type_in(&sections)).filter(|t| !t.is_empty());

        let columns = tokens
            .map(|t| aligned_columns(t, self.config.spatial.layout_alignment))
            .unwrap_or(0);
        let layout = if columns >= 3 { Layout::Tabular } else { Layout::Linear };

        let analysis = DocumentAnalysis {
            layout,
            labelled_sections,
            labelled_act_type,
            aligned_columns: columns,
            has_tokens: tokens.is_some_and(|t| !t.is_empty()),
            notary: extract_notary_info(text),
        };
        debug!(
            "Analysis: layout={:?}, {} section marker(s), {} aligned column(s)",
            analysis.layout,
            analysis.labelled_sections,
            analysis.aligned_columns
        );
        analysis
    }

    /// Accumulate an advisory confidence from independent signals.
    pub fn classify(&self, text: &str, analysis: &DocumentAnalysis) -> ClassificationResult {
        let upper = text.to_uppercase();
        let mut result = ClassificationResult {
            layout: analysis.layout,
            ..ClassificationResult::default()
        };

        // A known act keyword wins; otherwise the labelled act section counts.
        let act_type = ACT_TYPE_SIGNALS
            .iter()
            .find(|s| upper.contains(**s))
            .map(|s| s.to_string())
            .or_else(|| analysis.labelled_act_type.clone());
        if let Some(act_type) = act_type {
            result.act_type_guess = Some(act_type);
            result.confidence += 0.3;
        }

        if PERSON_NATURAL_KEYWORD.is_match(&upper) {
            result.person_type_guess = Some(PersonType::Natural);
            result.confidence += 0.2;
        } else if PERSON_JURIDICAL_KEYWORD.is_match(&upper) {
            result.person_type_guess = Some(PersonType::Juridical);
            result.confidence += 0.2;
        }

        let notary = &analysis.notary;
        result.notary_district_guess = notary.district_label.clone();
        if let Some(pattern) = self
            .patterns
            .match_district(notary.district_label.as_deref(), notary.district_number)
        {
            debug!("Notary district matches reference pattern '{}'", pattern.patron);
            result.confidence += 0.2;
        }

        if let Some(pattern) = self.patterns.match_act_types(&upper) {
            result.matched_pattern = Some(pattern.patron.clone());
            result.confidence += 0.3;
        }

        result.confidence = result.confidence.min(1.0);
        debug!("Classification: {:?}", result);
        result
    }

    /// Rank the applicable strategies by `priority × confidence`.
    ///
    /// Advanced and simple text always run; the table strategy runs when the
    /// layout is tabular.
    pub fn select_strategies(
        &self,
        analysis: &DocumentAnalysis,
        classification: &ClassificationResult,
    ) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(3);
        if analysis.has_table() && analysis.has_tokens {
            strategies.push(Strategy::Tabular);
        }
        strategies.push(Strategy::AdvancedText);
        strategies.push(Strategy::SimpleText);

        let score = |s: &Strategy| s.priority() * classification.confidence;
        strategies.sort_by(|a, b| score(b).total_cmp(&score(a)).then(b.priority().total_cmp(&a.priority())));
        debug!("Strategies: {:?}", strategies);
        strategies
    }

    /// Run every selected strategy, keeping only results with valid acts.
    ///
    /// When the text strategies find no grantors and tokens are available,
    /// the table strategy runs as a fallback even on a linear layout.
    pub fn execute(
        &self,
        strategies: &[Strategy],
        text: &str,
        tokens: Option<&[PositionedToken]>,
    ) -> Vec<StrategyResult> {
        let mut results: Vec<StrategyResult> = strategies
            .iter()
            .filter_map(|&strategy| self.run(strategy, text, tokens))
            .collect();

        let has_tokens = tokens.is_some_and(|t| !t.is_empty());
        if has_tokens && !strategies.contains(&Strategy::Tabular) && results.is_empty() {
            debug!("Text strategies found no grantors, trying the table strategy");
            results.extend(self.run(Strategy::Tabular, text, tokens));
        }
        results
    }

    fn run(&self, strategy: Strategy, text: &str, tokens: Option<&[PositionedToken]>) -> Option<StrategyResult> {
        let acts = match strategy {
            Strategy::Tabular => {
                let tokens = tokens?;
                match self.spatial.parse(text, tokens) {
                    Ok(act) => vec![act],
                    Err(issue) => {
                        warn!("Table strategy produced nothing: {}", issue);
                        return None;
                    }
                }
            }
            Strategy::AdvancedText => self.segmenting.parse(text),
            Strategy::SimpleText => vec![self.linear.parse(text)],
        };

        let acts: Vec<Act> = acts.into_iter().filter(Act::is_valid).collect();
        debug!("Strategy {} produced {} valid act(s)", strategy, acts.len());
        (!acts.is_empty()).then(|| StrategyResult {
            strategy,
            confidence: strategy.confidence(),
            acts,
        })
    }

    fn validate_and_merge(
        &self,
        results: Vec<StrategyResult>,
        classification: ClassificationResult,
        notary: &NotaryInfo,
    ) -> ParseOutcome {
        let Some(best_index) = best_result(&results) else {
            info!("No strategy produced a valid act");
            return ParseOutcome::none(classification, "No act could be extracted from the document");
        };

        let best = &results[best_index];
        let acts = merge_complementary(best, &results, notary);
        let validation = self.validate(&acts);
        let confidence = (best.confidence + validation.score).min(1.0);

        info!(
            "Selected {} with {} act(s), confidence {:.2}",
            best.strategy,
            acts.len(),
            confidence
        );

        ParseOutcome {
            acts,
            confidence,
            source: best.strategy.source().to_string(),
            validation,
            classification,
        }
    }

    /// Score structural completeness (averaged over acts) and collect
    /// issues and warnings.
    pub fn validate(&self, acts: &[Act]) -> Validation {
        let mut validation = Validation::default();
        if acts.is_empty() {
            validation.issues.push("No acts to validate".to_string());
            return validation;
        }

        let extraction = &self.config.extraction;
        let mut total = 0.0;

        for act in acts {
            let mut score = 0.0;

            if act.act_type.trim().chars().count() >= 3 {
                score += 0.2;
            } else {
                validation.issues.push("Act type missing or too short".to_string());
            }

            if act.grantors.is_empty() {
                validation.issues.push("No grantors detected".to_string());
            } else {
                score += 0.4;
                let invalid = act.grantors.iter().filter(|g| !self.is_well_formed(g)).count();
                if invalid > 0 {
                    validation
                        .issues
                        .push(format!("{} grantor(s) with invalid names", invalid));
                } else {
                    score += 0.1;
                }
                if act.grantors.len() > extraction.max_expected_grantors {
                    validation.warnings.push(format!(
                        "{} grantors found in '{}'; representatives may be listed as grantors",
                        act.grantors.len(),
                        act.act_type
                    ));
                }
            }

            if act.beneficiaries.is_empty() {
                let act_type = fold(&act.act_type);
                if extraction
                    .beneficiary_required_keywords
                    .iter()
                    .any(|k| act_type.contains(&fold(k)))
                {
                    validation
                        .warnings
                        .push(format!("'{}' usually has a beneficiary but none was found", act.act_type));
                }
            } else {
                score += 0.2;
                let invalid = act.beneficiaries.iter().filter(|b| !self.is_well_formed(b)).count();
                if invalid > 0 {
                    validation
                        .warnings
                        .push(format!("{} beneficiary(ies) with invalid names", invalid));
                }
            }

            for entity in act.grantors.iter().chain(&act.beneficiaries) {
                if let Some(number) = &entity.document_number {
                    if !validate_document_number(number) {
                        validation.warnings.push(format!(
                            "Document number {} of {} fails its checksum",
                            number, entity.name
                        ));
                    }
                }
            }

            total += score;
        }

        validation.score = total / acts.len() as f32;
        validation
    }

    fn is_well_formed(&self, entity: &Entity) -> bool {
        let name = fold(entity.name.trim());
        entity.has_valid_name()
            && !self
                .config
                .extraction
                .placeholder_names
                .iter()
                .any(|p| fold(p) == name)
    }
}

/// Index of the result with the highest stated confidence; earlier wins ties.
fn best_result(results: &[StrategyResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, result) in results.iter().enumerate() {
        match best {
            Some(b) if results[b].confidence >= result.confidence => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Fill gaps in the best acts from the header and from other strategies.
///
/// Missing notary fields come from the document header. An act without
/// beneficiaries borrows them from another strategy's act of the same type.
fn merge_complementary(best: &StrategyResult, results: &[StrategyResult], notary: &NotaryInfo) -> Vec<Act> {
    let mut acts = best.acts.clone();

    for act in &mut acts {
        act.apply_notary(notary);

        if act.beneficiaries.is_empty() {
            let act_type = fold(&act.act_type);
            let donor = results
                .iter()
                .filter(|r| r.strategy != best.strategy)
                .flat_map(|r| r.acts.iter())
                .find(|other| fold(&other.act_type) == act_type && !other.beneficiaries.is_empty());
            if let Some(donor) = donor {
                debug!(
                    "Borrowing {} beneficiary(ies) for '{}' from {}",
                    donor.beneficiaries.len(),
                    act.act_type,
                    donor.source
                );
                act.beneficiaries = donor.beneficiaries.clone();
            }
        }
    }
    acts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActSource, ReferencePattern};
    use pretty_assertions::assert_eq;
    use std::time::{Duration, Instant};

    const SCENARIO: &str = "ACTO O CONTRATO: PODER GENERAL\n\
        OTORGADO POR: NATURAL JUAN CARLOS PEREZ GOMEZ POR SUS PROPIOS DERECHOS\n\
        A FAVOR DE: NATURAL MARIA ELENA RODRIGUEZ LOPEZ POR SUS PROPIOS DERECHOS";

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.name.as_str()).collect()
    }

    fn act(act_type: &str, grantors: &[&str], beneficiaries: &[&str]) -> Act {
        let mut act = Act::new(ActSource::Segmented);
        act.act_type = act_type.to_string();
        act.grantors = grantors.iter().map(|n| Entity::natural(*n)).collect();
        act.beneficiaries = beneficiaries.iter().map(|n| Entity::natural(*n)).collect();
        act
    }

    #[test]
    fn test_parse_document_scenario() {
        let outcome = ClassificationOrchestrator::default().parse_document(SCENARIO, None);

        assert_eq!(outcome.acts.len(), 1);
        assert_eq!(outcome.acts[0].act_type, "PODER GENERAL");
        assert_eq!(names(&outcome.acts[0].grantors), vec!["JUAN CARLOS PEREZ GOMEZ"]);
        assert_eq!(names(&outcome.acts[0].beneficiaries), vec!["MARIA ELENA RODRIGUEZ LOPEZ"]);
        assert_eq!(outcome.source, "advanced_text");
        assert_eq!(outcome.confidence, 1.0);
        assert!(outcome.validation.issues.is_empty());
    }

    #[test]
    fn test_parse_document_empty() {
        let orchestrator = ClassificationOrchestrator::default();
        for text in ["", "   ", "TEXTO SIN ACTOS"] {
            let outcome = orchestrator.parse_document(text, None);
            assert!(outcome.acts.is_empty());
            assert_eq!(outcome.confidence, 0.0);
            assert_eq!(outcome.source, "none");
            assert_eq!(outcome.validation.issues.len(), 1);
        }
    }

    #[test]
    fn test_returned_acts_are_valid() {
        let text = "ACTO O CONTRATO: PODER ESPECIAL\nA FAVOR DE: NATURAL LOPEZ ANA POR SUS PROPIOS DERECHOS";
        let outcome = ClassificationOrchestrator::default().parse_document(text, None);
        assert!(outcome.acts.iter().all(Act::is_valid));
        assert_eq!(outcome.source, "none");
    }

    #[test]
    fn test_classify_signals() {
        let patterns = ReferencePatterns::from_patterns([ReferencePattern {
            patron: "quito_18".to_string(),
            tipos_aplicables: vec!["PODER GENERAL".to_string()],
            notaria: Some("DÉCIMA OCTAVA".to_string()),
            numero: Some(18),
        }]);
        let orchestrator = ClassificationOrchestrator::new(ExtractoConfig::default(), patterns);
        let text = "NOTARÍA DÉCIMA OCTAVA DEL CANTÓN QUITO\nPODER GENERAL\nPERSONA NATURAL";
        let analysis = orchestrator.analyze(text, None);
        let result = orchestrator.classify(text, &analysis);

        assert_eq!(result.act_type_guess.as_deref(), Some("PODER GENERAL"));
        assert_eq!(result.person_type_guess, Some(PersonType::Natural));
        assert_eq!(result.notary_district_guess.as_deref(), Some("DÉCIMA OCTAVA"));
        assert_eq!(result.matched_pattern.as_deref(), Some("quito_18"));
        assert!((result.confidence - 1.0).abs() < 1e-6);

        let bare = ClassificationOrchestrator::default();
        let result = bare.classify("", &bare.analyze("", None));
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_classify_uses_labelled_act_section() {
        let orchestrator = ClassificationOrchestrator::default();
        let text = "ACTO O CONTRATO: COMPRAVENTA\nOTORGADO POR: LOPEZ";
        let analysis = orchestrator.analyze(text, None);
        assert_eq!(analysis.labelled_sections, 2);
        assert_eq!(analysis.labelled_act_type.as_deref(), Some("COMPRAVENTA"));

        let result = orchestrator.classify(text, &analysis);
        assert_eq!(result.act_type_guess.as_deref(), Some("COMPRAVENTA"));
        assert!((result.confidence - 0.3).abs() < 1e-6);

        let unlabelled = "COMPRAVENTA ENTRE LAS PARTES";
        let result = orchestrator.classify(unlabelled, &orchestrator.analyze(unlabelled, None));
        assert_eq!(result.act_type_guess, None);
    }

    #[test]
    fn test_select_strategies() {
        let orchestrator = ClassificationOrchestrator::default();
        let classification = ClassificationResult {
            confidence: 0.5,
            ..ClassificationResult::default()
        };

        let linear = DocumentAnalysis::default();
        assert_eq!(
            orchestrator.select_strategies(&linear, &classification),
            vec![Strategy::AdvancedText, Strategy::SimpleText]
        );

        let tabular = DocumentAnalysis {
            layout: Layout::Tabular,
            has_tokens: true,
            ..DocumentAnalysis::default()
        };
        assert_eq!(
            orchestrator.select_strategies(&tabular, &classification),
            vec![Strategy::Tabular, Strategy::AdvancedText, Strategy::SimpleText]
        );
    }

    #[test]
    fn test_table_fallback_on_linear_layout() {
        let tokens = vec![
            PositionedToken::new(1, "OTORGANTES", 50.0, 700.0),
            PositionedToken::new(1, "NATURAL", 50.0, 680.0),
            PositionedToken::new(1, "PEREZ GOMEZ JUAN", 150.0, 680.0),
        ];
        // Interleaved cells leave no readable name in the text.
        let text = "ACTO O CONTRATO: PODER GENERAL\nOTORGANTES\n1710034065";
        let outcome = ClassificationOrchestrator::default().parse_document(text, Some(&tokens));

        assert_eq!(outcome.classification.layout, Layout::Linear);
        assert_eq!(outcome.source, "table");
        assert_eq!(names(&outcome.acts[0].grantors), vec!["JUAN PEREZ GOMEZ"]);
        assert_eq!(outcome.acts[0].act_type, "PODER GENERAL");
    }

    #[test]
    fn test_validate() {
        let orchestrator = ClassificationOrchestrator::default();

        let complete = orchestrator.validate(&[act("PODER GENERAL", &["JUAN PEREZ"], &["ANA LOPEZ"])]);
        assert!((complete.score - 0.9).abs() < 1e-6);
        assert!(complete.issues.is_empty());
        assert!(complete.warnings.is_empty());

        let placeholder = orchestrator.validate(&[act("COMPRAVENTA", &["[object Object]"], &[])]);
        assert!((placeholder.score - 0.6).abs() < 1e-6);
        assert_eq!(placeholder.issues, vec!["1 grantor(s) with invalid names".to_string()]);
        assert_eq!(placeholder.warnings.len(), 1);

        let crowded = orchestrator.validate(&[act(
            "REVOCATORIA",
            &["ANA UNO", "ANA DOS", "ANA TRES", "ANA CUATRO", "ANA CINCO", "ANA SEIS"],
            &[],
        )]);
        assert_eq!(crowded.warnings.len(), 1);
        assert!(crowded.warnings[0].contains("6 grantors"));
    }

    #[test]
    fn test_validate_checksum_warning() {
        let orchestrator = ClassificationOrchestrator::default();
        let mut act = act("PODER GENERAL", &["JUAN PEREZ"], &["ANA LOPEZ"]);
        act.grantors[0].document_number = Some("1710034066".to_string());
        let validation = orchestrator.validate(&[act]);
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].contains("1710034066"));
    }

    #[test]
    fn test_merge_complementary_borrows_beneficiaries() {
        let best = StrategyResult {
            strategy: Strategy::AdvancedText,
            confidence: 0.6,
            acts: vec![act("PODER GENERAL", &["JUAN PEREZ"], &[])],
        };
        let simple = StrategyResult {
            strategy: Strategy::SimpleText,
            confidence: 0.4,
            acts: vec![act("PODER GENERAL", &["JUAN PEREZ"], &["ANA LOPEZ"])],
        };
        let notary = NotaryInfo {
            name: Some("PEDRO ANDRADE".to_string()),
            ..NotaryInfo::default()
        };
        let results = vec![best.clone(), simple];

        let acts = merge_complementary(&best, &results, &notary);
        assert_eq!(names(&acts[0].beneficiaries), vec!["ANA LOPEZ"]);
        assert_eq!(acts[0].notary_name.as_deref(), Some("PEDRO ANDRADE"));
        assert_eq!(best_result(&results), Some(0));
    }

    #[test]
    fn test_large_document_performance() {
        let block = "ESCRITURA NRO. 1\n\
            NOTARIO(A): DR. PEDRO ANDRADE MORA\n\
            ACTO O CONTRATO: PODER GENERAL Y REVOCATORIA DE PODER\n\
            OTORGADO POR: NATURAL PEREZ GOMEZ JUAN CARLOS POR SUS PROPIOS DERECHOS CEDULA 1710034065\n\
            JURIDICA COMERCIAL BOLIVAR S.A. REPRESENTADO POR LOPEZ ANA RUC 1790012344001\n\
            A FAVOR DE: NATURAL RODRIGUEZ LOPEZ MARIA ELENA POR SUS PROPIOS DERECHOS\n\
            FECHA: 12/01/2024 CUANTIA: INDETERMINADA\n";
        let mut text = String::new();
        while text.len() < 30_000 {
            text.push_str(block);
        }

        let orchestrator = ClassificationOrchestrator::default();
        let start = Instant::now();
        let outcome = orchestrator.parse_document(&text, None);
        let elapsed = start.elapsed();

        assert!(!outcome.acts.is_empty());
        assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
    }
}
