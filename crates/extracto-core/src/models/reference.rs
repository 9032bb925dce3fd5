//! Reference patterns used as classification hints.
//!
//! Patterns are loaded once from a directory of JSON files and are
//! immutable afterwards; the orchestrator receives them by value at
//! construction time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One reference pattern file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencePattern {
    /// Pattern identifier. Defaults to the file stem.
    #[serde(default)]
    pub patron: String,

    /// Act types this pattern applies to.
    #[serde(default)]
    pub tipos_aplicables: Vec<String>,

    /// Notary district label the pattern was collected from (e.g. "DÉCIMA OCTAVA").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notaria: Option<String>,

    /// Notary district number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero: Option<u32>,
}

/// Immutable set of reference patterns keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferencePatterns {
    patterns: BTreeMap<String, ReferencePattern>,
}

impl ReferencePatterns {
    /// An empty pattern set. Classification still works, with lower confidence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a pattern set from already-decoded patterns.
    pub fn from_patterns(patterns: impl IntoIterator<Item = ReferencePattern>) -> Self {
        let patterns = patterns
            .into_iter()
            .map(|p| (p.patron.clone(), p))
            .collect();
        Self { patterns }
    }

    /// Load every `*.json` file in a directory.
    ///
    /// A missing directory or an unreadable file degrades to fewer patterns
    /// and is logged, never returned as an error.
    pub fn load_dir(dir: &Path) -> Self {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Reference patterns unavailable at {}: {}", dir.display(), e);
                return Self::empty();
            }
        };

        let mut patterns = BTreeMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| {
                    serde_json::from_str::<ReferencePattern>(&s).map_err(|e| e.to_string())
                });

            match parsed {
                Ok(mut pattern) => {
                    if pattern.patron.is_empty() {
                        pattern.patron = path
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .unwrap_or_default()
                            .to_string();
                    }
                    patterns.insert(pattern.patron.clone(), pattern);
                }
                Err(e) => warn!("Skipping reference pattern {}: {}", path.display(), e),
            }
        }

        debug!("Loaded {} reference patterns", patterns.len());
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferencePattern> {
        self.patterns.values()
    }

    /// First pattern (by identifier) whose applicable act types occur in the text.
    pub fn match_act_types(&self, upper_text: &str) -> Option<&ReferencePattern> {
        self.patterns.values().find(|p| {
            p.tipos_aplicables
                .iter()
                .any(|tipo| !tipo.is_empty() && upper_text.contains(&tipo.to_uppercase()))
        })
    }

    /// First pattern collected from the given notary district.
    pub fn match_district(&self, label: Option<&str>, number: Option<u32>) -> Option<&ReferencePattern> {
        let label = label.map(crate::notarial::rules::normalizer::fold);
        self.patterns.values().find(|p| {
            let by_number = matches!((p.numero, number), (Some(a), Some(b)) if a == b);
            let by_label = match (&p.notaria, &label) {
                (Some(a), Some(b)) => crate::notarial::rules::normalizer::fold(a) == *b,
                _ => false,
            };
            by_number || by_label
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("poder_general.json"),
            r#"{"tipos_aplicables": ["PODER GENERAL"], "notaria": "DÉCIMA OCTAVA", "numero": 18}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let patterns = ReferencePatterns::load_dir(dir.path());
        assert_eq!(patterns.len(), 1);

        let hit = patterns.match_act_types("ESCRITURA DE PODER GENERAL").unwrap();
        assert_eq!(hit.patron, "poder_general");
        assert!(patterns.match_act_types("COMPRAVENTA").is_none());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let patterns = ReferencePatterns::load_dir(Path::new("/nonexistent/patterns"));
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_match_district() {
        let patterns = ReferencePatterns::from_patterns(vec![ReferencePattern {
            patron: "quito18".to_string(),
            tipos_aplicables: vec![],
            notaria: Some("DÉCIMA OCTAVA".to_string()),
            numero: None,
        }]);
        assert!(patterns.match_district(Some("DECIMA OCTAVA"), None).is_some());
        assert!(patterns.match_district(Some("PRIMERA"), Some(1)).is_none());
    }
}
