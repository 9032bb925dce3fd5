//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::lexicon::Lexicon;

/// Main configuration for the extracto pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractoConfig {
    /// Act extraction and validation configuration.
    pub extraction: ExtractionConfig,

    /// Document classification configuration.
    pub classification: ClassificationConfig,

    /// Spatial table parser configuration.
    pub spatial: SpatialConfig,

    /// Hybrid aggregation configuration.
    pub hybrid: HybridConfig,

    /// PDF text acquisition configuration.
    pub pdf: PdfConfig,

    /// Rendering configuration.
    pub render: RenderConfig,

    /// Heuristic dictionaries.
    pub lexicon: Lexicon,
}

/// Act extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keywords an act type must contain to survive the segmenting filter.
    pub allowed_act_keywords: Vec<String>,

    /// Act types that mean "could not be determined".
    pub indeterminate_act_types: Vec<String>,

    /// Literal placeholder names reported as validation issues.
    pub placeholder_names: Vec<String>,

    /// Act-type keywords that normally require a beneficiary.
    pub beneficiary_required_keywords: Vec<String>,

    /// Grantor count above which a warning is raised.
    pub max_expected_grantors: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            allowed_act_keywords: vec![
                "PODER".to_string(),
                "REVOCATORIA".to_string(),
                "COMPRAVENTA".to_string(),
            ],
            indeterminate_act_types: vec![
                "INDETERMINADO".to_string(),
                "INDETERMINADA".to_string(),
                "ACTO_GENERICO".to_string(),
                "ACTO GENERICO".to_string(),
            ],
            placeholder_names: vec!["[OBJECT OBJECT]".to_string(), "UNDEFINED".to_string()],
            beneficiary_required_keywords: vec![
                "PODER".to_string(),
                "COMPRAVENTA".to_string(),
                "MANDATO".to_string(),
                "AUTORIZACION".to_string(),
                "PROCURACION".to_string(),
            ],
            max_expected_grantors: 5,
        }
    }
}

/// Document classification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Directory of reference pattern JSON files.
    pub patterns_dir: Option<PathBuf>,
}

/// Spatial table parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Window extent below a marker (points).
    pub window_below: f32,

    /// Window extent above a marker (points).
    pub window_above: f32,

    /// Vertical tolerance for grouping tokens into a row (points).
    pub row_tolerance: f32,

    /// Bucket size for rounding x positions into columns (points).
    pub column_bucket: f32,

    /// Distance within which column buckets are merged (points).
    pub column_merge: f32,

    /// Maximum pages to scan for table markers.
    pub max_pages: u32,

    /// Horizontal distance within which tokens count as aligned for
    /// layout detection (points).
    pub layout_alignment: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            window_below: 200.0,
            window_above: 50.0,
            row_tolerance: 8.0,
            column_bucket: 10.0,
            column_merge: 30.0,
            max_pages: 10,
            layout_alignment: 5.0,
        }
    }
}

/// Hybrid aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// Base URL of the external extraction provider.
    pub provider_url: Option<String>,

    /// Bearer token sent to the provider.
    pub api_token: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Jaccard similarity at which two names fall into the same bucket.
    pub similarity_threshold: f32,

    /// Cross-source similarity required to count a bucket as confirmed.
    pub confirmation_threshold: f32,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            provider_url: None,
            api_token: None,
            timeout_secs: 30,
            similarity_threshold: 0.6,
            confirmation_threshold: 0.7,
        }
    }
}

/// PDF text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum normalized text length to consider the PDF readable.
    pub min_text_length: usize,

    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 20,
            max_pages: 50,
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Template file; the built-in certified-copy template is used when unset.
    pub template_path: Option<PathBuf>,

    /// Number of numbered copies to render.
    pub copies: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            copies: 2,
        }
    }
}

impl ExtractoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractoConfig::default();
        assert_eq!(config.spatial.row_tolerance, 8.0);
        assert_eq!(config.hybrid.similarity_threshold, 0.6);
        assert_eq!(config.pdf.min_text_length, 20);
        assert_eq!(config.extraction.allowed_act_keywords.len(), 3);
    }

    #[test]
    fn test_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ExtractoConfig::default();
        config.hybrid.provider_url = Some("http://localhost:5000".to_string());
        config.save(&path).unwrap();

        let loaded = ExtractoConfig::from_file(&path).unwrap();
        assert_eq!(loaded.hybrid.provider_url.as_deref(), Some("http://localhost:5000"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ExtractoConfig =
            serde_json::from_str(r#"{"render": {"copies": 4}}"#).unwrap();
        assert_eq!(config.render.copies, 4);
        assert_eq!(config.hybrid.timeout_secs, 30);
    }
}
