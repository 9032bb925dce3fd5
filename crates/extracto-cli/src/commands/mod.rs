//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod render;

use std::fs;
use std::path::{Path, PathBuf};

use extracto_core::models::{ExtractoConfig, ReferencePatterns};
use extracto_core::pdf::extract_text_from_file;
use tracing::debug;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("extracto")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExtractoConfig> {
    if let Some(path) = config_path {
        return Ok(ExtractoConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(ExtractoConfig::from_file(&default_path)?)
    } else {
        Ok(ExtractoConfig::default())
    }
}

/// Reference patterns from `--patterns`, falling back to the configured directory.
pub fn load_patterns(override_dir: Option<&Path>, config: &ExtractoConfig) -> ReferencePatterns {
    match override_dir.or(config.classification.patterns_dir.as_deref()) {
        Some(dir) => ReferencePatterns::load_dir(dir),
        None => ReferencePatterns::empty(),
    }
}

/// Whether a file is something `read_document` can handle.
pub fn is_supported(path: &Path) -> bool {
    matches!(extension(path).as_str(), "pdf" | "txt")
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Read document text: PDFs through the text extractor, `.txt` verbatim.
pub fn read_document(path: &Path, config: &ExtractoConfig) -> anyhow::Result<String> {
    match extension(path).as_str() {
        "pdf" => Ok(extract_text_from_file(path, &config.pdf)?),
        "txt" => Ok(fs::read_to_string(path)?),
        other => anyhow::bail!("Unsupported file format: {}", other),
    }
}
