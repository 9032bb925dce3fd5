//! Positioned text tokens and coarse layout detection.
//!
//! Tokens are delivered by the text/coordinate collaborator in PDF user
//! space: `y` grows upwards, pages are 1-indexed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};
use crate::models::Layout;

/// A text fragment with its position on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    /// Page number (1-indexed).
    #[serde(default = "first_page")]
    pub page: u32,

    /// Token text.
    pub text: String,

    /// Left edge.
    pub x: f32,

    /// Baseline.
    pub y: f32,

    #[serde(default)]
    pub width: f32,

    #[serde(default)]
    pub height: f32,
}

fn first_page() -> u32 {
    1
}

impl PositionedToken {
    pub fn new(page: u32, text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            page,
            text: text.into(),
            x,
            y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Set the token extent.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Get the center point of the token.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Decode a JSON token list (`[{page, text, x, y, width, height}]`).
pub fn tokens_from_json(json: &str) -> Result<Vec<PositionedToken>> {
    serde_json::from_str(json)
        .map_err(|e| ExtractionError::InvalidTokens(e.to_string()).into())
}

/// Load a JSON token file.
pub fn load_tokens(path: &Path) -> Result<Vec<PositionedToken>> {
    let content = std::fs::read_to_string(path)?;
    tokens_from_json(&content)
}

/// Group tokens by page, dropping blank ones.
pub fn tokens_by_page(tokens: &[PositionedToken]) -> BTreeMap<u32, Vec<&PositionedToken>> {
    let mut pages: BTreeMap<u32, Vec<&PositionedToken>> = BTreeMap::new();
    for token in tokens.iter().filter(|t| !t.text.trim().is_empty()) {
        pages.entry(token.page).or_default().push(token);
    }
    pages
}

/// Count x positions shared by more than three tokens on the first page.
///
/// Positions are rounded to whole points; two positions are aligned when
/// they differ by less than `alignment`.
pub fn aligned_columns(tokens: &[PositionedToken], alignment: f32) -> usize {
    let pages = tokens_by_page(tokens);
    let Some(first) = pages.values().next() else {
        return 0;
    };

    let positions: Vec<i64> = first.iter().map(|t| t.x.round() as i64).collect();
    let mut unique = positions.clone();
    unique.sort_unstable();
    unique.dedup();

    unique
        .iter()
        .filter(|&&x| {
            positions
                .iter()
                .filter(|&&pos| ((pos - x) as f32).abs() < alignment)
                .count()
                > 3
        })
        .count()
}

/// Classify the document layout from token alignment.
pub fn detect_layout(tokens: &[PositionedToken], alignment: f32) -> Layout {
    if aligned_columns(tokens, alignment) >= 3 {
        Layout::Tabular
    } else {
        Layout::Linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(columns: &[f32], rows: usize) -> Vec<PositionedToken> {
        let mut tokens = Vec::new();
        for r in 0..rows {
            for &x in columns {
                tokens.push(PositionedToken::new(1, "CELDA", x, 700.0 - r as f32 * 12.0));
            }
        }
        tokens
    }

    #[test]
    fn test_tabular_layout() {
        let tokens = grid(&[50.0, 200.0, 350.0], 5);
        assert_eq!(aligned_columns(&tokens, 5.0), 3);
        assert_eq!(detect_layout(&tokens, 5.0), Layout::Tabular);
    }

    #[test]
    fn test_linear_layout() {
        let tokens = grid(&[50.0, 200.0], 5);
        assert_eq!(detect_layout(&tokens, 5.0), Layout::Linear);
        assert_eq!(detect_layout(&[], 5.0), Layout::Linear);
    }

    #[test]
    fn test_tokens_from_json() {
        let tokens = tokens_from_json(r#"[{"text": "OTORGANTES", "x": 10.0, "y": 500.0}]"#).unwrap();
        assert_eq!(tokens[0].page, 1);
        assert_eq!(tokens[0].width, 0.0);

        assert!(tokens_from_json("{").is_err());
    }
}
