// src/models/glyph_model.rs
// the JSON-based letterform bank

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

const EMBEDDED_BANK: &str = include_str!("letterforms.json");

pub const GENERIC_TEMPLATE: &str = "generic";

/// One template point. `x` is a fraction of the letter width, `y` a
/// vertical offset from the centerline, `sway` how strongly the
/// per-letter variation draw displaces this anchor.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub sway: f32,
    #[serde(default)]
    pub pressure: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct CurveSegment {
    pub control: Anchor,
    pub end: Anchor,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateStroke {
    /// Pressure-varying polyline through the anchors.
    Points { anchors: Vec<Anchor> },
    /// Chain of quadratic curves drawn at a single random width.
    Curves {
        start: Anchor,
        segments: Vec<CurveSegment>,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GlyphTemplate {
    pub strokes: Vec<TemplateStroke>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateBank {
    // bespoke letter -> template id; anything unlisted falls back to "generic"
    letters: HashMap<String, String>,
    templates: HashMap<String, GlyphTemplate>,
}

impl TemplateBank {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        let bank: TemplateBank = serde_json::from_str(&content)?;
        bank.validate()?;
        Ok(bank)
    }

    /// The built-in bank compiled into the binary.
    pub fn embedded() -> Self {
        let bank: TemplateBank =
            serde_json::from_str(EMBEDDED_BANK).expect("embedded letterform bank is valid JSON");
        bank.validate()
            .expect("embedded letterform bank is complete");
        bank
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Template for a character. Lowercase folds to uppercase; any
    /// character without a bespoke entry gets the generic squiggle.
    /// Never fails.
    pub fn template_for(&self, letter: char) -> &GlyphTemplate {
        let key: String = letter.to_uppercase().collect();
        self.letters
            .get(&key)
            .and_then(|id| self.templates.get(id))
            .unwrap_or_else(|| &self.templates[GENERIC_TEMPLATE])
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !self.templates.contains_key(GENERIC_TEMPLATE) {
            return Err("letterform bank is missing the generic template".into());
        }
        for (letter, id) in &self.letters {
            if !self.templates.contains_key(id) {
                return Err(
                    format!("letter {:?} maps to unknown template {:?}", letter, id).into(),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor_count(template: &GlyphTemplate) -> usize {
        template
            .strokes
            .iter()
            .map(|stroke| match stroke {
                TemplateStroke::Points { anchors } => anchors.len(),
                TemplateStroke::Curves { segments, .. } => 1 + segments.len() * 2,
            })
            .sum()
    }

    #[test]
    fn test_embedded_bank_has_bespoke_letters() {
        let bank = TemplateBank::embedded();
        assert!(bank.template_count() >= 4);

        // A is two strokes: the apex plus the crossbar.
        assert_eq!(bank.template_for('A').strokes.len(), 2);
        // M is a single seven-anchor zigzag.
        assert_eq!(anchor_count(bank.template_for('M')), 7);
        // S is curve-based, not a polyline.
        assert!(matches!(
            &bank.template_for('S').strokes[0],
            TemplateStroke::Curves { .. }
        ));
    }

    #[test]
    fn test_lowercase_folds_to_bespoke_template() {
        let bank = TemplateBank::embedded();
        let upper = bank.template_for('M');
        let lower = bank.template_for('m');
        assert_eq!(anchor_count(upper), anchor_count(lower));
    }

    #[test]
    fn test_unmapped_characters_fall_back_to_generic() {
        let bank = TemplateBank::embedded();
        for ch in ['B', 'z', '7', '-', 'É'] {
            assert_eq!(
                anchor_count(bank.template_for(ch)),
                anchor_count(&bank.templates[GENERIC_TEMPLATE]),
            );
        }
    }

    #[test]
    fn test_bank_without_generic_is_rejected() {
        let bank: TemplateBank = serde_json::from_str(
            r#"{ "letters": {}, "templates": { "apex": { "strokes": [] } } }"#,
        )
        .unwrap();
        assert!(bank.validate().is_err());
    }

    #[test]
    fn test_dangling_letter_mapping_is_rejected() {
        let bank: TemplateBank = serde_json::from_str(
            r#"{ "letters": { "Q": "missing" }, "templates": { "generic": { "strokes": [] } } }"#,
        )
        .unwrap();
        assert!(bank.validate().is_err());
    }
}
