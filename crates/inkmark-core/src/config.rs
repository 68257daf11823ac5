//! Editor settings.

use crate::annotations::AnnotationStyle;
use crate::effects::EffectKind;
use serde::{Deserialize, Serialize};

/// Default strength for each effect kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectStrengths {
    /// Gaussian sigma in pixels.
    pub blur: f64,
    /// Block size in pixels.
    pub pixelate: f64,
    /// Zoom factor.
    pub magnify: f64,
    /// Tint amount (0..=1).
    pub highlight: f64,
}

impl Default for EffectStrengths {
    fn default() -> Self {
        Self {
            blur: 6.0,
            pixelate: 10.0,
            magnify: 2.0,
            highlight: 1.0,
        }
    }
}

impl EffectStrengths {
    pub fn get(&self, kind: EffectKind) -> f64 {
        match kind {
            EffectKind::Blur => self.blur,
            EffectKind::Pixelate => self.pixelate,
            EffectKind::Magnify => self.magnify,
            EffectKind::Highlight => self.highlight,
        }
    }
}

/// Tunables for the editing engine.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Drawn annotations smaller than this (in both dimensions) are discarded.
    pub min_annotation_size: f64,
    /// Pointer distance within which a handle counts as hit.
    pub handle_hit_radius: f64,
    /// Distance of the rotate handle above the top edge.
    pub rotate_handle_offset: f64,
    /// Extra slack added to half the stroke width when hit-testing strokes.
    pub line_hit_slop: f64,
    /// Font size for new text annotations.
    pub default_font_size: f64,
    /// Darkening applied outside a spotlight (0 = none, 1 = black).
    pub spotlight_opacity: f64,
    /// Offset applied to pasted annotations so they don't cover the source.
    pub paste_offset: f64,
    pub effect_strength: EffectStrengths,
    /// Style applied to newly drawn annotations.
    pub default_style: AnnotationStyle,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            min_annotation_size: 3.0,
            handle_hit_radius: 8.0,
            rotate_handle_offset: 24.0,
            line_hit_slop: 3.0,
            default_font_size: 20.0,
            spotlight_opacity: 0.5,
            paste_offset: 10.0,
            effect_strength: EffectStrengths::default(),
            default_style: AnnotationStyle::default(),
        }
    }
}

impl EditorSettings {
    /// Load settings from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = EditorSettings::from_json(r#"{ "min_annotation_size": 8.0, "effect_strength": { "blur": 2.5 } }"#).unwrap();
        assert!((settings.min_annotation_size - 8.0).abs() < f64::EPSILON);
        assert!((settings.effect_strength.blur - 2.5).abs() < f64::EPSILON);
        assert!((settings.effect_strength.pixelate - 10.0).abs() < f64::EPSILON);
        assert!((settings.handle_hit_radius - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json() {
        assert!(EditorSettings::from_json("{ not json").is_err());
    }
}
