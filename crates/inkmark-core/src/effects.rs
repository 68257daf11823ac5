//! Pixel effects consumed by the editor.
//!
//! The editor only depends on the [`EffectProcessor`] trait. [`BuiltinEffects`]
//! is a CPU implementation on top of `image::imageops`; hosts can inject their
//! own (for example a GPU-backed one).

use crate::error::EffectError;
use crate::raster::Raster;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

/// Available region effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Blur,
    Pixelate,
    Magnify,
    Highlight,
}

impl EffectKind {
    /// All effect kinds.
    pub fn all() -> &'static [EffectKind] {
        &[
            EffectKind::Blur,
            EffectKind::Pixelate,
            EffectKind::Magnify,
            EffectKind::Highlight,
        ]
    }
}

/// A pure `raster × params → raster` function.
///
/// Implementations must return a raster of the same dimensions as `source`.
pub trait EffectProcessor {
    fn apply(&self, kind: EffectKind, strength: f64, source: &Raster) -> Result<Raster, EffectError>;
}

/// Highlighter tint (multiplied into the source).
const HIGHLIGHT_TINT: [f64; 3] = [1.0, 0.92, 0.23];

/// CPU effects built on `image::imageops`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEffects;

impl EffectProcessor for BuiltinEffects {
    fn apply(&self, kind: EffectKind, strength: f64, source: &Raster) -> Result<Raster, EffectError> {
        if !strength.is_finite() || strength <= 0.0 {
            return Err(EffectError::InvalidStrength(format!("{:?}: {}", kind, strength)));
        }
        let image = source.as_image();
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(EffectError::EmptySource);
        }

        let output = match kind {
            EffectKind::Blur => imageops::blur(image, strength as f32),
            EffectKind::Pixelate => {
                let block = (strength.round() as u32).max(1);
                let small = imageops::resize(image, (w / block).max(1), (h / block).max(1), FilterType::Triangle);
                imageops::resize(&small, w, h, FilterType::Nearest)
            }
            EffectKind::Magnify => {
                let factor = strength.max(1.0);
                let zw = ((w as f64 / factor).round() as u32).clamp(1, w);
                let zh = ((h as f64 / factor).round() as u32).clamp(1, h);
                let region = imageops::crop_imm(image, (w - zw) / 2, (h - zh) / 2, zw, zh).to_image();
                imageops::resize(&region, w, h, FilterType::CatmullRom)
            }
            EffectKind::Highlight => {
                let amount = strength.min(1.0);
                let mut out = image.clone();
                for pixel in out.pixels_mut() {
                    for (channel, tint) in pixel.0.iter_mut().zip(HIGHLIGHT_TINT) {
                        let value = *channel as f64;
                        *channel = (value + (value * tint - value) * amount).round() as u8;
                    }
                }
                out
            }
        };

        Raster::from_image(output).map_err(|e| EffectError::Failed(e.to_string()))
    }
}
