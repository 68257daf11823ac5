//! Spotlight: darkens everything outside the box.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::tools::ToolKind;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotlightAnnotation {
    pub base: AnnotationBase,
    /// Opacity of the dark overlay outside the box (0..=1).
    pub darken_opacity: f64,
    /// Size of the raster the overlay covers; updated when the raster changes.
    pub canvas_size: Size,
}

impl SpotlightAnnotation {
    pub fn new(point: Point, darken_opacity: f64, canvas_size: Size, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(ToolKind::Spotlight, point, style),
            darken_opacity: darken_opacity.clamp(0.0, 1.0),
            canvas_size,
        }
    }
}

impl AnnotationTrait for SpotlightAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }
}
