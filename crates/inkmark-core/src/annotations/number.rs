//! Numbered step markers.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::geometry::Handle;
use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A filled circle with a sequential number, centered on `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberAnnotation {
    pub base: AnnotationBase,
    pub number: u32,
}

impl NumberAnnotation {
    const BASE_RADIUS: f64 = 12.0;

    pub fn new(number: u32, center: Point, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(ToolKind::Number, center, style),
            number,
        }
    }

    pub fn center(&self) -> Point {
        self.base.start
    }

    /// Radius derived from the stroke width.
    pub fn radius(&self) -> f64 {
        Self::BASE_RADIUS + self.base.style.stroke_width * 1.5
    }
}

impl AnnotationTrait for NumberAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn local_box(&self) -> Rect {
        let c = self.center();
        let r = self.radius();
        Rect::new(c.x - r, c.y - r, c.x + r, c.y + r)
    }

    fn hit_test(&self, point: Point, _slop: f64) -> bool {
        (point - self.center()).hypot() <= self.radius()
    }

    fn set_box(&mut self, rect: Rect) {
        let center = rect.center();
        self.base.start = center;
        self.base.end = center;
    }

    fn handles(&self, _rotate_offset: f64) -> Vec<Handle> {
        Vec::new()
    }

    fn is_resizable(&self) -> bool {
        false
    }
}
