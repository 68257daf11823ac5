//! Rectangle and ellipse annotations.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::geometry;
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A rectangle or ellipse spanned by its two corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeAnnotation {
    pub base: AnnotationBase,
}

impl ShapeAnnotation {
    /// `tool` should be [`ToolKind::Rectangle`] or [`ToolKind::Ellipse`].
    pub fn new(tool: ToolKind, point: Point, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(tool, point, style),
        }
    }

    pub fn is_ellipse(&self) -> bool {
        self.base.tool == ToolKind::Ellipse
    }
}

impl AnnotationTrait for ShapeAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn hit_test(&self, point: Point, _slop: f64) -> bool {
        let rect = self.local_box();
        let local = geometry::rotate_point(point, rect.center(), -self.base.rotation);
        if self.is_ellipse() {
            geometry::point_in_ellipse(local, rect)
        } else {
            geometry::rect_contains(rect, local)
        }
    }

    fn supports_rotation(&self) -> bool {
        true
    }
}
