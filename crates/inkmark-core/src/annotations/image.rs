//! Embedded image annotations.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::raster::Raster;
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A pasted or inserted raster, drawn stretched into its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotation {
    pub base: AnnotationBase,
    /// Owned pixels; cloning the annotation copies them.
    pub raster: Raster,
}

impl ImageAnnotation {
    /// Place `raster` at its natural size with the top-left corner at `at`.
    pub fn new(raster: Raster, at: Point, style: AnnotationStyle) -> Self {
        let mut base = AnnotationBase::new(ToolKind::Image, at, style);
        base.end = Point::new(at.x + raster.width() as f64, at.y + raster.height() as f64);
        Self { base, raster }
    }
}

impl AnnotationTrait for ImageAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn supports_rotation(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_size() {
        let raster = Raster::new(30, 20).unwrap();
        let image = ImageAnnotation::new(raster, Point::new(5.0, 5.0), AnnotationStyle::default());
        let b = image.bounds();
        assert!((b.width() - 30.0).abs() < f64::EPSILON);
        assert!((b.height() - 20.0).abs() < f64::EPSILON);
    }
}
