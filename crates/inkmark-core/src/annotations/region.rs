//! Crop and cut-out selection regions.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::geometry::Handle;
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Rubber-band region drawn by the crop and cut-out tools.
///
/// Consumed when the gesture ends; never kept in the annotation list or history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAnnotation {
    pub base: AnnotationBase,
}

impl RegionAnnotation {
    pub fn new(tool: ToolKind, point: Point, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(tool, point, style),
        }
    }
}

impl AnnotationTrait for RegionAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn handles(&self, _rotate_offset: f64) -> Vec<Handle> {
        Vec::new()
    }

    fn is_resizable(&self) -> bool {
        false
    }
}
