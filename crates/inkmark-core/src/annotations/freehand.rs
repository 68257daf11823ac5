//! Freehand strokes and smart-eraser strokes.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait, SerializableColor};
use crate::geometry::{self, Handle};
use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand drawing (series of points).
///
/// Smart-eraser strokes are freehand strokes painted with a color sampled from
/// the raster under the first point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreehandAnnotation {
    pub base: AnnotationBase,
    /// Points in the stroke, in drawing order.
    pub points: Vec<Point>,
    /// Background color sampled for eraser strokes.
    #[serde(default)]
    pub eraser_color: Option<SerializableColor>,
}

impl FreehandAnnotation {
    /// Start a stroke at `point`.
    pub fn new(tool: ToolKind, point: Point, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(tool, point, style),
            points: vec![point],
            eraser_color: None,
        }
    }

    /// Start an eraser stroke painting with the sampled `background`.
    pub fn eraser(point: Point, background: SerializableColor, mut style: AnnotationStyle) -> Self {
        style.stroke_color = background;
        style.fill_color = None;
        style.shadow = false;
        let mut stroke = Self::new(ToolKind::SmartEraser, point, style);
        stroke.eraser_color = Some(background);
        stroke
    }

    pub fn is_eraser(&self) -> bool {
        self.eraser_color.is_some()
    }

    /// Add a point to the stroke.
    pub fn add_point(&mut self, point: Point) {
        if self.points.last() == Some(&point) {
            return;
        }
        self.points.push(point);
        self.base.end = point;
    }

    /// Color the stroke is painted with.
    pub fn paint_color(&self) -> SerializableColor {
        self.eraser_color.unwrap_or(self.base.style.stroke_color)
    }
}

impl AnnotationTrait for FreehandAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn local_box(&self) -> Rect {
        geometry::points_bounds(&self.points).unwrap_or_else(|| self.base.normalized())
    }

    fn bounds(&self) -> Rect {
        self.local_box()
    }

    fn hit_test(&self, point: Point, slop: f64) -> bool {
        let tolerance = self.base.style.stroke_width / 2.0 + slop;
        geometry::point_to_polyline_dist(point, &self.points) <= tolerance
    }

    fn map_points(&mut self, f: &mut dyn FnMut(Point) -> Point) {
        self.base.start = f(self.base.start);
        self.base.end = f(self.base.end);
        for p in &mut self.points {
            *p = f(*p);
        }
    }

    fn handles(&self, _rotate_offset: f64) -> Vec<Handle> {
        Vec::new()
    }

    fn is_resizable(&self) -> bool {
        false
    }
}
