//! Line and arrow annotations.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::geometry::{self, Handle, HandleKind};
use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight line between two literal endpoints, optionally with an arrow head
/// at `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAnnotation {
    pub base: AnnotationBase,
}

impl LineAnnotation {
    /// `tool` should be [`ToolKind::Line`] or [`ToolKind::Arrow`].
    pub fn new(tool: ToolKind, point: Point, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(tool, point, style),
        }
    }

    pub fn is_arrow(&self) -> bool {
        self.base.tool == ToolKind::Arrow
    }

    pub fn length(&self) -> f64 {
        (self.base.end - self.base.start).hypot()
    }

    /// Arrow head length, scaled with the stroke.
    pub fn head_length(&self) -> f64 {
        (self.base.style.stroke_width * 3.0).max(10.0)
    }

    /// The two barb tips of the arrow head, `None` for plain lines or
    /// degenerate arrows.
    pub fn head_points(&self) -> Option<(Point, Point)> {
        if !self.is_arrow() || self.length() < f64::EPSILON {
            return None;
        }
        let dir = (self.base.end - self.base.start).normalize();
        let back = self.base.end - dir * self.head_length();
        let normal = kurbo::Vec2::new(-dir.y, dir.x) * (self.head_length() / 2.0);
        Some((back + normal, back - normal))
    }
}

impl AnnotationTrait for LineAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn local_box(&self) -> Rect {
        self.base.normalized()
    }

    fn bounds(&self) -> Rect {
        self.local_box()
    }

    fn hit_test(&self, point: Point, slop: f64) -> bool {
        let tolerance = self.base.style.stroke_width / 2.0 + slop;
        geometry::point_to_segment_dist(point, self.base.start, self.base.end) <= tolerance
    }

    fn handles(&self, _rotate_offset: f64) -> Vec<Handle> {
        vec![
            Handle::new(HandleKind::Start, self.base.start),
            Handle::new(HandleKind::End, self.base.end),
        ]
    }

    fn is_resizable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(style_width: f64) -> LineAnnotation {
        let mut style = AnnotationStyle::default();
        style.stroke_width = style_width;
        let mut line = LineAnnotation::new(ToolKind::Line, Point::new(0.0, 0.0), style);
        line.base.end = Point::new(100.0, 0.0);
        line
    }

    #[test]
    fn test_hit_test_uses_stroke_tolerance() {
        let line = line(4.0);
        assert!(line.hit_test(Point::new(50.0, 4.0), 2.0));
        assert!(!line.hit_test(Point::new(50.0, 5.0), 2.0));
    }

    #[test]
    fn test_only_endpoint_handles() {
        let handles = line(2.0).handles(24.0);
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0].kind, HandleKind::Start);
        assert_eq!(handles[1].position, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_arrow_head() {
        let mut arrow = line(2.0);
        assert!(arrow.head_points().is_none());
        arrow.base.tool = ToolKind::Arrow;
        let (a, b) = arrow.head_points().unwrap();
        assert!((a.x - 90.0).abs() < 1e-9);
        assert!((a.y + b.y).abs() < 1e-9);
    }
}
