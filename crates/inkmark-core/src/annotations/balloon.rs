//! Speech balloons: a box with a pointing tail.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::geometry::{self, Handle, HandleKind};
use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechBalloonAnnotation {
    pub base: AnnotationBase,
    /// Tip of the tail.
    pub tail: Point,
}

impl SpeechBalloonAnnotation {
    pub fn new(point: Point, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(ToolKind::SpeechBalloon, point, style),
            tail: point,
        }
    }

    /// Place the tail below the left quarter of the box.
    pub fn reset_tail(&mut self) {
        let b = self.base.normalized();
        self.tail = Point::new(b.x0 + b.width() * 0.25, b.y1 + b.height() * 0.5);
    }

    /// Where the tail leaves the box: the bottom edge point nearest the tip.
    pub fn tail_root(&self) -> Point {
        let b = self.base.normalized();
        Point::new(self.tail.x.clamp(b.x0, b.x1), b.y1)
    }
}

impl AnnotationTrait for SpeechBalloonAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn bounds(&self) -> Rect {
        self.local_box().union_pt(self.tail)
    }

    fn hit_test(&self, point: Point, slop: f64) -> bool {
        if geometry::rect_contains(self.local_box(), point) {
            return true;
        }
        let tolerance = self.base.style.stroke_width / 2.0 + slop;
        geometry::point_to_segment_dist(point, self.tail_root(), self.tail) <= tolerance
    }

    fn map_points(&mut self, f: &mut dyn FnMut(Point) -> Point) {
        self.base.start = f(self.base.start);
        self.base.end = f(self.base.end);
        self.tail = f(self.tail);
    }

    fn handles(&self, _rotate_offset: f64) -> Vec<Handle> {
        let mut handles = geometry::box_handles(self.local_box(), 0.0, None);
        handles.push(Handle::new(HandleKind::Tail, self.tail));
        handles
    }
}
