//! Annotation definitions.
//!
//! Every annotation embeds an [`AnnotationBase`] with the shared fields and
//! implements [`AnnotationTrait`]. The [`Annotation`] enum is the owned, cloneable
//! form stored in the editor and in history snapshots; it dispatches through the
//! trait instead of branching on the concrete variant.

mod balloon;
mod effect;
mod freehand;
mod image;
mod line;
mod number;
mod region;
mod shape;
mod spotlight;
mod text;

pub use balloon::SpeechBalloonAnnotation;
pub use effect::EffectAnnotation;
pub use freehand::FreehandAnnotation;
pub use image::ImageAnnotation;
pub use line::LineAnnotation;
pub use number::NumberAnnotation;
pub use region::RegionAnnotation;
pub use shape::ShapeAnnotation;
pub use spotlight::SpotlightAnnotation;
pub use text::TextAnnotation;

use crate::geometry::{self, Handle};
use crate::tools::ToolKind;
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for annotations.
pub type AnnotationId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn red() -> Self {
        Self::new(229, 57, 53, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for SerializableColor {
    fn from(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties shared by all annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Draw a drop shadow under the annotation.
    #[serde(default)]
    pub shadow: bool,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::red(),
            stroke_width: 4.0,
            fill_color: None,
            shadow: true,
        }
    }
}

impl AnnotationStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }
}

/// Fields common to every annotation.
///
/// `start`/`end` are stored as drawn; for box annotations the normalized box is
/// derived from them at the point of use. For lines they are literal endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBase {
    pub(crate) id: AnnotationId,
    pub tool: ToolKind,
    pub start: Point,
    pub end: Point,
    /// Degrees, clockwise-positive, around the box center.
    #[serde(default)]
    pub rotation: f64,
    pub style: AnnotationStyle,
}

impl AnnotationBase {
    /// New base with a fresh Id and `start == end == point`.
    pub fn new(tool: ToolKind, point: Point, style: AnnotationStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            start: point,
            end: point,
            rotation: 0.0,
            style,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Normalized box spanned by `start` and `end`.
    pub fn normalized(&self) -> Rect {
        geometry::normalized_box(self.start, self.end)
    }
}

/// Capability contract implemented by every annotation variant.
pub trait AnnotationTrait {
    fn base(&self) -> &AnnotationBase;

    fn base_mut(&mut self) -> &mut AnnotationBase;

    /// Unrotated, normalized box in raster coordinates.
    fn local_box(&self) -> Rect {
        self.base().normalized()
    }

    /// Axis-aligned bounds, accounting for rotation. Used for layout and
    /// culling; precise hit-testing goes through [`AnnotationTrait::hit_test`].
    fn bounds(&self) -> Rect {
        geometry::rotated_bounds(self.local_box(), self.base().rotation)
    }

    /// Rotation-aware hit test. `slop` widens stroke-based tests only; box
    /// interiors are tested exactly.
    fn hit_test(&self, point: Point, slop: f64) -> bool {
        let _ = slop;
        let rect = self.local_box();
        let local = geometry::rotate_point(point, rect.center(), -self.base().rotation);
        geometry::rect_contains(rect, local)
    }

    /// Apply `f` to every stored coordinate (both corners, point lists, tails).
    fn map_points(&mut self, f: &mut dyn FnMut(Point) -> Point) {
        let base = self.base_mut();
        base.start = f(base.start);
        base.end = f(base.end);
    }

    /// Replace the box edges. `rect` may be un-normalized (flipped resize).
    fn set_box(&mut self, rect: Rect) {
        let base = self.base_mut();
        base.start = Point::new(rect.x0, rect.y0);
        base.end = Point::new(rect.x1, rect.y1);
    }

    /// Manipulation handles shown when selected.
    fn handles(&self, rotate_offset: f64) -> Vec<Handle> {
        let rotate = self.supports_rotation().then_some(rotate_offset);
        geometry::box_handles(self.local_box(), self.base().rotation, rotate)
    }

    fn supports_rotation(&self) -> bool {
        false
    }

    /// Whether box handles resize this annotation.
    fn is_resizable(&self) -> bool {
        true
    }
}

/// Enum wrapper for all annotation types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Shape(ShapeAnnotation),
    Line(LineAnnotation),
    Freehand(FreehandAnnotation),
    Text(TextAnnotation),
    Number(NumberAnnotation),
    SpeechBalloon(SpeechBalloonAnnotation),
    Spotlight(SpotlightAnnotation),
    Effect(EffectAnnotation),
    Image(ImageAnnotation),
    Region(RegionAnnotation),
}

impl Annotation {
    /// Borrow as the capability trait.
    pub fn as_dyn(&self) -> &dyn AnnotationTrait {
        match self {
            Annotation::Shape(a) => a,
            Annotation::Line(a) => a,
            Annotation::Freehand(a) => a,
            Annotation::Text(a) => a,
            Annotation::Number(a) => a,
            Annotation::SpeechBalloon(a) => a,
            Annotation::Spotlight(a) => a,
            Annotation::Effect(a) => a,
            Annotation::Image(a) => a,
            Annotation::Region(a) => a,
        }
    }

    /// Mutably borrow as the capability trait.
    pub fn as_dyn_mut(&mut self) -> &mut dyn AnnotationTrait {
        match self {
            Annotation::Shape(a) => a,
            Annotation::Line(a) => a,
            Annotation::Freehand(a) => a,
            Annotation::Text(a) => a,
            Annotation::Number(a) => a,
            Annotation::SpeechBalloon(a) => a,
            Annotation::Spotlight(a) => a,
            Annotation::Effect(a) => a,
            Annotation::Image(a) => a,
            Annotation::Region(a) => a,
        }
    }

    pub fn base(&self) -> &AnnotationBase {
        self.as_dyn().base()
    }

    pub fn id(&self) -> AnnotationId {
        self.base().id
    }

    pub fn tool(&self) -> ToolKind {
        self.base().tool
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.base().style
    }

    pub fn style_mut(&mut self) -> &mut AnnotationStyle {
        &mut self.as_dyn_mut().base_mut().style
    }

    pub fn bounds(&self) -> Rect {
        self.as_dyn().bounds()
    }

    pub fn local_box(&self) -> Rect {
        self.as_dyn().local_box()
    }

    pub fn hit_test(&self, point: Point, slop: f64) -> bool {
        self.as_dyn().hit_test(point, slop)
    }

    pub fn handles(&self, rotate_offset: f64) -> Vec<Handle> {
        self.as_dyn().handles(rotate_offset)
    }

    pub fn supports_rotation(&self) -> bool {
        self.as_dyn().supports_rotation()
    }

    pub fn is_resizable(&self) -> bool {
        self.as_dyn().is_resizable()
    }

    pub fn rotation(&self) -> f64 {
        self.base().rotation
    }

    /// Set the rotation; ignored for annotations that don't rotate.
    pub fn set_rotation(&mut self, degrees: f64) {
        if self.supports_rotation() {
            self.as_dyn_mut().base_mut().rotation = degrees.rem_euclid(360.0);
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_dyn_mut().map_points(&mut |p| p + delta);
    }

    pub fn map_points(&mut self, mut f: impl FnMut(Point) -> Point) {
        self.as_dyn_mut().map_points(&mut f);
    }

    pub fn set_box(&mut self, rect: Rect) {
        self.as_dyn_mut().set_box(rect);
    }

    /// Move a line endpoint or a balloon tail to `point`.
    pub fn move_control_point(&mut self, handle: crate::geometry::HandleKind, point: Point) {
        use crate::geometry::HandleKind;
        match (self, handle) {
            (Annotation::Line(line), HandleKind::Start) => line.base.start = point,
            (Annotation::Line(line), HandleKind::End) => line.base.end = point,
            (Annotation::SpeechBalloon(balloon), HandleKind::Tail) => balloon.tail = point,
            _ => {}
        }
    }

    /// Extend an in-progress drawing to `point`.
    pub fn extend_drawing(&mut self, point: Point) {
        match self {
            Annotation::Freehand(f) => f.add_point(point),
            Annotation::SpeechBalloon(b) => {
                b.base.end = point;
                b.reset_tail();
            }
            // Single-click annotations keep their placement.
            Annotation::Text(_) | Annotation::Number(_) => {}
            other => other.as_dyn_mut().base_mut().end = point,
        }
    }

    /// Whether a finished drawing is large enough to keep.
    pub fn meets_min_size(&self, min: f64) -> bool {
        match self {
            Annotation::Text(_) | Annotation::Number(_) | Annotation::Image(_) => true,
            Annotation::Line(line) => line.length() >= min,
            Annotation::Freehand(f) => {
                let b = f.local_box();
                f.points.len() >= 2 && (b.width() >= min || b.height() >= min)
            }
            other => {
                let b = other.local_box();
                b.width() >= min || b.height() >= min
            }
        }
    }

    /// Freehand strokes and eraser strokes.
    pub fn is_point_sequence(&self) -> bool {
        matches!(self, Annotation::Freehand(_))
    }

    /// Crop / cut-out regions that only live for one gesture.
    pub fn is_transient(&self) -> bool {
        matches!(self, Annotation::Region(_))
    }

    /// Deep copy with a fresh Id (copy/paste, duplicate).
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.regenerate_id();
        copy
    }

    /// Regenerate the annotation's ID with a new unique identifier.
    pub fn regenerate_id(&mut self) {
        self.as_dyn_mut().base_mut().id = Uuid::new_v4();
    }

    pub fn as_effect(&self) -> Option<&EffectAnnotation> {
        match self {
            Annotation::Effect(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_effect_mut(&mut self) -> Option<&mut EffectAnnotation> {
        match self {
            Annotation::Effect(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextAnnotation> {
        match self {
            Annotation::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextAnnotation> {
        match self {
            Annotation::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Copy suitable for history: effect caches are dropped and regenerated on
    /// restore.
    pub fn snapshot(&self) -> Self {
        match self {
            Annotation::Effect(e) => {
                let mut e = e.clone();
                e.invalidate();
                Annotation::Effect(e)
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;

    fn style() -> AnnotationStyle {
        AnnotationStyle::default()
    }

    #[test]
    fn test_color_round_trip_through_peniko() {
        let color = SerializableColor::new(12, 34, 56, 78);
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }

    #[test]
    fn test_duplicate_gets_new_id() {
        let rect = Annotation::Shape(ShapeAnnotation::new(ToolKind::Rectangle, Point::new(0.0, 0.0), style()));
        let copy = rect.duplicate();
        assert_ne!(copy.id(), rect.id());
        assert_eq!(copy.local_box(), rect.local_box());
    }

    #[test]
    fn test_clone_is_independent_for_every_variant() {
        let origin = Point::new(10.0, 10.0);
        let mut freehand = FreehandAnnotation::new(ToolKind::Freehand, origin, style());
        freehand.add_point(Point::new(20.0, 20.0));
        let raster = Raster::filled(4, 4, [1, 2, 3, 255]).unwrap();
        let mut effect = EffectAnnotation::new(crate::effects::EffectKind::Blur, 2.0, origin, style());
        effect.base.end = Point::new(14.0, 14.0);
        effect.update_effect(&raster, &crate::effects::BuiltinEffects).unwrap();

        let originals = vec![
            Annotation::Shape(ShapeAnnotation::new(ToolKind::Ellipse, origin, style())),
            Annotation::Line(LineAnnotation::new(ToolKind::Arrow, origin, style())),
            Annotation::Freehand(freehand),
            Annotation::Text(TextAnnotation::new(origin, "hi".into(), 20.0, style())),
            Annotation::Number(NumberAnnotation::new(1, origin, style())),
            Annotation::SpeechBalloon(SpeechBalloonAnnotation::new(origin, style())),
            Annotation::Spotlight(SpotlightAnnotation::new(origin, 0.5, kurbo::Size::new(100.0, 100.0), style())),
            Annotation::Effect(effect),
            Annotation::Image(ImageAnnotation::new(raster.clone(), origin, style())),
            Annotation::Region(RegionAnnotation::new(ToolKind::Crop, origin, style())),
        ];

        for original in &originals {
            let mut copy = original.clone();
            copy.translate(Vec2::new(5.0, 7.0));
            copy.style_mut().stroke_width = 99.0;
            match &mut copy {
                Annotation::Freehand(f) => f.points[0] = Point::new(-1.0, -1.0),
                Annotation::Image(i) => i.raster = Raster::new(1, 1).unwrap(),
                Annotation::Text(t) => t.text.push('!'),
                Annotation::Effect(e) => e.invalidate(),
                _ => {}
            }
            assert_ne!(&copy, original, "{:?}", original.tool());
            assert!((original.style().stroke_width - 4.0).abs() < f64::EPSILON);
        }

        match &originals[2] {
            Annotation::Freehand(f) => assert_eq!(f.points[0], origin),
            _ => unreachable!(),
        }
        match &originals[7] {
            Annotation::Effect(e) => assert!(e.effect_bitmap().is_some()),
            _ => unreachable!(),
        }
        match &originals[8] {
            Annotation::Image(i) => assert_eq!(i.raster.width(), 4),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_snapshot_drops_effect_cache() {
        let raster = Raster::filled(8, 8, [9, 9, 9, 255]).unwrap();
        let mut effect = EffectAnnotation::new(crate::effects::EffectKind::Pixelate, 2.0, Point::new(0.0, 0.0), style());
        effect.base.end = Point::new(4.0, 4.0);
        effect.update_effect(&raster, &crate::effects::BuiltinEffects).unwrap();
        let snap = Annotation::Effect(effect).snapshot();
        assert!(snap.as_effect().unwrap().effect_bitmap().is_none());
    }

    #[test]
    fn test_min_size() {
        let mut rect = Annotation::Shape(ShapeAnnotation::new(ToolKind::Rectangle, Point::new(0.0, 0.0), style()));
        assert!(!rect.meets_min_size(3.0));
        rect.extend_drawing(Point::new(2.0, 2.0));
        assert!(!rect.meets_min_size(3.0));
        rect.extend_drawing(Point::new(20.0, 2.0));
        assert!(rect.meets_min_size(3.0));

        let number = Annotation::Number(NumberAnnotation::new(1, Point::new(0.0, 0.0), style()));
        assert!(number.meets_min_size(3.0));
    }
}
