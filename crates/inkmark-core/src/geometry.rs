//! Rotation, handle and hit-testing math shared by annotations and the editor.
//!
//! Angles are in degrees, clockwise-positive in raster space (y grows down),
//! with 0° pointing up for the rotate handle.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// The kind of handle - determines what manipulation it performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    // Corner handles
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    // Edge midpoint handles
    Top,
    Bottom,
    Left,
    Right,
    // Endpoint handles (lines, arrows)
    Start,
    End,
    /// Speech balloon tail tip.
    Tail,
    /// Rotation handle, above the top edge.
    Rotate,
}

/// Which edges of a box a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeOwnership {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl HandleKind {
    /// The eight box handles, corners first.
    pub const BOX: [HandleKind; 8] = [
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomRight,
        HandleKind::BottomLeft,
        HandleKind::Top,
        HandleKind::Right,
        HandleKind::Bottom,
        HandleKind::Left,
    ];

    /// Edge-ownership rule: corners own two adjacent edges, edge midpoints one.
    pub fn edges(self) -> EdgeOwnership {
        let (left, top, right, bottom) = match self {
            HandleKind::TopLeft => (true, true, false, false),
            HandleKind::TopRight => (false, true, true, false),
            HandleKind::BottomLeft => (true, false, false, true),
            HandleKind::BottomRight => (false, false, true, true),
            HandleKind::Top => (false, true, false, false),
            HandleKind::Bottom => (false, false, false, true),
            HandleKind::Left => (true, false, false, false),
            HandleKind::Right => (false, false, true, false),
            HandleKind::Start | HandleKind::End | HandleKind::Tail | HandleKind::Rotate => {
                (false, false, false, false)
            }
        };
        EdgeOwnership { left, top, right, bottom }
    }

    /// Whether this handle resizes a bounding box.
    pub fn is_box_handle(self) -> bool {
        Self::BOX.contains(&self)
    }

    /// The box handle across from this one, which stays put while this one is
    /// dragged.
    pub fn opposite(self) -> Option<HandleKind> {
        Some(match self {
            HandleKind::TopLeft => HandleKind::BottomRight,
            HandleKind::TopRight => HandleKind::BottomLeft,
            HandleKind::BottomLeft => HandleKind::TopRight,
            HandleKind::BottomRight => HandleKind::TopLeft,
            HandleKind::Top => HandleKind::Bottom,
            HandleKind::Bottom => HandleKind::Top,
            HandleKind::Left => HandleKind::Right,
            HandleKind::Right => HandleKind::Left,
            HandleKind::Start | HandleKind::End | HandleKind::Tail | HandleKind::Rotate => return None,
        })
    }

    /// Position of a box handle on an unrotated box, relative to its center.
    fn box_offset(self, rect: Rect) -> Option<Vec2> {
        let hw = rect.width() / 2.0;
        let hh = rect.height() / 2.0;
        let offset = match self {
            HandleKind::TopLeft => Vec2::new(-hw, -hh),
            HandleKind::TopRight => Vec2::new(hw, -hh),
            HandleKind::BottomLeft => Vec2::new(-hw, hh),
            HandleKind::BottomRight => Vec2::new(hw, hh),
            HandleKind::Top => Vec2::new(0.0, -hh),
            HandleKind::Bottom => Vec2::new(0.0, hh),
            HandleKind::Left => Vec2::new(-hw, 0.0),
            HandleKind::Right => Vec2::new(hw, 0.0),
            _ => return None,
        };
        Some(offset)
    }
}

/// A manipulation handle in raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

impl Handle {
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self { kind, position }
    }

    /// Check if a point is within `radius` of this handle.
    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        (point - self.position).hypot2() <= radius * radius
    }
}

/// Normalized box spanned by two corners.
pub fn normalized_box(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

/// Rotate `point` around `center` by `degrees` (clockwise on screen).
pub fn rotate_point(point: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Corners of `rect` rotated around its center, clockwise from top-left.
pub fn rotated_corners(rect: Rect, degrees: f64) -> [Point; 4] {
    let center = rect.center();
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
    .map(|p| rotate_point(p, center, degrees))
}

/// Axis-aligned bounds of `rect` after rotation around its center.
pub fn rotated_bounds(rect: Rect, degrees: f64) -> Rect {
    if degrees == 0.0 {
        return rect;
    }
    points_bounds(&rotated_corners(rect, degrees)).unwrap_or(rect)
}

/// Bounding box of a point set, `None` if empty.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .skip(1)
            .fold(Rect::from_points(first, first), |acc, p| acc.union_pt(*p)),
    )
}

/// Handles for a resizable box, rotated with it.
///
/// `rotate_offset` adds a rotation handle that distance above the top-center.
pub fn box_handles(rect: Rect, degrees: f64, rotate_offset: Option<f64>) -> Vec<Handle> {
    let center = rect.center();
    let mut handles: Vec<Handle> = HandleKind::BOX
        .iter()
        .filter_map(|&kind| {
            let offset = kind.box_offset(rect)?;
            Some(Handle::new(kind, rotate_point(center + offset, center, degrees)))
        })
        .collect();
    if let Some(distance) = rotate_offset {
        handles.push(rotate_handle(rect, degrees, distance));
    }
    handles
}

/// The rotation handle: `distance` above the top-center, rotated with the box.
pub fn rotate_handle(rect: Rect, degrees: f64, distance: f64) -> Handle {
    let center = rect.center();
    let local = Point::new(center.x, rect.y0 - distance);
    Handle::new(HandleKind::Rotate, rotate_point(local, center, degrees))
}

/// New box edges after dragging `handle` to `local_point`.
///
/// `original` is the cached pre-resize box and `local_point` is already in the
/// box's unrotated frame. Edges not owned by the handle keep their cached
/// position. The result is not normalized: dragging past the opposite edge
/// flips the box.
pub fn resize_box(original: Rect, handle: HandleKind, local_point: Point) -> Rect {
    let edges = handle.edges();
    Rect::new(
        if edges.left { local_point.x } else { original.x0 },
        if edges.top { local_point.y } else { original.y0 },
        if edges.right { local_point.x } else { original.x1 },
        if edges.bottom { local_point.y } else { original.y1 },
    )
}

/// Resize a box rotated by `degrees` around its center by dragging `handle`
/// to `pointer` (raster coordinates).
///
/// The new edges come from [`resize_box`] in the frame of `original`. Since
/// the resized box rotates around its own center, it is then shifted so the
/// opposite handle keeps its on-screen position.
pub fn resize_rotated_box(original: Rect, handle: HandleKind, pointer: Point, degrees: f64) -> Rect {
    let center = original.center();
    let resized = resize_box(original, handle, rotate_point(pointer, center, -degrees));
    let Some((before, after)) = handle
        .opposite()
        .and_then(|anchor| anchor.box_offset(original).zip(anchor.box_offset(resized)))
    else {
        return resized;
    };
    let new_center = resized.center();
    let shift = rotate_point(center + before, center, degrees) - rotate_point(new_center + after, new_center, degrees);
    resized + shift
}

/// Rotation angle in degrees from `center` towards `pointer`.
///
/// 0° is straight up, clockwise-positive, in `[0, 360)`.
pub fn rotation_angle(center: Point, pointer: Point) -> f64 {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    dx.atan2(-dy).to_degrees().rem_euclid(360.0)
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => (point - *single).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Whether `point` lies inside the ellipse inscribed in `rect`.
pub fn point_in_ellipse(point: Point, rect: Rect) -> bool {
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = rect.center();
    let nx = (point.x - c.x) / rx;
    let ny = (point.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Inclusive containment test (kurbo's `contains` excludes the far edges).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether two normalized rectangles share any point.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let center = Point::new(0.0, 0.0);
        // Clockwise on screen: right -> down
        let p = rotate_point(Point::new(10.0, 0.0), center, 90.0);
        assert!(approx(p, Point::new(0.0, 10.0)));
        let back = rotate_point(p, center, -90.0);
        assert!(approx(back, Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_box_handles_unrotated() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let handles = box_handles(rect, 0.0, Some(20.0));
        assert_eq!(handles.len(), 9);
        let find = |kind| handles.iter().find(|h| h.kind == kind).unwrap().position;
        assert!(approx(find(HandleKind::BottomRight), Point::new(100.0, 50.0)));
        assert!(approx(find(HandleKind::Left), Point::new(0.0, 25.0)));
        assert!(approx(find(HandleKind::Rotate), Point::new(50.0, -20.0)));
    }

    #[test]
    fn test_rotate_handle_follows_rotation() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let handle = rotate_handle(rect, 90.0, 20.0);
        // Top of the box now points right.
        assert!(approx(handle.position, Point::new(120.0, 50.0)));
    }

    #[test]
    fn test_resize_corner_moves_two_edges() {
        let original = Rect::new(10.0, 10.0, 50.0, 50.0);
        let r = resize_box(original, HandleKind::BottomRight, Point::new(70.0, 80.0));
        assert_eq!(r, Rect::new(10.0, 10.0, 70.0, 80.0));
    }

    #[test]
    fn test_resize_edge_moves_one_edge() {
        let original = Rect::new(10.0, 10.0, 50.0, 50.0);
        let r = resize_box(original, HandleKind::Top, Point::new(999.0, 0.0));
        assert_eq!(r, Rect::new(10.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn test_rotated_resize_keeps_opposite_corner() {
        let original = Rect::new(100.0, 100.0, 200.0, 150.0);
        let anchor = |rect: Rect| {
            box_handles(rect, 90.0, None)
                .into_iter()
                .find(|h| h.kind == HandleKind::TopLeft)
                .unwrap()
                .position
        };
        let before = anchor(original);
        assert!(approx(before, Point::new(175.0, 75.0)));

        let resized = resize_rotated_box(original, HandleKind::BottomRight, Point::new(105.0, 215.0), 90.0);
        assert!((resized.width() - 140.0).abs() < 1e-9);
        assert!((resized.height() - 70.0).abs() < 1e-9);
        assert!(approx(anchor(resized), before));
        let dragged = box_handles(resized, 90.0, None)
            .into_iter()
            .find(|h| h.kind == HandleKind::BottomRight)
            .unwrap();
        assert!(approx(dragged.position, Point::new(105.0, 215.0)));
    }

    #[test]
    fn test_unrotated_resize_is_plain() {
        let original = Rect::new(10.0, 10.0, 50.0, 50.0);
        let r = resize_rotated_box(original, HandleKind::Right, Point::new(80.0, 0.0), 0.0);
        assert_eq!(r, Rect::new(10.0, 10.0, 80.0, 50.0));
    }

    #[test]
    fn test_rotation_angle() {
        let c = Point::new(50.0, 50.0);
        assert!((rotation_angle(c, Point::new(50.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((rotation_angle(c, Point::new(100.0, 50.0)) - 90.0).abs() < 1e-9);
        assert!((rotation_angle(c, Point::new(50.0, 100.0)) - 180.0).abs() < 1e-9);
        assert!((rotation_angle(c, Point::new(0.0, 50.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_distance() {
        let d = point_to_segment_dist(Point::new(5.0, 3.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-9);
        let d = point_to_segment_dist(Point::new(13.0, 4.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_bounds() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let b = rotated_bounds(rect, 90.0);
        assert!((b.width() - 20.0).abs() < 1e-9);
        assert!((b.height() - 100.0).abs() < 1e-9);
        assert!(approx(b.center(), rect.center()));
    }
}
