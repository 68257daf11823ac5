//! Pointer state machine: drawing, dragging, resizing and rotating.

use super::{Editor, EditorEvent};
use crate::annotations::{Annotation, AnnotationId};
use crate::geometry::{self, HandleKind};
use crate::raster::Axis;
use crate::tools::{self, ToolContext, ToolKind};
use kurbo::{Point, Rect, Vec2};

/// What the pointer is currently doing.
///
/// Gesture states record whether the pre-gesture memento has been taken. It
/// is taken on the first pointer move that changes the annotation, so a plain
/// click never adds an undo entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A new annotation is being drawn.
    Drawing { id: AnnotationId },
    /// The annotation follows the pointer.
    DraggingShape {
        id: AnnotationId,
        last: Point,
        snapshot_taken: bool,
    },
    /// A handle is being dragged.
    Resizing {
        id: AnnotationId,
        handle: HandleKind,
        /// Unrotated box at gesture start.
        original_box: Rect,
        origin: Point,
        snapshot_taken: bool,
    },
    /// The rotate handle is being dragged.
    Rotating {
        id: AnnotationId,
        center: Point,
        origin: Point,
        snapshot_taken: bool,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// The annotation the current gesture acts on.
    pub fn target(&self) -> Option<AnnotationId> {
        match *self {
            InteractionState::Idle => None,
            InteractionState::Drawing { id }
            | InteractionState::DraggingShape { id, .. }
            | InteractionState::Resizing { id, .. }
            | InteractionState::Rotating { id, .. } => Some(id),
        }
    }

    fn snapshot_taken(&self) -> bool {
        match *self {
            InteractionState::DraggingShape { snapshot_taken, .. }
            | InteractionState::Resizing { snapshot_taken, .. }
            | InteractionState::Rotating { snapshot_taken, .. } => snapshot_taken,
            _ => false,
        }
    }
}

impl Editor {
    /// Pointer button pressed at `point`.
    ///
    /// The right button deletes the topmost annotation under the pointer.
    pub fn on_pointer_pressed(&mut self, point: Point, is_right_button: bool) {
        if !self.state.is_idle() {
            self.abandon_gesture();
        }

        if is_right_button {
            if let Some(id) = self.annotation_at(point) {
                log::debug!("Deleting annotation {} by right click", id);
                self.delete_annotation(id);
            }
            return;
        }

        if let Some(state) = self.grab_selected(point) {
            self.state = state;
            return;
        }

        if self.tool == ToolKind::Select {
            let hit = self.annotation_at(point);
            self.set_selection(hit);
            if let Some(id) = hit {
                self.state = InteractionState::DraggingShape {
                    id,
                    last: point,
                    snapshot_taken: false,
                };
            }
            return;
        }

        let ctx = ToolContext {
            style: &self.style,
            settings: &self.settings,
            raster: &self.raster,
            next_number: self.next_number(),
        };
        let Some(annotation) = tools::create_annotation(self.tool, point, &ctx) else {
            return;
        };
        let id = annotation.id();
        self.set_selection(None);
        self.annotations.push(annotation);
        self.state = InteractionState::Drawing { id };
        self.refresh_effects();
        self.emit(EditorEvent::InvalidateRequested);
    }

    /// Start a gesture on the selected annotation if `point` is on one of its
    /// handles or on its body.
    fn grab_selected(&self, point: Point) -> Option<InteractionState> {
        let annotation = self.selected()?;
        let id = annotation.id();

        let radius = self.settings.handle_hit_radius;
        let handle = annotation
            .handles(self.settings.rotate_handle_offset)
            .into_iter()
            .filter(|h| h.hit_test(point, radius))
            .min_by(|a, b| {
                let da = (a.position - point).hypot2();
                let db = (b.position - point).hypot2();
                da.total_cmp(&db)
            });

        if let Some(handle) = handle {
            let original_box = annotation.local_box();
            return Some(match handle.kind {
                HandleKind::Rotate => InteractionState::Rotating {
                    id,
                    center: original_box.center(),
                    origin: point,
                    snapshot_taken: false,
                },
                kind => InteractionState::Resizing {
                    id,
                    handle: kind,
                    original_box,
                    origin: point,
                    snapshot_taken: false,
                },
            });
        }

        annotation
            .hit_test(point, self.settings.line_hit_slop)
            .then_some(InteractionState::DraggingShape {
                id,
                last: point,
                snapshot_taken: false,
            })
    }

    /// Pointer moved to `point` (with or without a button held).
    pub fn on_pointer_moved(&mut self, point: Point) {
        match self.state {
            InteractionState::Idle => return,
            InteractionState::Drawing { id } => {
                if let Some(annotation) = self.annotation_mut(id) {
                    annotation.extend_drawing(point);
                }
                if let Some(effect) = self.annotation_mut(id).and_then(Annotation::as_effect_mut) {
                    effect.invalidate();
                }
            }
            InteractionState::DraggingShape { id, last, .. } => {
                let delta = point - last;
                if delta == Vec2::ZERO {
                    return;
                }
                self.take_gesture_snapshot();
                if let Some(annotation) = self.annotation_mut(id) {
                    annotation.translate(delta);
                }
                if let InteractionState::DraggingShape { last, .. } = &mut self.state {
                    *last = point;
                }
            }
            InteractionState::Resizing {
                id,
                handle,
                original_box,
                origin,
                snapshot_taken,
            } => {
                if point == origin && !snapshot_taken {
                    return;
                }
                self.take_gesture_snapshot();
                let Some(annotation) = self.annotation_mut(id) else {
                    return;
                };
                if handle.is_box_handle() {
                    if annotation.is_resizable() {
                        let rotation = annotation.rotation();
                        annotation.set_box(geometry::resize_rotated_box(original_box, handle, point, rotation));
                    }
                } else {
                    annotation.move_control_point(handle, point);
                }
            }
            InteractionState::Rotating {
                id,
                center,
                origin,
                snapshot_taken,
            } => {
                if point == origin && !snapshot_taken {
                    return;
                }
                self.take_gesture_snapshot();
                if let Some(annotation) = self.annotation_mut(id) {
                    annotation.set_rotation(geometry::rotation_angle(center, point));
                }
            }
        }
        self.refresh_effects();
        self.emit(EditorEvent::InvalidateRequested);
    }

    /// Push the pre-gesture memento once per gesture.
    fn take_gesture_snapshot(&mut self) {
        let already = match &mut self.state {
            InteractionState::DraggingShape { snapshot_taken, .. }
            | InteractionState::Resizing { snapshot_taken, .. }
            | InteractionState::Rotating { snapshot_taken, .. } => std::mem::replace(snapshot_taken, true),
            _ => return,
        };
        if !already {
            // Forced so that cancelling can always pop exactly this entry.
            self.push_memento(None, true);
        }
    }

    /// Pointer button released at `point`; finishes the current gesture.
    pub fn on_pointer_released(&mut self, point: Point) {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => {}
            InteractionState::Drawing { id } => self.finish_drawing(id, point),
            _ => {
                self.refresh_effects();
                self.emit(EditorEvent::InvalidateRequested);
            }
        }
    }

    fn finish_drawing(&mut self, id: AnnotationId, point: Point) {
        if let Some(annotation) = self.annotation_mut(id) {
            annotation.extend_drawing(point);
        }
        let Some(index) = self.index_of(id) else {
            return;
        };

        if self.annotations[index].is_transient() {
            let region = self.annotations.remove(index);
            if region.meets_min_size(self.settings.min_annotation_size) {
                self.apply_region(region.tool(), region.local_box());
            }
            self.emit(EditorEvent::InvalidateRequested);
            return;
        }

        let tool = self.annotations[index].tool();
        if !tool.is_single_click() && !self.annotations[index].meets_min_size(self.settings.min_annotation_size) {
            log::debug!("Discarding {:?} below minimum size", tool);
            self.annotations.remove(index);
            self.emit(EditorEvent::InvalidateRequested);
            return;
        }

        self.push_memento(Some(id), true);
        if !self.annotations[index].is_point_sequence() {
            self.set_selection(Some(id));
        }
        if tool == ToolKind::Text {
            self.emit(EditorEvent::EditAnnotationRequested(id));
        }
        self.refresh_effects();
        self.emit(EditorEvent::InvalidateRequested);
    }

    /// Run the crop or cut-out a finished region gesture describes.
    fn apply_region(&mut self, tool: ToolKind, rect: Rect) {
        let result = match tool.cut_axis() {
            Some(Axis::Vertical) => self.cut_out(Axis::Vertical, rect.x0, rect.x1),
            Some(Axis::Horizontal) => self.cut_out(Axis::Horizontal, rect.y0, rect.y1),
            None => self.crop(rect),
        };
        match result {
            Ok(true) => {}
            Ok(false) => log::debug!("{:?} region {:?} changed nothing", tool, rect),
            Err(e) => log::warn!("{:?} failed: {}", tool, e),
        }
    }

    /// Double click: request inline editing of the text under the pointer.
    pub fn on_double_click(&mut self, point: Point) {
        let Some(id) = self.annotation_at(point) else {
            return;
        };
        if self.annotation(id).and_then(Annotation::as_text).is_some() {
            self.set_selection(Some(id));
            self.emit(EditorEvent::EditAnnotationRequested(id));
        }
    }

    /// Abort the current gesture, restoring the pre-gesture state.
    pub fn cancel_gesture(&mut self) {
        let state = std::mem::take(&mut self.state);
        match state {
            InteractionState::Idle => return,
            InteractionState::Drawing { id } => self.annotations.retain(|a| a.id() != id),
            _ if state.snapshot_taken() => {
                if let Some(memento) = self.history.discard_last() {
                    self.annotations = memento.annotations;
                    self.selected = memento.selected.filter(|id| self.index_of(*id).is_some());
                    self.refresh_effects();
                    self.emit(EditorEvent::AnnotationsRestored);
                    self.emit(EditorEvent::HistoryChanged);
                }
            }
            _ => {}
        }
        self.emit(EditorEvent::InvalidateRequested);
    }

    /// End the current gesture without side effects on history: an
    /// in-progress drawing is dropped, other gestures keep their changes.
    pub(crate) fn abandon_gesture(&mut self) {
        if let InteractionState::Drawing { id } = std::mem::take(&mut self.state) {
            self.annotations.retain(|a| a.id() != id);
            self.emit(EditorEvent::InvalidateRequested);
        }
    }
}
