//! The editing engine: annotation list, raster, selection, history and the
//! pointer state machine.

mod arrange;
mod destructive;
mod events;
mod interaction;

pub use events::{EditorEvent, EditorObserver};
pub use interaction::InteractionState;

use crate::annotations::{Annotation, AnnotationId, AnnotationStyle, ImageAnnotation};
use crate::config::EditorSettings;
use crate::effects::{BuiltinEffects, EffectProcessor};
use crate::geometry::Handle;
use crate::history::{HistoryManager, Memento};
use crate::raster::Raster;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};

/// An image plus the annotations drawn over it.
///
/// The editor is driven by a host: pointer events go to
/// [`on_pointer_pressed`](Self::on_pointer_pressed) and friends, everything else
/// through the public operations. Changes are reported to subscribed
/// [`EditorObserver`]s.
pub struct Editor {
    /// Annotations in z-order (back to front).
    annotations: Vec<Annotation>,
    raster: Raster,
    selected: Option<AnnotationId>,
    state: InteractionState,
    tool: ToolKind,
    /// Style given to newly drawn annotations.
    style: AnnotationStyle,
    settings: EditorSettings,
    history: HistoryManager,
    effects: Box<dyn EffectProcessor>,
    observers: Vec<Box<dyn EditorObserver>>,
}

impl Editor {
    /// Create an editor over `raster` with default settings and the built-in effects.
    pub fn new(raster: Raster) -> Self {
        Self::with_settings(raster, EditorSettings::default())
    }

    pub fn with_settings(raster: Raster, settings: EditorSettings) -> Self {
        Self::with_effects(raster, settings, Box::new(BuiltinEffects))
    }

    /// Create an editor with a custom effect processor.
    pub fn with_effects(raster: Raster, settings: EditorSettings, effects: Box<dyn EffectProcessor>) -> Self {
        let style = settings.default_style.clone();
        Self {
            annotations: Vec::new(),
            raster,
            selected: None,
            state: InteractionState::Idle,
            tool: ToolKind::Select,
            style,
            settings,
            history: HistoryManager::new(),
            effects,
            observers: Vec::new(),
        }
    }

    /// Register an observer for change notifications.
    pub fn subscribe(&mut self, observer: Box<dyn EditorObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn emit(&self, event: EditorEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub(crate) fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id() == id)
    }

    pub(crate) fn index_of(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id() == id)
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch the active tool. Any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool == tool {
            return;
        }
        self.abandon_gesture();
        log::debug!("Tool changed: {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Set the style used for newly drawn annotations.
    pub fn set_style(&mut self, style: AnnotationStyle) {
        self.style = style;
    }

    // --- Selection ---

    pub fn selected_id(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.annotation(id))
    }

    /// Select an annotation. Returns false if no such annotation exists.
    pub fn select(&mut self, id: AnnotationId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.set_selection(Some(id));
        true
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    pub(crate) fn set_selection(&mut self, id: Option<AnnotationId>) {
        if self.selected == id {
            return;
        }
        self.selected = id;
        self.emit(EditorEvent::SelectionChanged(id));
        self.emit(EditorEvent::InvalidateRequested);
    }

    /// Handles of the selected annotation, for drawing.
    pub fn selection_handles(&self) -> Vec<Handle> {
        self.selected()
            .map(|a| a.handles(self.settings.rotate_handle_offset))
            .unwrap_or_default()
    }

    /// The topmost annotation under `point`.
    pub fn annotation_at(&self, point: Point) -> Option<AnnotationId> {
        self.annotations
            .iter()
            .rev()
            .filter(|a| !a.is_transient())
            .find(|a| a.hit_test(point, self.settings.line_hit_slop))
            .map(Annotation::id)
    }

    // --- History ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Record the current annotation state before a change.
    pub(crate) fn push_memento(&mut self, exclude: Option<AnnotationId>, force: bool) -> bool {
        let pushed = self
            .history
            .create_annotations_memento(&self.annotations, self.selected, exclude, force);
        if pushed {
            self.emit(EditorEvent::HistoryChanged);
        }
        pushed
    }

    /// Record the current annotation state and raster before a raster change.
    pub(crate) fn push_canvas_memento(&mut self) {
        self.history
            .create_canvas_memento(&self.annotations, self.selected, &self.raster);
        self.emit(EditorEvent::HistoryChanged);
    }

    /// Undo the last change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.abandon_gesture();
        let Some(memento) = self.history.undo(&self.annotations, self.selected, &self.raster) else {
            return false;
        };
        log::debug!("Undo: restoring {} annotations", memento.annotations.len());
        self.restore(memento);
        true
    }

    /// Redo the last undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.abandon_gesture();
        let Some(memento) = self.history.redo(&self.annotations, self.selected, &self.raster) else {
            return false;
        };
        log::debug!("Redo: restoring {} annotations", memento.annotations.len());
        self.restore(memento);
        true
    }

    /// Replace the live state with a memento.
    pub(crate) fn restore(&mut self, memento: Memento) {
        let Memento {
            annotations,
            raster,
            selected,
        } = memento;
        self.annotations = annotations;
        let image_changed = raster.is_some();
        if let Some(raster) = raster {
            self.raster = raster;
        }
        self.selected = selected.filter(|id| self.index_of(*id).is_some());
        self.state = InteractionState::Idle;
        self.refresh_effects();

        if image_changed {
            self.emit(EditorEvent::ImageChanged);
        }
        self.emit(EditorEvent::AnnotationsRestored);
        self.emit(EditorEvent::SelectionChanged(self.selected));
        self.emit(EditorEvent::HistoryChanged);
        self.emit(EditorEvent::InvalidateRequested);
    }

    /// Regenerate stale effect caches against the current raster.
    pub(crate) fn refresh_effects(&mut self) {
        let raster = &self.raster;
        let processor = self.effects.as_ref();
        for effect in self.annotations.iter_mut().filter_map(Annotation::as_effect_mut) {
            if effect.is_stale() {
                if let Err(e) = effect.update_effect(raster, processor) {
                    log::warn!("Effect {:?} fell back to the plain region: {}", effect.kind, e);
                }
            }
        }
    }

    // --- Editing ---

    /// Number given to the next number marker: one more than the largest present,
    /// saturating at `u32::MAX`.
    pub fn next_number(&self) -> u32 {
        self.annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Number(n) => Some(n.number),
                _ => None,
            })
            .max()
            .map_or(1, |n| n.saturating_add(1))
    }

    /// Delete an annotation. Returns false if it doesn't exist.
    pub fn delete_annotation(&mut self, id: AnnotationId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.push_memento(None, true);
        self.annotations.remove(index);
        if self.selected == Some(id) {
            self.set_selection(None);
        }
        self.emit(EditorEvent::InvalidateRequested);
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete_annotation(id),
            None => false,
        }
    }

    /// Remove every annotation (undoable).
    pub fn clear_annotations(&mut self) -> bool {
        if self.annotations.is_empty() {
            return false;
        }
        self.abandon_gesture();
        self.push_memento(None, true);
        self.annotations.clear();
        self.set_selection(None);
        self.emit(EditorEvent::InvalidateRequested);
        true
    }

    /// Restyle the selected annotation.
    pub fn set_selected_style(&mut self, style: AnnotationStyle) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        if self.annotation(id).is_none_or(|a| *a.style() == style) {
            return false;
        }
        self.push_memento(None, true);
        if let Some(annotation) = self.annotation_mut(id) {
            *annotation.style_mut() = style;
        }
        self.emit(EditorEvent::InvalidateRequested);
        true
    }

    /// Commit new content for a text annotation, resizing its box to fit.
    pub fn set_annotation_text(&mut self, id: AnnotationId, text: impl Into<String>) -> bool {
        let text = text.into();
        if self
            .annotation(id)
            .and_then(Annotation::as_text)
            .is_none_or(|t| t.text == text)
        {
            return false;
        }
        self.push_memento(None, true);
        if let Some(t) = self.annotation_mut(id).and_then(Annotation::as_text_mut) {
            t.set_text(text);
        }
        self.emit(EditorEvent::InvalidateRequested);
        true
    }

    /// Move the selected annotation by `delta` (keyboard nudging).
    pub fn nudge_selected(&mut self, delta: Vec2) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        if delta == Vec2::ZERO || self.index_of(id).is_none() {
            return false;
        }
        self.push_memento(None, false);
        if let Some(annotation) = self.annotation_mut(id) {
            annotation.translate(delta);
        }
        self.refresh_effects();
        self.emit(EditorEvent::InvalidateRequested);
        true
    }

    /// Place a raster as a movable image annotation with its top-left at `at`.
    pub fn insert_image(&mut self, raster: Raster, at: Point) -> AnnotationId {
        self.abandon_gesture();
        self.push_memento(None, true);
        let annotation = Annotation::Image(ImageAnnotation::new(raster, at, self.style.clone()));
        let id = annotation.id();
        self.annotations.push(annotation);
        self.set_selection(Some(id));
        self.emit(EditorEvent::InvalidateRequested);
        id
    }

    /// Start over on a new raster: annotations, selection and history are cleared.
    pub fn load_raster(&mut self, raster: Raster) {
        log::info!("Loading raster {}x{}", raster.width(), raster.height());
        self.state = InteractionState::Idle;
        self.annotations.clear();
        self.selected = None;
        self.history.clear();
        self.raster = raster;
        self.emit(EditorEvent::ImageChanged);
        self.emit(EditorEvent::AnnotationsRestored);
        self.emit(EditorEvent::SelectionChanged(None));
        self.emit(EditorEvent::HistoryChanged);
        self.emit(EditorEvent::InvalidateRequested);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::annotations::{NumberAnnotation, ShapeAnnotation, TextAnnotation};
    use std::cell::RefCell;
    use std::rc::Rc;

    pub(crate) fn editor(width: u32, height: u32) -> Editor {
        Editor::new(Raster::filled(width, height, [200, 200, 200, 255]).unwrap())
    }

    pub(crate) fn rect_annotation(x0: f64, y0: f64, x1: f64, y1: f64) -> Annotation {
        let mut shape = ShapeAnnotation::new(ToolKind::Rectangle, Point::new(x0, y0), AnnotationStyle::default());
        shape.base.end = Point::new(x1, y1);
        Annotation::Shape(shape)
    }

    /// Add an annotation directly, bypassing history.
    pub(crate) fn add(editor: &mut Editor, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        editor.annotations.push(annotation);
        id
    }

    pub(crate) fn record(editor: &mut Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        editor.subscribe(Box::new(move |e: &EditorEvent| sink.borrow_mut().push(e.clone())));
        events
    }

    #[test]
    fn test_new_editor_is_idle_and_empty() {
        let editor = editor(10, 10);
        assert!(editor.annotations().is_empty());
        assert_eq!(*editor.state(), InteractionState::Idle);
        assert_eq!(editor.tool(), ToolKind::Select);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_annotation_at_prefers_topmost() {
        let mut editor = editor(100, 100);
        let bottom = add(&mut editor, rect_annotation(0.0, 0.0, 50.0, 50.0));
        let top = add(&mut editor, rect_annotation(20.0, 20.0, 60.0, 60.0));
        assert_eq!(editor.annotation_at(Point::new(30.0, 30.0)), Some(top));
        assert_eq!(editor.annotation_at(Point::new(5.0, 5.0)), Some(bottom));
        assert_eq!(editor.annotation_at(Point::new(90.0, 90.0)), None);
    }

    #[test]
    fn test_delete_and_undo_restores_selection() {
        let mut editor = editor(100, 100);
        let id = add(&mut editor, rect_annotation(0.0, 0.0, 50.0, 50.0));
        editor.select(id);
        assert!(editor.delete_selected());
        assert!(editor.annotations().is_empty());
        assert_eq!(editor.selected_id(), None);

        assert!(editor.undo());
        assert_eq!(editor.annotations().len(), 1);
        assert_eq!(editor.selected_id(), Some(id));
        assert!(editor.redo());
        assert!(editor.annotations().is_empty());
    }

    #[test]
    fn test_next_number_is_max_plus_one() {
        let mut editor = editor(100, 100);
        assert_eq!(editor.next_number(), 1);
        add(
            &mut editor,
            Annotation::Number(NumberAnnotation::new(4, Point::new(10.0, 10.0), AnnotationStyle::default())),
        );
        add(
            &mut editor,
            Annotation::Number(NumberAnnotation::new(2, Point::new(30.0, 10.0), AnnotationStyle::default())),
        );
        assert_eq!(editor.next_number(), 5);
    }

    #[test]
    fn test_next_number_saturates() {
        let mut editor = editor(100, 100);
        add(
            &mut editor,
            Annotation::Number(NumberAnnotation::new(u32::MAX, Point::new(10.0, 10.0), AnnotationStyle::default())),
        );
        assert_eq!(editor.next_number(), u32::MAX);

        editor.set_tool(ToolKind::Number);
        editor.on_pointer_pressed(Point::new(60.0, 60.0), false);
        editor.on_pointer_released(Point::new(60.0, 60.0));
        assert_eq!(editor.annotations().len(), 2);
    }

    #[test]
    fn test_set_annotation_text_is_undoable() {
        let mut editor = editor(200, 100);
        let text = TextAnnotation::new(Point::new(10.0, 10.0), String::new(), 20.0, AnnotationStyle::default());
        let id = add(&mut editor, Annotation::Text(text));
        assert!(editor.set_annotation_text(id, "hello"));
        assert!(!editor.set_annotation_text(id, "hello"));
        assert_eq!(editor.annotation(id).and_then(Annotation::as_text).unwrap().text, "hello");
        editor.undo();
        assert_eq!(editor.annotation(id).and_then(Annotation::as_text).unwrap().text, "");
    }

    #[test]
    fn test_nudge_moves_selected() {
        let mut editor = editor(100, 100);
        let id = add(&mut editor, rect_annotation(10.0, 10.0, 20.0, 20.0));
        assert!(!editor.nudge_selected(Vec2::new(1.0, 0.0)));
        editor.select(id);
        assert!(editor.nudge_selected(Vec2::new(1.0, 2.0)));
        assert_eq!(editor.annotation(id).unwrap().base().start, Point::new(11.0, 12.0));
    }

    #[test]
    fn test_insert_image_selects_it() {
        let mut editor = editor(100, 100);
        let id = editor.insert_image(Raster::new(8, 4).unwrap(), Point::new(5.0, 5.0));
        assert_eq!(editor.selected_id(), Some(id));
        assert_eq!(editor.annotation(id).unwrap().local_box(), kurbo::Rect::new(5.0, 5.0, 13.0, 9.0));
        editor.undo();
        assert!(editor.annotations().is_empty());
    }

    #[test]
    fn test_load_raster_resets_everything() {
        let mut editor = editor(100, 100);
        let id = add(&mut editor, rect_annotation(10.0, 10.0, 20.0, 20.0));
        editor.select(id);
        editor.delete_selected();
        let events = record(&mut editor);
        editor.load_raster(Raster::new(30, 40).unwrap());
        assert_eq!(editor.raster().width(), 30);
        assert!(!editor.can_undo());
        assert!(events.borrow().contains(&EditorEvent::ImageChanged));
        assert!(events.borrow().contains(&EditorEvent::AnnotationsRestored));
    }

    #[test]
    fn test_clear_annotations_undoable() {
        let mut editor = editor(100, 100);
        assert!(!editor.clear_annotations());
        add(&mut editor, rect_annotation(10.0, 10.0, 20.0, 20.0));
        add(&mut editor, rect_annotation(30.0, 30.0, 40.0, 40.0));
        assert!(editor.clear_annotations());
        assert!(editor.annotations().is_empty());
        editor.undo();
        assert_eq!(editor.annotations().len(), 2);
    }

    #[test]
    fn test_undo_emits_restore_events() {
        let mut editor = editor(100, 100);
        let id = add(&mut editor, rect_annotation(10.0, 10.0, 20.0, 20.0));
        editor.delete_annotation(id);
        let events = record(&mut editor);
        editor.undo();
        let events = events.borrow();
        assert!(events.contains(&EditorEvent::AnnotationsRestored));
        assert!(events.contains(&EditorEvent::HistoryChanged));
        assert!(!events.contains(&EditorEvent::ImageChanged));
    }
}
