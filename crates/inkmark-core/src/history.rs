//! Memento-based undo/redo.
//!
//! The manager never owns live state. Callers hand in the current annotation
//! list, selection and raster, and receive the memento to restore. Depth is
//! unbounded.

use crate::annotations::{Annotation, AnnotationId};
use crate::raster::Raster;

/// A snapshot of editor state for undo/redo.
#[derive(Debug, Clone, PartialEq)]
pub struct Memento {
    /// Annotation list in z-order, effect caches stripped.
    pub annotations: Vec<Annotation>,
    /// Raster copy, only for operations that replace the raster.
    pub raster: Option<Raster>,
    /// Selection at capture time, re-applied by Id if still present.
    pub selected: Option<AnnotationId>,
}

impl Memento {
    fn capture(
        annotations: &[Annotation],
        selected: Option<AnnotationId>,
        exclude: Option<AnnotationId>,
        raster: Option<&Raster>,
    ) -> Self {
        Self {
            annotations: annotations
                .iter()
                .filter(|a| Some(a.id()) != exclude && !a.is_transient())
                .map(Annotation::snapshot)
                .collect(),
            raster: raster.cloned(),
            selected: selected.filter(|id| Some(*id) != exclude),
        }
    }

    /// Whether restoring this memento replaces the raster.
    pub fn is_canvas(&self) -> bool {
        self.raster.is_some()
    }
}

/// Undo and redo stacks.
#[derive(Debug, Default)]
pub struct HistoryManager {
    undo_stack: Vec<Memento>,
    redo_stack: Vec<Memento>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the current annotation state (call before making changes).
    ///
    /// `exclude` leaves out an in-progress annotation so undo removes it.
    /// Unless `force` is set, a snapshot identical to the top of the undo stack
    /// is not pushed again. Returns whether a memento was pushed.
    pub fn create_annotations_memento(
        &mut self,
        annotations: &[Annotation],
        selected: Option<AnnotationId>,
        exclude: Option<AnnotationId>,
        force: bool,
    ) -> bool {
        let memento = Memento::capture(annotations, selected, exclude, None);
        if !force
            && self
                .undo_stack
                .last()
                .is_some_and(|top| !top.is_canvas() && top.annotations == memento.annotations)
        {
            return false;
        }
        self.push(memento);
        true
    }

    /// Push the current state including a full raster copy; used before crop,
    /// cut-out and whole-image effects.
    pub fn create_canvas_memento(
        &mut self,
        annotations: &[Annotation],
        selected: Option<AnnotationId>,
        raster: &Raster,
    ) {
        self.push(Memento::capture(annotations, selected, None, Some(raster)));
    }

    fn push(&mut self, memento: Memento) {
        self.undo_stack.push(memento);
        // Clear redo stack when new changes are made
        self.redo_stack.clear();
    }

    /// Pop the last memento, saving the current state for redo.
    ///
    /// The current raster is only copied when the popped memento carries one.
    pub fn undo(
        &mut self,
        annotations: &[Annotation],
        selected: Option<AnnotationId>,
        raster: &Raster,
    ) -> Option<Memento> {
        let memento = self.undo_stack.pop()?;
        let current = Memento::capture(annotations, selected, None, memento.is_canvas().then_some(raster));
        self.redo_stack.push(current);
        Some(memento)
    }

    /// Pop the last undone memento, saving the current state for undo.
    pub fn redo(
        &mut self,
        annotations: &[Annotation],
        selected: Option<AnnotationId>,
        raster: &Raster,
    ) -> Option<Memento> {
        let memento = self.redo_stack.pop()?;
        let current = Memento::capture(annotations, selected, None, memento.is_canvas().then_some(raster));
        self.undo_stack.push(current);
        Some(memento)
    }

    /// Drop the newest undo entry without restoring it (an aborted gesture).
    pub fn discard_last(&mut self) -> Option<Memento> {
        self.undo_stack.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
