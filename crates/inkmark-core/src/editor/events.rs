//! Change notifications raised by the editor.

use crate::annotations::AnnotationId;

/// What changed. Hosts usually map these to redraws and toolbar updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Something visible changed; redraw.
    InvalidateRequested,
    /// The z-order of the annotation list changed.
    AnnotationOrderChanged,
    /// The raster was replaced (crop, cut-out, whole-image effect, undo of those).
    ImageChanged,
    /// The whole annotation list was replaced; hosts must resync any per-annotation state.
    AnnotationsRestored,
    /// Undo/redo availability may have changed.
    HistoryChanged,
    /// The selected annotation changed.
    SelectionChanged(Option<AnnotationId>),
    /// The host should open an inline text editor for this annotation.
    EditAnnotationRequested(AnnotationId),
}

/// Receives editor notifications.
///
/// Observers are called synchronously on whatever thread drove the editor. The
/// editor makes no UI-thread assumptions; an observer that touches UI-owned
/// resources must marshal to the UI thread itself.
pub trait EditorObserver {
    fn on_event(&self, event: &EditorEvent);
}

impl<F> EditorObserver for F
where
    F: Fn(&EditorEvent),
{
    fn on_event(&self, event: &EditorEvent) {
        self(event)
    }
}
