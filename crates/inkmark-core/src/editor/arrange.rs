//! Z-order changes and copy/paste of annotations.

use super::{Editor, EditorEvent};
use crate::annotations::{Annotation, AnnotationId};
use crate::error::{EditorError, EditorResult};
use kurbo::Vec2;

impl Editor {
    /// Move an annotation to a new z-position computed from its current index
    /// and the list length. Returns false if nothing moved.
    fn reorder(&mut self, id: AnnotationId, target: impl FnOnce(usize, usize) -> usize) -> bool {
        let Some(pos) = self.index_of(id) else {
            return false;
        };
        let len = self.annotations.len();
        let new_pos = target(pos, len).min(len - 1);
        if new_pos == pos {
            return false;
        }
        self.push_memento(None, true);
        let annotation = self.annotations.remove(pos);
        self.annotations.insert(new_pos, annotation);
        self.emit(EditorEvent::AnnotationOrderChanged);
        self.emit(EditorEvent::InvalidateRequested);
        true
    }

    /// Bring an annotation to the front (topmost).
    pub fn bring_to_front(&mut self, id: AnnotationId) -> bool {
        self.reorder(id, |_, len| len - 1)
    }

    /// Send an annotation to the back (bottommost).
    pub fn send_to_back(&mut self, id: AnnotationId) -> bool {
        self.reorder(id, |_, _| 0)
    }

    /// Move an annotation one layer towards the front.
    pub fn bring_forward(&mut self, id: AnnotationId) -> bool {
        self.reorder(id, |pos, _| pos + 1)
    }

    /// Move an annotation one layer towards the back.
    pub fn send_backward(&mut self, id: AnnotationId) -> bool {
        self.reorder(id, |pos, _| pos.saturating_sub(1))
    }

    /// Serialize the selected annotation for the clipboard.
    pub fn copy_selected(&self) -> Option<String> {
        let annotation = self.selected()?;
        match serde_json::to_string(&vec![annotation.snapshot()]) {
            Ok(json) => Some(json),
            Err(e) => {
                log::error!("Failed to serialize annotation: {}", e);
                None
            }
        }
    }

    /// Paste annotations produced by [`copy_selected`](Self::copy_selected).
    ///
    /// Each pasted annotation gets a fresh Id and is offset so it doesn't hide
    /// the original. The last one pasted is selected.
    pub fn paste(&mut self, json: &str) -> EditorResult<Vec<AnnotationId>> {
        let parsed: Vec<Annotation> = serde_json::from_str(json)
            .map_err(|e| EditorError::InvalidArgument(format!("Clipboard is not annotation data: {}", e)))?;
        let offset = Vec2::new(self.settings.paste_offset, self.settings.paste_offset);
        let pasted: Vec<Annotation> = parsed
            .iter()
            .filter(|a| !a.is_transient())
            .map(|a| {
                let mut copy = a.duplicate();
                copy.translate(offset);
                copy
            })
            .collect();
        if pasted.is_empty() {
            return Ok(Vec::new());
        }

        self.abandon_gesture();
        self.push_memento(None, true);
        let ids: Vec<AnnotationId> = pasted.iter().map(Annotation::id).collect();
        self.annotations.extend(pasted);
        self.set_selection(ids.last().copied());
        self.refresh_effects();
        self.emit(EditorEvent::InvalidateRequested);
        log::debug!("Pasted {} annotations", ids.len());
        Ok(ids)
    }

    /// Copy the selected annotation in place (offset) and select the copy.
    pub fn duplicate_selected(&mut self) -> Option<AnnotationId> {
        let mut copy = self.selected()?.duplicate();
        copy.translate(Vec2::new(self.settings.paste_offset, self.settings.paste_offset));
        let id = copy.id();

        self.push_memento(None, true);
        self.annotations.push(copy);
        self.set_selection(Some(id));
        self.refresh_effects();
        self.emit(EditorEvent::InvalidateRequested);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add, editor, rect_annotation, record};
    use super::*;
    use kurbo::Rect;

    fn ids(editor: &Editor) -> Vec<AnnotationId> {
        editor.annotations().iter().map(Annotation::id).collect()
    }

    #[test]
    fn test_z_order() {
        let mut editor = editor(100, 100);
        let a = add(&mut editor, rect_annotation(0.0, 0.0, 10.0, 10.0));
        let b = add(&mut editor, rect_annotation(0.0, 0.0, 10.0, 10.0));
        let c = add(&mut editor, rect_annotation(0.0, 0.0, 10.0, 10.0));

        assert!(editor.bring_to_front(a));
        assert_eq!(ids(&editor), vec![b, c, a]);
        assert!(!editor.bring_to_front(a));

        assert!(editor.send_to_back(a));
        assert_eq!(ids(&editor), vec![a, b, c]);
        assert!(!editor.send_backward(a));

        assert!(editor.bring_forward(a));
        assert_eq!(ids(&editor), vec![b, a, c]);
        assert!(editor.send_backward(c));
        assert_eq!(ids(&editor), vec![b, c, a]);
    }

    #[test]
    fn test_reorder_emits_and_undoes() {
        let mut editor = editor(100, 100);
        let a = add(&mut editor, rect_annotation(0.0, 0.0, 10.0, 10.0));
        let b = add(&mut editor, rect_annotation(0.0, 0.0, 10.0, 10.0));
        let events = record(&mut editor);
        editor.bring_to_front(a);
        assert!(events.borrow().contains(&EditorEvent::AnnotationOrderChanged));
        editor.undo();
        assert_eq!(ids(&editor), vec![a, b]);
    }

    #[test]
    fn test_copy_paste() {
        let mut editor = editor(100, 100);
        let original = add(&mut editor, rect_annotation(10.0, 10.0, 30.0, 30.0));
        assert!(editor.copy_selected().is_none());
        editor.select(original);
        let json = editor.copy_selected().unwrap();

        let pasted = editor.paste(&json).unwrap();
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], original);
        assert_eq!(editor.selected_id(), Some(pasted[0]));
        assert_eq!(editor.annotation(pasted[0]).unwrap().local_box(), Rect::new(20.0, 20.0, 40.0, 40.0));

        editor.undo();
        assert_eq!(ids(&editor), vec![original]);
    }

    #[test]
    fn test_paste_rejects_garbage() {
        let mut editor = editor(100, 100);
        assert!(matches!(editor.paste("not json"), Err(EditorError::InvalidArgument(_))));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_duplicate_selected() {
        let mut editor = editor(100, 100);
        let original = add(&mut editor, rect_annotation(10.0, 10.0, 30.0, 30.0));
        assert!(editor.duplicate_selected().is_none());
        editor.select(original);
        let copy = editor.duplicate_selected().unwrap();
        assert_eq!(editor.annotations().len(), 2);
        assert_eq!(editor.selected_id(), Some(copy));
        assert_eq!(editor.annotation(original).unwrap().local_box(), Rect::new(10.0, 10.0, 30.0, 30.0));
    }
}
