//! Operations that replace the raster: crop, band cut-out and whole-image
//! effects.
//!
//! Each builds the new raster first, then records a canvas memento, then
//! remaps annotations and swaps the raster in. A failure before the swap
//! leaves the editor untouched.

use super::{Editor, EditorEvent};
use crate::annotations::Annotation;
use crate::effects::EffectKind;
use crate::error::{EditorError, EditorResult};
use crate::geometry;
use crate::raster::{Axis, Raster};
use kurbo::{Point, Rect};

/// Where a coordinate lands after removing the band `[start, end)`.
///
/// Coordinates before the band are unchanged, coordinates inside collapse onto
/// the band start and coordinates after shift back by the band width.
fn collapse_band(value: f64, start: f64, end: f64) -> f64 {
    if value < start {
        value
    } else if value < end {
        start
    } else {
        value - (end - start)
    }
}

impl Editor {
    /// Crop the raster to `rect` (image coordinates).
    ///
    /// The rectangle is normalized, rounded to whole pixels and clamped to the
    /// raster. Annotations that don't overlap the crop are removed; the rest
    /// are translated into the new coordinate space and clamped to it.
    ///
    /// Returns `Ok(false)` when the clamped rectangle is empty or is the whole
    /// raster (nothing changes, no history entry) and an error for a rectangle
    /// with no area.
    pub fn crop(&mut self, rect: Rect) -> EditorResult<bool> {
        let rect = rect.abs();
        if !(rect.width() > 0.0 && rect.height() > 0.0) || !rect.is_finite() {
            return Err(EditorError::InvalidArgument(format!("Crop rectangle has no area: {:?}", rect)));
        }

        let (width, height) = (self.raster.width() as f64, self.raster.height() as f64);
        let left = rect.x0.round().clamp(0.0, width);
        let top = rect.y0.round().clamp(0.0, height);
        let right = rect.x1.round().clamp(0.0, width);
        let bottom = rect.y1.round().clamp(0.0, height);
        if right <= left || bottom <= top {
            log::debug!("Crop {:?} lies outside the {}x{} raster", rect, width, height);
            return Ok(false);
        }
        if left == 0.0 && top == 0.0 && right == width && bottom == height {
            return Ok(false);
        }

        let cropped = self
            .raster
            .extract(left as u32, top as u32, (right - left) as u32, (bottom - top) as u32)
            .ok_or_else(|| EditorError::OperationFailed("Crop region outside raster".into()))?;

        self.abandon_gesture();
        self.push_canvas_memento();

        let area = Rect::new(left, top, right, bottom);
        let (new_w, new_h) = (right - left, bottom - top);
        self.annotations
            .retain(|a| !a.is_transient() && geometry::rects_overlap(a.bounds(), area));
        for annotation in &mut self.annotations {
            annotation.map_points(|p| Point::new((p.x - left).clamp(0.0, new_w), (p.y - top).clamp(0.0, new_h)));
        }

        log::info!(
            "Cropped {}x{} -> {}x{} at ({}, {})",
            width,
            height,
            new_w,
            new_h,
            left,
            top
        );
        self.replace_raster(cropped);
        Ok(true)
    }

    /// Remove the band `[start, end)` along `axis` and join the remaining parts.
    ///
    /// For [`Axis::Vertical`] the band is a range of columns (x), for
    /// [`Axis::Horizontal`] a range of rows (y). Annotations wholly inside the
    /// band are removed; coordinates after the band shift back by its width
    /// and coordinates inside collapse onto the band start.
    ///
    /// Returns `Ok(false)` if the band lies outside the raster or covers all of
    /// it, and an error if `end <= start`.
    pub fn cut_out(&mut self, axis: Axis, start: f64, end: f64) -> EditorResult<bool> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(EditorError::InvalidArgument(format!("Empty cut band: [{}, {})", start, end)));
        }

        let extent = match axis {
            Axis::Vertical => self.raster.width(),
            Axis::Horizontal => self.raster.height(),
        } as f64;
        let start = start.round().clamp(0.0, extent);
        let end = end.round().clamp(0.0, extent);
        if end <= start || end - start >= extent {
            log::debug!("Cut band [{}, {}) is empty or covers the whole {:?} extent", start, end, axis);
            return Ok(false);
        }

        let joined = self
            .raster
            .remove_band(axis, start as u32, end as u32)
            .ok_or_else(|| EditorError::OperationFailed("Cut band outside raster".into()))?;

        self.abandon_gesture();
        self.push_canvas_memento();

        let span = |r: Rect| match axis {
            Axis::Vertical => (r.x0, r.x1),
            Axis::Horizontal => (r.y0, r.y1),
        };
        self.annotations.retain(|a| {
            let (lo, hi) = span(a.bounds());
            !a.is_transient() && !(lo >= start && hi <= end)
        });
        for annotation in &mut self.annotations {
            annotation.map_points(|p| match axis {
                Axis::Vertical => Point::new(collapse_band(p.x, start, end), p.y),
                Axis::Horizontal => Point::new(p.x, collapse_band(p.y, start, end)),
            });
        }

        log::info!("Cut {:?} band [{}, {}) out of the raster", axis, start, end);
        self.replace_raster(joined);
        Ok(true)
    }

    /// Apply an effect to the whole raster.
    ///
    /// Returns `Ok(false)` without a history entry if the effect fails or
    /// returns a raster of a different size.
    pub fn apply_image_effect(&mut self, kind: EffectKind) -> EditorResult<bool> {
        let strength = self.settings.effect_strength.get(kind);
        let processed = match self.effects.apply(kind, strength, &self.raster) {
            Ok(processed) => processed,
            Err(e) => {
                log::warn!("Image effect {:?} failed: {}", kind, e);
                return Ok(false);
            }
        };
        if (processed.width(), processed.height()) != (self.raster.width(), self.raster.height()) {
            log::warn!("Image effect {:?} changed the raster size; ignoring", kind);
            return Ok(false);
        }

        self.abandon_gesture();
        self.push_canvas_memento();
        log::info!("Applied {:?} to the whole raster", kind);
        self.replace_raster(processed);
        Ok(true)
    }

    /// Swap in a new raster after annotations have been remapped.
    fn replace_raster(&mut self, raster: Raster) {
        let size = raster.size();
        self.raster = raster;
        for annotation in &mut self.annotations {
            match annotation {
                Annotation::Spotlight(s) => s.canvas_size = size,
                Annotation::Effect(e) => e.invalidate(),
                _ => {}
            }
        }
        if self.selected.is_some_and(|id| self.index_of(id).is_none()) {
            self.selected = None;
            self.emit(EditorEvent::SelectionChanged(None));
        }
        self.refresh_effects();
        self.emit(EditorEvent::ImageChanged);
        self.emit(EditorEvent::AnnotationsRestored);
        self.emit(EditorEvent::InvalidateRequested);
    }
}
