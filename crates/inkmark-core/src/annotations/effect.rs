//! Region effects (blur, pixelate, magnify, highlight) with a cached output.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::effects::{EffectKind, EffectProcessor};
use crate::error::EffectError;
use crate::raster::Raster;
use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An annotation whose content is the effect applied to the raster beneath it.
///
/// The cached bitmap is dropped whenever the box moves; the editor regenerates
/// it before the next redraw request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectAnnotation {
    pub base: AnnotationBase,
    pub kind: EffectKind,
    pub strength: f64,
    #[serde(skip)]
    cache: Option<Raster>,
}

impl EffectAnnotation {
    pub fn new(kind: EffectKind, strength: f64, point: Point, style: AnnotationStyle) -> Self {
        Self {
            base: AnnotationBase::new(ToolKind::from(kind), point, style),
            kind,
            strength,
            cache: None,
        }
    }

    /// The cached effect output, `None` when stale.
    pub fn effect_bitmap(&self) -> Option<&Raster> {
        self.cache.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.cache.is_none()
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Pixel-aligned box covered by the effect (at least 1x1).
    fn pixel_box(&self) -> (i64, i64, u32, u32) {
        let b = self.base.normalized();
        let x0 = b.x0.floor() as i64;
        let y0 = b.y0.floor() as i64;
        let w = ((b.x1.ceil() as i64) - x0).max(1) as u32;
        let h = ((b.y1.ceil() as i64) - y0).max(1) as u32;
        (x0, y0, w, h)
    }

    /// Recompute the cached bitmap from `source`.
    ///
    /// The output always has the size of the annotation's box; parts outside
    /// the source stay transparent. If the effect fails, the unprocessed
    /// region is cached instead and the error is returned for reporting.
    pub fn update_effect(&mut self, source: &Raster, processor: &dyn EffectProcessor) -> Result<(), EffectError> {
        let (x0, y0, w, h) = self.pixel_box();
        let mut output = Raster::new(w, h).map_err(|e| EffectError::Failed(e.to_string()))?;

        let ix0 = x0.max(0);
        let iy0 = y0.max(0);
        let ix1 = (x0 + w as i64).min(source.width() as i64);
        let iy1 = (y0 + h as i64).min(source.height() as i64);

        let mut result = Ok(());
        if ix1 > ix0 && iy1 > iy0 {
            let region = source
                .extract(ix0 as u32, iy0 as u32, (ix1 - ix0) as u32, (iy1 - iy0) as u32)
                .ok_or_else(|| EffectError::Failed("region outside source".into()))?;
            let processed = match processor.apply(self.kind, self.strength, &region) {
                Ok(processed) => processed,
                Err(e) => {
                    result = Err(e);
                    region
                }
            };
            output.paste(&processed, ix0 - x0, iy0 - y0);
        }
        self.cache = Some(output);
        result
    }
}

impl AnnotationTrait for EffectAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn map_points(&mut self, f: &mut dyn FnMut(Point) -> Point) {
        self.base.start = f(self.base.start);
        self.base.end = f(self.base.end);
        self.invalidate();
    }

    fn set_box(&mut self, rect: Rect) {
        self.base.start = Point::new(rect.x0, rect.y0);
        self.base.end = Point::new(rect.x1, rect.y1);
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::BuiltinEffects;

    struct Failing;

    impl EffectProcessor for Failing {
        fn apply(&self, _: EffectKind, _: f64, _: &Raster) -> Result<Raster, EffectError> {
            Err(EffectError::Failed("boom".into()))
        }
    }

    fn effect(x0: f64, y0: f64, x1: f64, y1: f64) -> EffectAnnotation {
        let mut e = EffectAnnotation::new(EffectKind::Pixelate, 2.0, Point::new(x0, y0), AnnotationStyle::default());
        e.base.end = Point::new(x1, y1);
        e
    }

    #[test]
    fn test_cache_matches_box_size() {
        let source = Raster::filled(100, 100, [10, 20, 30, 255]).unwrap();
        let mut e = effect(10.0, 10.0, 40.0, 30.0);
        e.update_effect(&source, &BuiltinEffects).unwrap();
        let bmp = e.effect_bitmap().unwrap();
        assert_eq!((bmp.width(), bmp.height()), (30, 20));
        assert_eq!(bmp.pixel(0, 0), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_outside_source_is_transparent() {
        let source = Raster::filled(50, 50, [255, 255, 255, 255]).unwrap();
        let mut e = effect(200.0, 200.0, 220.0, 210.0);
        e.update_effect(&source, &BuiltinEffects).unwrap();
        let bmp = e.effect_bitmap().unwrap();
        assert_eq!((bmp.width(), bmp.height()), (20, 10));
        assert_eq!(bmp.pixel(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_partially_outside_keeps_offset() {
        let source = Raster::filled(50, 50, [255, 0, 0, 255]).unwrap();
        let mut e = effect(-10.0, 0.0, 10.0, 10.0);
        e.update_effect(&source, &BuiltinEffects).unwrap();
        let bmp = e.effect_bitmap().unwrap();
        assert_eq!(bmp.width(), 20);
        assert_eq!(bmp.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(bmp.pixel(15, 2), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_moving_invalidates_cache() {
        let source = Raster::filled(50, 50, [1, 1, 1, 255]).unwrap();
        let mut e = effect(0.0, 0.0, 10.0, 10.0);
        e.update_effect(&source, &BuiltinEffects).unwrap();
        assert!(!e.is_stale());
        e.map_points(&mut |p| p + kurbo::Vec2::new(1.0, 0.0));
        assert!(e.is_stale());
    }

    #[test]
    fn test_failed_effect_caches_plain_region() {
        let source = Raster::filled(20, 20, [7, 7, 7, 255]).unwrap();
        let mut e = effect(0.0, 0.0, 10.0, 10.0);
        assert!(e.update_effect(&source, &Failing).is_err());
        assert_eq!(e.effect_bitmap().unwrap().pixel(3, 3), Some([7, 7, 7, 255]));
    }
}
