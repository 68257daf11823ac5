//! Owned raster buffer.
//!
//! A [`Raster`] has exactly one owner at a time: the editor, a memento, or an
//! annotation. Replacing a raster moves the new buffer in before the old one is
//! dropped, so there is never a window where the editor holds no image.

use crate::error::{EditorError, EditorResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

/// Direction of a band cut-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// A vertical band: a range of columns along x is removed.
    Vertical,
    /// A horizontal band: a range of rows along y is removed.
    Horizontal,
}

/// RGBA8 pixel buffer in raster-pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RasterRepr", try_from = "RasterRepr")]
pub struct Raster {
    image: RgbaImage,
}

/// Serialized form: dimensions plus base64-encoded RGBA bytes.
#[derive(Serialize, Deserialize)]
struct RasterRepr {
    width: u32,
    height: u32,
    data_base64: String,
}

impl From<Raster> for RasterRepr {
    fn from(raster: Raster) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            data_base64: STANDARD.encode(raster.image.as_raw()),
        }
    }
}

impl TryFrom<RasterRepr> for Raster {
    type Error = String;

    fn try_from(repr: RasterRepr) -> Result<Self, Self::Error> {
        let bytes = STANDARD
            .decode(repr.data_base64.as_bytes())
            .map_err(|e| format!("invalid raster payload: {}", e))?;
        let image = RgbaImage::from_raw(repr.width, repr.height, bytes)
            .ok_or_else(|| format!("raster payload does not match {}x{}", repr.width, repr.height))?;
        Raster::from_image(image).map_err(|e| e.to_string())
    }
}

impl Raster {
    /// Create a fully transparent raster.
    pub fn new(width: u32, height: u32) -> EditorResult<Self> {
        Self::check_size(width, height)?;
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// Create a raster filled with a single color.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> EditorResult<Self> {
        Self::check_size(width, height)?;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, Rgba(color)),
        })
    }

    /// Take ownership of a decoded image.
    pub fn from_image(image: RgbaImage) -> EditorResult<Self> {
        Self::check_size(image.width(), image.height())?;
        Ok(Self { image })
    }

    fn check_size(width: u32, height: u32) -> EditorResult<()> {
        if width == 0 || height == 0 {
            return Err(EditorError::InvalidArgument(format!(
                "raster must not be empty ({}x{})",
                width, height
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Dimensions as floating point, for geometry in raster space.
    pub fn size(&self) -> kurbo::Size {
        kurbo::Size::new(self.width() as f64, self.height() as f64)
    }

    /// Read a pixel, `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Borrow the underlying image.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Release the raster and return the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Copy a sub-rectangle into a new raster.
    ///
    /// Returns `None` when the rectangle is empty or not fully inside.
    pub fn extract(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Raster> {
        if width == 0 || height == 0 {
            return None;
        }
        let right = x.checked_add(width)?;
        let bottom = y.checked_add(height)?;
        if right > self.width() || bottom > self.height() {
            return None;
        }
        let image = imageops::crop_imm(&self.image, x, y, width, height).to_image();
        Some(Raster { image })
    }

    /// Build a raster with the band `[start, end)` removed along `axis`,
    /// joining the parts before and after the band with no gap.
    ///
    /// Returns `None` if the band is empty, out of range, or covers the
    /// whole extent.
    pub fn remove_band(&self, axis: Axis, start: u32, end: u32) -> Option<Raster> {
        let extent = match axis {
            Axis::Vertical => self.width(),
            Axis::Horizontal => self.height(),
        };
        if start >= end || end > extent || end - start >= extent {
            return None;
        }
        let band = end - start;
        let (w, h) = (self.width(), self.height());

        let mut image = match axis {
            Axis::Vertical => RgbaImage::new(w - band, h),
            Axis::Horizontal => RgbaImage::new(w, h - band),
        };
        match axis {
            Axis::Vertical => {
                if start > 0 {
                    let before = imageops::crop_imm(&self.image, 0, 0, start, h).to_image();
                    imageops::replace(&mut image, &before, 0, 0);
                }
                if end < w {
                    let after = imageops::crop_imm(&self.image, end, 0, w - end, h).to_image();
                    imageops::replace(&mut image, &after, start as i64, 0);
                }
            }
            Axis::Horizontal => {
                if start > 0 {
                    let before = imageops::crop_imm(&self.image, 0, 0, w, start).to_image();
                    imageops::replace(&mut image, &before, 0, 0);
                }
                if end < h {
                    let after = imageops::crop_imm(&self.image, 0, end, w, h - end).to_image();
                    imageops::replace(&mut image, &after, 0, start as i64);
                }
            }
        }
        Some(Raster { image })
    }

    /// Paste `other` with its top-left corner at (x, y), clipping at the edges.
    pub fn paste(&mut self, other: &Raster, x: i64, y: i64) {
        imageops::replace(&mut self.image, &other.image, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x1 raster with distinct column colors.
    fn striped() -> Raster {
        let mut image = RgbaImage::new(4, 1);
        for x in 0..4 {
            image.put_pixel(x, 0, Rgba([x as u8 * 10, 0, 0, 255]));
        }
        Raster::from_image(image).unwrap()
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(Raster::new(0, 10), Err(EditorError::InvalidArgument(_))));
        assert!(Raster::filled(10, 0, [0, 0, 0, 255]).is_err());
    }

    #[test]
    fn test_extract_bounds() {
        let raster = Raster::new(10, 10).unwrap();
        let sub = raster.extract(2, 3, 5, 4).unwrap();
        assert_eq!((sub.width(), sub.height()), (5, 4));
        assert!(raster.extract(8, 0, 5, 5).is_none());
        assert!(raster.extract(0, 0, 0, 5).is_none());
    }

    #[test]
    fn test_remove_vertical_band_joins_columns() {
        let raster = striped();
        let cut = raster.remove_band(Axis::Vertical, 1, 3).unwrap();
        assert_eq!(cut.width(), 2);
        assert_eq!(cut.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(cut.pixel(1, 0), Some([30, 0, 0, 255]));
    }

    #[test]
    fn test_remove_band_whole_extent_is_rejected() {
        let raster = striped();
        assert!(raster.remove_band(Axis::Vertical, 0, 4).is_none());
        assert!(raster.remove_band(Axis::Vertical, 2, 2).is_none());
        assert!(raster.remove_band(Axis::Horizontal, 0, 1).is_none());
    }

    #[test]
    fn test_serde_payload() {
        let raster = striped();
        let json = serde_json::to_string(&raster).unwrap();
        let back: Raster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, raster);
    }
}
