//! Single-line text annotations.

use super::{AnnotationBase, AnnotationStyle, AnnotationTrait};
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A text label placed at `start`; `end` tracks the estimated layout size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub base: AnnotationBase,
    pub text: String,
    /// Font size in pixels.
    pub font_size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl TextAnnotation {
    /// Minimum box width so an empty label stays clickable.
    const MIN_CHARS: usize = 4;

    pub fn new(position: Point, text: String, font_size: f64, style: AnnotationStyle) -> Self {
        let mut annotation = Self {
            base: AnnotationBase::new(ToolKind::Text, position, style),
            text,
            font_size,
            bold: false,
            italic: false,
        };
        annotation.fit_to_text();
        annotation
    }

    /// Approximate (width, height) of the laid-out line.
    ///
    /// The renderer owns real shaping; this estimate only drives hit-testing
    /// and handles until the host reports otherwise.
    pub fn estimated_size(&self) -> (f64, f64) {
        let chars = self.text.chars().count().max(Self::MIN_CHARS);
        let factor = if self.bold { 0.6 } else { 0.55 };
        (chars as f64 * self.font_size * factor, self.font_size * 1.25)
    }

    /// Resize the box to the estimated text extent, keeping the top-left corner.
    pub fn fit_to_text(&mut self) {
        let origin = self.base.normalized().origin();
        let (w, h) = self.estimated_size();
        self.base.start = origin;
        self.base.end = Point::new(origin.x + w, origin.y + h);
    }

    /// Replace the content and refit the box.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.fit_to_text();
    }
}

impl AnnotationTrait for TextAnnotation {
    fn base(&self) -> &AnnotationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnnotationBase {
        &mut self.base
    }

    fn supports_rotation(&self) -> bool {
        true
    }
}
