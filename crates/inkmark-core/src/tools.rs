//! Tool system: which annotation a pointer-down creates.

use crate::annotations::{
    Annotation, AnnotationStyle, EffectAnnotation, FreehandAnnotation, LineAnnotation, NumberAnnotation,
    RegionAnnotation, SerializableColor, ShapeAnnotation, SpeechBalloonAnnotation, SpotlightAnnotation,
    TextAnnotation,
};
use crate::config::EditorSettings;
use crate::effects::EffectKind;
use crate::raster::{Axis, Raster};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools. Also used as the type tag stored on every annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Freehand,
    SmartEraser,
    Text,
    Number,
    SpeechBalloon,
    Spotlight,
    Blur,
    Pixelate,
    Magnify,
    Highlight,
    /// Tag of inserted images; not a drawing tool.
    Image,
    Crop,
    CutOutVertical,
    CutOutHorizontal,
}

impl ToolKind {
    /// Tools placed with a single click; no minimum-size check applies.
    pub fn is_single_click(self) -> bool {
        matches!(self, ToolKind::Text | ToolKind::Number)
    }

    pub fn effect_kind(self) -> Option<EffectKind> {
        match self {
            ToolKind::Blur => Some(EffectKind::Blur),
            ToolKind::Pixelate => Some(EffectKind::Pixelate),
            ToolKind::Magnify => Some(EffectKind::Magnify),
            ToolKind::Highlight => Some(EffectKind::Highlight),
            _ => None,
        }
    }

    /// Band direction for the cut-out tools.
    pub fn cut_axis(self) -> Option<Axis> {
        match self {
            ToolKind::CutOutVertical => Some(Axis::Vertical),
            ToolKind::CutOutHorizontal => Some(Axis::Horizontal),
            _ => None,
        }
    }
}

impl From<EffectKind> for ToolKind {
    fn from(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Blur => ToolKind::Blur,
            EffectKind::Pixelate => ToolKind::Pixelate,
            EffectKind::Magnify => ToolKind::Magnify,
            EffectKind::Highlight => ToolKind::Highlight,
        }
    }
}

/// Everything the factory needs besides the tool and the point.
pub struct ToolContext<'a> {
    pub style: &'a AnnotationStyle,
    pub settings: &'a EditorSettings,
    pub raster: &'a Raster,
    /// Number given to a new number marker.
    pub next_number: u32,
}

/// Instantiate the annotation `tool` creates at `point`.
///
/// Returns `None` for tools that don't draw ([`ToolKind::Select`], [`ToolKind::Image`]).
pub fn create_annotation(tool: ToolKind, point: Point, ctx: &ToolContext<'_>) -> Option<Annotation> {
    let style = ctx.style.clone();
    let annotation = match tool {
        ToolKind::Select | ToolKind::Image => return None,
        ToolKind::Rectangle | ToolKind::Ellipse => Annotation::Shape(ShapeAnnotation::new(tool, point, style)),
        ToolKind::Line | ToolKind::Arrow => Annotation::Line(LineAnnotation::new(tool, point, style)),
        ToolKind::Freehand => Annotation::Freehand(FreehandAnnotation::new(tool, point, style)),
        ToolKind::SmartEraser => {
            let background = sample(ctx.raster, point).unwrap_or_else(SerializableColor::white);
            Annotation::Freehand(FreehandAnnotation::eraser(point, background, style))
        }
        ToolKind::Text => Annotation::Text(TextAnnotation::new(
            point,
            String::new(),
            ctx.settings.default_font_size,
            style,
        )),
        ToolKind::Number => Annotation::Number(NumberAnnotation::new(ctx.next_number, point, style)),
        ToolKind::SpeechBalloon => Annotation::SpeechBalloon(SpeechBalloonAnnotation::new(point, style)),
        ToolKind::Spotlight => Annotation::Spotlight(SpotlightAnnotation::new(
            point,
            ctx.settings.spotlight_opacity,
            ctx.raster.size(),
            style,
        )),
        ToolKind::Blur | ToolKind::Pixelate | ToolKind::Magnify | ToolKind::Highlight => {
            let kind = tool.effect_kind()?;
            let strength = ctx.settings.effect_strength.get(kind);
            Annotation::Effect(EffectAnnotation::new(kind, strength, point, style))
        }
        ToolKind::Crop | ToolKind::CutOutVertical | ToolKind::CutOutHorizontal => {
            Annotation::Region(RegionAnnotation::new(tool, point, style))
        }
    };
    Some(annotation)
}

/// Raster color under `point`, `None` outside.
fn sample(raster: &Raster, point: Point) -> Option<SerializableColor> {
    if point.x < 0.0 || point.y < 0.0 {
        return None;
    }
    raster.pixel(point.x as u32, point.y as u32).map(SerializableColor::from)
}
