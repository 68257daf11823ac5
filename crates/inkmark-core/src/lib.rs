//! Inkmark Core Library
//!
//! Platform-agnostic editing engine for the Inkmark image annotator: the
//! annotation model, pointer-driven interaction, undo/redo history and the
//! destructive raster operations (crop, band cut-out).

pub mod annotations;
pub mod config;
pub mod editor;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod history;
pub mod raster;
pub mod tools;

pub use annotations::{Annotation, AnnotationId, AnnotationStyle, AnnotationTrait, SerializableColor};
pub use config::EditorSettings;
pub use editor::{Editor, EditorEvent, EditorObserver, InteractionState};
pub use effects::{BuiltinEffects, EffectKind, EffectProcessor};
pub use error::{EditorError, EditorResult, EffectError};
pub use geometry::{Handle, HandleKind};
pub use history::{HistoryManager, Memento};
pub use raster::{Axis, Raster};
pub use tools::ToolKind;
