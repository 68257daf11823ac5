//! Error types for editor operations.

use thiserror::Error;

/// Errors raised by the effect collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("Effect source is empty")]
    EmptySource,
    #[error("Invalid effect strength: {0}")]
    InvalidStrength(String),
    #[error("Effect failed: {0}")]
    Failed(String),
}

/// Editor errors.
///
/// Geometric no-ops (a crop rectangle outside the raster, a band covering the
/// whole extent) are not errors; those operations report `Ok(false)`. Neither
/// are effect failures: region effects keep the unprocessed pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
