//! Errors raised by editing stages.

use thiserror::Error;

use crate::raster::{ColorMode, RasterError};

/// Errors that can occur while applying a pipeline stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    /// The stage cannot operate on the raster's current color mode.
    /// The raster is left untouched.
    #[error("Cannot apply {op} to a {mode} image")]
    InvalidOperation { op: &'static str, mode: ColorMode },

    /// Zoom border would leave a zero or negative dimension.
    #[error("Zoom border of {border}px is too large for a {width}x{height} image")]
    Bounds { border: u32, width: u32, height: u32 },

    /// A stage produced or received an inconsistent pixel buffer.
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// A parameter value is out of range for its stage. Nothing was applied.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The run was cancelled between two stages.
    #[error("Editing was cancelled")]
    Cancelled,
}

impl EditError {
    /// Stage-local errors are reported as notices and the pipeline continues.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EditError::InvalidOperation { .. })
    }
}
