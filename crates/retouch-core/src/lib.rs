//! Retouch Core - Image editing library
//!
//! This crate provides the core image editing functionality for Retouch:
//! the raster model, the eleven-stage editing pipeline, PNG/JPEG codecs,
//! batch export and the single-image and batch editing sessions.

pub mod adjustments;
pub mod batch;
pub mod codec;
pub mod color;
pub mod controller;
pub mod editor;
pub mod error;
pub mod filter;
pub mod luminance;
pub mod params;
pub mod pipeline;
pub mod quantize;
pub mod raster;
pub mod transform;

pub use batch::{
    apply_and_export, enumerate, list_images, BatchError, BatchItem, BatchJob, BatchReport,
    ItemOutcome,
};
pub use codec::{DecodeError, DecodedSource, EncodeError, FileFormat, QualityPolicy};
pub use controller::{BatchController, Controller, ControllerError, EditingMode, SingleImageController};
pub use editor::{ImageEditor, Notice, Stage};
pub use error::EditError;
pub use params::{Effects, Filters, FlipAxis, ParamError, ParameterSet, Position};
pub use pipeline::{Pipeline, Rendered};
pub use raster::{ColorMode, Raster, RasterError};
pub use transform::InterpolationFilter;
