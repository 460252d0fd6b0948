//! Geometric stages: rotation, zoom (border crop) and flipping.
//!
//! These run first in the editing pipeline, before any color work:
//! 1. Rotation
//! 2. Zoom
//! 3. Flip
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Zoom borders are in pixels, removed from all four edges
//! - Origin is top-left corner
//!
//! Right-angle rotations, zoom and flips only move pixels around, so they keep
//! palette rasters indexed. Free rotation resamples and works on direct modes.

mod crop;
mod flip;
mod rotation;

pub use crop::{crop_border, crop_region};
pub use flip::{apply_flip, flip_horizontal, flip_vertical};
pub use rotation::{apply_rotation, compute_rotated_bounds, InterpolationFilter};
