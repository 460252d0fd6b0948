//! Reading and writing image files.
//!
//! This module provides functionality for:
//! - Decoding PNG and JPEG files into a [`Raster`](crate::Raster)
//! - Estimating the quality a JPEG was saved with
//! - Encoding rasters to PNG or JPEG following a [`QualityPolicy`]
//!
//! # Quality policy
//!
//! Exporting to JPEG from a JPEG source keeps the source quality. Every
//! other export is written at maximum quality.

mod decode;
mod encode;
mod quality;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use decode::{decode, decode_bytes, DecodeError, DecodedSource};
pub use encode::{encode, encode_to_vec, EncodeError};
pub use quality::estimate_jpeg_quality;

/// Highest JPEG quality, also used when the source quality is unknown.
pub const MAX_QUALITY: u8 = 100;

/// File formats that can be read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Jpeg,
    Png,
}

impl FileFormat {
    /// Match a file extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(FileFormat::Jpeg),
            "png" => Some(FileFormat::Png),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Preferred extension for new files.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Jpeg => "jpg",
            FileFormat::Png => "png",
        }
    }

    pub fn supports_alpha(self) -> bool {
        self == FileFormat::Png
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileFormat::Jpeg => "JPEG",
            FileFormat::Png => "PNG",
        })
    }
}

/// How lossy output quality is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPolicy {
    /// Quality 100.
    #[default]
    Maximum,
    /// A specific JPEG quality (1-100).
    Fixed(u8),
}

impl QualityPolicy {
    /// Pick the policy for exporting a source of `source_format` to `target`.
    ///
    /// JPEG to JPEG keeps `source_quality`, falling back to maximum quality
    /// when it could not be estimated.
    pub fn for_export(source_format: Option<FileFormat>, source_quality: Option<u8>, target: FileFormat) -> Self {
        match (source_format, target) {
            (Some(FileFormat::Jpeg), FileFormat::Jpeg) => match source_quality {
                Some(quality) => QualityPolicy::Fixed(quality),
                None => QualityPolicy::Maximum,
            },
            _ => QualityPolicy::Maximum,
        }
    }

    /// JPEG quality to encode with.
    pub fn jpeg_quality(self) -> u8 {
        match self {
            QualityPolicy::Maximum => MAX_QUALITY,
            QualityPolicy::Fixed(quality) => quality.clamp(1, MAX_QUALITY),
        }
    }
}
