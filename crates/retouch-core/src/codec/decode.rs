//! Image decoding for PNG and JPEG sources.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

use super::{estimate_jpeg_quality, FileFormat};
use crate::raster::Raster;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    UnsupportedFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    Corrupted(String),
}

/// A decoded source image and what is known about its encoding.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    pub raster: Raster,
    pub format: FileFormat,
    /// Estimated quality for JPEG sources.
    pub jpeg_quality: Option<u8>,
}

/// Read and decode an image file.
///
/// The format is detected from the file contents, not the extension.
///
/// # Errors
///
/// Returns `DecodeError::Io` if the file cannot be read, along with the
/// errors of [`decode_bytes`].
pub fn decode(path: impl AsRef<Path>) -> Result<DecodedSource, DecodeError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = decode_bytes(&bytes)?;
    log::debug!(
        "Decoded {} ({} {}x{} {})",
        path.display(),
        decoded.format,
        decoded.raster.width(),
        decoded.raster.height(),
        decoded.raster.mode()
    );
    Ok(decoded)
}

/// Decode an image from bytes.
///
/// # Arguments
///
/// * `bytes` - Raw PNG or JPEG file bytes
///
/// # Returns
///
/// The image as an 8-bit grayscale, RGB or RGBA raster.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` if the bytes are not PNG or JPEG.
/// Returns `DecodeError::Corrupted` if the file is damaged or truncated.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedSource, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    let format = match reader.format() {
        Some(image::ImageFormat::Jpeg) => FileFormat::Jpeg,
        Some(image::ImageFormat::Png) => FileFormat::Png,
        _ => return Err(DecodeError::UnsupportedFormat),
    };

    let img = reader
        .decode()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    let jpeg_quality = match format {
        FileFormat::Jpeg => estimate_jpeg_quality(bytes),
        FileFormat::Png => None,
    };

    Ok(DecodedSource {
        raster: Raster::from(img),
        format,
        jpeg_quality,
    })
}
