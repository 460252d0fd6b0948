//! Encoding rasters for export.
//!
//! JPEG output uses the `image` crate's JPEG encoder at the quality chosen by
//! the [`QualityPolicy`]. PNG output is lossless with default compression.
//! JPEG has no alpha channel, so alpha is dropped on JPEG export; palette
//! rasters are expanded before encoding.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use super::{FileFormat, QualityPolicy};
use crate::raster::{ColorMode, Raster};

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The output extension is not one of jpg, jpeg or png.
    #[error("Unsupported output extension '{0}' (expected jpg, jpeg or png)")]
    UnsupportedExtension(String),

    /// Writing the output file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder rejected the image.
    #[error("{format} encoding failed: {message}")]
    EncodingFailed { format: FileFormat, message: String },
}

/// Encode a raster and write it to `path`, replacing any existing file.
///
/// The format follows the extension of `path`.
pub fn encode(raster: Raster, path: impl AsRef<Path>, policy: QualityPolicy) -> Result<(), EncodeError> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path).ok_or_else(|| {
        EncodeError::UnsupportedExtension(
            path.extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    })?;

    let bytes = encode_to_vec(&raster, format, policy)?;
    std::fs::write(path, &bytes).map_err(|source| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Encode a raster to PNG or JPEG bytes.
///
/// # Arguments
///
/// * `raster` - Image to encode, in any mode
/// * `format` - Output format
/// * `policy` - JPEG quality policy (ignored for PNG)
pub fn encode_to_vec(raster: &Raster, format: FileFormat, policy: QualityPolicy) -> Result<Vec<u8>, EncodeError> {
    let direct = raster.clone().into_direct();
    let failed = |e: image::ImageError| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    };

    let mut buffer = Cursor::new(Vec::new());
    match format {
        FileFormat::Jpeg => {
            let quality = policy.jpeg_quality();
            let (pixels, color) = match direct.mode() {
                ColorMode::Luma => (direct.pixels().to_vec(), ExtendedColorType::L8),
                ColorMode::Rgba => (strip_alpha(direct.pixels()), ExtendedColorType::Rgb8),
                _ => (direct.pixels().to_vec(), ExtendedColorType::Rgb8),
            };
            JpegEncoder::new_with_quality(&mut buffer, quality)
                .write_image(&pixels, direct.width(), direct.height(), color)
                .map_err(failed)?;
        }
        FileFormat::Png => {
            let color = match direct.mode() {
                ColorMode::Luma => ExtendedColorType::L8,
                ColorMode::Rgba => ExtendedColorType::Rgba8,
                _ => ExtendedColorType::Rgb8,
            };
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Adaptive)
                .write_image(direct.pixels(), direct.width(), direct.height(), color)
                .map_err(failed)?;
        }
    }

    Ok(buffer.into_inner())
}

fn strip_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect()
}
