//! In-memory raster model shared by every pipeline stage.

use std::fmt;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a raster is built from inconsistent parts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RasterError {
    /// Pixel buffer length doesn't match the dimensions and mode.
    #[error("Invalid pixel data: expected {expected} bytes for {width}x{height} {mode}, got {actual}")]
    InvalidPixelData {
        width: u32,
        height: u32,
        mode: ColorMode,
        expected: usize,
        actual: usize,
    },

    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Indexed rasters need between 1 and 256 palette entries.
    #[error("Invalid palette: expected 1 to 256 entries, got {0}")]
    InvalidPalette(usize),

    /// An index points past the end of the palette.
    #[error("Palette index {index} out of range for {len} entries")]
    PaletteIndex { index: u8, len: usize },

    /// `Indexed` was passed to a constructor for direct rasters.
    #[error("Use Raster::new_indexed to build palette rasters")]
    PaletteRequired,
}

/// Color mode of a raster, i.e. how to read each pixel's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    /// Single 8-bit luminance channel.
    Luma,
    /// 8-bit red, green, blue.
    Rgb,
    /// 8-bit red, green, blue, alpha.
    Rgba,
    /// One byte per pixel indexing into an RGBA palette.
    Indexed,
    /// Byte-scaled hue, saturation, value (each 0..=255).
    Hsv,
}

impl ColorMode {
    /// Bytes per pixel in this mode.
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Luma | ColorMode::Indexed => 1,
            ColorMode::Rgb | ColorMode::Hsv => 3,
            ColorMode::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        self == ColorMode::Rgba
    }

    /// Direct modes store color values in the pixel buffer itself.
    pub fn is_direct(self) -> bool {
        self != ColorMode::Indexed
    }

    /// Short mode name in the conventional imaging notation ("RGB", "P", ...).
    pub fn name(self) -> &'static str {
        match self {
            ColorMode::Luma => "L",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
            ColorMode::Indexed => "P",
            ColorMode::Hsv => "HSV",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 2D pixel grid with an explicit color mode.
///
/// Pixels are row-major with `mode.channels()` bytes each. For
/// [`ColorMode::Indexed`] every byte is an index into `palette`; the palette
/// is empty for every other mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) mode: ColorMode,
    pub(crate) pixels: Vec<u8>,
    pub(crate) palette: Vec<[u8; 4]>,
}

impl Raster {
    /// Build a direct-mode raster, validating the buffer length.
    pub fn new(width: u32, height: u32, mode: ColorMode, pixels: Vec<u8>) -> Result<Self, RasterError> {
        if mode == ColorMode::Indexed {
            return Err(RasterError::PaletteRequired);
        }
        check_buffer(width, height, mode, pixels.len())?;
        Ok(Self {
            width,
            height,
            mode,
            pixels,
            palette: Vec::new(),
        })
    }

    /// Build a palette raster from per-pixel indices and RGBA palette entries.
    pub fn new_indexed(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Vec<[u8; 4]>,
    ) -> Result<Self, RasterError> {
        if palette.is_empty() || palette.len() > 256 {
            return Err(RasterError::InvalidPalette(palette.len()));
        }
        check_buffer(width, height, ColorMode::Indexed, indices.len())?;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(RasterError::PaletteIndex {
                index,
                len: palette.len(),
            });
        }
        Ok(Self {
            width,
            height,
            mode: ColorMode::Indexed,
            pixels: indices,
            palette,
        })
    }

    /// A raster where every pixel holds `color` (one byte per channel).
    pub fn solid(width: u32, height: u32, mode: ColorMode, color: &[u8]) -> Result<Self, RasterError> {
        if color.len() != mode.channels() {
            return Err(RasterError::InvalidPixelData {
                width: 1,
                height: 1,
                mode,
                expected: mode.channels(),
                actual: color.len(),
            });
        }
        let pixels = color.repeat(width as usize * height as usize);
        Self::new(width, height, mode, pixels)
    }

    /// Internal constructor for stage outputs whose sizes are correct by construction.
    pub(crate) fn from_parts(width: u32, height: u32, mode: ColorMode, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * mode.channels(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            mode,
            pixels,
            palette: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    /// Raw pixel bytes (indices for palette rasters).
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Palette entries; empty unless the mode is [`ColorMode::Indexed`].
    pub fn palette(&self) -> &[[u8; 4]] {
        &self.palette
    }

    /// Bytes of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels();
        let idx = (y as usize * self.width as usize + x as usize) * c;
        self.pixels.get(idx..idx + c)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Whether any palette entry is not fully opaque.
    fn palette_has_alpha(&self) -> bool {
        self.palette.iter().any(|entry| entry[3] != 255)
    }

    /// Expand a palette raster into RGB, or RGBA when the palette carries
    /// transparency. HSV rasters are converted back to RGB. Direct modes are
    /// returned unchanged.
    pub fn into_direct(self) -> Raster {
        match self.mode {
            ColorMode::Indexed => {
                let with_alpha = self.palette_has_alpha();
                let mode = if with_alpha { ColorMode::Rgba } else { ColorMode::Rgb };
                let mut pixels = Vec::with_capacity(self.pixel_count() * mode.channels());
                for &index in &self.pixels {
                    // Indices were validated against the palette on construction.
                    let entry = self.palette.get(index as usize).copied().unwrap_or([0, 0, 0, 255]);
                    if with_alpha {
                        pixels.extend_from_slice(&entry);
                    } else {
                        pixels.extend_from_slice(&entry[..3]);
                    }
                }
                Raster::from_parts(self.width, self.height, mode, pixels)
            }
            ColorMode::Hsv => crate::color::hsv_to_rgb_raster(&self),
            _ => self,
        }
    }

    /// Convert to the `image` crate representation for codecs and filters.
    pub fn to_dynamic(&self) -> Result<DynamicImage, RasterError> {
        let direct;
        let src = if matches!(self.mode, ColorMode::Indexed | ColorMode::Hsv) {
            direct = self.clone().into_direct();
            &direct
        } else {
            self
        };

        let mismatch = || RasterError::InvalidPixelData {
            width: src.width,
            height: src.height,
            mode: src.mode,
            expected: src.pixel_count() * src.channels(),
            actual: src.pixels.len(),
        };
        let (w, h, pixels) = (src.width, src.height, src.pixels.clone());
        let image = match src.mode {
            ColorMode::Luma => DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, pixels).ok_or_else(mismatch)?),
            ColorMode::Rgba => DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, pixels).ok_or_else(mismatch)?),
            _ => DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, pixels).ok_or_else(mismatch)?),
        };
        Ok(image)
    }
}

impl From<DynamicImage> for Raster {
    /// Normalize any decoded image to one of the 8-bit direct modes.
    fn from(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(img) => Raster::from_parts(width, height, ColorMode::Luma, img.into_raw()),
            DynamicImage::ImageRgb8(img) => Raster::from_parts(width, height, ColorMode::Rgb, img.into_raw()),
            DynamicImage::ImageRgba8(img) => Raster::from_parts(width, height, ColorMode::Rgba, img.into_raw()),
            other @ DynamicImage::ImageLuma16(_) => {
                Raster::from_parts(width, height, ColorMode::Luma, other.into_luma8().into_raw())
            }
            other if other.color().has_alpha() => {
                Raster::from_parts(width, height, ColorMode::Rgba, other.into_rgba8().into_raw())
            }
            other => Raster::from_parts(width, height, ColorMode::Rgb, other.into_rgb8().into_raw()),
        }
    }
}

fn check_buffer(width: u32, height: u32, mode: ColorMode, actual: usize) -> Result<(), RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * mode.channels();
    if actual != expected {
        return Err(RasterError::InvalidPixelData {
            width,
            height,
            mode,
            expected,
            actual,
        });
    }
    Ok(())
}
