//! WASM-compatible wrapper types for image data.
//!
//! JavaScript only ever sees direct 8-bit rasters through [`JsRaster`]; use
//! [`JsRaster::to_rgba`] when the pixels are headed for a canvas `ImageData`.

use retouch_core::{ColorMode, Raster};
use wasm_bindgen::prelude::*;

/// A raster wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. `pixels()` and `to_rgba()` copy
/// it out to a JavaScript `Uint8Array`. Call `free()` to release the WASM side
/// early, otherwise wasm-bindgen's finalizer cleans it up.
#[wasm_bindgen]
pub struct JsRaster {
    inner: Raster,
}

#[wasm_bindgen]
impl JsRaster {
    /// Create a raster from dimensions, a mode name ("L", "RGB" or "RGBA")
    /// and row-major pixel data.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, mode: &str, pixels: Vec<u8>) -> Result<JsRaster, JsValue> {
        let mode = parse_mode(mode).ok_or_else(|| JsValue::from_str(&format!("Unsupported color mode: {}", mode)))?;
        let inner = Raster::new(width, height, mode, pixels).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Color mode name, e.g. "RGB" or "P" for palette images
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.mode().name().to_string()
    }

    /// Bytes per pixel in `pixels()`
    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> usize {
        self.inner.channels()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns the raw pixel buffer as a Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Palette entries flattened to RGBA quadruplets; empty unless the mode is "P".
    pub fn palette(&self) -> Vec<u8> {
        self.inner.palette().iter().flatten().copied().collect()
    }

    /// Returns the image as RGBA8, ready for `new ImageData(...)`.
    pub fn to_rgba(&self) -> Vec<u8> {
        expand_to_rgba(&self.inner)
    }

    /// Explicitly free WASM memory
    pub fn free(self) {
        drop(self);
    }
}

impl JsRaster {
    pub(crate) fn from_raster(inner: Raster) -> Self {
        Self { inner }
    }

    pub(crate) fn raster(&self) -> &Raster {
        &self.inner
    }

    pub(crate) fn into_raster(self) -> Raster {
        self.inner
    }
}

/// Parse the mode names accepted from JavaScript. Only direct modes can be
/// built from a plain pixel buffer.
pub(crate) fn parse_mode(name: &str) -> Option<ColorMode> {
    match name.to_ascii_uppercase().as_str() {
        "L" => Some(ColorMode::Luma),
        "RGB" => Some(ColorMode::Rgb),
        "RGBA" => Some(ColorMode::Rgba),
        _ => None,
    }
}

fn expand_to_rgba(raster: &Raster) -> Vec<u8> {
    let direct = raster.clone().into_direct();
    let mut out = Vec::with_capacity(direct.pixel_count() * 4);
    for px in direct.pixels().chunks_exact(direct.channels()) {
        match px {
            [v] => out.extend_from_slice(&[*v, *v, *v, 255]),
            [r, g, b] => out.extend_from_slice(&[*r, *g, *b, 255]),
            _ => out.extend_from_slice(px),
        }
    }
    out
}
