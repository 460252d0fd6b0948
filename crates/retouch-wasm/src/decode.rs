//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, estimate_jpeg_quality } from '@retouch/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height} ${image.mode}`);
//! console.log(`JPEG quality: ${estimate_jpeg_quality(bytes) ?? 'n/a'}`);
//! ```

use crate::types::JsRaster;
use retouch_core::codec;
use wasm_bindgen::prelude::*;

/// Decode a PNG or JPEG image from bytes.
///
/// The format is sniffed from the content, not from a file name. Palette and
/// 16-bit images come back as 8-bit "L", "RGB" or "RGBA" rasters.
///
/// # Errors
///
/// Throws if the bytes are not a supported format or are corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    codec::decode_bytes(bytes)
        .map(|source| JsRaster::from_raster(source.raster))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Estimate the quality a JPEG was saved with from its luminance
/// quantization table. Returns `undefined` for non-JPEG input.
#[wasm_bindgen]
pub fn estimate_jpeg_quality(bytes: &[u8]) -> Option<u8> {
    codec::estimate_jpeg_quality(bytes)
}

/// Tests for decode bindings.
///
/// `decode_image` returns `Result<T, JsValue>`, which only works on wasm32
/// targets; native tests go through the core codec directly.
#[cfg(test)]
mod tests {
    use super::*;
    use retouch_core::{ColorMode, FileFormat, QualityPolicy, Raster};

    fn encoded(format: FileFormat) -> Vec<u8> {
        let raster = Raster::solid(8, 4, ColorMode::Rgb, &[90, 120, 150]).unwrap();
        codec::encode_to_vec(&raster, format, QualityPolicy::Fixed(60)).unwrap()
    }

    #[test]
    fn test_estimate_quality_of_jpeg() {
        let quality = estimate_jpeg_quality(&encoded(FileFormat::Jpeg)).unwrap();
        assert!((quality as i32 - 60).abs() <= 2, "estimated {}", quality);
    }

    #[test]
    fn test_estimate_quality_of_png() {
        assert_eq!(estimate_jpeg_quality(&encoded(FileFormat::Png)), None);
    }

    #[test]
    fn test_decoded_source_wraps() {
        let source = codec::decode_bytes(&encoded(FileFormat::Png)).unwrap();
        let image = JsRaster::from_raster(source.raster);
        assert_eq!((image.width(), image.height()), (8, 4));
        assert_eq!(image.mode(), "RGB");
    }
}
