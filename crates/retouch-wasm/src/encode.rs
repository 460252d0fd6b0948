//! Image encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_image } from '@retouch/wasm';
//!
//! const pngBytes = encode_image(image, 'png');
//! const jpegBytes = encode_image(image, 'jpg', 85);
//! ```

use crate::types::JsRaster;
use retouch_core::{codec, FileFormat, QualityPolicy};
use wasm_bindgen::prelude::*;

/// Encode an image to PNG or JPEG bytes.
///
/// # Arguments
///
/// * `image` - The image to encode
/// * `extension` - Target format by extension: "png", "jpg" or "jpeg"
/// * `quality` - JPEG quality (1-100); omit for maximum quality. Ignored for PNG.
///
/// JPEG output drops the alpha channel.
#[wasm_bindgen]
pub fn encode_image(image: &JsRaster, extension: &str, quality: Option<u8>) -> Result<Vec<u8>, JsValue> {
    let format = FileFormat::from_extension(extension)
        .ok_or_else(|| JsValue::from_str(&format!("Unsupported output extension: {}", extension)))?;
    codec::encode_to_vec(image.raster(), format, quality_policy(quality))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn quality_policy(quality: Option<u8>) -> QualityPolicy {
    match quality {
        Some(q) => QualityPolicy::Fixed(q),
        None => QualityPolicy::Maximum,
    }
}
