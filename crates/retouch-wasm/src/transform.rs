//! WASM bindings for the geometric stages.
//!
//! Single-stage entry points for interactive previews; full edits go through
//! [`crate::session::EditSession`].

use crate::types::JsRaster;
use retouch_core::transform::{self, InterpolationFilter};
use retouch_core::FlipAxis;
use wasm_bindgen::prelude::*;

/// Rotate an image around its center, expanding the canvas to fit.
///
/// # Arguments
///
/// * `image` - Source image
/// * `angle_degrees` - Rotation angle (positive = counter-clockwise)
/// * `use_lanczos` - Use the Lanczos3 filter (slower), otherwise bilinear
///
/// # Example (TypeScript)
///
/// ```typescript
/// const preview = apply_rotation(sourceImage, 15.0, false);
/// const exported = apply_rotation(sourceImage, 15.0, true);
/// ```
#[wasm_bindgen]
pub fn apply_rotation(image: &JsRaster, angle_degrees: f64, use_lanczos: bool) -> JsRaster {
    let filter = if use_lanczos {
        InterpolationFilter::Lanczos3
    } else {
        InterpolationFilter::Bilinear
    };
    JsRaster::from_raster(transform::apply_rotation(image.raster(), angle_degrees, filter))
}

/// Remove `border` pixels from every edge.
///
/// Throws if the border would leave nothing of the image.
#[wasm_bindgen]
pub fn apply_zoom(image: &JsRaster, border: u32) -> Result<JsRaster, JsValue> {
    transform::crop_border(image.raster(), border)
        .map(JsRaster::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Mirror an image: "x" (left to right), "y" (top to bottom), "both" or "none".
#[wasm_bindgen]
pub fn apply_flip(image: &JsRaster, axis: &str) -> Result<JsRaster, JsValue> {
    let axis = axis.parse::<FlipAxis>().map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(JsRaster::from_raster(transform::apply_flip(image.raster(), axis)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a simple test image.
    fn test_image(width: u32, height: u32) -> JsRaster {
        let pixels: Vec<u8> = (0..(width * height * 3) as usize).map(|i| (i % 256) as u8).collect();
        JsRaster::new(width, height, "RGB", pixels).unwrap()
    }

    #[test]
    fn test_rotation_no_change() {
        let img = test_image(40, 40);
        let result = apply_rotation(&img, 0.0, false);
        assert_eq!((result.width(), result.height()), (40, 40));
        assert_eq!(result.pixels(), img.pixels());
    }

    #[test]
    fn test_rotation_90_degrees() {
        let img = test_image(40, 20);
        let result = apply_rotation(&img, 90.0, true);
        assert_eq!((result.width(), result.height()), (20, 40));
    }

    #[test]
    fn test_rotation_45_degrees_expands() {
        let img = test_image(40, 40);
        let result = apply_rotation(&img, 45.0, false);
        assert!(result.width() > 40);
        assert!(result.height() > 40);
    }

    #[test]
    fn test_zoom_shrinks_each_edge() {
        let result = apply_zoom(&test_image(10, 8), 2).unwrap();
        assert_eq!((result.width(), result.height()), (6, 4));
    }

    #[test]
    fn test_flip_both() {
        let img = JsRaster::new(2, 1, "L", vec![1, 2]).unwrap();
        let result = apply_flip(&img, "both").unwrap();
        assert_eq!(result.pixels(), vec![2, 1]);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_zoom_too_large_throws() {
        let img = JsRaster::new(4, 4, "L", vec![0; 16]).unwrap();
        assert!(apply_zoom(&img, 2).is_err());
    }

    #[wasm_bindgen_test]
    fn test_flip_unknown_axis_throws() {
        let img = JsRaster::new(1, 1, "L", vec![0]).unwrap();
        assert!(apply_flip(&img, "diagonal").is_err());
    }
}
