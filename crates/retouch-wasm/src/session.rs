//! Single-image editing session bindings.
//!
//! An `EditSession` keeps the decoded original in WASM memory and re-renders
//! it from scratch whenever the parameters change, so sliders never stack
//! their effects.
//!
//! ```typescript
//! const session = new EditSession(bytes, false);
//! params.hue = 20;
//! const preview = session.update(params);
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(preview.to_rgba()), preview.width), 0, 0);
//! const jpeg = session.export('jpg');
//! ```

use crate::params::JsParameterSet;
use crate::types::JsRaster;
use retouch_core::{codec, FileFormat, InterpolationFilter, Notice, Pipeline, SingleImageController};
use wasm_bindgen::prelude::*;

fn pipeline_for(use_lanczos: bool) -> Pipeline {
    Pipeline::new(if use_lanczos {
        InterpolationFilter::Lanczos3
    } else {
        InterpolationFilter::Bilinear
    })
}

/// An open image plus its current parameters and rendered output.
#[wasm_bindgen]
pub struct EditSession {
    inner: SingleImageController,
}

#[wasm_bindgen]
impl EditSession {
    /// Decode `bytes` (PNG or JPEG) and start a session with neutral parameters.
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8], use_lanczos: bool) -> Result<EditSession, JsValue> {
        let source = codec::decode_bytes(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            inner: SingleImageController::new(source, pipeline_for(use_lanczos)),
        })
    }

    /// Format of the opened file: "JPEG" or "PNG"
    #[wasm_bindgen(getter)]
    pub fn source_format(&self) -> String {
        self.inner.source_format().to_string()
    }

    /// Re-render the original with `params` and return the new output.
    ///
    /// Stages that cannot run on the current image are skipped; their
    /// messages are written to the console and kept in `notices()`. Throws
    /// on invalid parameters, leaving the previous output in place.
    pub fn update(&mut self, params: &JsParameterSet) -> Result<JsRaster, JsValue> {
        let notices = self
            .inner
            .parameters_changed(params.inner().clone())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        relay_notices(notices);
        Ok(self.output())
    }

    /// The untouched source image
    pub fn original(&self) -> JsRaster {
        JsRaster::from_raster(self.inner.original().clone())
    }

    /// The latest rendered output
    pub fn output(&self) -> JsRaster {
        JsRaster::from_raster(self.inner.output().clone())
    }

    /// Messages from stages skipped during the last update
    pub fn notices(&self) -> Vec<String> {
        self.inner.notices().iter().map(Notice::to_string).collect()
    }

    /// Encode the current output as "png", "jpg" or "jpeg".
    ///
    /// JPEG sources exported as JPEG keep their estimated quality; every
    /// other combination uses maximum quality.
    pub fn export(&self, extension: &str) -> Result<Vec<u8>, JsValue> {
        let format = FileFormat::from_extension(extension)
            .ok_or_else(|| JsValue::from_str(&format!("Unsupported output extension: {}", extension)))?;
        self.inner
            .encode_output(format)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Explicitly free WASM memory
    pub fn free(self) {
        drop(self);
    }
}

/// Run every stage of `params` over a copy of `image` without a session.
#[wasm_bindgen]
pub fn apply_parameters(image: &JsRaster, params: &JsParameterSet, use_lanczos: bool) -> Result<JsRaster, JsValue> {
    params.inner().validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let rendered = pipeline_for(use_lanczos)
        .run(image.raster(), params.inner())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    relay_notices(&rendered.notices);
    Ok(JsRaster::from_raster(rendered.image))
}

#[cfg(target_arch = "wasm32")]
fn relay_notices(notices: &[Notice]) {
    for notice in notices {
        web_sys::console::warn_1(&JsValue::from_str(&notice.to_string()));
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn relay_notices(_notices: &[Notice]) {}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_core::{ColorMode, QualityPolicy, Raster};

    fn png_bytes() -> Vec<u8> {
        let pixels = (0..12 * 8 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let raster = Raster::new(12, 8, ColorMode::Rgb, pixels).unwrap();
        codec::encode_to_vec(&raster, FileFormat::Png, QualityPolicy::Maximum).unwrap()
    }

    #[test]
    fn test_update_renders_from_original() {
        let mut session = EditSession::new(&png_bytes(), false).unwrap();
        assert_eq!(session.source_format(), "PNG");

        let mut params = JsParameterSet::new();
        params.set_zoom(2);
        let first = session.update(&params).unwrap();
        assert_eq!((first.width(), first.height()), (8, 4));

        // Same parameters again must not crop twice.
        let second = session.update(&params).unwrap();
        assert_eq!((second.width(), second.height()), (8, 4));
        assert_eq!(session.original().width(), 12);
    }

    #[test]
    fn test_update_collects_notices() {
        let raster = Raster::solid(4, 4, ColorMode::Rgba, &[10, 20, 30, 200]).unwrap();
        let bytes = codec::encode_to_vec(&raster, FileFormat::Png, QualityPolicy::Maximum).unwrap();
        let mut session = EditSession::new(&bytes, false).unwrap();

        let mut params = JsParameterSet::new();
        params.set_invert(true);
        params.set_brightness(2.0);
        let output = session.update(&params).unwrap();

        let notices = session.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("invert skipped"), "{}", notices[0]);
        assert_eq!(output.pixels()[..4], [20, 40, 60, 200]);

        params.set_invert(false);
        session.update(&params).unwrap();
        assert!(session.notices().is_empty());
    }

    #[test]
    fn test_export_png() {
        let mut session = EditSession::new(&png_bytes(), true).unwrap();
        let mut params = JsParameterSet::new();
        params.set_rotation(90.0);
        session.update(&params).unwrap();

        let bytes = session.export("png").unwrap();
        let decoded = codec::decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.raster.dimensions(), (8, 12));
    }

    #[test]
    fn test_apply_parameters_is_stateless() {
        let image = JsRaster::new(2, 2, "L", vec![10, 20, 30, 40]).unwrap();
        let mut params = JsParameterSet::new();
        params.set_invert(true);
        let result = apply_parameters(&image, &params, false).unwrap();
        assert_eq!(result.pixels(), vec![245, 235, 225, 215]);
        assert_eq!(image.pixels(), vec![10, 20, 30, 40]);
    }
}
