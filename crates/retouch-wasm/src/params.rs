//! Editing parameter WASM bindings.
//!
//! Exposes the core `ParameterSet` to TypeScript as flat getters and setters,
//! one per stage value.

use retouch_core::{FlipAxis, ParameterSet};
use wasm_bindgen::prelude::*;

/// Editing parameters wrapper for JavaScript
#[wasm_bindgen]
pub struct JsParameterSet {
    inner: ParameterSet,
}

#[wasm_bindgen]
impl JsParameterSet {
    /// Create a parameter set with every stage neutral
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: ParameterSet::new(),
        }
    }

    /// Rotation in degrees, counter-clockwise
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f32 {
        self.inner.position.rotation
    }

    #[wasm_bindgen(setter)]
    pub fn set_rotation(&mut self, value: f32) {
        self.inner.position.rotation = value;
    }

    /// Border removed from each edge, in pixels
    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> u32 {
        self.inner.position.zoom
    }

    #[wasm_bindgen(setter)]
    pub fn set_zoom(&mut self, value: u32) {
        self.inner.position.zoom = value;
    }

    /// Flip axis: "none", "x", "y" or "both"
    #[wasm_bindgen(getter)]
    pub fn flip(&self) -> String {
        self.inner.position.flip.name().to_string()
    }

    /// Set the flip axis by name. Also accepts "horizontal" and "vertical".
    pub fn set_flip(&mut self, axis: &str) -> Result<(), JsValue> {
        self.inner.position.flip = axis.parse::<FlipAxis>().map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.filters.brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.filters.brightness = value;
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.filters.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.filters.saturation = value;
    }

    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> bool {
        self.inner.filters.grayscale
    }

    #[wasm_bindgen(setter)]
    pub fn set_grayscale(&mut self, value: bool) {
        self.inner.filters.grayscale = value;
    }

    #[wasm_bindgen(getter)]
    pub fn invert(&self) -> bool {
        self.inner.filters.invert
    }

    #[wasm_bindgen(setter)]
    pub fn set_invert(&mut self, value: bool) {
        self.inner.filters.invert = value;
    }

    #[wasm_bindgen(getter)]
    pub fn four_color(&self) -> bool {
        self.inner.filters.four_color
    }

    #[wasm_bindgen(setter)]
    pub fn set_four_color(&mut self, value: bool) {
        self.inner.filters.four_color = value;
    }

    /// Gaussian blur sigma
    #[wasm_bindgen(getter)]
    pub fn blur(&self) -> f32 {
        self.inner.effects.blur
    }

    #[wasm_bindgen(setter)]
    pub fn set_blur(&mut self, value: f32) {
        self.inner.effects.blur = value;
    }

    /// Unsharp mask strength
    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.effects.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.effects.contrast = value;
    }

    /// Hue shift, -100 to 100
    #[wasm_bindgen(getter)]
    pub fn hue(&self) -> i32 {
        self.inner.effects.hue
    }

    #[wasm_bindgen(setter)]
    pub fn set_hue(&mut self, value: i32) {
        self.inner.effects.hue = value;
    }

    /// Check if every stage is at its neutral value
    pub fn is_neutral(&self) -> bool {
        self.inner.is_neutral()
    }

    pub fn reset_position(&mut self) {
        self.inner.reset_position();
    }

    pub fn reset_filters(&mut self) {
        self.inner.reset_filters();
    }

    pub fn reset_effects(&mut self) {
        self.inner.reset_effects();
    }

    /// Throws if any value is out of range
    pub fn validate(&self) -> Result<(), JsValue> {
        self.inner.validate().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Serialize to JSON for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Deserialize from JSON
    pub fn from_json(value: JsValue) -> Result<JsParameterSet, JsValue> {
        let inner: ParameterSet =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    /// Render as a TOML preset, the format the command line tool reads
    pub fn to_toml(&self) -> Result<String, JsValue> {
        self.inner.to_toml_string().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Parse and validate a TOML preset
    pub fn from_toml(text: &str) -> Result<JsParameterSet, JsValue> {
        let inner = ParameterSet::from_toml_str(text).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Default for JsParameterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl JsParameterSet {
    pub(crate) fn inner(&self) -> &ParameterSet {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_neutral() {
        let params = JsParameterSet::new();
        assert!(params.is_neutral());
        assert_eq!(params.flip(), "none");
        assert_eq!(params.brightness(), 1.0);
        assert_eq!(params.saturation(), 1.0);
        assert_eq!(params.hue(), 0);
    }

    #[test]
    fn test_setters_reach_every_group() {
        let mut params = JsParameterSet::new();
        params.set_rotation(90.0);
        params.set_zoom(4);
        params.set_flip("horizontal").unwrap();
        params.set_brightness(1.5);
        params.set_saturation(0.0);
        params.set_grayscale(true);
        params.set_invert(true);
        params.set_four_color(true);
        params.set_blur(2.0);
        params.set_contrast(0.5);
        params.set_hue(-30);

        let inner = params.inner();
        assert_eq!(inner.position.rotation, 90.0);
        assert_eq!(inner.position.zoom, 4);
        assert_eq!(inner.position.flip, FlipAxis::X);
        assert_eq!(params.flip(), "x");
        assert_eq!(inner.filters.brightness, 1.5);
        assert_eq!(inner.filters.saturation, 0.0);
        assert!(inner.filters.grayscale && inner.filters.invert && inner.filters.four_color);
        assert_eq!(inner.effects.blur, 2.0);
        assert_eq!(inner.effects.contrast, 0.5);
        assert_eq!(inner.effects.hue, -30);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_group_resets() {
        let mut params = JsParameterSet::new();
        params.set_zoom(3);
        params.set_invert(true);
        params.set_hue(10);

        params.reset_position();
        assert_eq!(params.zoom(), 0);
        assert!(!params.is_neutral());

        params.reset_filters();
        assert!(!params.invert());

        params.reset_effects();
        assert!(params.is_neutral());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut params = JsParameterSet::new();
        params.set_blur(1.25);
        params.set_flip("both").unwrap();

        let text = params.to_toml().unwrap();
        let parsed = JsParameterSet::from_toml(&text).unwrap();
        assert_eq!(parsed.inner(), params.inner());
    }
}
