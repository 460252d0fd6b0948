//! Retouch WASM - WebAssembly bindings for Retouch
//!
//! This crate exposes the retouch-core editing pipeline to JavaScript and
//! TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - `JsRaster`, the WASM-side image wrapper
//! - `params` - `JsParameterSet`, the editing parameters
//! - `session` - `EditSession`, an open image re-rendered on every change
//! - `decode` / `encode` - PNG and JPEG bytes in and out
//! - `transform` - single-stage rotation, zoom and flip for previews
//!
//! # Usage
//!
//! ```typescript
//! import init, { EditSession, JsParameterSet } from '@retouch/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const session = new EditSession(bytes, false);
//! const params = new JsParameterSet();
//! params.brightness = 1.2;
//! const preview = session.update(params);
//! console.log(`Rendered ${preview.width}x${preview.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod params;
mod session;
mod transform;
mod types;

// Re-export public types
pub use decode::{decode_image, estimate_jpeg_quality};
pub use encode::encode_image;
pub use params::JsParameterSet;
pub use session::{apply_parameters, EditSession};
pub use transform::{apply_flip, apply_rotation, apply_zoom};
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
