//! Tonal and color filter algorithms.
//!
//! Applies the per-pixel color filters of the editing pipeline.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Saturation
//! 3. Grayscale
//! 4. Invert
//!
//! Every filter returns a new raster. Alpha channels are carried through
//! unchanged, and palette rasters are expanded to RGB(A) before any
//! arithmetic.

use crate::error::EditError;
use crate::luminance::luma_u8;
use crate::raster::{ColorMode, Raster};

/// Scale every color channel by `factor`.
///
/// Formula: `output = input * factor`, clamped to 255.
///
/// 1.0 is identity and 0.0 produces black with alpha kept.
pub fn adjust_brightness(image: &Raster, factor: f32) -> Raster {
    let mut out = image.clone().into_direct();
    if factor == 1.0 {
        return out;
    }

    for_each_color_pixel(&mut out, |color| {
        for v in color {
            *v = scale(*v as f32 * factor);
        }
    });
    out
}

/// Move every pixel toward (`factor < 1`) or away from (`factor > 1`) its
/// own luminance.
///
/// Formula: `output = gray + factor * (input - gray)` with Rec.601 luma as
/// `gray`. 1.0 is identity and 0.0 is fully desaturated.
pub fn adjust_saturation(image: &Raster, factor: f32) -> Raster {
    let mut out = image.clone().into_direct();
    if factor == 1.0 || out.mode == ColorMode::Luma {
        return out;
    }

    for_each_color_pixel(&mut out, |color| {
        let gray = luma_u8(color[0], color[1], color[2]) as f32;
        for v in color {
            *v = scale(gray + factor * (*v as f32 - gray));
        }
    });
    out
}

/// Replace every pixel by its luminance, keeping the mode.
///
/// RGB stays RGB with `R = G = B`, RGBA keeps its alpha and grayscale
/// images are returned as-is.
pub fn to_grayscale(image: &Raster) -> Raster {
    let mut out = image.clone().into_direct();
    if out.mode == ColorMode::Luma {
        return out;
    }

    for_each_color_pixel(&mut out, |color| {
        let gray = luma_u8(color[0], color[1], color[2]);
        color.fill(gray);
    });
    out
}

/// Invert every channel: `output = 255 - input`.
///
/// # Errors
///
/// Only grayscale and RGB images can be inverted. RGBA, palette and HSV
/// images fail with [`EditError::InvalidOperation`].
pub fn invert(image: &Raster) -> Result<Raster, EditError> {
    match image.mode {
        ColorMode::Luma | ColorMode::Rgb => {}
        mode => {
            return Err(EditError::InvalidOperation {
                op: "color inversion",
                mode,
            })
        }
    }

    let mut out = image.clone();
    for v in out.pixels.iter_mut() {
        *v = 255 - *v;
    }
    Ok(out)
}

/// Run `f` over the color channels of each pixel, skipping alpha.
///
/// Grayscale pixels are passed as one-element slices.
fn for_each_color_pixel(image: &mut Raster, mut f: impl FnMut(&mut [u8])) {
    let c = image.channels();
    let color_channels = if image.mode.has_alpha() { c - 1 } else { c };
    for px in image.pixels.chunks_exact_mut(c) {
        f(&mut px[..color_channels]);
    }
}

#[inline]
fn scale(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
