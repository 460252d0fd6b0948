//! HSV color-space conversion and the hue stage.
//!
//! HSV here is byte-scaled: hue, saturation and value each span 0..=255, so a
//! full turn of the hue circle is 256 steps. Shifting hue adds to the H byte
//! with modulo-256 wrap-around.

use crate::raster::{ColorMode, Raster};

/// Convert one RGB pixel to byte-scaled HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    if maxc == minc {
        return [0, 0, maxc];
    }

    let range = (maxc - minc) as f32;
    let s = range / maxc as f32;
    let rc = (maxc - r) as f32 / range;
    let gc = (maxc - g) as f32 / range;
    let bc = (maxc - b) as f32 / range;

    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    let h = (h / 6.0 + 1.0).rem_euclid(1.0);

    [
        (h * 255.0).round().min(255.0) as u8,
        (s * 255.0).round() as u8,
        maxc,
    ]
}

/// Convert one byte-scaled HSV pixel back to RGB.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> [u8; 3] {
    if s == 0 {
        return [v, v, v];
    }

    let hf = h as f32 * 6.0 / 255.0;
    let sector = hf.floor();
    let f = hf - sector;
    let sf = s as f32 / 255.0;
    let vf = v as f32;

    let p = (vf * (1.0 - sf)).round() as u8;
    let q = (vf * (1.0 - sf * f)).round() as u8;
    let t = (vf * (1.0 - sf * (1.0 - f))).round() as u8;

    match sector as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Convert a raster to the HSV working representation.
///
/// Alpha, if present, is dropped; palette rasters are expanded first.
pub fn to_hsv(image: &Raster) -> Raster {
    let direct = image.clone().into_direct();
    if direct.mode == ColorMode::Hsv {
        return direct;
    }

    let c = direct.channels();
    let mut pixels = Vec::with_capacity(direct.pixel_count() * 3);
    for px in direct.pixels.chunks_exact(c) {
        let hsv = match direct.mode {
            ColorMode::Luma => [0, 0, px[0]],
            _ => rgb_to_hsv(px[0], px[1], px[2]),
        };
        pixels.extend_from_slice(&hsv);
    }
    Raster::from_parts(direct.width, direct.height, ColorMode::Hsv, pixels)
}

/// Convert an HSV raster back to RGB.
pub(crate) fn hsv_to_rgb_raster(image: &Raster) -> Raster {
    debug_assert_eq!(image.mode, ColorMode::Hsv);
    let mut pixels = Vec::with_capacity(image.pixel_count() * 3);
    for px in image.pixels.chunks_exact(3) {
        pixels.extend_from_slice(&hsv_to_rgb(px[0], px[1], px[2]));
    }
    Raster::from_parts(image.width, image.height, ColorMode::Rgb, pixels)
}

/// Rotate the hue of every pixel by `shift` steps (256 steps per full turn).
///
/// The raster passes through HSV and comes back as RGB; an alpha channel is
/// carried across unchanged. Grayscale rasters have no hue and are returned
/// as-is.
pub fn shift_hue(image: &Raster, shift: i32) -> Raster {
    let direct = image.clone().into_direct();
    if shift == 0 || direct.mode == ColorMode::Luma {
        return direct;
    }

    let alpha: Option<Vec<u8>> = direct
        .mode
        .has_alpha()
        .then(|| direct.pixels.chunks_exact(4).map(|px| px[3]).collect());

    let delta = shift.rem_euclid(256) as u8;
    let mut hsv = to_hsv(&direct);
    for px in hsv.pixels.chunks_exact_mut(3) {
        px[0] = px[0].wrapping_add(delta);
    }
    let rgb = hsv_to_rgb_raster(&hsv);

    match alpha {
        Some(alpha) => {
            let mut pixels = Vec::with_capacity(rgb.pixel_count() * 4);
            for (px, a) in rgb.pixels.chunks_exact(3).zip(alpha) {
                pixels.extend_from_slice(px);
                pixels.push(a);
            }
            Raster::from_parts(rgb.width, rgb.height, ColorMode::Rgba, pixels)
        }
        None => rgb,
    }
}
