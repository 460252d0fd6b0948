//! Image rotation with bilinear and Lanczos3 interpolation.
//!
//! Multiples of 90 degrees are exact pixel permutations. Any other angle is
//! resampled with one of two interpolation methods:
//! - **Bilinear**: Fast interpolation suitable for live preview
//! - **Lanczos3**: Higher quality interpolation suitable for export
//!
//! # Algorithm
//!
//! Free rotation uses inverse mapping: for each pixel center in the output
//! image, we calculate which source position maps onto it and interpolate
//! around that position.
//!
//! For rotation by angle θ, the inverse transform is:
//! ```text
//! src_x = (dst_x - cx) * cos(-θ) - (dst_y - cy) * sin(-θ) + src_cx
//! src_y = (dst_x - cx) * sin(-θ) + (dst_y - cy) * cos(-θ) + src_cy
//! ```
//!
//! # Canvas
//!
//! The output canvas is the bounding box of the rotated content. Uncovered
//! corners are filled with zero bytes: transparent for RGBA, black otherwise.

use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// Tolerance (degrees) for treating an angle as a right angle.
const ANGLE_EPSILON: f64 = 0.001;

/// Interpolation filter for rotation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation - good for preview rendering.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation - good for export.
    Lanczos3,
}

/// Right-angle rotations that can be done without resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RightAngle {
    None,
    Ccw90,
    Half,
    Ccw270,
}

fn right_angle(angle_degrees: f64) -> Option<RightAngle> {
    let a = angle_degrees.rem_euclid(360.0);
    let near = |target: f64| (a - target).abs() < ANGLE_EPSILON;
    if near(0.0) || near(360.0) {
        Some(RightAngle::None)
    } else if near(90.0) {
        Some(RightAngle::Ccw90)
    } else if near(180.0) {
        Some(RightAngle::Half)
    } else if near(270.0) {
        Some(RightAngle::Ccw270)
    } else {
        None
    }
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// When an image is rotated, the corners extend beyond the original bounds.
/// This function calculates the minimum bounding box that contains the
/// entire rotated image.
///
/// # Arguments
///
/// * `width` - Original image width
/// * `height` - Original image height
/// * `angle_degrees` - Rotation angle in degrees (positive = counter-clockwise)
///
/// # Returns
///
/// Tuple of (new_width, new_height) for the rotated bounding box.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match right_angle(angle_degrees) {
        Some(RightAngle::None) | Some(RightAngle::Half) => return (width, height),
        Some(RightAngle::Ccw90) | Some(RightAngle::Ccw270) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    // The bounding box of a rotated rectangle is:
    // new_w = |w*cos| + |h*sin|
    // new_h = |w*sin| + |h*cos|
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate an image around its center.
///
/// The output canvas is expanded to fit the entire rotated image (no
/// clipping). Angles that are multiples of 360 return an identical copy, and
/// other multiples of 90 are exact. Palette rasters stay indexed for right
/// angles and are expanded to a direct mode for any other angle.
///
/// # Arguments
///
/// * `image` - Source image to rotate
/// * `angle_degrees` - Rotation angle in degrees (positive = counter-clockwise)
/// * `filter` - Interpolation method for free angles
pub fn apply_rotation(image: &Raster, angle_degrees: f64, filter: InterpolationFilter) -> Raster {
    match right_angle(angle_degrees) {
        Some(RightAngle::None) => return image.clone(),
        Some(RightAngle::Ccw90) => return rotate_right_angle(image, RightAngle::Ccw90),
        Some(RightAngle::Half) => return rotate_right_angle(image, RightAngle::Half),
        Some(RightAngle::Ccw270) => return rotate_right_angle(image, RightAngle::Ccw270),
        None => {}
    }

    let image = image.clone().into_direct();
    let c = image.channels();

    let (src_w, src_h) = (image.width as f64, image.height as f64);
    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle_degrees);

    // Negate angle for correct visual rotation direction
    // (positive angle should rotate counter-clockwise visually)
    let angle_rad = -angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = vec![0u8; dst_w as usize * dst_h as usize * c];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Work on pixel centers so a 1px source still maps onto itself
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos - dy * sin + src_cx - 0.5;
            let src_y = dx * sin + dy * cos + src_cy - 0.5;

            let dst_idx = (dst_y as usize * dst_w as usize + dst_x as usize) * c;
            let out = &mut output[dst_idx..dst_idx + c];

            match filter {
                InterpolationFilter::Bilinear => sample_bilinear(&image, src_x, src_y, out),
                InterpolationFilter::Lanczos3 => sample_lanczos3(&image, src_x, src_y, out),
            }
        }
    }

    Raster::from_parts(dst_w, dst_h, image.mode, output)
}

/// Exact rotation by a right angle; works for every mode, palette included.
fn rotate_right_angle(image: &Raster, rotation: RightAngle) -> Raster {
    let (w, h) = (image.width as usize, image.height as usize);
    let c = image.channels();
    let (dst_w, dst_h) = match rotation {
        RightAngle::Ccw90 | RightAngle::Ccw270 => (h, w),
        _ => (w, h),
    };

    let mut output = vec![0u8; image.pixels.len()];
    for y in 0..dst_h {
        for x in 0..dst_w {
            let (sx, sy) = match rotation {
                RightAngle::None => (x, y),
                RightAngle::Ccw90 => (w - 1 - y, x),
                RightAngle::Half => (w - 1 - x, h - 1 - y),
                RightAngle::Ccw270 => (y, h - 1 - x),
            };
            let src_idx = (sy * w + sx) * c;
            let dst_idx = (y * dst_w + x) * c;
            output[dst_idx..dst_idx + c].copy_from_slice(&image.pixels[src_idx..src_idx + c]);
        }
    }

    Raster {
        width: dst_w as u32,
        height: dst_h as u32,
        mode: image.mode,
        pixels: output,
        palette: image.palette.clone(),
    }
}

/// Read channel `ch` of the pixel at `(px, py)` as f64.
#[inline]
fn channel_f64(image: &Raster, px: usize, py: usize, ch: usize) -> f64 {
    let c = image.channels();
    image.pixels[(py * image.width as usize + px) * c + ch] as f64
}

/// Whether a source position (in pixel-index coordinates) lies on the image.
#[inline]
fn covers(image: &Raster, x: f64, y: f64) -> bool {
    x >= -0.5 && y >= -0.5 && x < image.width as f64 - 0.5 && y < image.height as f64 - 0.5
}

/// Sample a pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance. Positions off the image leave
/// `out` at the zero background.
fn sample_bilinear(image: &Raster, x: f64, y: f64, out: &mut [u8]) {
    if !covers(image, x, y) {
        return;
    }

    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    for (ch, slot) in out.iter_mut().enumerate() {
        let v = channel_f64(image, x0, y0, ch) * (1.0 - fx) * (1.0 - fy)
            + channel_f64(image, x1, y0, ch) * fx * (1.0 - fy)
            + channel_f64(image, x0, y1, ch) * (1.0 - fx) * fy
            + channel_f64(image, x1, y1, ch) * fx * fy;
        *slot = v.clamp(0.0, 255.0).round() as u8;
    }
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Lanczos3 considers a 6x6 neighborhood of pixels, providing
/// higher quality results especially for sharp edges.
fn sample_lanczos3(image: &Raster, x: f64, y: f64, out: &mut [u8]) {
    let (w, h) = (image.width as i64, image.height as i64);

    // Fall back to bilinear where the kernel would leave the image
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        sample_bilinear(image, x, y, out);
        return;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            if px >= 0 && px < w && py >= 0 && py < h {
                let dx = x - px as f64;
                let dy = y - py as f64;
                let weight = lanczos_weight(dx, 3.0) * lanczos_weight(dy, 3.0);

                for (ch, acc) in sum.iter_mut().enumerate().take(out.len()) {
                    *acc += channel_f64(image, px as usize, py as usize, ch) * weight;
                }
                weight_sum += weight;
            }
        }
    }

    if weight_sum > 0.0 {
        for (slot, acc) in out.iter_mut().zip(sum.iter()) {
            *slot = (acc / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
