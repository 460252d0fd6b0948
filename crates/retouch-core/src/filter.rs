//! Convolution effects: Gaussian blur and unsharp-mask contrast.
//!
//! Both filters delegate the Gaussian convolution to `image::imageops`, so
//! edges are handled the way the `image` crate handles them.

use crate::raster::{Raster, RasterError};

/// Sharpening amount of the contrast stage (150%).
pub const UNSHARP_AMOUNT: f32 = 1.5;

/// Differences at or below this value are left alone by the contrast stage.
pub const UNSHARP_THRESHOLD: u8 = 3;

/// Gaussian blur with `sigma` as the standard deviation.
///
/// A sigma of zero, less or NaN returns the image unchanged. Every channel,
/// alpha included, is blurred. Palette images are expanded first.
pub fn gaussian_blur(image: &Raster, sigma: f32) -> Result<Raster, RasterError> {
    let direct = image.clone().into_direct();
    if !(sigma > 0.0) {
        return Ok(direct);
    }
    let blurred = direct.to_dynamic()?.blur(sigma);
    Ok(Raster::from(blurred))
}

/// Sharpen by adding back the difference to a blurred copy.
///
/// ```text
/// diff   = input - gaussian(input, sigma)
/// output = input + amount * diff    where |diff| > threshold
/// ```
///
/// # Arguments
///
/// * `sigma` - Blur standard deviation; larger values affect wider edges
/// * `amount` - Multiplier for the difference (1.5 = 150%)
/// * `threshold` - Minimum difference that gets sharpened
pub fn unsharp_mask(image: &Raster, sigma: f32, amount: f32, threshold: u8) -> Result<Raster, RasterError> {
    let mut out = image.clone().into_direct();
    if !(sigma > 0.0) || amount == 0.0 {
        return Ok(out);
    }

    let blurred = gaussian_blur(&out, sigma)?;
    let c = out.channels();
    let color_channels = if out.mode.has_alpha() { c - 1 } else { c };

    for (px, soft) in out.pixels.chunks_exact_mut(c).zip(blurred.pixels.chunks_exact(c)) {
        for (v, &b) in px[..color_channels].iter_mut().zip(soft) {
            let diff = *v as i32 - b as i32;
            if diff.abs() > threshold as i32 {
                *v = (*v as f32 + diff as f32 * amount).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ColorMode;

    /// Left half `left`, right half `right`.
    fn step_image(width: u32, height: u32, left: u8, right: u8) -> Raster {
        let pixels = (0..height)
            .flat_map(|_| (0..width).map(move |x| if x < width / 2 { left } else { right }))
            .collect();
        Raster::new(width, height, ColorMode::Luma, pixels).unwrap()
    }

    #[test]
    fn test_blur_zero_is_identity() {
        let img = step_image(10, 4, 0, 255);
        assert_eq!(gaussian_blur(&img, 0.0).unwrap(), img);
    }

    #[test]
    fn test_nan_sigma_is_identity() {
        let img = step_image(10, 4, 0, 255);
        assert_eq!(gaussian_blur(&img, f32::NAN).unwrap(), img);
        assert_eq!(unsharp_mask(&img, f32::NAN, UNSHARP_AMOUNT, UNSHARP_THRESHOLD).unwrap(), img);
    }

    #[test]
    fn test_blur_keeps_mode_and_size() {
        let img = Raster::solid(12, 9, ColorMode::Rgba, &[10, 20, 30, 255]).unwrap();
        let result = gaussian_blur(&img, 2.0).unwrap();
        assert_eq!(result.mode(), ColorMode::Rgba);
        assert_eq!(result.dimensions(), (12, 9));
    }

    #[test]
    fn test_blur_uniform_stays_uniform() {
        let img = Raster::solid(16, 16, ColorMode::Rgb, &[200, 100, 50]).unwrap();
        let result = gaussian_blur(&img, 3.0).unwrap();
        for px in result.pixels().chunks_exact(3) {
            assert!((px[0] as i32 - 200).abs() <= 1);
            assert!((px[1] as i32 - 100).abs() <= 1);
            assert!((px[2] as i32 - 50).abs() <= 1);
        }
    }

    #[test]
    fn test_blur_softens_edges() {
        let img = step_image(20, 4, 0, 255);
        let result = gaussian_blur(&img, 2.0).unwrap();
        let row = &result.pixels()[20..40];
        assert!(row[9] > 0, "dark side of the edge should brighten");
        assert!(row[10] < 255, "bright side of the edge should darken");
        assert!(row[0] < 10);
        assert!(row[19] > 245);
    }

    #[test]
    fn test_unsharp_zero_is_identity() {
        let img = step_image(10, 4, 30, 90);
        assert_eq!(unsharp_mask(&img, 0.0, UNSHARP_AMOUNT, UNSHARP_THRESHOLD).unwrap(), img);
    }

    #[test]
    fn test_unsharp_leaves_flat_areas() {
        let img = Raster::solid(16, 16, ColorMode::Rgb, &[120, 60, 30]).unwrap();
        let result = unsharp_mask(&img, 2.0, UNSHARP_AMOUNT, UNSHARP_THRESHOLD).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_unsharp_increases_edge_contrast() {
        let img = step_image(20, 20, 100, 150);
        let result = unsharp_mask(&img, 2.0, UNSHARP_AMOUNT, UNSHARP_THRESHOLD).unwrap();
        let row = &result.pixels()[200..220];
        assert!(row[9] < 100, "dark side got {}", row[9]);
        assert!(row[10] > 150, "bright side got {}", row[10]);
    }

    #[test]
    fn test_unsharp_keeps_alpha() {
        let mut pixels = Vec::new();
        for x in 0..16 {
            let v = if x < 8 { 40 } else { 200 };
            pixels.extend_from_slice(&[v, v, v, 128]);
        }
        let img = Raster::new(16, 1, ColorMode::Rgba, pixels).unwrap();
        let result = unsharp_mask(&img, 1.5, UNSHARP_AMOUNT, UNSHARP_THRESHOLD).unwrap();
        assert!(result.pixels().chunks_exact(4).all(|px| px[3] == 128));
    }
}
