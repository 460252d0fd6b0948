//! Image cropping operations.
//!
//! The zoom stage removes an equal border from every edge, which enlarges the
//! remaining content once it is displayed at the original size.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel
//! - Regions are given in whole pixels and must lie inside the image

use crate::error::EditError;
use crate::raster::Raster;

/// Copy a rectangular region out of an image.
///
/// The region is clamped to the image bounds and is never smaller than 1x1.
/// Palette rasters keep their palette.
///
/// # Arguments
///
/// * `image` - Source image to crop
/// * `x`, `y` - Top-left corner of the region
/// * `width`, `height` - Size of the region
pub fn crop_region(image: &Raster, x: u32, y: u32, width: u32, height: u32) -> Raster {
    let x = x.min(image.width.saturating_sub(1));
    let y = y.min(image.height.saturating_sub(1));
    let out_width = width.min(image.width - x).max(1);
    let out_height = height.min(image.height - y).max(1);

    if x == 0 && y == 0 && out_width == image.width && out_height == image.height {
        return image.clone();
    }

    let c = image.channels();
    let row_bytes = out_width as usize * c;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for row in 0..out_height as usize {
        let src_start = ((y as usize + row) * image.width as usize + x as usize) * c;
        output.extend_from_slice(&image.pixels[src_start..src_start + row_bytes]);
    }

    Raster {
        width: out_width,
        height: out_height,
        mode: image.mode,
        pixels: output,
        palette: image.palette.clone(),
    }
}

/// Remove `border` pixels from all four edges.
///
/// # Errors
///
/// Returns [`EditError::Bounds`] when the border would consume the whole
/// width or height, i.e. when `2 * border >= min(width, height)`.
pub fn crop_border(image: &Raster, border: u32) -> Result<Raster, EditError> {
    if border == 0 {
        return Ok(image.clone());
    }

    let twice = border as u64 * 2;
    if twice >= image.width.min(image.height) as u64 {
        return Err(EditError::Bounds {
            border,
            width: image.width,
            height: image.height,
        });
    }

    Ok(crop_region(
        image,
        border,
        border,
        image.width - 2 * border,
        image.height - 2 * border,
    ))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::ColorMode;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep reasonable for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=60, 1u32..=60)
    }

    fn create_test_image(width: u32, height: u32) -> Raster {
        let pixels = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
        Raster::new(width, height, ColorMode::Rgb, pixels).unwrap()
    }

    proptest! {
        /// Property: Border crop shrinks each axis by exactly twice the border.
        #[test]
        fn prop_border_dimensions(
            (width, height) in dimensions_strategy(),
            border in 0u32..40,
        ) {
            let img = create_test_image(width, height);
            match crop_border(&img, border) {
                Ok(result) => {
                    prop_assert_eq!(result.width(), width - 2 * border);
                    prop_assert_eq!(result.height(), height - 2 * border);
                    prop_assert_eq!(result.byte_size(), result.pixel_count() * 3);
                }
                Err(_) => prop_assert!(border > 0 && 2 * border >= width.min(height)),
            }
        }

        /// Property: Region output never exceeds the input.
        #[test]
        fn prop_region_bounded_by_input(
            (width, height) in dimensions_strategy(),
            (x, y, w, h) in (0u32..80, 0u32..80, 0u32..80, 0u32..80),
        ) {
            let img = create_test_image(width, height);
            let result = crop_region(&img, x, y, w, h);

            prop_assert!(result.width() >= 1 && result.width() <= width);
            prop_assert!(result.height() >= 1 && result.height() <= height);
            prop_assert_eq!(result.byte_size(), result.pixel_count() * 3);
        }

        /// Property: Every cropped pixel equals the source pixel at the offset position.
        #[test]
        fn prop_region_pixels_from_original(
            (width, height) in (10u32..=40, 10u32..=40),
            (x, y) in (0u32..5, 0u32..5),
        ) {
            let img = create_test_image(width, height);
            let result = crop_region(&img, x, y, 5, 5);
            for cy in 0..result.height() {
                for cx in 0..result.width() {
                    prop_assert_eq!(result.pixel(cx, cy), img.pixel(x + cx, y + cy));
                }
            }
        }
    }
}
