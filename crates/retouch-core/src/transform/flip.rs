//! Mirror and flip operations.

use crate::params::FlipAxis;
use crate::raster::Raster;

/// Mirror an image left to right.
pub fn flip_horizontal(image: &Raster) -> Raster {
    let c = image.channels();
    let row_bytes = image.width as usize * c;
    let mut output = Vec::with_capacity(image.pixels.len());

    for row in image.pixels.chunks_exact(row_bytes) {
        for px in row.chunks_exact(c).rev() {
            output.extend_from_slice(px);
        }
    }

    with_pixels(image, output)
}

/// Flip an image top to bottom.
pub fn flip_vertical(image: &Raster) -> Raster {
    let row_bytes = image.width as usize * image.channels();
    let mut output = Vec::with_capacity(image.pixels.len());

    for row in image.pixels.chunks_exact(row_bytes).rev() {
        output.extend_from_slice(row);
    }

    with_pixels(image, output)
}

/// Apply the flip selected by `axis`.
///
/// `X` mirrors left to right, `Y` flips top to bottom and `Both` does the
/// two in sequence. Any mode is accepted and palettes are kept.
pub fn apply_flip(image: &Raster, axis: FlipAxis) -> Raster {
    match axis {
        FlipAxis::None => image.clone(),
        FlipAxis::X => flip_horizontal(image),
        FlipAxis::Y => flip_vertical(image),
        FlipAxis::Both => flip_vertical(&flip_horizontal(image)),
    }
}

fn with_pixels(image: &Raster, pixels: Vec<u8>) -> Raster {
    Raster {
        width: image.width,
        height: image.height,
        mode: image.mode,
        pixels,
        palette: image.palette.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ColorMode;

    fn grid() -> Raster {
        // 3x2:
        // 1 2 3
        // 4 5 6
        Raster::new(3, 2, ColorMode::Luma, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn test_flip_horizontal() {
        assert_eq!(flip_horizontal(&grid()).pixels(), &[3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_flip_vertical() {
        assert_eq!(flip_vertical(&grid()).pixels(), &[4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_flip_both() {
        assert_eq!(apply_flip(&grid(), FlipAxis::Both).pixels(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_flip_none() {
        assert_eq!(apply_flip(&grid(), FlipAxis::None), grid());
    }

    #[test]
    fn test_flip_keeps_whole_pixels() {
        let img = Raster::new(2, 1, ColorMode::Rgb, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(flip_horizontal(&img).pixels(), &[4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_flip_keeps_palette() {
        let palette = vec![[0, 0, 0, 255], [9, 9, 9, 255]];
        let img = Raster::new_indexed(2, 1, vec![0, 1], palette.clone()).unwrap();
        let result = apply_flip(&img, FlipAxis::X);
        assert_eq!(result.mode(), ColorMode::Indexed);
        assert_eq!(result.palette(), palette.as_slice());
        assert_eq!(result.pixels(), &[1, 0]);
    }
}
