//! Adaptive palette quantization by median cut.
//!
//! The distinct colors of an image are put in one box, and the box with the
//! widest channel range is repeatedly split at the pixel-weighted median of
//! that channel until the requested number of boxes exists. Each box's
//! weighted mean becomes a palette entry and every pixel is mapped to its
//! nearest entry.

use std::collections::HashMap;

use crate::raster::{ColorMode, Raster};

/// Palette size used by the four-color stage.
pub const FOUR_COLORS: usize = 4;

type Rgba = [u8; 4];

/// A set of distinct colors with their pixel counts.
struct ColorBox {
    colors: Vec<(Rgba, u32)>,
}

impl ColorBox {
    /// Channel with the widest value range, and that range.
    fn widest_channel(&self) -> (usize, u8) {
        (0..4)
            .map(|ch| {
                let (lo, hi) = self
                    .colors
                    .iter()
                    .fold((u8::MAX, u8::MIN), |(lo, hi), (c, _)| (lo.min(c[ch]), hi.max(c[ch])));
                (ch, hi.saturating_sub(lo))
            })
            .max_by_key(|&(ch, range)| (range, std::cmp::Reverse(ch)))
            .unwrap_or((0, 0))
    }

    /// Split at the weighted median of the widest channel.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let (ch, _) = self.widest_channel();
        self.colors.sort_by_key(|(c, _)| (c[ch], *c));

        let total: u64 = self.colors.iter().map(|&(_, n)| n as u64).sum();
        let mut seen = 0u64;
        let mut cut = 1;
        for (i, &(_, n)) in self.colors.iter().enumerate() {
            seen += n as u64;
            if seen * 2 >= total {
                cut = i + 1;
                break;
            }
        }
        // Both halves must keep at least one color
        let cut = cut.clamp(1, self.colors.len() - 1);

        let upper = self.colors.split_off(cut);
        (self, ColorBox { colors: upper })
    }

    fn mean(&self) -> Rgba {
        let mut sum = [0u64; 4];
        let mut total = 0u64;
        for &(c, n) in &self.colors {
            for (acc, v) in sum.iter_mut().zip(c) {
                *acc += v as u64 * n as u64;
            }
            total += n as u64;
        }
        let total = total.max(1);
        sum.map(|s| ((s + total / 2) / total) as u8)
    }
}

/// Reduce an image to at most `max_colors` palette entries.
///
/// The result is always a palette raster. Images that already have no more
/// than `max_colors` distinct colors keep those exact colors. Grayscale input
/// yields gray palette entries and opaque input yields opaque entries.
pub fn quantize(image: &Raster, max_colors: usize) -> Raster {
    let direct = image.clone().into_direct();
    let max_colors = max_colors.clamp(1, 256);

    let pixel_colors: Vec<Rgba> = direct
        .pixels
        .chunks_exact(direct.channels())
        .map(|px| match direct.mode {
            ColorMode::Luma => [px[0], px[0], px[0], 255],
            ColorMode::Rgba => [px[0], px[1], px[2], px[3]],
            _ => [px[0], px[1], px[2], 255],
        })
        .collect();

    let mut histogram: HashMap<Rgba, u32> = HashMap::new();
    for &c in &pixel_colors {
        *histogram.entry(c).or_insert(0) += 1;
    }
    let mut colors: Vec<(Rgba, u32)> = histogram.into_iter().collect();
    colors.sort_unstable();

    let mut boxes = vec![ColorBox { colors }];
    while boxes.len() < max_colors {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.colors.len() > 1)
            .max_by_key(|(i, b)| (b.widest_channel().1, std::cmp::Reverse(*i)))
            .map(|(i, _)| i);
        let Some(index) = candidate else {
            break;
        };
        let (lower, upper) = boxes.swap_remove(index).split();
        boxes.push(lower);
        boxes.push(upper);
    }

    let mut palette: Vec<Rgba> = boxes.iter().map(ColorBox::mean).collect();
    palette.sort_unstable();
    palette.dedup();

    let mut lookup: HashMap<Rgba, u8> = HashMap::new();
    let indices = pixel_colors
        .iter()
        .map(|c| *lookup.entry(*c).or_insert_with(|| nearest(&palette, *c)))
        .collect();

    log::debug!(
        "Quantized {}x{} image to {} colors",
        direct.width,
        direct.height,
        palette.len()
    );

    Raster {
        width: direct.width,
        height: direct.height,
        mode: ColorMode::Indexed,
        pixels: indices,
        palette,
    }
}

fn nearest(palette: &[Rgba], color: Rgba) -> u8 {
    palette
        .iter()
        .enumerate()
        .min_by_key(|(_, entry)| {
            entry
                .iter()
                .zip(color)
                .map(|(&a, b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum::<u32>()
        })
        .map(|(i, _)| i as u8)
        .unwrap_or(0)
}
