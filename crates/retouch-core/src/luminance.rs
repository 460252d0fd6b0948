//! Luminance calculation using ITU-R BT.601 weights.
//!
//! Grayscale conversion and the saturation stage both measure "gray" with the
//! same luma so that `saturation(0.0)` and `grayscale(true)` agree.
//! Weights are 16.16 fixed point and sum to exactly 65536, so pure white stays
//! 255 and pure black stays 0.

/// BT.601 red weight in 16.16 fixed point (0.299).
pub const LUMA_R: u32 = 19595;

/// BT.601 green weight in 16.16 fixed point (0.587).
pub const LUMA_G: u32 = 38470;

/// BT.601 blue weight in 16.16 fixed point (0.114).
pub const LUMA_B: u32 = 7471;

/// Luma of an 8-bit RGB triple, rounded to nearest.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    ((LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32 + 0x8000) >> 16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_unity() {
        assert_eq!(LUMA_R + LUMA_G + LUMA_B, 1 << 16);
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma_u8(0, 0, 0), 0);
        assert_eq!(luma_u8(255, 255, 255), 255);
    }

    #[test]
    fn test_luma_gray_is_fixed_point() {
        for v in 0..=255u8 {
            assert_eq!(luma_u8(v, v, v), v, "gray {} should map to itself", v);
        }
    }

    #[test]
    fn test_luma_primaries() {
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(luma_u8(255, 0, 0), 76);
        assert_eq!(luma_u8(0, 255, 0), 150);
        assert_eq!(luma_u8(0, 0, 255), 29);
    }

    #[test]
    fn test_green_dominates() {
        assert!(luma_u8(0, 200, 0) > luma_u8(200, 0, 0));
        assert!(luma_u8(200, 0, 0) > luma_u8(0, 0, 200));
    }
}
