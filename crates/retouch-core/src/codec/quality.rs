//! JPEG quality estimation from quantization tables.
//!
//! Encoders derived from the IJG reference scale the Annex K luminance table
//! by a quality-dependent factor. Comparing a file's luminance table against
//! every scaled table finds the quality it was most likely saved with.

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const DQT: u8 = 0xDB;

/// Annex K luminance quantization table, natural (row-major) order.
#[rustfmt::skip]
const STD_LUMA_QTABLE: [u16; 64] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

/// Natural-order position of the k-th coefficient in zigzag order.
#[rustfmt::skip]
const ZIGZAG: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Estimate the quality (1-100) a JPEG was encoded with.
///
/// Returns `None` when `bytes` is not a JPEG or carries no luminance table.
pub fn estimate_jpeg_quality(bytes: &[u8]) -> Option<u8> {
    let table = luminance_table(bytes)?;

    (1..=100u8)
        .map(|quality| {
            let scaled = scaled_table(quality);
            let error: u32 = table
                .iter()
                .zip(ZIGZAG)
                .map(|(&actual, natural)| (actual as i32 - scaled[natural] as i32).unsigned_abs())
                .sum();
            (error, quality)
        })
        // Lowest error wins; ties go to the higher quality
        .min_by_key(|&(error, quality)| (error, std::cmp::Reverse(quality)))
        .map(|(_, quality)| quality)
}

/// The Annex K table as scaled for `quality`, natural order.
fn scaled_table(quality: u8) -> [u16; 64] {
    let quality = quality.clamp(1, 100) as u32;
    let scale = if quality < 50 { 5000 / quality } else { 200 - quality * 2 };
    STD_LUMA_QTABLE.map(|v| ((v as u32 * scale + 50) / 100).clamp(1, 255) as u16)
}

/// Table 0 from the first DQT segment that defines it, in zigzag order.
fn luminance_table(bytes: &[u8]) -> Option<[u16; 64]> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != SOI {
        return None;
    }

    let mut pos = 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        pos += 2;

        match marker {
            // Fill byte
            0xFF => {
                pos -= 1;
                continue;
            }
            EOI | SOS => return None,
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => continue,
            _ => {}
        }

        let len = u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]) as usize;
        let segment = bytes.get(pos + 2..pos + len)?;
        if marker == DQT {
            if let Some(table) = parse_dqt(segment) {
                return Some(table);
            }
        }
        pos += len;
    }
    None
}

fn parse_dqt(segment: &[u8]) -> Option<[u16; 64]> {
    let mut i = 0;
    while i < segment.len() {
        let precision = segment[i] >> 4;
        let id = segment[i] & 0x0F;
        i += 1;

        let mut table = [0u16; 64];
        if precision == 0 {
            let values = segment.get(i..i + 64)?;
            for (slot, &v) in table.iter_mut().zip(values) {
                *slot = v as u16;
            }
            i += 64;
        } else {
            let values = segment.get(i..i + 128)?;
            for (slot, pair) in table.iter_mut().zip(values.chunks_exact(2)) {
                *slot = u16::from_be_bytes([pair[0], pair[1]]);
            }
            i += 128;
        }

        if id == 0 {
            return Some(table);
        }
    }
    None
}
