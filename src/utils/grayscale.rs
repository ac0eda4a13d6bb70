/// Convert packed RGB/RGBA pixels to luminance
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8).min(255) as u8
}

/// Convert RGB to grayscale, rows in parallel
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    to_grayscale(rgb, width, height, 3)
}

/// Convert RGBA to grayscale, rows in parallel (alpha ignored)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    to_grayscale(rgba, width, height, 4)
}

fn to_grayscale(pixels: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }
    gray.par_chunks_mut(width)
        .zip(pixels.par_chunks(width * channels))
        .for_each(|(row, src)| {
            for (out, px) in row.iter_mut().zip(src.chunks_exact(channels)) {
                *out = luma(px[0], px[1], px[2]);
            }
        });
    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let gray = rgb_to_grayscale(&[255, 255, 255], 1, 1);
        assert!(gray[0] >= 254);

        // Pure black
        let gray = rgb_to_grayscale(&[0, 0, 0], 1, 1);
        assert_eq!(gray[0], 0);

        // Green dominates red which dominates blue
        let gray = rgb_to_grayscale(&[255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255], 2, 2);
        assert_eq!(gray.len(), 4);
        assert!(gray[1] > gray[0] && gray[0] > gray[2]);
    }

    #[test]
    fn test_rgba_ignores_alpha() {
        let opaque = rgba_to_grayscale(&[200, 100, 50, 255], 1, 1);
        let clear = rgba_to_grayscale(&[200, 100, 50, 0], 1, 1);
        assert_eq!(opaque, clear);
        assert_eq!(opaque, rgb_to_grayscale(&[200, 100, 50], 1, 1));
    }

    #[test]
    fn test_short_input_leaves_black() {
        // Missing pixels stay at zero rather than panicking
        let gray = rgb_to_grayscale(&[255, 255, 255], 2, 1);
        assert_eq!(gray.len(), 2);
        assert!(gray[0] >= 254);
        assert_eq!(gray[1], 0);
    }
}
