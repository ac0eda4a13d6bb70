/// Version information extraction for QR codes v7+
use super::tables::VERSION_INFO;
use crate::models::{BitMatrix, Version};

/// 18-bit version information (6 data + 12 BCH bits), stored twice
pub struct VersionInfo;

impl VersionInfo {
    /// Closest version (7..=40) to `bits`, with its Hamming distance
    pub fn from_bits(bits: u32) -> (Version, u32) {
        let (index, distance) = VERSION_INFO
            .iter()
            .enumerate()
            .map(|(i, &code)| (i, (code ^ bits).count_ones()))
            .min_by_key(|&(_, d)| d)
            .unwrap_or((0, u32::MAX));
        // Table index 0 is version 7
        let version = Version::new(index as u8 + 7).unwrap_or(Version::MAX);
        (version, distance)
    }

    /// Best match over both copies, `Err(best_distance)` when neither is in tolerance
    pub fn read(matrix: &BitMatrix, max_distance: u32) -> Result<Version, u32> {
        let (a, da) = Self::from_bits(Self::read_top_right(matrix));
        let (b, db) = Self::from_bits(Self::read_bottom_left(matrix));
        let (version, distance) = if da <= db { (a, da) } else { (b, db) };
        if distance <= max_distance {
            Ok(version)
        } else {
            Err(distance)
        }
    }

    /// Hamming distances of both copies against `version`'s pattern
    pub fn copy_distances(matrix: &BitMatrix, version: Version) -> (u32, u32) {
        let code = version.version_bits().unwrap_or(0);
        (
            (Self::read_top_right(matrix) ^ code).count_ones(),
            (Self::read_bottom_left(matrix) ^ code).count_ones(),
        )
    }

    /// 6x3 block left of the top-right finder; bit k at (n-11 + k%3, k/3)
    pub fn read_top_right(matrix: &BitMatrix) -> u32 {
        let n = matrix.dimension();
        (0..18).fold(0u32, |bits, k| {
            bits | ((matrix.get(n - 11 + k % 3, k / 3) as u32) << k)
        })
    }

    /// 3x6 block above the bottom-left finder; the transpose of the top-right one
    pub fn read_bottom_left(matrix: &BitMatrix) -> u32 {
        let n = matrix.dimension();
        (0..18).fold(0u32, |bits, k| {
            bits | ((matrix.get(k / 3, n - 11 + k % 3) as u32) << k)
        })
    }

    /// Write both copies; no-op below version 7
    pub fn write(version: Version, matrix: &mut BitMatrix) {
        let Some(code) = version.version_bits() else {
            return;
        };
        let n = matrix.dimension();
        for k in 0..18 {
            let bit = (code >> k) & 1 == 1;
            matrix.set(n - 11 + k % 3, k / 3, bit);
            matrix.set(k / 3, n - 11 + k % 3, bit);
        }
    }
}
