//! Function patterns and metadata for a symbol being built

use crate::decoder::format::FormatInformation;
use crate::decoder::function_mask::alignment_pattern_centers;
use crate::decoder::version::VersionInfo;
use crate::models::{BitMatrix, ECLevel, MaskPattern, Version};

/// Finders, timing, alignment patterns and the dark module; all else light
pub fn function_patterns(version: Version) -> BitMatrix {
    let n = version.dimension();
    let mut matrix = BitMatrix::new(n, n);

    // Separators are the light border the 7x7 finders leave inside their 8x8 area
    for (x, y) in [(0, 0), (n - 7, 0), (0, n - 7)] {
        set_finder_pattern(&mut matrix, x, y);
    }
    for i in 8..n - 8 {
        matrix.set(i, 6, i % 2 == 0);
        matrix.set(6, i, i % 2 == 0);
    }
    for (cx, cy) in alignment_pattern_centers(version) {
        set_alignment_pattern(&mut matrix, cx, cy);
    }
    matrix.set(8, n - 8, true);
    matrix
}

fn set_finder_pattern(matrix: &mut BitMatrix, x: usize, y: usize) {
    matrix.set_region(x, y, 7, 7, true);
    matrix.set_region(x + 1, y + 1, 5, 5, false);
    matrix.set_region(x + 2, y + 2, 3, 3, true);
}

fn set_alignment_pattern(matrix: &mut BitMatrix, cx: usize, cy: usize) {
    matrix.set_region(cx - 2, cy - 2, 5, 5, true);
    matrix.set_region(cx - 1, cy - 1, 3, 3, false);
    matrix.set(cx, cy, true);
}

/// Both format copies, plus both version copies from version 7 up
pub fn set_metadata(matrix: &mut BitMatrix, version: Version, level: ECLevel, mask: MaskPattern) {
    FormatInformation::new(level, mask).write(matrix);
    VersionInfo::write(version, matrix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::function_mask::FunctionMask;

    #[test]
    fn test_version_one_layout() {
        let matrix = function_patterns(Version::MIN);
        // Finder rings and separators
        assert!(matrix.get(0, 0) && matrix.get(6, 6) && matrix.get(3, 3));
        assert!(!matrix.get(1, 1) && !matrix.get(7, 0) && !matrix.get(0, 7));
        assert!(matrix.get(14, 0) && !matrix.get(13, 0));
        // Timing alternates from the first module after the separator
        assert!(matrix.get(8, 6) && !matrix.get(9, 6) && matrix.get(12, 6));
        assert!(matrix.get(6, 8) && !matrix.get(6, 9));
        // Dark module
        assert!(matrix.get(8, 13));
    }

    #[test]
    fn test_patterns_stay_inside_function_area() {
        for number in [1u8, 2, 7, 14, 40] {
            let version = Version::new(number).unwrap();
            let mut matrix = function_patterns(version);
            set_metadata(&mut matrix, version, ECLevel::H, MaskPattern::Pattern5);
            let func = FunctionMask::new(version);
            let n = version.dimension();
            for y in 0..n {
                for x in 0..n {
                    assert!(!matrix.get(x, y) || func.is_function(x, y), "v{number} ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_alignment_pattern_version_two() {
        let matrix = function_patterns(Version::new(2).unwrap());
        assert!(matrix.get(18, 18) && matrix.get(16, 16) && matrix.get(20, 18));
        assert!(!matrix.get(17, 17) && !matrix.get(19, 18));
    }
}
