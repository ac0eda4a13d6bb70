/// Data masking; the same XOR removes and applies a mask
use crate::decoder::function_mask::FunctionMask;
use crate::models::{BitMatrix, MaskPattern};

/// Toggle every data module selected by `mask_pattern`
pub fn apply_mask(matrix: &mut BitMatrix, mask_pattern: MaskPattern, func: &FunctionMask) {
    let size = func.size();
    for y in 0..size {
        for x in 0..size {
            if !func.is_function(x, y) && mask_pattern.is_masked(y, x) {
                matrix.toggle(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Version;

    #[test]
    fn test_unmask() {
        let mut matrix = BitMatrix::new(21, 21);
        matrix.set(10, 10, true);
        matrix.set(11, 10, false);

        let func = FunctionMask::new(Version::MIN);
        apply_mask(&mut matrix, MaskPattern::Pattern0, &func);

        // (10 + 10) % 2 == 0 is toggled, (11 + 10) is not
        assert!(!matrix.get(10, 10));
        assert!(!matrix.get(11, 10));
        // Function modules are never touched
        assert!(!matrix.get(0, 0));
    }

    #[test]
    fn test_mask_is_self_inverse() {
        let version = Version::new(3).unwrap();
        let func = FunctionMask::new(version);
        let mut original = BitMatrix::square(version.dimension()).unwrap();
        for y in 0..version.dimension() {
            for x in 0..version.dimension() {
                original.set(x, y, (x * 7 + y * 13) % 5 < 2);
            }
        }
        for mask in MaskPattern::ALL {
            let mut matrix = original.clone();
            apply_mask(&mut matrix, mask, &func);
            assert_ne!(matrix, original, "mask {}", mask.id());
            apply_mask(&mut matrix, mask, &func);
            assert_eq!(matrix, original, "mask {}", mask.id());
        }
    }

    #[test]
    fn test_row_column_orientation() {
        // Mask 1 inverts even rows: (x=9, y=10) toggles, (x=10, y=9) does not
        let func = FunctionMask::new(Version::MIN);
        let mut matrix = BitMatrix::new(21, 21);
        apply_mask(&mut matrix, MaskPattern::Pattern1, &func);
        assert!(matrix.get(9, 10));
        assert!(!matrix.get(10, 9));
    }
}
