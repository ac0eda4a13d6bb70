/// Format information: EC level and mask, stored twice around the finders
use log::debug;

use super::tables::FORMAT_INFO;
use crate::error::DecodeError;
use crate::models::{BitMatrix, ECLevel, MaskPattern};

/// Decoded 15-bit format information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInformation {
    /// Error correction level
    pub ec_level: ECLevel,
    /// Data mask
    pub mask: MaskPattern,
}

impl FormatInformation {
    /// Pair a level and mask
    pub fn new(ec_level: ECLevel, mask: MaskPattern) -> Self {
        Self { ec_level, mask }
    }

    /// Masked 15-bit code for this pair
    pub fn bits(&self) -> u16 {
        FORMAT_INFO[self.ec_level.bits() as usize * 8 + self.mask.id() as usize]
    }

    /// Closest table entry to `bits`, with its Hamming distance
    pub fn from_bits(bits: u16) -> (Self, u32) {
        let (index, distance) = FORMAT_INFO
            .iter()
            .enumerate()
            .map(|(i, &code)| (i, (code ^ bits).count_ones()))
            .min_by_key(|&(_, d)| d)
            .unwrap_or((0, u32::MAX));
        let info = Self {
            ec_level: ECLevel::from_bits((index / 8) as u8),
            mask: MaskPattern::from_bits((index % 8) as u8),
        };
        (info, distance)
    }

    /// Read and match the top-left copy, falling back to the split copy
    pub fn read(matrix: &BitMatrix, max_distance: u32) -> Result<Self, DecodeError> {
        let [(first, d1), (second, d2)] = Self::match_copies(matrix);
        if d1 <= max_distance {
            debug!("format: {first:?} from top-left copy (distance {d1})");
            return Ok(first);
        }
        if d2 <= max_distance {
            debug!("format: {second:?} from split copy (distance {d2})");
            return Ok(second);
        }
        Err(DecodeError::Format {
            best_distance: d1.min(d2),
        })
    }

    /// Closest table entry for each stored copy, top-left copy first
    pub fn match_copies(matrix: &BitMatrix) -> [(Self, u32); 2] {
        let n = matrix.dimension();
        [
            Self::from_bits(Self::read_copy(matrix, copy1_position)),
            Self::from_bits(Self::read_copy(matrix, |i| copy2_position(i, n))),
        ]
    }

    /// Hamming distances of both stored copies against this pair's code
    pub fn copy_distances(&self, matrix: &BitMatrix) -> (u32, u32) {
        let n = matrix.dimension();
        let code = self.bits();
        let d1 = (Self::read_copy(matrix, copy1_position) ^ code).count_ones();
        let d2 = (Self::read_copy(matrix, |i| copy2_position(i, n)) ^ code).count_ones();
        (d1, d2)
    }

    /// Write both copies
    pub fn write(&self, matrix: &mut BitMatrix) {
        let n = matrix.dimension();
        let code = self.bits();
        for i in 0..15 {
            let bit = (code >> i) & 1 == 1;
            let (x, y) = copy1_position(i);
            matrix.set(x, y, bit);
            let (x, y) = copy2_position(i, n);
            matrix.set(x, y, bit);
        }
    }

    fn read_copy(matrix: &BitMatrix, position: impl Fn(usize) -> (usize, usize)) -> u16 {
        (0..15).fold(0u16, |bits, i| {
            let (x, y) = position(i);
            bits | ((matrix.get(x, y) as u16) << i)
        })
    }
}

/// (x, y) of bit `i` (LSB = 0) in the copy wrapped around the top-left finder
fn copy1_position(i: usize) -> (usize, usize) {
    match i {
        0..=5 => (8, i),
        6 => (8, 7),
        7 => (8, 8),
        8 => (7, 8),
        _ => (14 - i, 8),
    }
}

/// (x, y) of bit `i` in the copy split between the other two finders
fn copy2_position(i: usize, n: usize) -> (usize, usize) {
    if i < 8 { (n - 1 - i, 8) } else { (8, n - 15 + i) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_table_entry() {
        let (info, distance) = FormatInformation::from_bits(0x5412);
        assert_eq!(distance, 0);
        assert_eq!(info.ec_level, ECLevel::M);
        assert_eq!(info.mask, MaskPattern::Pattern0);
    }

    #[test]
    fn test_bits_round_trip_table() {
        for level in ECLevel::ALL {
            for mask in MaskPattern::ALL {
                let info = FormatInformation::new(level, mask);
                assert_eq!(FormatInformation::from_bits(info.bits()), (info, 0));
            }
        }
    }

    #[test]
    fn test_three_bit_errors_tolerated() {
        let info = FormatInformation::new(ECLevel::Q, MaskPattern::Pattern5);
        let damaged = info.bits() ^ 0b100_0000_1000_0001;
        assert_eq!(FormatInformation::from_bits(damaged), (info, 3));
    }

    #[test]
    fn test_read_write_both_copies() {
        let info = FormatInformation::new(ECLevel::H, MaskPattern::Pattern6);
        let mut matrix = BitMatrix::square(25).unwrap();
        info.write(&mut matrix);
        assert_eq!(FormatInformation::read(&matrix, 3), Ok(info));
        assert_eq!(info.copy_distances(&matrix), (0, 0));

        // An all-light copy is at least 4 bits from every table entry
        for i in 0..15 {
            let (x, y) = copy1_position(i);
            matrix.set(x, y, false);
        }
        assert_eq!(FormatInformation::read(&matrix, 3), Ok(info));

        for i in 0..15 {
            let (x, y) = copy2_position(i, 25);
            matrix.set(x, y, false);
        }
        assert!(matches!(
            FormatInformation::read(&matrix, 3),
            Err(DecodeError::Format { .. })
        ));
    }

    #[test]
    fn test_copy_positions_avoid_timing() {
        for i in 0..15 {
            let (x, y) = copy1_position(i);
            assert!(x != 6 && y != 6);
            assert!(x <= 8 && y <= 8);
        }
        assert_eq!(copy2_position(14, 21), (8, 20));
        assert_eq!(copy2_position(8, 21), (8, 14));
        assert_eq!(copy2_position(0, 21), (20, 8));
    }
}
