/// Mask penalty rules N1..N4 over a complete symbol
use log::trace;

use crate::models::BitMatrix;

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// Dark-light-dark-dark-dark-light-dark, the finder cross-section
const FINDER_LIKE: [bool; 7] = [true, false, true, true, true, false, true];

/// Sum of all four rules
pub fn penalty(matrix: &BitMatrix) -> u32 {
    let n1 = penalty_runs(matrix);
    let n2 = penalty_blocks(matrix);
    let n3 = penalty_finder_like(matrix);
    let n4 = penalty_balance(matrix);
    trace!("penalty: n1={n1} n2={n2} n3={n3} n4={n4}");
    n1 + n2 + n3 + n4
}

/// Module `i` along row `index` (or column when `vertical`); outside reads light
fn line_at(matrix: &BitMatrix, vertical: bool, index: usize, i: isize) -> bool {
    if i < 0 {
        return false;
    }
    if vertical {
        matrix.get(index, i as usize)
    } else {
        matrix.get(i as usize, index)
    }
}

/// N1: a run of 5 + k same-coloured modules scores 3 + k
pub fn penalty_runs(matrix: &BitMatrix) -> u32 {
    let n = matrix.dimension();
    let mut points = 0;
    for vertical in [false, true] {
        for index in 0..n {
            let at = |i: usize| line_at(matrix, vertical, index, i as isize);
            let mut run = 1;
            for i in 1..=n {
                if i < n && at(i) == at(i - 1) {
                    run += 1;
                    continue;
                }
                if run >= 5 {
                    points += PENALTY_N1 + run - 5;
                }
                run = 1;
            }
        }
    }
    points
}

/// N2: every uniform 2x2 window scores 3
pub fn penalty_blocks(matrix: &BitMatrix) -> u32 {
    let n = matrix.dimension();
    let mut points = 0;
    for y in 0..n.saturating_sub(1) {
        for x in 0..n - 1 {
            let dark = matrix.get(x, y);
            if matrix.get(x + 1, y) == dark
                && matrix.get(x, y + 1) == dark
                && matrix.get(x + 1, y + 1) == dark
            {
                points += PENALTY_N2;
            }
        }
    }
    points
}

/// N3: a 1:1:3:1:1 pattern with four light modules on either side scores 40
pub fn penalty_finder_like(matrix: &BitMatrix) -> u32 {
    let n = matrix.dimension() as isize;
    let mut points = 0;
    for vertical in [false, true] {
        for index in 0..n as usize {
            let at = |i: isize| line_at(matrix, vertical, index, i);
            for start in 0..=n - 7 {
                let matches = FINDER_LIKE
                    .iter()
                    .enumerate()
                    .all(|(k, &dark)| at(start + k as isize) == dark);
                if !matches {
                    continue;
                }
                let light_before = (start - 4..start).all(|i| !at(i));
                let light_after = (start + 7..start + 11).all(|i| !at(i));
                if light_before || light_after {
                    points += PENALTY_N3;
                }
            }
        }
    }
    points
}

/// N4: 10 points per full 5% the dark share strays from one half
pub fn penalty_balance(matrix: &BitMatrix) -> u32 {
    let total = matrix.dimension() * matrix.dimension();
    if total == 0 {
        return 0;
    }
    let dark = matrix.count_ones();
    let k = (20 * dark).abs_diff(10 * total) / total;
    k as u32 * PENALTY_N4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_symbol() {
        let matrix = BitMatrix::new(21, 21);
        // 42 lines of 21 light modules: 3 + 16 each
        assert_eq!(penalty_runs(&matrix), 42 * 19);
        assert_eq!(penalty_blocks(&matrix), 20 * 20 * 3);
        assert_eq!(penalty_finder_like(&matrix), 0);
        assert_eq!(penalty_balance(&matrix), 100);
        assert_eq!(penalty(&matrix), 798 + 1200 + 100);
    }

    #[test]
    fn test_runs_broken_up() {
        let mut matrix = BitMatrix::new(21, 21);
        // Row 0: 5 light, 6 dark, 10 light
        matrix.set_region(5, 0, 6, 1, true);
        // Row 0 scores 3 + (3 + 1) + (3 + 5); its 6 dark columns lose their run of 21
        let columns = 15 * 19 + 6 * (3 + 15);
        let rows = 20 * 19 + 3 + 4 + 8;
        assert_eq!(penalty_runs(&matrix), rows + columns);
    }

    #[test]
    fn test_finder_like_patterns() {
        let mut matrix = BitMatrix::new(21, 21);
        for (x, &dark) in FINDER_LIKE.iter().enumerate() {
            // Mid-row with light on both sides
            matrix.set(4 + x, 3, dark);
            // Against the left edge: outside counts as light
            matrix.set(x, 12, dark);
        }
        assert_eq!(penalty_finder_like(&matrix), 2 * PENALTY_N3);
    }

    #[test]
    fn test_finder_like_needs_light_margin() {
        let mut matrix = BitMatrix::new(21, 21);
        for (x, &dark) in FINDER_LIKE.iter().enumerate() {
            matrix.set(4 + x, 3, dark);
        }
        // Dark modules three away on both sides
        matrix.set(1, 3, true);
        matrix.set(13, 3, true);
        assert_eq!(penalty_finder_like(&matrix), 0);
    }

    #[test]
    fn test_balance() {
        let mut matrix = BitMatrix::new(10, 10);
        matrix.set_region(0, 0, 10, 5, true);
        assert_eq!(penalty_balance(&matrix), 0);
        // 60% dark
        matrix.set_region(0, 5, 10, 1, true);
        assert_eq!(penalty_balance(&matrix), 20);
        // 64% dark rounds down to the same step
        matrix.set_region(0, 6, 4, 1, true);
        assert_eq!(penalty_balance(&matrix), 20);
    }
}
