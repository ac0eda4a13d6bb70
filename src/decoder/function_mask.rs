use crate::models::{BitMatrix, Version};

/// Function module mask for a specific QR version.
/// true = function module (not data), false = data module.
pub struct FunctionMask {
    mask: BitMatrix,
    version: Version,
}

impl FunctionMask {
    /// Mark every finder, separator, timing, alignment, format and version module
    pub fn new(version: Version) -> Self {
        let size = version.dimension();
        let mut mask = BitMatrix::new(size, size);

        // Finder patterns + separators (8x8 areas, clipped to bounds)
        mask.set_region(0, 0, 8, 8, true);
        mask.set_region(size - 8, 0, 8, 8, true);
        mask.set_region(0, size - 8, 8, 8, true);

        // Timing patterns (row 6 and column 6)
        for i in 0..size {
            mask.set(6, i, true);
            mask.set(i, 6, true);
        }

        for (cx, cy) in alignment_pattern_centers(version) {
            mask.set_region(cx - 2, cy - 2, 5, 5, true);
        }

        // Format info areas (both copies, including the dark module)
        for i in 0..9 {
            mask.set(8, i, true);
            mask.set(i, 8, true);
        }
        for i in 0..8 {
            mask.set(size - 1 - i, 8, true);
            mask.set(8, size - 1 - i, true);
        }

        if version.number() >= 7 {
            mask.set_region(size - 11, 0, 3, 6, true);
            mask.set_region(0, size - 11, 6, 3, true);
        }

        Self { mask, version }
    }

    /// Modules per side
    pub fn size(&self) -> usize {
        self.mask.width()
    }

    /// Version this mask was built for
    pub fn version(&self) -> Version {
        self.version
    }

    /// True when (x, y) is not a data module
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Modules available to codewords and remainder bits
    pub fn data_modules_count(&self) -> usize {
        self.size() * self.size() - self.mask.count_ones()
    }
}

/// Alignment pattern centres as (x, y), skipping the three finder corners
pub fn alignment_pattern_centers(version: Version) -> Vec<(usize, usize)> {
    let centers = version.alignment_centers();
    let Some(&last) = centers.last() else {
        return Vec::new();
    };
    let mut result = Vec::with_capacity(centers.len() * centers.len());
    for &cy in centers {
        for &cx in centers {
            let in_tl = cx == 6 && cy == 6;
            let in_tr = cx == last && cy == 6;
            let in_bl = cx == 6 && cy == last;
            if !(in_tl || in_tr || in_bl) {
                result.push((cx as usize, cy as usize));
            }
        }
    }
    result
}
