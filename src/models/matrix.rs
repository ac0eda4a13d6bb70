use crate::models::Version;

/// Compact bit matrix for storing binary data
///
/// A set bit is a dark module (or dark pixel when the matrix holds a
/// binarized image). Reads outside the matrix return light and writes
/// outside it are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create a new bit matrix with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Create an empty symbol grid of `dimension` modules per side
    ///
    /// Returns `None` unless `dimension` is a legal symbol size
    /// (21..=177 with `dimension % 4 == 1`).
    pub fn square(dimension: usize) -> Option<Self> {
        Version::from_dimension(dimension)?;
        Some(Self::new(dimension, dimension))
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Side length for square matrices
    pub fn dimension(&self) -> usize {
        self.width
    }

    /// Get bit at (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let bit = 1 << (index % 8);
        if value {
            self.data[index / 8] |= bit;
        } else {
            self.data[index / 8] &= !bit;
        }
    }

    /// Toggle bit at (x, y)
    pub fn toggle(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        self.data[index / 8] ^= 1 << (index % 8);
    }

    /// Fill a `width` x `height` rectangle whose top-left corner is (x, y)
    pub fn set_region(&mut self, x: usize, y: usize, width: usize, height: usize, value: bool) {
        for yy in y..(y + height).min(self.height) {
            for xx in x..(x + width).min(self.width) {
                self.set(xx, yy, value);
            }
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Clear all bits to 0
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
