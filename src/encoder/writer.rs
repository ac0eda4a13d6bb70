//! Output surfaces for encoded symbols.
//!
//! A [`SymbolWriter`] receives one background fill and then one square per
//! dark module, already scaled and offset by the quiet zone.

use image::{GrayImage, Luma};

use crate::models::BitMatrix;

/// Destination for a rendered symbol
pub trait SymbolWriter {
    /// Pixels per module
    fn module_size(&self) -> usize {
        1
    }

    /// Light border around the symbol, in modules
    fn quiet_zone(&self) -> usize {
        4
    }

    /// Clear a square surface `extent` pixels on a side to light
    fn set_background(&mut self, extent: usize);

    /// Paint the `size` x `size` pixel square at (x, y) dark
    fn set_dark(&mut self, x: usize, y: usize, size: usize);
}

/// Paint `symbol` onto `writer` with its module size and quiet zone
pub fn write_symbol(symbol: &BitMatrix, writer: &mut impl SymbolWriter) {
    let n = symbol.dimension();
    let size = writer.module_size().max(1);
    let quiet = writer.quiet_zone();
    writer.set_background((n + 2 * quiet) * size);
    for y in 0..n {
        for x in 0..n {
            if symbol.get(x, y) {
                writer.set_dark((x + quiet) * size, (y + quiet) * size, size);
            }
        }
    }
}

/// Collects modules into a [`BitMatrix`] at one pixel per module
#[derive(Debug, Clone, Default)]
pub struct MatrixWriter {
    quiet_zone: usize,
    matrix: BitMatrix,
}

impl MatrixWriter {
    /// Symbol only, no quiet zone
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a light border of `quiet_zone` modules
    pub fn with_quiet_zone(quiet_zone: usize) -> Self {
        Self {
            quiet_zone,
            matrix: BitMatrix::default(),
        }
    }

    /// The collected modules
    pub fn into_matrix(self) -> BitMatrix {
        self.matrix
    }
}

impl SymbolWriter for MatrixWriter {
    fn quiet_zone(&self) -> usize {
        self.quiet_zone
    }

    fn set_background(&mut self, extent: usize) {
        self.matrix = BitMatrix::new(extent, extent);
    }

    fn set_dark(&mut self, x: usize, y: usize, size: usize) {
        self.matrix.set_region(x, y, size, size, true);
    }
}

/// Paints a grayscale image: 255 light, 0 dark
#[derive(Debug, Clone)]
pub struct ImageWriter {
    module_size: usize,
    quiet_zone: usize,
    image: GrayImage,
}

impl ImageWriter {
    /// Writer with the given pixels per module and quiet zone in modules
    pub fn new(module_size: usize, quiet_zone: usize) -> Self {
        Self {
            module_size: module_size.max(1),
            quiet_zone,
            image: GrayImage::new(0, 0),
        }
    }

    /// The painted image
    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

impl Default for ImageWriter {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl SymbolWriter for ImageWriter {
    fn module_size(&self) -> usize {
        self.module_size
    }

    fn quiet_zone(&self) -> usize {
        self.quiet_zone
    }

    fn set_background(&mut self, extent: usize) {
        self.image = GrayImage::from_pixel(extent as u32, extent as u32, Luma([255]));
    }

    fn set_dark(&mut self, x: usize, y: usize, size: usize) {
        let (width, height) = (self.image.width() as usize, self.image.height() as usize);
        for py in y..(y + size).min(height) {
            for px in x..(x + size).min(width) {
                self.image.put_pixel(px as u32, py as u32, Luma([0]));
            }
        }
    }
}
