//! Luminance thresholding and symbol bounding box.
//!
//! A [`LuminanceSource`] is turned into a [`ThresholdedImage`], which answers
//! the [`PixelSource`] question "is this pixel box dark?". Everything
//! downstream of this module only sees dark/light decisions.

use image::GrayImage;
use log::debug;
use rayon::prelude::*;

use crate::decoder::config::ThresholdMode;
use crate::error::DetectionError;
use crate::models::BitMatrix;
use crate::utils::grayscale::{rgb_to_grayscale, rgba_to_grayscale};

/// Zones per side for [`ThresholdMode::Zoned`]
const ZONES: usize = 4;

/// Smallest symbol side in pixels (version 1 at one pixel per module)
const MIN_SYMBOL_PX: isize = 21;

/// Rectangular source of 8-bit luminance
pub trait LuminanceSource {
    /// Width in pixels
    fn width(&self) -> usize;
    /// Height in pixels
    fn height(&self) -> usize;
    /// Luminance at (x, y), 0 = black
    fn luminance(&self, x: usize, y: usize) -> u8;
}

/// Rectangular source of dark/light decisions
pub trait PixelSource {
    /// Width in pixels
    fn width(&self) -> usize;
    /// Height in pixels
    fn height(&self) -> usize;
    /// Whether the `box_size` x `box_size` box anchored at (x, y) is dark
    fn is_dark(&self, x: usize, y: usize, box_size: usize) -> bool;
}

impl LuminanceSource for GrayImage {
    fn width(&self) -> usize {
        GrayImage::width(self) as usize
    }

    fn height(&self) -> usize {
        GrayImage::height(self) as usize
    }

    fn luminance(&self, x: usize, y: usize) -> u8 {
        self.get_pixel(x as u32, y as u32).0[0]
    }
}

/// A set bit is dark; boxes are dark when more than half their bits are set
impl PixelSource for BitMatrix {
    fn width(&self) -> usize {
        BitMatrix::width(self)
    }

    fn height(&self) -> usize {
        BitMatrix::height(self)
    }

    fn is_dark(&self, x: usize, y: usize, box_size: usize) -> bool {
        if box_size <= 1 {
            return self.get(x, y);
        }
        let x_end = (x + box_size).min(BitMatrix::width(self));
        let y_end = (y + box_size).min(BitMatrix::height(self));
        let mut dark = 0;
        let mut total = 0;
        for yy in y..y_end {
            for xx in x..x_end {
                dark += self.get(xx, yy) as usize;
                total += 1;
            }
        }
        total > 0 && dark * 2 > total
    }
}

/// Owned luma plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl LumaBuffer {
    /// Wrap `width * height` luma bytes, row-major
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Convert packed RGB
    pub fn from_rgb(rgb: &[u8], width: usize, height: usize) -> Option<Self> {
        if rgb.len() < width * height * 3 {
            return None;
        }
        Self::new(width, height, rgb_to_grayscale(rgb, width, height))
    }

    /// Convert packed RGBA (alpha ignored)
    pub fn from_rgba(rgba: &[u8], width: usize, height: usize) -> Option<Self> {
        if rgba.len() < width * height * 4 {
            return None;
        }
        Self::new(width, height, rgba_to_grayscale(rgba, width, height))
    }

    /// Raw luma bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl LuminanceSource for LumaBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn luminance(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Threshold {
    Global(f32),
    Zoned {
        zone_width: usize,
        zone_height: usize,
        values: Vec<f32>,
    },
}

/// Luminance plane with a fixed dark/light threshold
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdedImage {
    width: usize,
    height: usize,
    luma: Vec<u8>,
    threshold: Threshold,
}

impl ThresholdedImage {
    /// Snapshot `source` and compute its threshold.
    ///
    /// Fails with [`DetectionError::LowContrast`] when the luminance range is
    /// narrower than `min_contrast`.
    pub fn new(
        source: &impl LuminanceSource,
        mode: ThresholdMode,
        min_contrast: f32,
    ) -> Result<Self, DetectionError> {
        let (width, height) = (source.width(), source.height());
        let mut luma = Vec::with_capacity(width * height);
        for y in 0..height {
            luma.extend((0..width).map(|x| source.luminance(x, y)));
        }

        let (min, max, sum) = if width == 0 {
            (0, 0, 0)
        } else {
            luma.par_chunks(width)
                .map(|row| {
                    row.iter().fold((u8::MAX, u8::MIN, 0u64), |(lo, hi, s), &v| {
                        (lo.min(v), hi.max(v), s + v as u64)
                    })
                })
                .reduce(
                    || (u8::MAX, u8::MIN, 0u64),
                    |a, b| (a.0.min(b.0), a.1.max(b.1), a.2 + b.2),
                )
        };
        if luma.is_empty() || ((max as f32) - (min as f32)) < min_contrast {
            return Err(DetectionError::LowContrast {
                min: if luma.is_empty() { 0 } else { min },
                max,
                required: min_contrast,
            });
        }

        let threshold = match mode {
            ThresholdMode::Mean => Threshold::Global(sum as f32 / luma.len() as f32),
            ThresholdMode::Zoned => zoned_threshold(&luma, width, height),
        };
        debug!("threshold {width}x{height}: luminance {min}..{max}, {threshold:?}");

        Ok(Self {
            width,
            height,
            luma,
            threshold,
        })
    }

    fn threshold_at(&self, x: usize, y: usize) -> f32 {
        match &self.threshold {
            Threshold::Global(t) => *t,
            Threshold::Zoned {
                zone_width,
                zone_height,
                values,
            } => {
                let zx = (x / zone_width).min(ZONES - 1);
                let zy = (y / zone_height).min(ZONES - 1);
                values[zy * ZONES + zx]
            }
        }
    }
}

/// Midpoint of min and max per zone; tiny images fall back to one zone
fn zoned_threshold(luma: &[u8], width: usize, height: usize) -> Threshold {
    let (zone_width, zone_height) = (width / ZONES, height / ZONES);
    if zone_width == 0 || zone_height == 0 {
        let (lo, hi) = luma
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        return Threshold::Global(((lo as u32 + hi as u32) / 2) as f32);
    }
    let values = (0..ZONES * ZONES)
        .into_par_iter()
        .map(|zone| {
            let (zx, zy) = (zone % ZONES, zone / ZONES);
            let (lo, hi) = (zy * zone_height..(zy + 1) * zone_height)
                .flat_map(|y| {
                    let row = y * width + zx * zone_width;
                    luma[row..row + zone_width].iter().copied()
                })
                .fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
            ((lo as u32 + hi as u32) / 2) as f32
        })
        .collect();
    Threshold::Zoned {
        zone_width,
        zone_height,
        values,
    }
}

impl PixelSource for ThresholdedImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn is_dark(&self, x: usize, y: usize, box_size: usize) -> bool {
        let box_size = box_size.max(1);
        let x_end = x.saturating_add(box_size).min(self.width);
        let y_end = y.saturating_add(box_size).min(self.height);
        if x >= x_end || y >= y_end {
            return false;
        }
        let mut sum = 0u32;
        for yy in y..y_end {
            let row = &self.luma[yy * self.width + x..yy * self.width + x_end];
            sum += row.iter().map(|&v| v as u32).sum::<u32>();
        }
        let mean = sum as f32 / ((x_end - x) * (y_end - y)) as f32;
        mean < self.threshold_at(x, y)
    }
}

/// Binarize every pixel of `source` into a matrix
pub fn binarize(source: &impl PixelSource) -> BitMatrix {
    let (width, height) = (source.width(), source.height());
    let mut matrix = BitMatrix::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if source.is_dark(x, y, 1) {
                matrix.set(x, y, true);
            }
        }
    }
    matrix
}

/// Inclusive pixel bounds of the dark content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// First dark column
    pub left: usize,
    /// First dark row
    pub top: usize,
    /// Last dark column
    pub right: usize,
    /// Last dark row
    pub bottom: usize,
}

impl BoundingBox {
    /// Scan each edge inward until a line holds at least `dark_ratio` dark pixels
    pub fn find(source: &impl PixelSource, dark_ratio: f32) -> Result<Self, DetectionError> {
        let (width, height) = (source.width(), source.height());
        let column_limit = height as f32 * dark_ratio;
        let row_limit = width as f32 * dark_ratio;
        let column_dark = |x: usize| (0..height).filter(|&y| source.is_dark(x, y, 1)).count();
        let row_dark = |y: usize| (0..width).filter(|&x| source.is_dark(x, y, 1)).count();

        let left = (0..width)
            .find(|&x| column_dark(x) as f32 >= column_limit)
            .map_or(width as isize, |x| x as isize);
        let right = (0..width)
            .rev()
            .find(|&x| column_dark(x) as f32 >= column_limit)
            .map_or(-1, |x| x as isize);
        let top = (0..height)
            .find(|&y| row_dark(y) as f32 >= row_limit)
            .map_or(height as isize, |y| y as isize);
        let bottom = (0..height)
            .rev()
            .find(|&y| row_dark(y) as f32 >= row_limit)
            .map_or(-1, |y| y as isize);

        let box_width = right - left + 1;
        let box_height = bottom - top + 1;
        if box_width < MIN_SYMBOL_PX || box_height < MIN_SYMBOL_PX {
            return Err(DetectionError::NoSymbol {
                width: box_width.max(0) as usize,
                height: box_height.max(0) as usize,
            });
        }

        let limit = (height / 64).max(2);
        if (box_width - box_height).unsigned_abs() > limit {
            return Err(DetectionError::Skewed {
                width: box_width as usize,
                height: box_height as usize,
                limit,
            });
        }

        let bounds = Self {
            left: left as usize,
            top: top as usize,
            right: right as usize,
            bottom: bottom as usize,
        };
        debug!("bounding box {bounds:?}");
        Ok(bounds)
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    /// Mean side length
    pub fn size(&self) -> f32 {
        (self.width() + self.height()) as f32 / 2.0
    }
}
