//! Helpers shared by the integration tests

#![allow(dead_code)]

use image::GrayImage;
use rust_qr_codec::encoder::writer::write_symbol;
use rust_qr_codec::{BitMatrix, ImageWriter, Mode};

const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Small deterministic generator so failures reproduce
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    /// Uniform in `low..=high`
    pub fn range(&mut self, low: usize, high: usize) -> usize {
        low + (self.next() % (high - low + 1) as u64) as usize
    }

    /// `length` characters from the alphabet of `mode`
    pub fn text(&mut self, mode: Mode, length: usize) -> String {
        (0..length)
            .map(|_| match mode {
                Mode::Numeric => char::from(b'0' + (self.next() % 10) as u8),
                Mode::Alphanumeric => {
                    char::from(ALPHANUMERIC[(self.next() % ALPHANUMERIC.len() as u64) as usize])
                }
                Mode::Byte => char::from((self.next() % 256) as u8),
            })
            .collect()
    }
}

/// Paint `symbol` at `module_size` pixels per module with a 4-module quiet zone
pub fn render(symbol: &BitMatrix, module_size: usize) -> GrayImage {
    let mut writer = ImageWriter::new(module_size, 4);
    write_symbol(symbol, &mut writer);
    writer.into_image()
}
