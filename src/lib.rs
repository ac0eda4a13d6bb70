//! rust_qr_codec - QR code decoding and encoding in pure Rust
//!
//! Decoding runs thresholding, symbol location (finder patterns or grid
//! fitting), sampling, format/version recovery, Reed-Solomon correction and
//! segment parsing. Encoding runs the same layers in reverse and picks the
//! lowest-penalty mask.
//!
//! Tuning lives in [`DecoderConfig`]; the process default is read from `QR_*`
//! environment variables once. Progress is reported through the `log` facade.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// QR code decoding modules (error correction, format extraction, data modes)
pub mod decoder;
/// QR code detection modules (thresholding, finder patterns, sampling)
pub mod detector;
/// QR code encoding (mask selection, rendering, writers)
pub mod encoder;
/// Error types for every stage
pub mod error;
/// Core data structures (QRCode, BitMatrix, Point, etc.)
pub mod models;
/// Utility functions (grayscale, geometry)
pub mod utils;

pub use decoder::config::{DecoderConfig, DetectStrategy, ThresholdMode, decoder_config};
pub use detector::threshold::{LumaBuffer, LuminanceSource, PixelSource, ThresholdedImage};
pub use encoder::writer::{ImageWriter, MatrixWriter, SymbolWriter};
pub use encoder::{EncodedSymbol, VersionChoice, encode, encode_symbol};
pub use error::{DecodeError, DetectionError, EncodeError};
pub use models::{BitMatrix, ECLevel, MaskPattern, Mode, Point, QRCode, Segment, Version};

use decoder::qr_decoder::QrDecoder;
use log::debug;

/// Decode the text of the symbol in `source` with the process-wide configuration
pub fn decode(source: &impl PixelSource) -> Result<String, DecodeError> {
    decode_symbol(source, decoder_config()).map(|qr| qr.content)
}

/// Locate, sample and decode one symbol
///
/// # Arguments
/// * `source` - Dark/light pixel decisions
/// * `config` - Detection strategy and tolerances
///
/// # Returns
/// The decoded symbol with its image-space position
pub fn decode_symbol(
    source: &impl PixelSource,
    config: &DecoderConfig,
) -> Result<QRCode, DecodeError> {
    let detection = detector::detect(source, config)?;
    let mut qr = QrDecoder::decode(&detection.matrix, config)?;
    qr.position = detection.position;
    qr.low_confidence_version = detection.low_confidence_version;
    debug!(
        "decoded {}-{:?}, {} corrected codewords",
        qr.version,
        qr.error_correction,
        qr.corrected_errors()
    );
    Ok(qr)
}

/// Threshold a luminance image with the configured mode, then decode it
///
/// # Arguments
/// * `source` - 8-bit luminance, e.g. an `image::GrayImage` or a [`LumaBuffer`]
/// * `config` - Threshold mode, contrast floor, strategy and tolerances
pub fn decode_luminance(
    source: &impl LuminanceSource,
    config: &DecoderConfig,
) -> Result<QRCode, DecodeError> {
    let image = ThresholdedImage::new(source, config.threshold, config.min_contrast)?;
    decode_symbol(&image, config)
}

/// Decode an already sampled symbol matrix, one bit per module
pub fn decode_matrix(matrix: &BitMatrix) -> Result<QRCode, DecodeError> {
    QrDecoder::decode(matrix, decoder_config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_round_trip() {
        let symbol = encode_symbol(
            "HELLO WORLD",
            Mode::Alphanumeric,
            VersionChoice::Fixed(1),
            ECLevel::L,
        )
        .unwrap();
        let qr = decode_matrix(&symbol.matrix).unwrap();
        assert_eq!(qr.content, "HELLO WORLD");
        assert_eq!(qr.segments.len(), 1);
        assert_eq!(qr.segments[0].mode, Mode::Alphanumeric);
    }

    #[test]
    fn test_image_round_trip() {
        let mut writer = ImageWriter::new(4, 4);
        encode("HELLO WORLD", Mode::Alphanumeric, VersionChoice::Fixed(1), ECLevel::L, &mut writer)
            .unwrap();
        let image = writer.into_image();
        let qr = decode_luminance(&image, &DecoderConfig::default()).unwrap();
        assert_eq!(qr.content, "HELLO WORLD");
        assert!(qr.position[0].distance(&Point::new(30.0, 30.0)) < 0.5);
    }

    #[test]
    fn test_uniform_image_is_low_contrast() {
        let flat = image::GrayImage::from_pixel(64, 64, image::Luma([128]));
        assert!(matches!(
            decode_luminance(&flat, &DecoderConfig::default()),
            Err(DecodeError::Detection(DetectionError::LowContrast { .. }))
        ));
    }
}
