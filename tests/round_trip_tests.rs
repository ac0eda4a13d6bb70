//! Encode-then-decode tests across versions, levels and modes
//!
//! Every symbol the encoder produces must decode back to the same text,
//! version, level and mask, both straight from its module matrix and from a
//! rendered grayscale image.

mod common;

use common::{XorShift, render};
use rust_qr_codec::decoder::qr_decoder::grade_errors;
use rust_qr_codec::decoder::segments::capacity;
use rust_qr_codec::{
    DecoderConfig, ECLevel, Mode, Version, VersionChoice, decode_luminance, decode_matrix,
    encode_symbol,
};

const MODES: [Mode; 3] = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte];

#[test]
fn test_matrix_round_trip_small_versions() {
    let mut rng = XorShift::new(0x51_C0DE);
    for number in 1..=10u8 {
        let version = Version::new(number).unwrap();
        for level in ECLevel::ALL {
            for mode in MODES {
                let max = capacity(version, level, mode);
                // Alternate between full symbols and random fill
                let length = if (number as usize + level.bits() as usize) % 2 == 0 {
                    max
                } else {
                    rng.range(1, max)
                };
                let text = rng.text(mode, length);
                let symbol = encode_symbol(&text, mode, VersionChoice::Fixed(number), level)
                    .unwrap_or_else(|err| panic!("v{number}-{level:?} {mode:?}: {err}"));

                let qr = decode_matrix(&symbol.matrix)
                    .unwrap_or_else(|err| panic!("v{number}-{level:?} {mode:?}: {err}"));
                assert_eq!(qr.content, text, "v{number}-{level:?} {mode:?}");
                assert_eq!(qr.version, version);
                assert_eq!(qr.error_correction, level);
                assert_eq!(qr.mask_pattern, symbol.mask);
                assert_eq!(qr.corrected_errors(), 0);
                let ecc = version.ec_blocks(level).ecc_per_block;
                assert_eq!(qr.error_grade, grade_errors(&[0], ecc));
                assert!(qr.error_grade >= 3);
            }
        }
    }
}

#[test]
fn test_auto_version_round_trip() {
    let mut rng = XorShift::new(77);
    for (i, mode) in MODES.into_iter().cycle().take(12).enumerate() {
        let level = ECLevel::ALL[i % 4];
        let length = rng.range(1, 300);
        let text = rng.text(mode, length);
        let symbol = encode_symbol(&text, mode, VersionChoice::Auto, level).unwrap();

        // The chosen version is the smallest one that holds the text
        assert!(capacity(symbol.version, level, mode) >= length);
        if let Some(smaller) = Version::new(symbol.version.number() - 1) {
            assert!(capacity(smaller, level, mode) < length);
        }
        assert_eq!(decode_matrix(&symbol.matrix).unwrap().content, text);
    }
}

#[test]
fn test_large_version_round_trip() {
    let mut rng = XorShift::new(4040);
    for (number, level) in [(25u8, ECLevel::M), (40, ECLevel::L), (40, ECLevel::H)] {
        let version = Version::new(number).unwrap();
        let text = rng.text(Mode::Byte, capacity(version, level, Mode::Byte));
        let symbol = encode_symbol(&text, Mode::Byte, VersionChoice::Fixed(number), level).unwrap();
        assert_eq!(symbol.matrix.dimension(), version.dimension());

        let qr = decode_matrix(&symbol.matrix).unwrap();
        assert_eq!(qr.content, text);
        assert_eq!(qr.version, version);
    }
}

#[test]
fn test_image_round_trip() {
    let mut rng = XorShift::new(0xBEEF);
    let config = DecoderConfig::default();
    for number in 1..=10u8 {
        let level = ECLevel::ALL[number as usize % 4];
        let mode = MODES[number as usize % 3];
        let version = Version::new(number).unwrap();
        let length = rng.range(1, capacity(version, level, mode));
        let text = rng.text(mode, length);
        let symbol = encode_symbol(&text, mode, VersionChoice::Fixed(number), level).unwrap();
        let image = render(&symbol.matrix, 4);

        let qr = decode_luminance(&image, &config)
            .unwrap_or_else(|err| panic!("v{number}-{level:?} {mode:?}: {err}"));
        assert_eq!(qr.content, text, "v{number}-{level:?} {mode:?}");
        assert_eq!(qr.version, version);
        assert_eq!(qr.error_correction, level);
        assert!(!qr.low_confidence_version);
    }
}
