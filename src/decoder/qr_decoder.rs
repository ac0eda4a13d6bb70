/// Symbol matrix decoder - wires the format, codeword, RS and segment stages together
use log::{debug, trace};

use super::blocks::deinterleave;
use super::codewords::read_codewords;
use super::config::DecoderConfig;
use super::format::FormatInformation;
use super::function_mask::FunctionMask;
use super::masking::apply_mask;
use super::reed_solomon::ReedSolomonDecoder;
use super::segments::decode_segments;
use super::version::VersionInfo;
use crate::error::{BlockSizeError, DecodeError};
use crate::models::{BitMatrix, Point, QRCode, Version};

/// Decodes an already sampled symbol matrix
pub struct QrDecoder;

impl QrDecoder {
    /// Decode `matrix`, whose dimension fixes the version.
    ///
    /// `position` is reported in module coordinates (finder centres and the
    /// bottom-right corner); the image detector overwrites it with pixel
    /// coordinates.
    pub fn decode(matrix: &BitMatrix, config: &DecoderConfig) -> Result<QRCode, DecodeError> {
        let dimension = matrix.dimension();
        let version = Version::from_dimension(dimension).ok_or(BlockSizeError {
            expected: 21,
            found: dimension,
        })?;

        let format = FormatInformation::read(matrix, config.max_format_distance)?;
        Self::check_version(matrix, version, config)?;

        let func = FunctionMask::new(version);
        let mut unmasked = matrix.clone();
        apply_mask(&mut unmasked, format.mask, &func);

        let raw = read_codewords(&unmasked, &func);
        trace!("read {} codewords from v{version}", raw.len());
        let mut blocks = deinterleave(&raw, version, format.ec_level)?;

        let ecc = version.ec_blocks(format.ec_level).ecc_per_block;
        let rs = ReedSolomonDecoder::new(ecc);
        let mut block_errors = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter_mut().enumerate() {
            let corrected = rs
                .decode(&mut block.codewords)
                .map_err(|source| DecodeError::Uncorrectable {
                    block: index,
                    source,
                })?;
            block_errors.push(corrected);
        }

        let data: Vec<u8> = blocks.iter().flat_map(|b| b.data().iter().copied()).collect();
        let segments = decode_segments(&data, version)?;
        let content: String = segments.iter().map(|s| s.text.as_str()).collect();
        let error_grade = grade_errors(&block_errors, ecc);
        debug!(
            "decoded v{version}-{:?} mask {} with {} segments, block errors {block_errors:?}",
            format.ec_level,
            format.mask.id(),
            segments.len()
        );

        let n = dimension as f32;
        Ok(QRCode {
            data,
            content,
            segments,
            version,
            error_correction: format.ec_level,
            mask_pattern: format.mask,
            position: [
                Point::new(3.5, 3.5),
                Point::new(n - 3.5, 3.5),
                Point::new(n - 3.5, n - 3.5),
                Point::new(3.5, n - 3.5),
            ],
            modules: matrix.clone(),
            block_errors,
            error_grade,
            low_confidence_version: false,
        })
    }

    /// From version 7 the stored version code must agree with the grid size
    fn check_version(
        matrix: &BitMatrix,
        version: Version,
        config: &DecoderConfig,
    ) -> Result<(), DecodeError> {
        if version.version_bits().is_none() {
            return Ok(());
        }
        match VersionInfo::read(matrix, config.max_version_distance) {
            Ok(read) if read == version => Ok(()),
            Ok(read) => {
                debug!("version code names v{read}, grid is v{version}");
                let (d1, d2) = VersionInfo::copy_distances(matrix, version);
                Err(DecodeError::Version {
                    provisional: version.number(),
                    best_distance: d1.min(d2),
                })
            }
            Err(best_distance) => Err(DecodeError::Version {
                provisional: version.number(),
                best_distance,
            }),
        }
    }
}

/// Remaining correction margin of the worst block: 4 untouched, 0 at capacity
pub fn grade_errors(block_errors: &[usize], ecc_per_block: usize) -> u8 {
    let half = ecc_per_block as f32 / 2.0;
    let worst = block_errors.iter().copied().max().unwrap_or(0) as f32;
    if worst > half - 1.0 {
        0
    } else if worst > half - 2.0 {
        1
    } else if worst > half - 3.0 {
        2
    } else if worst > half - 4.0 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{VersionChoice, encode_symbol};
    use crate::models::{ECLevel, Mode};

    fn config() -> DecoderConfig {
        DecoderConfig::default()
    }

    #[test]
    fn test_grade_errors() {
        // 16 EC words per block: 8 correctable
        assert_eq!(grade_errors(&[0, 0], 16), 4);
        assert_eq!(grade_errors(&[4, 0], 16), 4);
        assert_eq!(grade_errors(&[5], 16), 3);
        assert_eq!(grade_errors(&[0, 6], 16), 2);
        assert_eq!(grade_errors(&[7], 16), 1);
        assert_eq!(grade_errors(&[8], 16), 0);
        // 7 EC words: half is 3.5
        assert_eq!(grade_errors(&[3], 7), 0);
        assert_eq!(grade_errors(&[0], 7), 3);
    }

    #[test]
    fn test_decode_hello_world() {
        let symbol = encode_symbol(
            "HELLO WORLD",
            Mode::Alphanumeric,
            VersionChoice::Fixed(1),
            ECLevel::L,
        )
        .unwrap();
        let qr = QrDecoder::decode(&symbol.matrix, &config()).unwrap();
        assert_eq!(qr.content, "HELLO WORLD");
        // Corrected data codewords: mode and count, payload, terminator, pad bytes
        assert_eq!(qr.data.len(), 19);
        assert_eq!(&qr.data[..4], &[0x20, 0x5B, 0x0B, 0x78]);
        assert_eq!(&qr.data[10..12], &[0xEC, 0x11]);
        assert_eq!(qr.version.number(), 1);
        assert_eq!(qr.error_correction, ECLevel::L);
        assert_eq!(qr.mask_pattern, symbol.mask);
        assert_eq!(qr.block_errors, vec![0]);
        // Seven EC codewords leave a margin of 3.5, never a full grade
        assert_eq!(qr.error_grade, 3);
        assert!(!qr.low_confidence_version);
    }

    #[test]
    fn test_corrects_damaged_block() {
        let symbol =
            encode_symbol("31415926535", Mode::Numeric, VersionChoice::Fixed(2), ECLevel::H)
                .unwrap();
        let mut matrix = symbol.matrix.clone();
        // Flip a 2x2 patch in the lower-right data area
        let n = matrix.dimension();
        for (x, y) in [(n - 1, n - 1), (n - 2, n - 1), (n - 1, n - 2), (n - 2, n - 2)] {
            matrix.toggle(x, y);
        }
        let qr = QrDecoder::decode(&matrix, &config()).unwrap();
        assert_eq!(qr.content, "31415926535");
        assert!(qr.corrected_errors() >= 1);
    }

    #[test]
    fn test_unreadable_format() {
        let symbol =
            encode_symbol("A", Mode::Byte, VersionChoice::Fixed(1), ECLevel::M).unwrap();
        let mut matrix = symbol.matrix.clone();
        let n = matrix.dimension();
        for i in 0..9 {
            matrix.set(8, i, false);
            matrix.set(i, 8, false);
            matrix.set(n - 1 - i, 8, false);
            matrix.set(8, n - 1 - i, false);
        }
        assert!(matches!(
            QrDecoder::decode(&matrix, &config()),
            Err(DecodeError::Format { .. })
        ));
    }

    #[test]
    fn test_version_code_must_match_grid() {
        let symbol = encode_symbol(
            "VERSION SEVEN",
            Mode::Alphanumeric,
            VersionChoice::Fixed(7),
            ECLevel::M,
        )
        .unwrap();
        assert_eq!(
            QrDecoder::decode(&symbol.matrix, &config()).unwrap().content,
            "VERSION SEVEN"
        );

        let mut matrix = symbol.matrix.clone();
        VersionInfo::write(Version::new(9).unwrap(), &mut matrix);
        assert!(matches!(
            QrDecoder::decode(&matrix, &config()),
            Err(DecodeError::Version { provisional: 7, .. })
        ));
    }

    #[test]
    fn test_rejects_non_symbol_size() {
        for size in [22, 1045] {
            let matrix = BitMatrix::new(size, size);
            assert!(matches!(
                QrDecoder::decode(&matrix, &config()),
                Err(DecodeError::BlockSize(_))
            ));
        }
    }
}
