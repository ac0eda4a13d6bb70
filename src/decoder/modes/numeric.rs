/// Numeric mode (Mode 0001)
/// Groups of 3 digits = 10 bits, 2 digits = 7 bits, 1 digit = 4 bits
use crate::decoder::segments::{BitReader, BitWriter};
use crate::error::BitstreamError;
use crate::models::Mode;

/// Numeric segment payload reader
pub struct NumericDecoder;

impl NumericDecoder {
    /// Read `character_count` digits
    pub fn decode(
        reader: &mut BitReader,
        character_count: usize,
    ) -> Result<String, BitstreamError> {
        let mut result = String::with_capacity(character_count);
        let mut remaining = character_count;

        while remaining > 0 {
            let group = remaining.min(3);
            let (bits, limit) = match group {
                3 => (10, 1000),
                2 => (7, 100),
                _ => (4, 10),
            };
            let offset = reader.offset();
            let value = reader.read(bits)?;
            if value >= limit {
                return Err(BitstreamError::InvalidValue {
                    mode: Mode::Numeric,
                    value,
                    offset,
                });
            }
            result.push_str(&format!("{:0width$}", value, width = group));
            remaining -= group;
        }
        Ok(result)
    }
}

/// Numeric segment payload writer
pub struct NumericEncoder;

impl NumericEncoder {
    /// Digits only
    pub fn validate(text: &str) -> Result<(), BitstreamError> {
        match text.chars().enumerate().find(|(_, c)| !c.is_ascii_digit()) {
            Some((position, character)) => Err(BitstreamError::InvalidCharacter {
                character,
                position,
                mode: Mode::Numeric,
            }),
            None => Ok(()),
        }
    }

    /// Append the packed digit groups of a validated string
    pub fn encode(writer: &mut BitWriter, text: &str) {
        for group in text.as_bytes().chunks(3) {
            let value = group
                .iter()
                .fold(0u32, |acc, &d| acc * 10 + (d - b'0') as u32);
            writer.append(value, group.len() * 3 + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_decode() {
        // 1017 is not a valid 3-digit group; 101 and 7 are
        let mut writer = BitWriter::new();
        writer.append(101, 10);
        writer.append(7, 4);
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(NumericDecoder::decode(&mut reader, 4).unwrap(), "1017");
        assert_eq!(reader.offset(), 14);
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let mut writer = BitWriter::new();
        NumericEncoder::encode(&mut writer, "00701");
        assert_eq!(writer.len(), 17);
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(NumericDecoder::decode(&mut reader, 5).unwrap(), "00701");
    }

    #[test]
    fn test_out_of_range_group() {
        let mut writer = BitWriter::new();
        writer.append(1017, 10);
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(
            NumericDecoder::decode(&mut reader, 3),
            Err(BitstreamError::InvalidValue {
                mode: Mode::Numeric,
                value: 1017,
                offset: 0
            })
        );
    }

    #[test]
    fn test_validate() {
        assert!(NumericEncoder::validate("0123456789").is_ok());
        assert_eq!(
            NumericEncoder::validate("12a4"),
            Err(BitstreamError::InvalidCharacter {
                character: 'a',
                position: 2,
                mode: Mode::Numeric
            })
        );
    }
}
