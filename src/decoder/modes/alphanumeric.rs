/// Alphanumeric mode (Mode 0010)
/// Alphanumeric character set: 0-9, A-Z, space, $%*+-./:
use crate::decoder::segments::{BitReader, BitWriter};
use crate::error::BitstreamError;
use crate::models::Mode;

const ALPHANUMERIC_TABLE: [char; 45] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', ' ', '$',
    '%', '*', '+', '-', '.', '/', ':',
];

/// Index of `c` in the 45-symbol table
pub fn alphanumeric_value(c: char) -> Option<u32> {
    ALPHANUMERIC_TABLE
        .iter()
        .position(|&t| t == c)
        .map(|i| i as u32)
}

/// Decode alphanumeric data
/// Pairs = 11 bits, single = 6 bits
pub struct AlphanumericDecoder;

impl AlphanumericDecoder {
    /// Read `character_count` symbols
    pub fn decode(
        reader: &mut BitReader,
        character_count: usize,
    ) -> Result<String, BitstreamError> {
        let mut result = String::with_capacity(character_count);
        let mut remaining = character_count;

        while remaining > 0 {
            let offset = reader.offset();
            if remaining >= 2 {
                let value = reader.read(11)?;
                if value >= 45 * 45 {
                    return Err(invalid(value, offset));
                }
                result.push(ALPHANUMERIC_TABLE[(value / 45) as usize]);
                result.push(ALPHANUMERIC_TABLE[(value % 45) as usize]);
                remaining -= 2;
            } else {
                let value = reader.read(6)?;
                if value >= 45 {
                    return Err(invalid(value, offset));
                }
                result.push(ALPHANUMERIC_TABLE[value as usize]);
                remaining -= 1;
            }
        }
        Ok(result)
    }
}

fn invalid(value: u32, offset: usize) -> BitstreamError {
    BitstreamError::InvalidValue {
        mode: Mode::Alphanumeric,
        value,
        offset,
    }
}

/// Alphanumeric segment payload writer
pub struct AlphanumericEncoder;

impl AlphanumericEncoder {
    /// Every character must be in the 45-symbol table
    pub fn validate(text: &str) -> Result<(), BitstreamError> {
        match text
            .chars()
            .enumerate()
            .find(|&(_, c)| alphanumeric_value(c).is_none())
        {
            Some((position, character)) => Err(BitstreamError::InvalidCharacter {
                character,
                position,
                mode: Mode::Alphanumeric,
            }),
            None => Ok(()),
        }
    }

    /// Append 45*a + b per pair and a trailing 6-bit symbol
    pub fn encode(writer: &mut BitWriter, text: &str) {
        let values: Vec<u32> = text.chars().filter_map(alphanumeric_value).collect();
        for pair in values.chunks(2) {
            match *pair {
                [a, b] => writer.append(a * 45 + b, 11),
                [a] => writer.append(a, 6),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumeric_decode() {
        // "A1" = 10 * 45 + 1 = 451
        let bytes = [0b0011_1000, 0b0110_0000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(AlphanumericDecoder::decode(&mut reader, 2).unwrap(), "A1");
        assert_eq!(reader.offset(), 11);
    }

    #[test]
    fn test_encode_odd_length() {
        let mut writer = BitWriter::new();
        AlphanumericEncoder::encode(&mut writer, "AC-42");
        // Two pairs and one single
        assert_eq!(writer.len(), 28);
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read(11).unwrap(), 10 * 45 + 12);
        assert_eq!(reader.read(11).unwrap(), 41 * 45 + 4);
        assert_eq!(reader.read(6).unwrap(), 2);
    }

    #[test]
    fn test_validate_rejects_lowercase() {
        assert!(AlphanumericEncoder::validate("HELLO WORLD $%*+-./:").is_ok());
        assert_eq!(
            AlphanumericEncoder::validate("Hello"),
            Err(BitstreamError::InvalidCharacter {
                character: 'e',
                position: 1,
                mode: Mode::Alphanumeric
            })
        );
    }

    #[test]
    fn test_invalid_pair_value() {
        let mut writer = BitWriter::new();
        writer.append(2047, 11);
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert!(matches!(
            AlphanumericDecoder::decode(&mut reader, 2),
            Err(BitstreamError::InvalidValue { value: 2047, .. })
        ));
    }
}
