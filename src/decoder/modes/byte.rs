/// Byte mode (Mode 0100) for 8-bit data
///
/// Octets map one-to-one onto ISO-8859-1 code points, so every decoded
/// byte is a `char` and every encodable `char` is at most U+00FF.
use crate::decoder::segments::{BitReader, BitWriter};
use crate::error::BitstreamError;
use crate::models::Mode;

/// Decode byte mode data (8 bits per character)
pub struct ByteDecoder;

impl ByteDecoder {
    /// Read `character_count` octets
    pub fn decode(
        reader: &mut BitReader,
        character_count: usize,
    ) -> Result<String, BitstreamError> {
        (0..character_count)
            .map(|_| reader.read(8).map(|b| char::from(b as u8)))
            .collect()
    }
}

/// Byte segment payload writer
pub struct ByteEncoder;

impl ByteEncoder {
    /// Only code points U+0000..=U+00FF
    pub fn validate(text: &str) -> Result<(), BitstreamError> {
        match text
            .chars()
            .enumerate()
            .find(|&(_, c)| u32::from(c) > 0xFF)
        {
            Some((position, character)) => Err(BitstreamError::InvalidCharacter {
                character,
                position,
                mode: Mode::Byte,
            }),
            None => Ok(()),
        }
    }

    /// One octet per character
    pub fn encode(writer: &mut BitWriter, text: &str) {
        for c in text.chars() {
            writer.append(u32::from(c) & 0xFF, 8);
        }
    }
}
