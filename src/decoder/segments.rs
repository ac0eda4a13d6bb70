//! Segment bitstream: mode indicator, character count, payload.
//!
//! Decoding stops at the terminator (or when fewer than four bits remain);
//! encoding writes a single segment followed by terminator and pad codewords.

use log::trace;

use crate::decoder::modes::{
    alphanumeric::{AlphanumericDecoder, AlphanumericEncoder},
    byte::{ByteDecoder, ByteEncoder},
    numeric::{NumericDecoder, NumericEncoder},
};
use crate::error::BitstreamError;
use crate::models::{ECLevel, Mode, Segment, Version};

const PAD_CODEWORDS: [u8; 2] = [0xEC, 0x11];

/// MSB-first reader over data codewords
pub struct BitReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BitReader<'a> {
    /// Reader positioned at the first bit of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bits consumed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bits left to read
    pub fn available(&self) -> usize {
        self.data.len() * 8 - self.offset
    }

    /// Read `n` (<= 32) bits as an unsigned value
    pub fn read(&mut self, n: usize) -> Result<u32, BitstreamError> {
        if n > self.available() {
            return Err(BitstreamError::Truncated {
                needed: n,
                offset: self.offset,
                available: self.available(),
            });
        }
        let mut value = 0u32;
        for _ in 0..n {
            let byte = self.data[self.offset / 8];
            let bit = (byte >> (7 - self.offset % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.offset += 1;
        }
        Ok(value)
    }
}

/// MSB-first bit accumulator
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    len: usize,
}

impl BitWriter {
    /// Empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits written
    pub fn len(&self) -> usize {
        self.len
    }

    /// True before anything is written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append the low `n` bits of `value`, most significant first
    pub fn append(&mut self, value: u32, n: usize) {
        for i in (0..n).rev() {
            if self.len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> i) & 1 == 1 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 0x80 >> (self.len % 8);
            }
            self.len += 1;
        }
    }

    /// Written bytes, the final one zero-padded
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Parse every segment up to the terminator
pub fn decode_segments(data: &[u8], version: Version) -> Result<Vec<Segment>, BitstreamError> {
    let mut reader = BitReader::new(data);
    let mut segments = Vec::new();

    while reader.available() >= 4 {
        let offset = reader.offset();
        let indicator = reader.read(4)? as u8;
        if indicator == 0 {
            break;
        }
        let mode = Mode::from_indicator(indicator)
            .ok_or(BitstreamError::UnknownMode { indicator, offset })?;
        let count = reader.read(mode.count_bits(version))? as usize;
        let text = match mode {
            Mode::Numeric => NumericDecoder::decode(&mut reader, count)?,
            Mode::Alphanumeric => AlphanumericDecoder::decode(&mut reader, count)?,
            Mode::Byte => ByteDecoder::decode(&mut reader, count)?,
        };
        trace!("segment: {mode:?} x{count} at bit {offset}");
        segments.push(Segment { mode, text });
    }
    Ok(segments)
}

/// Characters of `mode` that fit in the data codewords of `version` at `level`
pub fn capacity(version: Version, level: ECLevel, mode: Mode) -> usize {
    let bits = (version.data_codewords(level) * 8).saturating_sub(4 + mode.count_bits(version));
    let capacity = match mode {
        Mode::Numeric => {
            let rest = bits % 10;
            bits / 10 * 3 + usize::from(rest >= 4) + usize::from(rest >= 7)
        }
        Mode::Alphanumeric => bits / 11 * 2 + usize::from(bits % 11 >= 6),
        Mode::Byte => bits / 8,
    };
    // The count field bounds the length too
    capacity.min((1 << mode.count_bits(version)) - 1)
}

/// Smallest version whose capacity holds `length` characters
pub fn version_for_length(length: usize, mode: Mode, level: ECLevel) -> Option<Version> {
    Version::all().find(|&v| capacity(v, level, mode) >= length)
}

/// Check every character against the mode's alphabet
pub fn validate(text: &str, mode: Mode) -> Result<(), BitstreamError> {
    match mode {
        Mode::Numeric => NumericEncoder::validate(text),
        Mode::Alphanumeric => AlphanumericEncoder::validate(text),
        Mode::Byte => ByteEncoder::validate(text),
    }
}

/// Data codewords for `text` as one segment, terminated and padded to capacity
pub fn encode_segment(
    text: &str,
    mode: Mode,
    version: Version,
    level: ECLevel,
) -> Result<Vec<u8>, BitstreamError> {
    validate(text, mode)?;
    let length = text.chars().count();
    let capacity = capacity(version, level, mode);
    if length > capacity {
        return Err(BitstreamError::CapacityExceeded {
            length,
            capacity,
            version: version.number(),
            ec_level: level,
            mode,
        });
    }

    let data_codewords = version.data_codewords(level);
    let data_bits = data_codewords * 8;
    let mut writer = BitWriter::new();
    writer.append(mode.indicator() as u32, 4);
    writer.append(length as u32, mode.count_bits(version));
    match mode {
        Mode::Numeric => NumericEncoder::encode(&mut writer, text),
        Mode::Alphanumeric => AlphanumericEncoder::encode(&mut writer, text),
        Mode::Byte => ByteEncoder::encode(&mut writer, text),
    }

    let terminator = (data_bits - writer.len()).min(4);
    writer.append(0, terminator);
    let padding = (8 - writer.len() % 8) % 8;
    writer.append(0, padding);

    let mut bytes = writer.into_bytes();
    let filler = data_codewords.saturating_sub(bytes.len());
    bytes.extend(PAD_CODEWORDS.iter().cycle().take(filler));
    Ok(bytes)
}
