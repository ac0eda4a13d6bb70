use super::{BitMatrix, Point, Version};

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl ECLevel {
    /// All levels in ascending strength
    pub const ALL: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

    /// Level from the two format bits (01=L, 00=M, 11=Q, 10=H)
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => ECLevel::L,
            0b00 => ECLevel::M,
            0b11 => ECLevel::Q,
            _ => ECLevel::H,
        }
    }

    /// Two-bit code stored in the format information
    pub fn bits(&self) -> u8 {
        match self {
            ECLevel::L => 0b01,
            ECLevel::M => 0b00,
            ECLevel::Q => 0b11,
            ECLevel::H => 0b10,
        }
    }

    pub(crate) fn table_index(&self) -> usize {
        match self {
            ECLevel::L => 0,
            ECLevel::M => 1,
            ECLevel::Q => 2,
            ECLevel::H => 3,
        }
    }
}

/// Mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskPattern {
    /// (i + j) % 2 == 0
    Pattern0 = 0,
    /// i % 2 == 0
    Pattern1 = 1,
    /// j % 3 == 0
    Pattern2 = 2,
    /// (i + j) % 3 == 0
    Pattern3 = 3,
    /// (i/2 + j/3) % 2 == 0
    Pattern4 = 4,
    /// (i*j)%2 + (i*j)%3 == 0
    Pattern5 = 5,
    /// ((i*j)%2 + (i*j)%3) % 2 == 0
    Pattern6 = 6,
    /// ((i+j)%2 + (i*j)%3) % 2 == 0
    Pattern7 = 7,
}

impl MaskPattern {
    /// All masks in id order
    pub const ALL: [MaskPattern; 8] = [
        MaskPattern::Pattern0,
        MaskPattern::Pattern1,
        MaskPattern::Pattern2,
        MaskPattern::Pattern3,
        MaskPattern::Pattern4,
        MaskPattern::Pattern5,
        MaskPattern::Pattern6,
        MaskPattern::Pattern7,
    ];

    /// Get mask pattern from bits
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0x07) as usize]
    }

    /// Mask id 0..=7
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Check if module at row `i`, column `j` is inverted by this mask
    pub fn is_masked(&self, i: usize, j: usize) -> bool {
        match self {
            MaskPattern::Pattern0 => (i + j) % 2 == 0,
            MaskPattern::Pattern1 => i % 2 == 0,
            MaskPattern::Pattern2 => j % 3 == 0,
            MaskPattern::Pattern3 => (i + j) % 3 == 0,
            MaskPattern::Pattern4 => (i / 2 + j / 3) % 2 == 0,
            MaskPattern::Pattern5 => ((i * j) % 2 + (i * j) % 3) == 0,
            MaskPattern::Pattern6 => (((i * j) % 2) + ((i * j) % 3)) % 2 == 0,
            MaskPattern::Pattern7 => (((i + j) % 2) + ((i * j) % 3)) % 2 == 0,
        }
    }
}

/// Data segment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Digits 0-9
    Numeric,
    /// 0-9, A-Z, space and `$%*+-./:`
    Alphanumeric,
    /// Raw octets (ISO-8859-1)
    Byte,
}

impl Mode {
    /// 4-bit mode indicator
    pub fn indicator(&self) -> u8 {
        match self {
            Mode::Numeric => 0b0001,
            Mode::Alphanumeric => 0b0010,
            Mode::Byte => 0b0100,
        }
    }

    /// Mode for an indicator, `None` for terminator and unsupported modes
    pub fn from_indicator(indicator: u8) -> Option<Self> {
        match indicator {
            0b0001 => Some(Mode::Numeric),
            0b0010 => Some(Mode::Alphanumeric),
            0b0100 => Some(Mode::Byte),
            _ => None,
        }
    }

    /// Width of the character count field at this version
    pub fn count_bits(&self, version: Version) -> usize {
        let v = version.number();
        let tier = if v < 10 {
            0
        } else if v < 27 {
            1
        } else {
            2
        };
        match self {
            Mode::Numeric => [10, 12, 14][tier],
            Mode::Alphanumeric => [9, 11, 13][tier],
            Mode::Byte => [8, 16, 16][tier],
        }
    }
}

/// One decoded segment of the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment mode
    pub mode: Mode,
    /// Decoded characters
    pub text: String,
}

/// Decoded QR code
#[derive(Debug, Clone)]
pub struct QRCode {
    /// Data codewords after error correction
    pub data: Vec<u8>,
    /// Concatenated segment text
    pub content: String,
    /// Segments in stream order
    pub segments: Vec<Segment>,
    /// QR code version
    pub version: Version,
    /// Error correction level
    pub error_correction: ECLevel,
    /// Mask pattern used
    pub mask_pattern: MaskPattern,
    /// Corner anchors in image coordinates: top-left, top-right,
    /// bottom-right (alignment or extrapolated) and bottom-left
    pub position: [Point; 4],
    /// Module matrix (true = black, false = white)
    pub modules: BitMatrix,
    /// Errors corrected in each RS block
    pub block_errors: Vec<usize>,
    /// Margin left in the worst block, 4 = clean, 0 = at the limit
    pub error_grade: u8,
    /// Version code disagreed with the sampled dimension by more than 2
    pub low_confidence_version: bool,
}

impl QRCode {
    /// Total corrected codewords across all blocks
    pub fn corrected_errors(&self) -> usize {
        self.block_errors.iter().sum()
    }
}
