use crate::decoder::tables::{self, EcBlockInfo};
use crate::models::ECLevel;

/// QR Code version (1-40, Model 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u8);

impl Version {
    /// Smallest version
    pub const MIN: Version = Version(1);
    /// Largest version
    pub const MAX: Version = Version(40);

    /// Validate a version number
    pub fn new(number: u8) -> Option<Self> {
        (1..=40).contains(&number).then_some(Version(number))
    }

    /// Version for a symbol side length, if it is a legal one
    pub fn from_dimension(dimension: usize) -> Option<Self> {
        if dimension < 21 || dimension % 4 != 1 {
            return None;
        }
        u8::try_from((dimension - 17) / 4).ok().and_then(Self::new)
    }

    /// Version number (1-40)
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Modules per side: 17 + 4v
    pub fn dimension(&self) -> usize {
        17 + 4 * self.0 as usize
    }

    /// Data plus EC codewords in the symbol
    pub fn total_codewords(&self) -> usize {
        tables::TOTAL_CODEWORDS[self.0 as usize] as usize
    }

    /// Block layout at the given level
    pub fn ec_blocks(&self, level: ECLevel) -> EcBlockInfo {
        // Every (1..=40, level) entry is populated.
        tables::ec_block_info(self.0, level).unwrap_or(EcBlockInfo {
            num_blocks: 1,
            ecc_per_block: 0,
        })
    }

    /// Data codewords available at the given level
    pub fn data_codewords(&self, level: ECLevel) -> usize {
        let info = self.ec_blocks(level);
        self.total_codewords() - info.num_blocks * info.ecc_per_block
    }

    /// Row/column coordinates of alignment pattern centres
    pub fn alignment_centers(&self) -> &'static [u8] {
        tables::ALIGNMENT_CENTERS[self.0 as usize]
    }

    /// Data-region modules left over after the last full codeword
    pub fn remainder_bits(&self) -> usize {
        match self.0 {
            2..=6 => 7,
            14..=20 | 28..=34 => 3,
            21..=27 => 4,
            _ => 0,
        }
    }

    /// 18-bit version information pattern (versions 7 and up)
    pub fn version_bits(&self) -> Option<u32> {
        (self.0 >= 7).then(|| tables::VERSION_INFO[self.0 as usize - 7])
    }

    /// Iterate all versions in ascending order
    pub fn all() -> impl Iterator<Item = Version> {
        (1..=40).map(Version)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
