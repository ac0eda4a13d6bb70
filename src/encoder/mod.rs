//! QR code encoding
//!
//! Text becomes data codewords, RS blocks, an interleaved stream placed in
//! the zig-zag order, and finally the lowest-penalty masked symbol.

/// Mask penalty rules
pub mod penalty;
/// Function patterns and metadata
pub mod render;
/// Output surfaces
pub mod writer;

use log::debug;
use rayon::prelude::*;

use crate::decoder::blocks::{DataBlock, interleave, split_data};
use crate::decoder::codewords::write_codewords;
use crate::decoder::function_mask::FunctionMask;
use crate::decoder::masking::apply_mask;
use crate::decoder::reed_solomon::ReedSolomonEncoder;
use crate::decoder::segments::{encode_segment, validate, version_for_length};
use crate::error::EncodeError;
use crate::models::{BitMatrix, ECLevel, MaskPattern, Mode, Version};
use writer::{SymbolWriter, write_symbol};

/// How the symbol version is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionChoice {
    /// Smallest version that holds the text
    #[default]
    Auto,
    /// Exactly this version number
    Fixed(u8),
}

/// A finished symbol
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSymbol {
    /// One bit per module, set = dark
    pub matrix: BitMatrix,
    /// Symbol version
    pub version: Version,
    /// Error correction level
    pub level: ECLevel,
    /// Chosen data mask
    pub mask: MaskPattern,
    /// Penalty score of the chosen mask
    pub penalty: u32,
}

/// Encode `text` as one `mode` segment into a symbol matrix
pub fn encode_symbol(
    text: &str,
    mode: Mode,
    choice: VersionChoice,
    level: ECLevel,
) -> Result<EncodedSymbol, EncodeError> {
    let version = match choice {
        VersionChoice::Fixed(number) => {
            Version::new(number).ok_or(EncodeError::InvalidVersion { version: number })?
        }
        VersionChoice::Auto => {
            validate(text, mode)?;
            // Too long even for the largest version: let the segment encoder report it
            version_for_length(text.chars().count(), mode, level).unwrap_or(Version::MAX)
        }
    };
    debug!("encode: {} chars as {mode:?} at {version}-{level:?}", text.chars().count());

    let data = encode_segment(text, mode, version, level)?;
    let ecc = version.ec_blocks(level).ecc_per_block;
    let mut rs = ReedSolomonEncoder::new();
    let blocks: Vec<DataBlock> = split_data(&data, version, level)?
        .into_iter()
        .map(|chunk| DataBlock {
            num_data_codewords: chunk.len(),
            codewords: rs.encode_block(chunk, ecc),
        })
        .collect();
    let stream = interleave(&blocks);

    let func = FunctionMask::new(version);
    let mut unmasked = render::function_patterns(version);
    write_codewords(&mut unmasked, &func, &stream)?;

    let (mask, penalty, matrix) = choose_mask(&unmasked, &func, version, level);
    debug!("encode: mask {} with penalty {penalty}", mask.id());
    Ok(EncodedSymbol {
        matrix,
        version,
        level,
        mask,
        penalty,
    })
}

/// Encode and paint onto `writer`
pub fn encode(
    text: &str,
    mode: Mode,
    choice: VersionChoice,
    level: ECLevel,
    writer: &mut impl SymbolWriter,
) -> Result<(), EncodeError> {
    let symbol = encode_symbol(text, mode, choice, level)?;
    write_symbol(&symbol.matrix, writer);
    Ok(())
}

/// Score all eight masks in parallel; ties go to the lowest id
fn choose_mask(
    unmasked: &BitMatrix,
    func: &FunctionMask,
    version: Version,
    level: ECLevel,
) -> (MaskPattern, u32, BitMatrix) {
    let candidates: Vec<(u32, MaskPattern, BitMatrix)> = MaskPattern::ALL
        .par_iter()
        .map(|&mask| {
            let mut matrix = unmasked.clone();
            apply_mask(&mut matrix, mask, func);
            render::set_metadata(&mut matrix, version, level, mask);
            (penalty::penalty(&matrix), mask, matrix)
        })
        .collect();
    let best = candidates
        .into_iter()
        .min_by_key(|(score, mask, _)| (*score, mask.id()));
    match best {
        Some((score, mask, matrix)) => (mask, score, matrix),
        // MaskPattern::ALL is never empty
        None => (MaskPattern::Pattern0, 0, unmasked.clone()),
    }
}
