/// Error-correction block partitioning and interleaving
use crate::error::BlockSizeError;
use crate::models::{ECLevel, Version};

/// One RS block: data codewords followed by EC codewords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    /// Leading codewords that carry data
    pub num_data_codewords: usize,
    /// Data then EC codewords
    pub codewords: Vec<u8>,
}

impl DataBlock {
    /// Data portion
    pub fn data(&self) -> &[u8] {
        &self.codewords[..self.num_data_codewords]
    }
}

/// Data codewords per block; short blocks first, long blocks (one extra) last
pub fn data_lengths(version: Version, level: ECLevel) -> Vec<usize> {
    let info = version.ec_blocks(level);
    let data_total = version.data_codewords(level);
    let short = data_total / info.num_blocks;
    let num_long = data_total % info.num_blocks;
    (0..info.num_blocks)
        .map(|b| {
            if b < info.num_blocks - num_long {
                short
            } else {
                short + 1
            }
        })
        .collect()
}

/// Split the interleaved symbol stream back into its blocks
pub fn deinterleave(
    raw: &[u8],
    version: Version,
    level: ECLevel,
) -> Result<Vec<DataBlock>, BlockSizeError> {
    let expected = version.total_codewords();
    if raw.len() != expected {
        return Err(BlockSizeError {
            expected,
            found: raw.len(),
        });
    }
    let ecc = version.ec_blocks(level).ecc_per_block;
    let lengths = data_lengths(version, level);
    let longest = lengths.iter().copied().max().unwrap_or(0);

    let mut blocks: Vec<DataBlock> = lengths
        .iter()
        .map(|&len| DataBlock {
            num_data_codewords: len,
            codewords: Vec::with_capacity(len + ecc),
        })
        .collect();

    let mut stream = raw.iter().copied();
    for i in 0..longest {
        for block in blocks.iter_mut().filter(|b| i < b.num_data_codewords) {
            block.codewords.extend(stream.next());
        }
    }
    for _ in 0..ecc {
        for block in blocks.iter_mut() {
            block.codewords.extend(stream.next());
        }
    }

    let found: usize = blocks.iter().map(|b| b.codewords.len()).sum();
    if found != expected {
        return Err(BlockSizeError { expected, found });
    }
    Ok(blocks)
}

/// Interleave blocks into the symbol stream: data round-robin, then EC round-robin
pub fn interleave(blocks: &[DataBlock]) -> Vec<u8> {
    let longest_data = blocks.iter().map(|b| b.num_data_codewords).max().unwrap_or(0);
    let longest_ec = blocks
        .iter()
        .map(|b| b.codewords.len() - b.num_data_codewords)
        .max()
        .unwrap_or(0);
    let mut out = Vec::with_capacity(blocks.iter().map(|b| b.codewords.len()).sum());
    for i in 0..longest_data {
        out.extend(
            blocks
                .iter()
                .filter(|b| i < b.num_data_codewords)
                .map(|b| b.codewords[i]),
        );
    }
    for i in 0..longest_ec {
        out.extend(
            blocks
                .iter()
                .filter_map(|b| b.codewords.get(b.num_data_codewords + i)),
        );
    }
    out
}

/// Cut the data codewords into per-block slices
pub fn split_data<'a>(
    data: &'a [u8],
    version: Version,
    level: ECLevel,
) -> Result<Vec<&'a [u8]>, BlockSizeError> {
    let expected = version.data_codewords(level);
    if data.len() != expected {
        return Err(BlockSizeError {
            expected,
            found: data.len(),
        });
    }
    let mut rest = data;
    Ok(data_lengths(version, level)
        .into_iter()
        .map(|len| {
            let (head, tail) = rest.split_at(len);
            rest = tail;
            head
        })
        .collect())
}
