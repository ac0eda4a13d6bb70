/// Codeword placement in the module grid (zig-zag traversal)
use crate::decoder::function_mask::FunctionMask;
use crate::error::BlockSizeError;
use crate::models::BitMatrix;

/// Data module coordinates (x, y) in placement order
///
/// Column pairs are walked right to left, skipping the vertical timing
/// column; the first pair runs bottom to top and the direction alternates.
/// Within a pair the right-hand module comes first.
pub fn data_positions(func: &FunctionMask) -> Vec<(usize, usize)> {
    let dimension = func.size();
    let mut positions = Vec::with_capacity(func.data_modules_count());
    let mut upward = true;
    let mut col = dimension as isize - 1;

    while col > 0 {
        if col == 6 {
            col -= 1;
            continue;
        }
        for i in 0..dimension {
            let row = if upward { dimension - 1 - i } else { i };
            for c in [col as usize, col as usize - 1] {
                if !func.is_function(c, row) {
                    positions.push((c, row));
                }
            }
        }
        upward = !upward;
        col -= 2;
    }
    positions
}

/// Pack the (already unmasked) data modules MSB-first into codewords
///
/// Trailing remainder modules that do not fill a byte are dropped.
pub fn read_codewords(matrix: &BitMatrix, func: &FunctionMask) -> Vec<u8> {
    let positions = data_positions(func);
    positions
        .chunks_exact(8)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u8, |byte, &(x, y)| (byte << 1) | matrix.get(x, y) as u8)
        })
        .collect()
}

/// Write codewords MSB-first along the placement order; remainder modules stay light
pub fn write_codewords(
    matrix: &mut BitMatrix,
    func: &FunctionMask,
    codewords: &[u8],
) -> Result<(), BlockSizeError> {
    let positions = data_positions(func);
    let capacity = positions.len() / 8;
    if codewords.len() > capacity {
        return Err(BlockSizeError {
            expected: capacity,
            found: codewords.len(),
        });
    }
    let bits = codewords
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1));
    for (&(x, y), bit) in positions.iter().zip(bits.chain(std::iter::repeat(false))) {
        matrix.set(x, y, bit);
    }
    Ok(())
}
