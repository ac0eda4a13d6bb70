//! Typed failures for every stage of the decode and encode pipelines.
//!
//! Every error is terminal for the attempt that produced it; callers decide
//! whether to retry on a new frame.

use thiserror::Error;

use crate::models::{ECLevel, Mode};

/// Failure while locating the symbol in the image
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    /// Luminance range is too narrow to separate dark from light
    #[error("insufficient contrast: luminance range {min}..{max}, need at least {required}")]
    LowContrast {
        /// Darkest luminance seen
        min: u8,
        /// Brightest luminance seen
        max: u8,
        /// Minimum range required
        required: f32,
    },
    /// No dark region large enough to hold a symbol
    #[error("no symbol bounding box found (dark region {width}x{height} px)")]
    NoSymbol {
        /// Width of the dark region
        width: usize,
        /// Height of the dark region
        height: usize,
    },
    /// Bounding box is too far from square
    #[error("skewed capture: bounding box {width}x{height} px exceeds squareness limit {limit}")]
    Skewed {
        /// Bounding box width
        width: usize,
        /// Bounding box height
        height: usize,
        /// Allowed width/height difference
        limit: usize,
    },
    /// Fewer than three usable finder patterns
    #[error("unable to resolve a finder pattern triple ({found} candidates)")]
    FinderPatterns {
        /// Number of candidate centres found
        found: usize,
    },
    /// Estimated module size is below one pixel
    #[error("estimated module size {module_size:.3} px is too small")]
    ModuleSize {
        /// The estimate
        module_size: f32,
    },
    /// Estimated dimension is not a valid symbol size
    #[error("estimated dimension {dimension} is not a valid symbol size")]
    Dimension {
        /// The rejected dimension
        dimension: usize,
    },
    /// Perspective system was singular
    #[error("unable to solve perspective transform")]
    Transform,
    /// No version's module grid fitted the bounding box
    #[error("no version grid fits the symbol (best grade {best_grade})")]
    GridFit {
        /// Best grade reached by any version
        best_grade: u8,
    },
}

/// Reed-Solomon correction failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReedSolomonError {
    /// Chien search found a different number of roots than the locator degree
    #[error("error locator has degree {expected} but {found} roots")]
    RootCount {
        /// Degree of the locator
        expected: usize,
        /// Roots found
        found: usize,
    },
    /// A located error falls outside the codeword
    #[error("error position {position} outside codeword of length {length}")]
    PositionOutOfRange {
        /// Computed position
        position: usize,
        /// Codeword length
        length: usize,
    },
    /// More errors than the EC words can repair
    #[error("{errors} errors exceed capacity of {ec_words} EC codewords")]
    TooManyErrors {
        /// Errors located
        errors: usize,
        /// EC codewords in the block
        ec_words: usize,
    },
    /// Locator is indeterminate (sigma(0) == 0 or no errors despite syndromes)
    #[error("error locator is degenerate")]
    DegenerateLocator,
    /// Euclidean step failed to reduce the remainder
    #[error("euclidean algorithm failed to converge")]
    Divergent,
    /// Syndromes remain non-zero after correction
    #[error("codeword still inconsistent after correction")]
    Residual,
}

/// Codeword count disagrees with the version tables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("codeword count mismatch: expected {expected}, found {found}")]
pub struct BlockSizeError {
    /// Count required by the version tables
    pub expected: usize,
    /// Count actually present
    pub found: usize,
}

/// Segment bitstream failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitstreamError {
    /// Mode indicator is not numeric, alphanumeric, byte or terminator
    #[error("unknown mode indicator {indicator:#06b} at bit {offset}")]
    UnknownMode {
        /// The 4-bit indicator read
        indicator: u8,
        /// Bit offset of the indicator
        offset: usize,
    },
    /// Stream ended inside a field
    #[error("bitstream truncated: need {needed} bits at offset {offset}, {available} available")]
    Truncated {
        /// Bits requested
        needed: usize,
        /// Read position
        offset: usize,
        /// Bits left
        available: usize,
    },
    /// Packed group value out of range for its mode
    #[error("invalid {mode:?} group value {value} at bit {offset}")]
    InvalidValue {
        /// Mode being decoded
        mode: Mode,
        /// Offending value
        value: u32,
        /// Bit offset of the group
        offset: usize,
    },
    /// Input character outside the mode's alphabet
    #[error("character {character:?} at position {position} not encodable in {mode:?} mode")]
    InvalidCharacter {
        /// Offending character
        character: char,
        /// Index in the input
        position: usize,
        /// Requested mode
        mode: Mode,
    },
    /// Input longer than the data capacity
    #[error(
        "{length} characters exceed {mode:?} capacity {capacity} at version {version}-{ec_level:?}"
    )]
    CapacityExceeded {
        /// Input length in characters
        length: usize,
        /// Maximum characters at this version/level
        capacity: usize,
        /// Version number tried
        version: u8,
        /// Error correction level
        ec_level: ECLevel,
        /// Requested mode
        mode: Mode,
    },
}

/// Any failure of a decode attempt
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Symbol could not be located
    #[error(transparent)]
    Detection(#[from] DetectionError),
    /// Neither format copy matched within tolerance
    #[error("format information unreadable (best Hamming distance {best_distance})")]
    Format {
        /// Smallest distance seen over both copies
        best_distance: u32,
    },
    /// Version information unmatched or inconsistent with the sampled grid
    #[error("version information unreadable (estimated v{provisional}, distance {best_distance})")]
    Version {
        /// Version implied by the sampled dimension
        provisional: u8,
        /// Smallest distance seen over both copies
        best_distance: u32,
    },
    /// Codeword stream length mismatch
    #[error(transparent)]
    BlockSize(#[from] BlockSizeError),
    /// A data block could not be corrected
    #[error("block {block} uncorrectable: {source}")]
    Uncorrectable {
        /// Index of the failing block
        block: usize,
        /// Underlying RS failure
        source: ReedSolomonError,
    },
    /// Payload could not be interpreted
    #[error(transparent)]
    Bitstream(#[from] BitstreamError),
}

/// Any failure of an encode attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Text could not be packed into the symbol
    #[error(transparent)]
    Bitstream(#[from] BitstreamError),
    /// Requested version is not in 1..=40
    #[error("invalid version {version}")]
    InvalidVersion {
        /// Rejected version number
        version: u8,
    },
    /// Internal codeword layout mismatch
    #[error(transparent)]
    BlockSize(#[from] BlockSizeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = DecodeError::from(DetectionError::LowContrast {
            min: 120,
            max: 130,
            required: 25.5,
        });
        let msg = err.to_string();
        assert!(msg.contains("120..130"), "{msg}");

        let err = DecodeError::Uncorrectable {
            block: 2,
            source: ReedSolomonError::TooManyErrors {
                errors: 9,
                ec_words: 16,
            },
        };
        assert!(err.to_string().starts_with("block 2"));
    }
}
