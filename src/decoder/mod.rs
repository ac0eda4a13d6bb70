//! QR code decoding modules
//!
//! This module contains all the logic for decoding a sampled symbol matrix,
//! and the codeword and segment layers shared with the encoder:
//! - Reed-Solomon error correction over GF(256)
//! - Format and version information
//! - Data mode codecs (numeric, alphanumeric, byte)
//! - Zig-zag codeword placement, masking and block interleaving

/// EC block partitioning and interleaving
pub mod blocks;
/// Zig-zag codeword placement
pub mod codewords;
pub mod config;
/// Format information (mask pattern, EC level)
pub mod format;
/// Function module mask builder (finder/timing/format/alignment/version)
pub mod function_mask;
/// Data mask application
pub mod masking;
/// Data mode codecs (numeric, alphanumeric, byte)
pub mod modes;
/// Symbol matrix decoder that orchestrates the decoding pipeline
pub mod qr_decoder;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// Segment bitstream reader and writer
pub mod segments;
/// QR specification tables (ECC codewords/blocks, format and version codes)
pub mod tables;
/// Version information (versions 7-40)
pub mod version;
