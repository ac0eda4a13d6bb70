//! Reed-Solomon error correction for QR codes
//!
//! QR codes use RS over GF(256) with primitive polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 and generator roots alpha^0..alpha^(ec-1).

mod decoder;
mod encoder;
pub mod gf256;
pub mod poly;

pub use decoder::ReedSolomonDecoder;
pub use encoder::ReedSolomonEncoder;
pub use gf256::Gf256;
pub use poly::GfPoly;
