//! QR code data mode codecs
//!
//! - Numeric: Efficient encoding for digits (0-9)
//! - Alphanumeric: Upper-case letters, digits and nine symbols
//! - Byte: 8-bit data (ISO-8859-1)

pub mod alphanumeric;
pub mod byte;
pub mod numeric;
