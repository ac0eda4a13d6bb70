pub mod matrix;
pub mod point;
pub mod qr_code;
pub mod version;

pub use matrix::BitMatrix;
pub use point::Point;
pub use qr_code::{ECLevel, MaskPattern, Mode, QRCode, Segment};
pub use version::Version;
