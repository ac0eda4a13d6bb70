//! Utility functions for image processing
//!
//! This module provides helper functions for QR code detection:
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Geometry (perspective transforms)

pub mod geometry;
pub mod grayscale;
