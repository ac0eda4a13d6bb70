//! Decoder tuning knobs.
//!
//! Defaults match the standard reader behaviour; every field can be
//! overridden from the environment (`QR_*` variables) for field debugging
//! without a rebuild.

use std::sync::OnceLock;

/// How luminance is split into dark and light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// One global threshold at the mean luminance
    #[default]
    Mean,
    /// 4x4 zones, each thresholded at the midpoint of its min and max
    Zoned,
}

/// Which detector locates the module grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectStrategy {
    /// Finder patterns plus perspective transform
    #[default]
    FinderPatterns,
    /// Fit each version's grid to the bounding box (axis-aligned captures)
    GridFit,
}

/// Decoder configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Thresholding mode for luminance inputs
    pub threshold: ThresholdMode,
    /// Grid location strategy
    pub strategy: DetectStrategy,
    /// Fraction of dark pixels that marks a bounding-box edge
    pub dark_ratio: f32,
    /// Minimum luminance range (max - min) accepted
    pub min_contrast: f32,
    /// Hamming tolerance for format information
    pub max_format_distance: u32,
    /// Hamming tolerance for version information
    pub max_version_distance: u32,
    /// Template mismatches accepted for the alignment pattern
    pub alignment_max_mismatch: usize,
    /// Highest version tried by the grid-fit strategy
    pub max_version: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMode::Mean,
            strategy: DetectStrategy::FinderPatterns,
            dark_ratio: 0.2,
            min_contrast: 255.0 / 10.0,
            max_format_distance: 3,
            max_version_distance: 3,
            alignment_max_mismatch: 3,
            max_version: 40,
        }
    }
}

impl DecoderConfig {
    /// Defaults overridden by any `QR_*` environment variables present
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            threshold: match parse_env_str("QR_THRESHOLD").as_deref() {
                Some("zoned") => ThresholdMode::Zoned,
                Some("mean") => ThresholdMode::Mean,
                _ => d.threshold,
            },
            strategy: match parse_env_str("QR_STRATEGY").as_deref() {
                Some("grid-fit") | Some("grid_fit") => DetectStrategy::GridFit,
                Some("finder") => DetectStrategy::FinderPatterns,
                _ => d.strategy,
            },
            dark_ratio: parse_env_f32("QR_DARK_RATIO", d.dark_ratio).clamp(0.01, 0.99),
            min_contrast: parse_env_f32("QR_MIN_CONTRAST", d.min_contrast).clamp(0.0, 255.0),
            max_format_distance: parse_env_u32("QR_MAX_FORMAT_DISTANCE", d.max_format_distance)
                .min(3),
            max_version_distance: parse_env_u32("QR_MAX_VERSION_DISTANCE", d.max_version_distance)
                .min(3),
            alignment_max_mismatch: parse_env_usize(
                "QR_ALIGNMENT_MAX_MISMATCH",
                d.alignment_max_mismatch,
            )
            .min(12),
            max_version: parse_env_u8("QR_MAX_VERSION", d.max_version).clamp(1, 40),
        }
    }
}

fn parse_env_str(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn parse_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(default)
}

static DECODER_CONFIG: OnceLock<DecoderConfig> = OnceLock::new();

/// Process-wide configuration, read from the environment once
pub fn decoder_config() -> &'static DecoderConfig {
    DECODER_CONFIG.get_or_init(DecoderConfig::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.threshold, ThresholdMode::Mean);
        assert_eq!(config.strategy, DetectStrategy::FinderPatterns);
        assert_eq!(config.max_format_distance, 3);
        assert!((config.min_contrast - 25.5).abs() < 1e-6);
    }

    #[test]
    fn test_unset_variables_fall_back() {
        assert_eq!(parse_env_u8("QR_TEST_UNSET_VARIABLE_U8", 7), 7);
        assert_eq!(parse_env_f32("QR_TEST_UNSET_VARIABLE_F32", 0.5), 0.5);
        assert!(parse_env_str("QR_TEST_UNSET_VARIABLE_STR").is_none());
    }
}
