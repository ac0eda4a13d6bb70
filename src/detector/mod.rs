//! QR code detection modules
//!
//! This module turns pixels into a sampled symbol matrix:
//! - Thresholding and bounding box (dark/light decisions)
//! - Finder pattern detection (the three square markers)
//! - Module size and dimension estimation
//! - Alignment pattern search and perspective sampling
//! - Grid fitting, an alternative for axis-aligned captures

/// Alignment pattern search for versions 2+
pub mod alignment;
/// Module size and dimension from the finder triple
pub mod dimension;
/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
/// Version-by-version grid fitting
pub mod grid_fit;
/// Perspective transform construction and module sampling
pub mod sampler;
/// Luminance thresholding and bounding box
pub mod threshold;

use log::debug;

use crate::decoder::config::{DecoderConfig, DetectStrategy};
use crate::decoder::version::VersionInfo;
use crate::error::{DecodeError, DetectionError};
use crate::models::{BitMatrix, Point, Version};
use alignment::find_alignment;
use dimension::{compute_dimension, estimate_module_size};
use finder::{FinderDetector, FinderTriple, select_triple};
use grid_fit::GridFit;
use sampler::{build_transform, extrapolate_bottom_right, sample_grid};
use threshold::{BoundingBox, PixelSource, binarize};

/// A sampled symbol and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// One bit per module, set = dark
    pub matrix: BitMatrix,
    /// Image-space corners: top-left, top-right, bottom-right, bottom-left
    pub position: [Point; 4],
    /// The version code disagreed with the estimated dimension by more than 2
    pub low_confidence_version: bool,
}

/// Locate and sample one symbol using the configured strategy
pub fn detect(source: &impl PixelSource, config: &DecoderConfig) -> Result<Detection, DecodeError> {
    let bounds = BoundingBox::find(source, config.dark_ratio)?;
    match config.strategy {
        DetectStrategy::FinderPatterns => detect_with_finders(source, &bounds, config),
        DetectStrategy::GridFit => Ok(detect_with_grid(source, &bounds, config)?),
    }
}

fn detect_with_finders(
    source: &impl PixelSource,
    bounds: &BoundingBox,
    config: &DecoderConfig,
) -> Result<Detection, DecodeError> {
    let binary = binarize(source);
    let patterns = FinderDetector::detect(&binary, bounds);
    debug!("{} finder candidates", patterns.len());
    let triple = select_triple(&patterns)?;
    let module_size = estimate_module_size(&binary, &triple)?;
    let dimension = compute_dimension(&triple, module_size)?;
    let provisional =
        Version::from_dimension(dimension).ok_or(DetectionError::Dimension { dimension })?;

    let detection = sample_symbol(&binary, &triple, module_size, provisional, config)?;
    if provisional.number() < 7 {
        return Ok(detection);
    }

    // Larger symbols carry their version; trust it over the estimate
    match VersionInfo::read(&detection.matrix, config.max_version_distance) {
        Ok(version) if version != provisional => {
            let diff = version.number().abs_diff(provisional.number());
            debug!("version code says {version}, estimate said {provisional}; resampling");
            let mut resampled = sample_symbol(&binary, &triple, module_size, version, config)?;
            resampled.low_confidence_version = diff > 2;
            Ok(resampled)
        }
        Ok(_) => Ok(detection),
        Err(best_distance) => Err(DecodeError::Version {
            provisional: provisional.number(),
            best_distance,
        }),
    }
}

/// Transform and sample at `version`'s dimension
fn sample_symbol(
    binary: &BitMatrix,
    triple: &FinderTriple,
    module_size: f32,
    version: Version,
    config: &DecoderConfig,
) -> Result<Detection, DetectionError> {
    let dimension = version.dimension();
    let bottom_right = extrapolate_bottom_right(triple);
    let alignment = if version.number() >= 2 {
        let tl = triple.top_left.center;
        let correction = 1.0 - 3.0 / (dimension as f32 - 7.0);
        let estimate = Point::new(
            tl.x + correction * (bottom_right.x - tl.x),
            tl.y + correction * (bottom_right.y - tl.y),
        );
        find_alignment(binary, estimate, module_size, config.alignment_max_mismatch)
    } else {
        None
    };

    let transform = build_transform(triple, alignment, dimension)?;
    Ok(Detection {
        matrix: sample_grid(binary, &transform, dimension),
        position: [
            triple.top_left.center,
            triple.top_right.center,
            alignment.unwrap_or(bottom_right),
            triple.bottom_left.center,
        ],
        low_confidence_version: false,
    })
}

fn detect_with_grid(
    source: &impl PixelSource,
    bounds: &BoundingBox,
    config: &DecoderConfig,
) -> Result<Detection, DetectionError> {
    let found = GridFit::detect(source, bounds, config)?;
    let ms = found.module_size;
    let near = 3.5 * ms;
    let far = (found.version.dimension() as f32 - 3.5) * ms;
    let (left, top) = (bounds.left as f32, bounds.top as f32);
    Ok(Detection {
        matrix: found.matrix,
        position: [
            Point::new(left + near, top + near),
            Point::new(left + far, top + near),
            Point::new(left + far, top + far),
            Point::new(left + near, top + far),
        ],
        low_confidence_version: false,
    })
}
