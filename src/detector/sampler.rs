/// Perspective sampling of module centres into a symbol matrix
use log::debug;

use super::finder::FinderTriple;
use super::threshold::PixelSource;
use crate::error::DetectionError;
use crate::models::{BitMatrix, Point};
use crate::utils::geometry::PerspectiveTransform;

/// Fourth corner of the parallelogram spanned by the finder centres
pub fn extrapolate_bottom_right(triple: &FinderTriple) -> Point {
    let (tl, tr, bl) = (
        triple.top_left.center,
        triple.top_right.center,
        triple.bottom_left.center,
    );
    Point::new(tr.x - tl.x + bl.x, tr.y - tl.y + bl.y)
}

/// Module-space to image-space transform for a symbol of `dimension` modules
///
/// The fourth correspondence is the alignment centre when one was found,
/// otherwise the extrapolated bottom-right finder centre.
pub fn build_transform(
    triple: &FinderTriple,
    alignment: Option<Point>,
    dimension: usize,
) -> Result<PerspectiveTransform, DetectionError> {
    let n = dimension as f32;
    let (corner, target) = match alignment {
        Some(center) => (Point::new(n - 6.5, n - 6.5), center),
        None => (Point::new(n - 3.5, n - 3.5), extrapolate_bottom_right(triple)),
    };
    let src = [
        Point::new(3.5, 3.5),
        Point::new(n - 3.5, 3.5),
        corner,
        Point::new(3.5, n - 3.5),
    ];
    let dst = [
        triple.top_left.center,
        triple.top_right.center,
        target,
        triple.bottom_left.center,
    ];
    PerspectiveTransform::from_points(&src, &dst).ok_or(DetectionError::Transform)
}

/// Sample every module centre; points that land outside the image read light
pub fn sample_grid(
    source: &impl PixelSource,
    transform: &PerspectiveTransform,
    dimension: usize,
) -> BitMatrix {
    let (width, height) = (source.width() as f64, source.height() as f64);
    let mut matrix = BitMatrix::new(dimension, dimension);
    for y in 0..dimension {
        for x in 0..dimension {
            let Some((px, py)) = transform.transform(x as f64 + 0.5, y as f64 + 0.5) else {
                continue;
            };
            let (px, py) = (px.floor(), py.floor());
            if px >= 0.0 && py >= 0.0 && px < width && py < height {
                matrix.set(x, y, source.is_dark(px as usize, py as usize, 1));
            }
        }
    }
    debug!(
        "sampled {dimension}x{dimension} grid, {} dark modules",
        matrix.count_ones()
    );
    matrix
}
