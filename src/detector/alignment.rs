/// Alignment pattern search near the extrapolated bottom-right corner
use log::{debug, trace};

use super::threshold::PixelSource;
use crate::models::Point;

/// Search radii in module sizes, tried in order
const SEARCH_RADII: [f32; 3] = [4.0, 8.0, 16.0];

/// Template cells are dark except on the ring at distance 1
fn expected_dark(dx: isize, dy: isize) -> bool {
    dx.abs().max(dy.abs()) != 1
}

/// Cells of the 5x5 template that disagree with the image around (cx, cy)
fn template_mismatch(source: &impl PixelSource, cx: f32, cy: f32, module_size: f32) -> usize {
    let (width, height) = (source.width() as f32, source.height() as f32);
    let mut mismatches = 0;
    for dy in -2isize..=2 {
        for dx in -2isize..=2 {
            let sx = (cx + dx as f32 * module_size).floor();
            let sy = (cy + dy as f32 * module_size).floor();
            let inside = sx >= 0.0 && sy >= 0.0 && sx < width && sy < height;
            let dark = inside && source.is_dark(sx as usize, sy as usize, 1);
            if dark != expected_dark(dx, dy) {
                mismatches += 1;
            }
        }
    }
    mismatches
}

/// Best template position within `radius` module sizes of `estimate`
///
/// Returns the lowest mismatch count and the centroid of every position that
/// reached it, or `None` when the clipped window is too small to hold a pattern.
fn search_window(
    source: &impl PixelSource,
    estimate: Point,
    module_size: f32,
    radius: f32,
) -> Option<(usize, Point)> {
    let reach = radius * module_size;
    let max_x = source.width().checked_sub(1)? as f32;
    let max_y = source.height().checked_sub(1)? as f32;
    let left = (estimate.x - reach).clamp(0.0, max_x) as usize;
    let right = (estimate.x + reach).clamp(0.0, max_x) as usize;
    let top = (estimate.y - reach).clamp(0.0, max_y) as usize;
    let bottom = (estimate.y + reach).clamp(0.0, max_y) as usize;
    let span = 3.0 * module_size;
    if ((right - left) as f32) < span || ((bottom - top) as f32) < span {
        return None;
    }

    let mut best = usize::MAX;
    let (mut sum_x, mut sum_y, mut hits) = (0.0f64, 0.0f64, 0usize);
    for y in top..=bottom {
        for x in left..=right {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            let score = template_mismatch(source, cx, cy, module_size);
            if score < best {
                best = score;
                (sum_x, sum_y, hits) = (cx as f64, cy as f64, 1);
            } else if score == best {
                sum_x += cx as f64;
                sum_y += cy as f64;
                hits += 1;
            }
        }
    }
    let centroid = Point::new((sum_x / hits as f64) as f32, (sum_y / hits as f64) as f32);
    Some((best, centroid))
}

/// Locate the alignment pattern closest in shape to the template
///
/// Widens the search window until a position with at most `max_mismatch`
/// disagreeing template cells turns up.
pub fn find_alignment(
    source: &impl PixelSource,
    estimate: Point,
    module_size: f32,
    max_mismatch: usize,
) -> Option<Point> {
    for radius in SEARCH_RADII {
        let Some((mismatch, center)) = search_window(source, estimate, module_size, radius) else {
            trace!("alignment: window of radius {radius} too small");
            continue;
        };
        trace!("alignment: radius {radius} best mismatch {mismatch}");
        if mismatch <= max_mismatch {
            debug!("alignment pattern at ({:.1}, {:.1})", center.x, center.y);
            return Some(center);
        }
    }
    debug!("alignment pattern not found near ({:.1}, {:.1})", estimate.x, estimate.y);
    None
}
