//! Module size and symbol dimension from the finder pattern triple.
//!
//! Module size comes from Bresenham black-white-black runs along the lines
//! joining the finder centres; the dimension from the centre distances.

use log::debug;

use super::finder::{FinderPattern, FinderTriple};
use crate::error::DetectionError;
use crate::models::{BitMatrix, Version};

fn dark_at(matrix: &BitMatrix, x: isize, y: isize) -> bool {
    x >= 0 && y >= 0 && matrix.get(x as usize, y as usize)
}

fn on_border(matrix: &BitMatrix, x: isize, y: isize) -> bool {
    x <= 0 || y <= 0 || x >= matrix.width() as isize - 1 || y >= matrix.height() as isize - 1
}

/// Length of the dark, light, dark run starting at `from` heading for `to`.
///
/// Both endpoints are included. A line that ends on the image border while
/// still inside the final dark run counts the pixel beyond the border as light.
fn size_of_black_white_black_run(
    matrix: &BitMatrix,
    from: (isize, isize),
    to: (isize, isize),
) -> f32 {
    let steep = (to.1 - from.1).abs() > (to.0 - from.0).abs();
    let ((from_x, from_y), (to_x, to_y)) = if steep {
        ((from.1, from.0), (to.1, to.0))
    } else {
        (from, to)
    };

    let dx = (to_x - from_x).abs();
    let dy = (to_y - from_y).abs();
    let mut error = -dx >> 1;
    let xstep = if from_x < to_x { 1 } else { -1 };
    let ystep = if from_y < to_y { 1 } else { -1 };
    let distance = |x: isize, y: isize| (((x - from_x).pow(2) + (y - from_y).pow(2)) as f32).sqrt();

    // 0: in dark looking for light, 1: in light looking for dark, 2: in dark again
    let mut state = 0;
    let (mut x, mut y) = (from_x, from_y);
    loop {
        let (real_x, real_y) = if steep { (y, x) } else { (x, y) };
        let dark = dark_at(matrix, real_x, real_y);
        if (state == 1) == dark {
            state += 1;
        }
        if state == 3 {
            return distance(x, y);
        }
        if x == to_x {
            break;
        }
        error += dy;
        if error > 0 {
            if y == to_y {
                break;
            }
            y += ystep;
            error -= dx;
        }
        x += xstep;
    }

    let (real_x, real_y) = if steep { (to_y, to_x) } else { (to_x, to_y) };
    if state == 2 && on_border(matrix, real_x, real_y) {
        return distance(to_x + xstep, to_y);
    }
    distance(to_x, to_y)
}

/// Run from `from` toward `to` plus the mirrored run, clipped to the image
fn size_of_black_white_black_run_both_ways(
    matrix: &BitMatrix,
    from: (isize, isize),
    to: (isize, isize),
) -> f32 {
    let (width, height) = (matrix.width() as f32, matrix.height() as f32);
    let (from_x, from_y) = (from.0 as f32, from.1 as f32);
    let mut result = size_of_black_white_black_run(matrix, from, to);

    let mut scale = 1.0f32;
    let mut other_x = from_x - (to.0 as f32 - from_x);
    if other_x < 0.0 {
        scale = from_x / (from_x - other_x);
        other_x = 0.0;
    } else if other_x >= width {
        scale = (width - 1.0 - from_x) / (other_x - from_x);
        other_x = width - 1.0;
    }
    let mut other_y = (from_y - (to.1 as f32 - from_y) * scale).floor();

    scale = 1.0;
    if other_y < 0.0 {
        scale = from_y / (from_y - other_y);
        other_y = 0.0;
    } else if other_y >= height {
        scale = (height - 1.0 - from_y) / (other_y - from_y);
        other_y = height - 1.0;
    }
    other_x = (from_x + (other_x - from_x) * scale).floor();

    result += size_of_black_white_black_run(matrix, from, (other_x as isize, other_y as isize));
    // The starting pixel was counted twice
    result - 1.0
}

fn pixel(p: &FinderPattern) -> (isize, isize) {
    (p.center.x.floor() as isize, p.center.y.floor() as isize)
}

/// Both directions between two finders cover 14 modules
fn module_size_one_way(matrix: &BitMatrix, pattern: &FinderPattern, other: &FinderPattern) -> f32 {
    let est1 = size_of_black_white_black_run_both_ways(matrix, pixel(pattern), pixel(other));
    let est2 = size_of_black_white_black_run_both_ways(matrix, pixel(other), pixel(pattern));
    (est1 + est2) / 14.0
}

/// Mean of the top-left to top-right and top-left to bottom-left estimates
pub fn estimate_module_size(
    matrix: &BitMatrix,
    triple: &FinderTriple,
) -> Result<f32, DetectionError> {
    let module_size = (module_size_one_way(matrix, &triple.top_left, &triple.top_right)
        + module_size_one_way(matrix, &triple.top_left, &triple.bottom_left))
        / 2.0;
    debug!("module size {module_size:.3} px");
    if module_size < 1.0 {
        return Err(DetectionError::ModuleSize { module_size });
    }
    Ok(module_size)
}

/// Symbol dimension from the centre distances, snapped to 4k + 1
pub fn compute_dimension(triple: &FinderTriple, module_size: f32) -> Result<usize, DetectionError> {
    let tl = &triple.top_left.center;
    let tltr = (tl.distance(&triple.top_right.center) / module_size).round() as usize;
    let tlbl = (tl.distance(&triple.bottom_left.center) / module_size).round() as usize;
    let mut dimension = ((tltr + tlbl) >> 1) + 7;
    match dimension & 0x03 {
        0 => dimension += 1,
        2 => dimension -= 1,
        3 => return Err(DetectionError::Dimension { dimension }),
        _ => {}
    }
    if Version::from_dimension(dimension).is_none() {
        return Err(DetectionError::Dimension { dimension });
    }
    debug!("dimension {dimension}");
    Ok(dimension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder(x: f32, y: f32) -> FinderPattern {
        FinderPattern::new(x, y, 1.0)
    }

    /// Three finders at one pixel per module, nothing else
    fn bare_finders(size: usize, unit: usize, offset: usize) -> BitMatrix {
        let mut matrix = BitMatrix::new(size, size);
        let far = offset + (size - 2 * offset) - 7 * unit;
        for (x, y) in [(offset, offset), (far, offset), (offset, far)] {
            matrix.set_region(x, y, 7 * unit, 7 * unit, true);
            matrix.set_region(x + unit, y + unit, 5 * unit, 5 * unit, false);
            matrix.set_region(x + 2 * unit, y + 2 * unit, 3 * unit, 3 * unit, true);
        }
        matrix
    }

    #[test]
    fn test_run_clipped_at_image_edge() {
        let matrix = bare_finders(21, 1, 0);
        // Toward the far finder: dark 3,4 light 5 dark 6 light 7
        assert_eq!(size_of_black_white_black_run(&matrix, (3, 3), (17, 3)), 4.0);
        // Toward the edge: dark 3,2 light 1 dark 0, then off the image
        assert_eq!(size_of_black_white_black_run(&matrix, (3, 3), (0, 3)), 4.0);
        assert_eq!(size_of_black_white_black_run_both_ways(&matrix, (3, 3), (17, 3)), 7.0);
    }

    #[test]
    fn test_one_pixel_modules() {
        let matrix = bare_finders(21, 1, 0);
        let triple = FinderTriple {
            top_left: finder(3.5, 3.5),
            top_right: finder(17.5, 3.5),
            bottom_left: finder(3.5, 17.5),
        };
        let module_size = estimate_module_size(&matrix, &triple).unwrap();
        assert!((module_size - 1.0).abs() < 1e-6, "{module_size}");
        assert_eq!(compute_dimension(&triple, module_size).unwrap(), 21);
    }

    #[test]
    fn test_scaled_modules_with_quiet_zone() {
        // Version 2 (25 modules) at 4 px with a 16 px margin
        let matrix = bare_finders(25 * 4 + 32, 4, 16);
        let (near, far) = (16.0 + 14.0, 16.0 + 25.0 * 4.0 - 14.0);
        let triple = FinderTriple {
            top_left: finder(near, near),
            top_right: finder(far, near),
            bottom_left: finder(near, far),
        };
        let module_size = estimate_module_size(&matrix, &triple).unwrap();
        assert!((module_size - 4.0).abs() < 0.2, "{module_size}");
        assert_eq!(compute_dimension(&triple, module_size).unwrap(), 25);
    }

    #[test]
    fn test_dimension_snapping() {
        let triple = FinderTriple {
            top_left: finder(0.0, 0.0),
            top_right: finder(15.0, 0.0),
            bottom_left: finder(0.0, 15.0),
        };
        // 15 + 7 = 22 -> 21
        assert_eq!(compute_dimension(&triple, 1.0).unwrap(), 21);
        // 16 + 7 = 23 is not 4k + 1 reachable
        let triple = FinderTriple {
            top_left: finder(0.0, 0.0),
            top_right: finder(16.0, 0.0),
            bottom_left: finder(0.0, 16.0),
        };
        assert_eq!(
            compute_dimension(&triple, 1.0),
            Err(DetectionError::Dimension { dimension: 23 })
        );
    }

    #[test]
    fn test_tiny_modules_rejected() {
        // Checkerboard: every run is a single pixel
        let mut matrix = BitMatrix::new(30, 30);
        for y in 0..30 {
            for x in 0..30 {
                matrix.set(x, y, (x + y) % 2 == 0);
            }
        }
        let triple = FinderTriple {
            top_left: finder(4.0, 4.0),
            top_right: finder(24.0, 4.0),
            bottom_left: finder(4.0, 24.0),
        };
        assert!(matches!(
            estimate_module_size(&matrix, &triple),
            Err(DetectionError::ModuleSize { .. })
        ));
    }
}
