/// Finder pattern detection using 1:1:3:1:1 ratio scanning with cross-checks
use log::{debug, trace};

use super::threshold::BoundingBox;
use crate::error::DetectionError;
use crate::models::{BitMatrix, Point};

/// Largest module-size ratio inside a triple
const MAX_SIZE_RATIO: f32 = 1.5;
/// Largest |cos| at the top-left vertex
const MAX_CORNER_COS: f32 = 0.3;

/// A confirmed finder pattern centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Centre in pixel coordinates
    pub center: Point,
    /// Estimated module size in pixels
    pub module_size: f32,
    /// Number of scan hits merged into this pattern
    pub count: usize,
}

impl FinderPattern {
    /// Single-hit pattern
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
            count: 1,
        }
    }

    /// Same pattern seen again: within one module and of similar size
    fn about_equals(&self, x: f32, y: f32, module_size: f32) -> bool {
        if (y - self.center.y).abs() > module_size || (x - self.center.x).abs() > module_size {
            return false;
        }
        let diff = (module_size - self.module_size).abs();
        diff <= 1.0 || diff <= self.module_size
    }

    /// Count-weighted average with a new hit
    fn combine(&self, x: f32, y: f32, module_size: f32) -> Self {
        let count = self.count + 1;
        let n = self.count as f32;
        let total = count as f32;
        Self {
            center: Point::new(
                (n * self.center.x + x) / total,
                (n * self.center.y + y) / total,
            ),
            module_size: (n * self.module_size + module_size) / total,
            count,
        }
    }
}

/// Three finder patterns with their roles assigned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderTriple {
    /// Corner with the right angle
    pub top_left: FinderPattern,
    /// Clockwise neighbour of the top-left in image coordinates
    pub top_right: FinderPattern,
    /// Remaining corner
    pub bottom_left: FinderPattern,
}

/// Row scanner for finder pattern candidates
pub struct FinderDetector;

impl FinderDetector {
    /// Scan every row of the bounding box and return the merged candidates
    pub fn detect(matrix: &BitMatrix, bounds: &BoundingBox) -> Vec<FinderPattern> {
        let mut patterns: Vec<FinderPattern> = Vec::new();
        let bottom = bounds.bottom.min(matrix.height().saturating_sub(1));

        for y in bounds.top..=bottom {
            if !Self::has_significant_edges(matrix, y, bounds) {
                continue;
            }
            for (center_x, counts) in Self::scan_row(matrix, y, bounds) {
                if let Some((x, y, module_size)) =
                    Self::handle_possible_center(matrix, &counts, center_x, y)
                {
                    match patterns.iter_mut().find(|p| p.about_equals(x, y, module_size)) {
                        Some(existing) => *existing = existing.combine(x, y, module_size),
                        None => patterns.push(FinderPattern::new(x, y, module_size)),
                    }
                }
            }
        }

        debug!("finder: {} candidates", patterns.len());
        for p in &patterns {
            trace!("finder candidate {p:?}");
        }
        patterns
    }

    /// A finder row crosses at least four dark/light edges
    fn has_significant_edges(matrix: &BitMatrix, y: usize, bounds: &BoundingBox) -> bool {
        let mut transitions = 0;
        let mut prev_color = matrix.get(bounds.left, y);

        for x in bounds.left + 1..=bounds.right {
            let color = matrix.get(x, y);
            if color != prev_color {
                transitions += 1;
                prev_color = color;
                if transitions >= 4 {
                    return true;
                }
            }
        }
        false
    }

    /// Dark/light/dark/light/dark run windows passing the ratio test, with the
    /// centre x of each (pixel-edge coordinates)
    fn scan_row(matrix: &BitMatrix, y: usize, bounds: &BoundingBox) -> Vec<(f32, [usize; 5])> {
        let mut runs: Vec<(bool, usize, usize)> = Vec::new();
        let mut run_start = bounds.left;
        let mut current_color = matrix.get(bounds.left, y);

        for x in bounds.left + 1..=bounds.right + 1 {
            // One past the box flushes the final run
            let color = if x > bounds.right {
                !current_color
            } else {
                matrix.get(x, y)
            };
            if color != current_color {
                runs.push((current_color, run_start, x - run_start));
                run_start = x;
                current_color = color;
            }
        }

        runs.windows(5)
            .filter(|w| w[0].0)
            .filter_map(|w| {
                let counts = [w[0].2, w[1].2, w[2].2, w[3].2, w[4].2];
                found_pattern_cross(&counts)
                    .then(|| (w[2].1 as f32 + w[2].2 as f32 / 2.0, counts))
            })
            .collect()
    }

    /// Confirm a row hit vertically, horizontally and diagonally
    fn handle_possible_center(
        matrix: &BitMatrix,
        counts: &[usize; 5],
        center_x: f32,
        y: usize,
    ) -> Option<(f32, f32, f32)> {
        let total: usize = counts.iter().sum();
        let max_count = counts[2];

        let cx = center_x.floor() as usize;
        let (center_y, _) = cross_check(matrix, cx, y, (0, 1), max_count, total)?;
        let cy = center_y.floor() as usize;
        let (center_x, total_h) = cross_check(matrix, cx, cy, (1, 0), max_count, total)?;
        let cx = center_x.floor() as usize;

        let (diagonal, _) = run_counts(matrix, cx, cy, (1, 1), max_count * 2)?;
        if !found_pattern_cross(&diagonal) {
            return None;
        }

        Some((center_x, center_y, total_h as f32 / 7.0))
    }
}

/// 1:1:3:1:1 within half a module per unit run
fn found_pattern_cross(counts: &[usize; 5]) -> bool {
    if counts.iter().any(|&c| c == 0) {
        return false;
    }
    let total: usize = counts.iter().sum();
    if total < 7 {
        return false;
    }
    let module = total as f32 / 7.0;
    let max_variance = module / 2.0;
    (module - counts[0] as f32).abs() < max_variance
        && (module - counts[1] as f32).abs() < max_variance
        && (3.0 * module - counts[2] as f32).abs() < 3.0 * max_variance
        && (module - counts[3] as f32).abs() < max_variance
        && (module - counts[4] as f32).abs() < max_variance
}

/// Re-measure the five runs through (cx, cy) along `step`; returns the
/// centre coordinate along that axis and the run total
fn cross_check(
    matrix: &BitMatrix,
    cx: usize,
    cy: usize,
    step: (isize, isize),
    max_count: usize,
    original_total: usize,
) -> Option<(f32, usize)> {
    let (counts, end) = run_counts(matrix, cx, cy, step, max_count)?;
    let total: usize = counts.iter().sum();
    if 5 * total.abs_diff(original_total) >= 2 * original_total {
        return None;
    }
    if !found_pattern_cross(&counts) {
        return None;
    }
    let base = (if step.0 != 0 { cx } else { cy }) as f32;
    let offset = end as f32 - counts[4] as f32 - counts[3] as f32 - counts[2] as f32 / 2.0;
    Some((base + offset, total))
}

/// Run lengths dark/light/dark/light/dark centred on (cx, cy), plus the
/// forward offset one past the last run. The outer dark runs may stop at the
/// image edge; the inner runs may not.
fn run_counts(
    matrix: &BitMatrix,
    cx: usize,
    cy: usize,
    (dx, dy): (isize, isize),
    max_count: usize,
) -> Option<([usize; 5], isize)> {
    let (width, height) = (matrix.width() as isize, matrix.height() as isize);
    let at = |i: isize| -> Option<bool> {
        let x = cx as isize + i * dx;
        let y = cy as isize + i * dy;
        (x >= 0 && y >= 0 && x < width && y < height).then(|| matrix.get(x as usize, y as usize))
    };
    let mut counts = [0usize; 5];

    let mut i = 0isize;
    while at(-i) == Some(true) {
        counts[2] += 1;
        i += 1;
    }
    at(-i)?;
    while at(-i) == Some(false) && counts[1] <= max_count {
        counts[1] += 1;
        i += 1;
    }
    if at(-i).is_none() || counts[1] > max_count {
        return None;
    }
    while at(-i) == Some(true) && counts[0] <= max_count {
        counts[0] += 1;
        i += 1;
    }
    if counts[0] > max_count {
        return None;
    }

    let mut i = 1isize;
    while at(i) == Some(true) {
        counts[2] += 1;
        i += 1;
    }
    at(i)?;
    while at(i) == Some(false) && counts[3] < max_count {
        counts[3] += 1;
        i += 1;
    }
    if at(i).is_none() || counts[3] >= max_count {
        return None;
    }
    while at(i) == Some(true) && counts[4] < max_count {
        counts[4] += 1;
        i += 1;
    }
    if counts[4] >= max_count {
        return None;
    }
    Some((counts, i))
}

/// Pick the best-scoring right-angle triple and assign roles
pub fn select_triple(patterns: &[FinderPattern]) -> Result<FinderTriple, DetectionError> {
    let found = patterns.len();
    let confirmed: Vec<&FinderPattern> = patterns.iter().filter(|p| p.count >= 2).collect();
    let pool: Vec<&FinderPattern> = if confirmed.len() >= 3 {
        confirmed
    } else {
        patterns.iter().collect()
    };

    let mut best: Option<(f32, [&FinderPattern; 3])> = None;
    for i in 0..pool.len() {
        for j in i + 1..pool.len() {
            for k in j + 1..pool.len() {
                let triple = [pool[i], pool[j], pool[k]];
                if let Some(score) = triple_score(&triple) {
                    if best.is_none_or(|(s, _)| score < s) {
                        best = Some((score, triple));
                    }
                }
            }
        }
    }

    let (score, [a, b, c]) = best.ok_or(DetectionError::FinderPatterns { found })?;
    let triple = order_finder_patterns(a, b, c);
    debug!(
        "finder triple tl={:?} tr={:?} bl={:?} (score {score:.3})",
        triple.top_left.center, triple.top_right.center, triple.bottom_left.center
    );
    Ok(triple)
}

/// |cos| of the angle at `p` between `a` and `b`
fn corner_cos(p: &Point, a: &Point, b: &Point) -> f32 {
    let (v1x, v1y) = (a.x - p.x, a.y - p.y);
    let (v2x, v2y) = (b.x - p.x, b.y - p.y);
    let denom = (v1x * v1x + v1y * v1y).sqrt() * (v2x * v2x + v2y * v2y).sqrt();
    if denom == 0.0 {
        return f32::INFINITY;
    }
    ((v1x * v2x + v1y * v2y) / denom).abs()
}

/// Index of the vertex nearest a right angle, with its |cos|
fn right_angle_vertex(triple: &[&FinderPattern; 3]) -> (usize, f32) {
    (0..3)
        .map(|i| {
            let p = &triple[i].center;
            let a = &triple[(i + 1) % 3].center;
            let b = &triple[(i + 2) % 3].center;
            (i, corner_cos(p, a, b))
        })
        .fold((0, f32::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

/// Lower is better; `None` when the triple cannot be a symbol
fn triple_score(triple: &[&FinderPattern; 3]) -> Option<f32> {
    let sizes = triple.map(|p| p.module_size);
    let min_size = sizes.iter().copied().fold(f32::INFINITY, f32::min);
    let max_size = sizes.iter().copied().fold(0.0f32, f32::max);
    if min_size <= 0.0 || max_size / min_size > MAX_SIZE_RATIO {
        return None;
    }
    let avg_module = sizes.iter().sum::<f32>() / 3.0;

    let d01 = triple[0].center.distance(&triple[1].center);
    let d02 = triple[0].center.distance(&triple[2].center);
    let d12 = triple[1].center.distance(&triple[2].center);
    if d01.min(d02).min(d12) < avg_module * 3.0 {
        return None;
    }

    let (vertex, cos) = right_angle_vertex(triple);
    if cos > MAX_CORNER_COS {
        return None;
    }
    let p = &triple[vertex].center;
    let leg1 = p.distance(&triple[(vertex + 1) % 3].center);
    let leg2 = p.distance(&triple[(vertex + 2) % 3].center);

    let counts = triple.map(|p| p.count);
    let max_count = counts.iter().copied().max().unwrap_or(1) as f32;
    let min_count = counts.iter().copied().min().unwrap_or(1) as f32;

    let size_spread = max_size / min_size - 1.0;
    let count_imbalance = (max_count - min_count) / max_count;
    let leg_imbalance = (leg1 - leg2).abs() / leg1.max(leg2);
    Some(size_spread + count_imbalance + leg_imbalance + cos)
}

/// Top-left is the right-angle vertex; the cross product sign separates the others
fn order_finder_patterns(a: &FinderPattern, b: &FinderPattern, c: &FinderPattern) -> FinderTriple {
    let patterns = [a, b, c];
    let (best_idx, _) = right_angle_vertex(&patterns);

    let tl = patterns[best_idx];
    let p1 = patterns[(best_idx + 1) % 3];
    let p2 = patterns[(best_idx + 2) % 3];

    let (tr, bl) = if tl.center.cross(&p1.center, &p2.center) > 0.0 {
        (p1, p2)
    } else {
        (p2, p1)
    };
    FinderTriple {
        top_left: *tl,
        top_right: *tr,
        bottom_left: *bl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Draw a finder pattern whose top-left corner is at (x, y)
    fn draw_finder(matrix: &mut BitMatrix, x: usize, y: usize, unit: usize) {
        matrix.set_region(x, y, 7 * unit, 7 * unit, true);
        matrix.set_region(x + unit, y + unit, 5 * unit, 5 * unit, false);
        matrix.set_region(x + 2 * unit, y + 2 * unit, 3 * unit, 3 * unit, true);
    }

    fn bounds_of(matrix: &BitMatrix) -> BoundingBox {
        BoundingBox {
            left: 0,
            top: 0,
            right: matrix.width() - 1,
            bottom: matrix.height() - 1,
        }
    }

    #[test]
    fn test_single_pattern_center() {
        let mut matrix = BitMatrix::new(40, 40);
        draw_finder(&mut matrix, 5, 8, 3);

        let patterns = FinderDetector::detect(&matrix, &bounds_of(&matrix));
        assert_eq!(patterns.len(), 1, "{patterns:?}");
        let p = patterns[0];
        assert!((p.center.x - 15.5).abs() < 0.01, "{p:?}");
        assert!((p.center.y - 18.5).abs() < 0.01, "{p:?}");
        assert!((p.module_size - 3.0).abs() < 0.01);
        // Every row through the 3x3 core hits
        assert_eq!(p.count, 9);
    }

    #[test]
    fn test_pattern_touching_image_edge() {
        let mut matrix = BitMatrix::new(21, 21);
        draw_finder(&mut matrix, 0, 0, 1);
        draw_finder(&mut matrix, 14, 0, 1);
        draw_finder(&mut matrix, 0, 14, 1);

        let patterns = FinderDetector::detect(&matrix, &bounds_of(&matrix));
        assert_eq!(patterns.len(), 3, "{patterns:?}");
        let triple = select_triple(&patterns).unwrap();
        assert_eq!(triple.top_left.center, Point::new(3.5, 3.5));
        assert_eq!(triple.top_right.center, Point::new(17.5, 3.5));
        assert_eq!(triple.bottom_left.center, Point::new(3.5, 17.5));
        assert_eq!(triple.top_left.module_size, 1.0);
    }

    #[test]
    fn test_found_pattern_cross() {
        assert!(found_pattern_cross(&[3, 3, 9, 3, 3]));
        assert!(found_pattern_cross(&[1, 1, 3, 1, 1]));
        // Centre within 1.5 modules of 3x still counts
        assert!(found_pattern_cross(&[3, 3, 5, 3, 3]));
        // Equal runs: centre too narrow
        assert!(!found_pattern_cross(&[3, 3, 3, 3, 3]));
        // Outer run off by more than half a module
        assert!(!found_pattern_cross(&[1, 3, 9, 3, 3]));
        assert!(!found_pattern_cross(&[0, 2, 9, 3, 3]));
    }

    #[test]
    fn test_orientation_after_rotation() {
        // Symbol rotated 90 degrees clockwise: TL lands top-right
        let tl = FinderPattern::new(100.0, 10.0, 4.0);
        let tr = FinderPattern::new(100.0, 100.0, 4.0);
        let bl = FinderPattern::new(10.0, 10.0, 4.0);
        let triple = order_finder_patterns(&bl, &tl, &tr);
        assert_eq!(triple.top_left, tl);
        assert_eq!(triple.top_right, tr);
        assert_eq!(triple.bottom_left, bl);
    }

    #[test]
    fn test_select_rejects_bad_geometry() {
        let collinear = [
            FinderPattern::new(0.0, 0.0, 2.0),
            FinderPattern::new(50.0, 0.0, 2.0),
            FinderPattern::new(100.0, 0.0, 2.0),
        ];
        assert_eq!(
            select_triple(&collinear),
            Err(DetectionError::FinderPatterns { found: 3 })
        );
        assert_eq!(
            select_triple(&collinear[..2]),
            Err(DetectionError::FinderPatterns { found: 2 })
        );
    }

    #[test]
    fn test_select_prefers_confirmed_patterns() {
        let mut patterns = vec![
            FinderPattern::new(30.0, 30.0, 3.0),
            FinderPattern::new(130.0, 30.0, 3.0),
            FinderPattern::new(30.0, 130.0, 3.0),
        ];
        for p in &mut patterns {
            p.count = 9;
        }
        // A lone hit that would also form a right angle
        patterns.push(FinderPattern::new(130.0, 130.0, 3.0));
        let triple = select_triple(&patterns).unwrap();
        assert_eq!(triple.top_left.center, Point::new(30.0, 30.0));
        assert_eq!(triple.top_right.center, Point::new(130.0, 30.0));
    }
}
