//! Grid-fit detection for axis-aligned captures.
//!
//! Instead of locating finder patterns, every candidate version's module grid
//! is laid over the bounding box and the sampled function patterns are graded
//! 0..4. The first version graded 4 wins; otherwise the best grade does.

use log::{debug, trace};

use super::threshold::{BoundingBox, PixelSource};
use crate::decoder::config::DecoderConfig;
use crate::decoder::format::FormatInformation;
use crate::decoder::function_mask::alignment_pattern_centers;
use crate::decoder::version::VersionInfo;
use crate::error::DetectionError;
use crate::models::{BitMatrix, Version};

/// Checks per finder pattern: 24 outer ring, 16 inner ring, 9 core, 15 quiet
const FINDER_CHECKS: usize = 64;
/// Any finder below this many correct checks rules the version out
const FINDER_FLOOR: usize = 32;
/// Sliding window of timing checks that must hold 3 correct
const TIMING_WINDOW: usize = 5;
/// Distances above the match tolerance grade as this
const NO_MATCH_DISTANCE: u32 = 4;

/// Best-fitting version and its sampled matrix
#[derive(Debug, Clone, PartialEq)]
pub struct GridMatch {
    /// Fitted version
    pub version: Version,
    /// Lowest component grade, 1..=4
    pub grade: u8,
    /// Module pitch in pixels
    pub module_size: f32,
    /// Sampled symbol
    pub matrix: BitMatrix,
}

/// Version-by-version grid fitting against a bounding box
pub struct GridFit;

impl GridFit {
    /// Grade versions 1..=`max_version` and keep the best fit
    pub fn detect(
        source: &impl PixelSource,
        bounds: &BoundingBox,
        config: &DecoderConfig,
    ) -> Result<GridMatch, DetectionError> {
        let mut best: Option<GridMatch> = None;
        for version in Version::all().take(config.max_version as usize) {
            let module_size = bounds.size() / version.dimension() as f32;
            let matrix = sample_version(source, bounds, version, module_size);
            let grade = grade_version(&matrix, version);
            trace!("grid fit: version {version} grade {grade}");
            if grade > best.as_ref().map_or(0, |b| b.grade) {
                best = Some(GridMatch {
                    version,
                    grade,
                    module_size,
                    matrix,
                });
            }
            if grade == 4 {
                break;
            }
        }
        match best {
            Some(found) => {
                debug!(
                    "grid fit: version {} grade {} at {:.2} px/module",
                    found.version, found.grade, found.module_size
                );
                Ok(found)
            }
            None => Err(DetectionError::GridFit { best_grade: 0 }),
        }
    }
}

/// Sample the box anchored at each module's top-left pixel
fn sample_version(
    source: &impl PixelSource,
    bounds: &BoundingBox,
    version: Version,
    module_size: f32,
) -> BitMatrix {
    let n = version.dimension();
    let box_size = (module_size.round() as usize).max(1);
    let mut matrix = BitMatrix::new(n, n);
    for y in 0..n {
        let py = (bounds.top as f32 + y as f32 * module_size).round() as usize;
        if py >= source.height() {
            break;
        }
        for x in 0..n {
            let px = (bounds.left as f32 + x as f32 * module_size).round() as usize;
            if px >= source.width() {
                break;
            }
            matrix.set(x, y, source.is_dark(px, py, box_size));
        }
    }
    matrix
}

fn dark(matrix: &BitMatrix, x: isize, y: isize) -> bool {
    x >= 0 && y >= 0 && matrix.get(x as usize, y as usize)
}

/// Minimum of the component grades; 0 as soon as any component is 0
pub fn grade_version(matrix: &BitMatrix, version: Version) -> u8 {
    let n = matrix.dimension() as isize;
    let corners = [(0, 0, 7, 7), (0, n - 7, 7, -1), (n - 7, 0, -1, 7)];
    let mut finder_total = 0;
    for (x, y, quiet_x, quiet_y) in corners {
        let score = finder_score(matrix, x, y, quiet_x, quiet_y);
        if score < FINDER_FLOOR {
            return 0;
        }
        finder_total += score;
    }

    let mut grades = vec![grade_finders(finder_total)];
    if version.number() >= 7 {
        grades.push(grade_version_info(matrix, version));
    }
    let checks = matrix.dimension() - 16;
    let timing = timing_score(matrix, true) + timing_score(matrix, false);
    grades.push(grade_timing(1.0 - timing as f32 / (2 * checks) as f32));
    grades.push(grade_alignment(matrix, version));
    grades.push(grade_format(matrix));

    grades.into_iter().min().unwrap_or(0)
}

/// Correct checks for the finder whose top-left module is (x, y)
fn finder_score(matrix: &BitMatrix, x: isize, y: isize, quiet_x: isize, quiet_y: isize) -> usize {
    let mut n = 0;
    let mut check = |cx: isize, cy: isize, want_dark: bool| {
        if dark(matrix, cx, cy) == want_dark {
            n += 1;
        }
    };
    for i in 0..=5 {
        check(x + i, y, true);
        check(x + 6, y + i, true);
        check(x + 6 - i, y + 6, true);
        check(x, y + 6 - i, true);
    }
    for i in 0..=3 {
        check(x + i + 1, y + 1, false);
        check(x + 5, y + i + 1, false);
        check(x + 5 - i, y + 5, false);
        check(x + 1, y + 5 - i, false);
    }
    for j in 2..=4 {
        for i in 2..=4 {
            check(x + i, y + j, true);
        }
    }
    for i in 0..=6 {
        check(x + quiet_x, y + i, false);
        check(x + i, y + quiet_y, false);
    }
    check(x + quiet_x, y + quiet_y, false);
    n
}

fn grade_finders(total: usize) -> u8 {
    match total {
        t if t >= 3 * FINDER_CHECKS => 4,
        t if t >= 3 * 62 => 3,
        t if t >= 3 * 58 => 2,
        t if t >= 3 * 42 => 1,
        _ => 0,
    }
}

/// Two-copy distance grade; 0 when the closer copy names another version
fn grade_version_info(matrix: &BitMatrix, version: Version) -> u8 {
    let (top_right, d1) = VersionInfo::from_bits(VersionInfo::read_top_right(matrix));
    let (bottom_left, d2) = VersionInfo::from_bits(VersionInfo::read_bottom_left(matrix));
    let (d1, d2) = (d1.min(NO_MATCH_DISTANCE), d2.min(NO_MATCH_DISTANCE));
    let named = if d1 < d2 {
        (d1 < NO_MATCH_DISTANCE).then_some(top_right)
    } else {
        (d2 < NO_MATCH_DISTANCE).then_some(bottom_left)
    };
    if named.is_some_and(|v| v != version) {
        trace!("grid fit: version info names {named:?}, not {version}");
        return 0;
    }
    distance_grade(d1, d2)
}

fn grade_format(matrix: &BitMatrix) -> u8 {
    let [(_, d1), (_, d2)] = FormatInformation::match_copies(matrix);
    distance_grade(d1.min(NO_MATCH_DISTANCE), d2.min(NO_MATCH_DISTANCE))
}

fn distance_grade(d1: u32, d2: u32) -> u8 {
    let total = (NO_MATCH_DISTANCE - d1) + (NO_MATCH_DISTANCE - d2);
    (total as f32 / 2.0).round() as u8
}

/// Correct alternating checks along row or column 6 between the finders
///
/// Zero once the last five checks hold fewer than three correct.
fn timing_score(matrix: &BitMatrix, horizontal: bool) -> usize {
    let checks = matrix.dimension() - 16;
    let mut window = [true; TIMING_WINDOW];
    let mut correct = 0;
    for i in 0..checks {
        let (x, y) = if horizontal { (8 + i, 6) } else { (6, 8 + i) };
        let ok = matrix.get(x, y) == (i % 2 == 0);
        if ok {
            correct += 1;
        }
        window[i % TIMING_WINDOW] = ok;
        if window.iter().filter(|&&w| w).count() < 3 {
            return 0;
        }
    }
    correct
}

fn grade_timing(mismatch: f32) -> u8 {
    match mismatch {
        t if t >= 0.14 => 0,
        t if t >= 0.11 => 1,
        t if t >= 0.07 => 2,
        t if t >= 0.00001 => 3,
        _ => 4,
    }
}

/// Fraction of alignment patterns matching in all 25 modules
fn grade_alignment(matrix: &BitMatrix, version: Version) -> u8 {
    let centers = alignment_pattern_centers(version);
    if centers.is_empty() {
        return 4;
    }
    let matched = centers
        .iter()
        .filter(|&&(cx, cy)| {
            (-2isize..=2).all(|dy| {
                (-2isize..=2).all(|dx| {
                    let want_dark = dx.abs().max(dy.abs()) != 1;
                    dark(matrix, cx as isize + dx, cy as isize + dy) == want_dark
                })
            })
        })
        .count();
    let mismatch = 1.0 - matched as f32 / centers.len() as f32;
    match mismatch {
        a if a >= 0.30 => 0,
        a if a >= 0.20 => 1,
        a if a >= 0.10 => 2,
        a if a >= 0.00001 => 3,
        _ => 4,
    }
}
