/// Perspective transform between module space and image space
use crate::models::Point;

/// Perspective transformation matrix (3x3, a33 = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
}

impl PerspectiveTransform {
    /// Create transform from 4 source points to 4 destination points
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform: two equations per correspondence
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for i in 0..4 {
            let (sx, sy) = (src[i].x as f64, src[i].y as f64);
            let (dx, dy) = (dst[i].x as f64, dst[i].y as f64);

            let row = i * 2;
            a[row] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[row] = dx;
            a[row + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[row + 1] = dy;
        }

        solve_linear_system(a, b).map(|s| Self {
            a11: s[0],
            a12: s[1],
            a13: s[2],
            a21: s[3],
            a22: s[4],
            a23: s[5],
            a31: s[6],
            a32: s[7],
        })
    }

    /// Transform a point using this perspective matrix; `None` at the horizon
    pub fn transform(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let denominator = self.a31 * x + self.a32 * y + 1.0;
        if denominator.abs() < 1e-12 {
            return None;
        }
        Some((
            (self.a11 * x + self.a12 * y + self.a13) / denominator,
            (self.a21 * x + self.a22 * y + self.a23) / denominator,
        ))
    }

    /// Transform a `Point`
    pub fn transform_point(&self, p: &Point) -> Option<Point> {
        self.transform(p.x as f64, p.y as f64)
            .map(|(x, y)| Point::new(x as f32, y as f32))
    }
}

/// Solve 8x8 linear system using Gaussian elimination with partial pivoting
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(mut a: [[f64; 8]; 8], mut b: [f64; 8]) -> Option<[f64; 8]> {
    let n = 8;

    // Forward elimination
    for i in 0..n {
        let max_row = (i..n).max_by(|&p, &q| a[p][i].abs().total_cmp(&a[q][i].abs()))?;
        if a[max_row][i].abs() < 1e-12 {
            return None;
        }
        a.swap(i, max_row);
        b.swap(i, max_row);

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    // Back substitution
    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let sum: f64 = b[i] - ((i + 1)..n).map(|j| a[i][j] * x[j]).sum::<f64>();
        x[i] = sum / a[i][i];
    }

    Some(x)
}
