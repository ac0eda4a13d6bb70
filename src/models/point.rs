/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Translate point by (dx, dy)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// z component of (b - self) x (c - self); positive when c lies clockwise
    /// of b in image coordinates (y down)
    pub fn cross(&self, b: &Point, c: &Point) -> f32 {
        (b.x - self.x) * (c.y - self.y) - (b.y - self.y) * (c.x - self.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(a.translate(1.0, 2.0), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_cross_sign() {
        let tl = Point::new(0.0, 0.0);
        let tr = Point::new(10.0, 0.0);
        let bl = Point::new(0.0, 10.0);
        assert!(tl.cross(&tr, &bl) > 0.0);
        assert!(tl.cross(&bl, &tr) < 0.0);
    }
}
