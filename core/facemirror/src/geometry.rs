use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates (x to the right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate (pixels).
    pub x: f64,
    /// Vertical coordinate (pixels).
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Rotate `point` about `pivot` by `angle_degrees`.
///
/// Uses the standard rotation matrix `[cos -sin; sin cos]`. With the y axis
/// pointing down this turns positive angles clockwise on screen, which is the
/// same direction a 2D canvas `rotate()` call uses. Pixel rotation in the
/// compositor uses the same matrix, so rotated landmarks stay on their pixels.
pub fn rotate_point(point: Point, pivot: Point, angle_degrees: f64) -> Point {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let d = point - pivot;
    Point::new(
        d.x * cos - d.y * sin + pivot.x,
        d.x * sin + d.y * cos + pivot.y,
    )
}

/// Midpoint of the segment `a`–`b`.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
