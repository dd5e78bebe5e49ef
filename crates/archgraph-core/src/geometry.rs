//! Geometric primitives for diagram layout.
//!
//! # Coordinate System
//!
//! Archgraph uses the same coordinate system as SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Element positions refer to the element center.

use serde::Serialize;

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use archgraph_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// assert_eq!(Point::new(3.0, 4.0).hypot(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the Euclidean distance from the origin
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Clamps both coordinates into the given inclusive ranges.
    pub fn clamp(self, min: Point, max: Point) -> Self {
        Self {
            x: self.x.max(min.x).min(max.x),
            y: self.y.max(min.y).min(max.y),
        }
    }
}

/// Width and height of a rectangular area
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the smaller of the two dimensions
    pub fn min_dimension(self) -> f32 {
        self.width.min(self.height)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(4.0, -5.0);

        assert_eq!(a.add_point(b), Point::new(14.0, 15.0));
        assert_eq!(a.sub_point(b), Point::new(6.0, 25.0));
        assert_eq!(a.scale(0.5), Point::new(5.0, 10.0));
    }

    #[test]
    fn test_point_hypot() {
        assert!(approx_eq!(f32, Point::new(6.0, 8.0).hypot(), 10.0, ulps = 2));
        assert_eq!(Point::default().hypot(), 0.0);
    }

    #[test]
    fn test_point_clamp() {
        let min = Point::new(50.0, 50.0);
        let max = Point::new(1150.0, 750.0);

        assert_eq!(Point::new(0.0, 900.0).clamp(min, max), Point::new(50.0, 750.0));
        assert_eq!(
            Point::new(300.0, 400.0).clamp(min, max),
            Point::new(300.0, 400.0)
        );
    }

    #[test]
    fn test_size_min_dimension() {
        let size = Size::new(1200.0, 800.0);
        assert_eq!(size.min_dimension(), 800.0);
        assert_eq!(size.width(), 1200.0);
        assert_eq!(size.height(), 800.0);
    }
}
