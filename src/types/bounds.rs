//! Axis-aligned rectangle bounds.

use std::fmt;

/// 2D axis-aligned rectangle.
///
/// Used both for the planar extent of a mesh (source CRS units) and for the
/// grid window in the target CRS. The south-west corner is
/// `(x_min, y_min)`, the north-east corner is `(x_max, y_max)`.
///
/// # Example
///
/// ```
/// use seisgrid::types::Bounds2D;
///
/// let bounds = Bounds2D::from_corners((25.0, 36.0), (27.5, 38.0));
///
/// assert_eq!(bounds.sw(), (25.0, 36.0));
/// assert_eq!(bounds.ne(), (27.5, 38.0));
/// assert_eq!(bounds.width(), 2.5);
/// assert!(bounds.contains(26.0, 37.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2D {
    /// Minimum x-coordinate (western edge)
    pub x_min: f64,
    /// Maximum x-coordinate (eastern edge)
    pub x_max: f64,
    /// Minimum y-coordinate (southern edge)
    pub y_min: f64,
    /// Maximum y-coordinate (northern edge)
    pub y_max: f64,
}

impl Bounds2D {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if `x_max < x_min` or `y_max < y_min`. Degenerate (zero width
    /// or height) rectangles are allowed.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        assert!(
            x_max >= x_min,
            "x_max ({}) must not be less than x_min ({})",
            x_max,
            x_min
        );
        assert!(
            y_max >= y_min,
            "y_max ({}) must not be less than y_min ({})",
            y_max,
            y_min
        );

        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Create bounds from south-west and north-east corners.
    pub fn from_corners(sw: (f64, f64), ne: (f64, f64)) -> Self {
        Self::new(sw.0, ne.0, sw.1, ne.1)
    }

    /// Smallest rectangle enclosing all points, or `None` for an empty set.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let mut b = Self {
            x_min: x0,
            x_max: x0,
            y_min: y0,
            y_max: y0,
        };
        for (x, y) in iter {
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }
        Some(b)
    }

    /// South-west (lower-left) corner.
    #[inline]
    pub fn sw(&self) -> (f64, f64) {
        (self.x_min, self.y_min)
    }

    /// North-east (upper-right) corner.
    #[inline]
    pub fn ne(&self) -> (f64, f64) {
        (self.x_max, self.y_max)
    }

    /// Width (x_max - x_min).
    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height (y_max - y_min).
    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Check if a point is inside (inclusive).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Check if `other` lies entirely within `self` (inclusive).
    pub fn contains_bounds(&self, other: &Bounds2D) -> bool {
        self.contains(other.x_min, other.y_min) && self.contains(other.x_max, other.y_max)
    }
}

impl fmt::Display for Bounds2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}] × [{:.6}, {:.6}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let b = Bounds2D::new(0.0, 100.0, 0.0, 50.0);
        assert_eq!(b.x_min, 0.0);
        assert_eq!(b.x_max, 100.0);
        assert_eq!(b.y_min, 0.0);
        assert_eq!(b.y_max, 50.0);
        assert_eq!(b.center(), (50.0, 25.0));
    }

    #[test]
    fn test_contains() {
        let b = Bounds2D::new(0.0, 100.0, 0.0, 50.0);
        assert!(b.contains(50.0, 25.0));
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(100.0, 50.0));
        assert!(!b.contains(-1.0, 25.0));
        assert!(!b.contains(50.0, 51.0));

        let inner = Bounds2D::new(10.0, 20.0, 10.0, 20.0);
        assert!(b.contains_bounds(&inner));
        assert!(!inner.contains_bounds(&b));
    }

    #[test]
    fn test_enclosing() {
        let b = Bounds2D::enclosing([(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0)]).unwrap();
        assert_eq!(b.sw(), (-2.0, -1.0));
        assert_eq!(b.ne(), (4.0, 5.0));
        assert!(Bounds2D::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    #[should_panic(expected = "x_max")]
    fn test_invalid_x() {
        Bounds2D::new(100.0, 0.0, 0.0, 50.0);
    }

    #[test]
    #[should_panic(expected = "y_max")]
    fn test_invalid_y() {
        Bounds2D::new(0.0, 100.0, 50.0, 0.0);
    }
}
