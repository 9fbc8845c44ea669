//! Coordinate axes for structured grids.

use super::GridError;
use crate::types::Bounds2D;

/// Longest axis [`arange`] will generate.
pub const MAX_AXIS_LEN: usize = 1 << 24;

/// Values `start, start + step, ...` strictly below `stop`.
///
/// The count is `ceil((stop - start) / step)`; an empty vector is returned
/// when `stop <= start` or `step` is not a positive finite number. Returns
/// `None` instead of allocating when the count exceeds [`MAX_AXIS_LEN`].
///
/// # Example
///
/// ```
/// use seisgrid::grid::arange;
///
/// assert_eq!(arange(0.0, 1.0, 0.25), Some(vec![0.0, 0.25, 0.5, 0.75]));
/// assert_eq!(arange(0.0, 1.1, 0.5), Some(vec![0.0, 0.5, 1.0]));
/// assert_eq!(arange(1.0, 1.0, 0.5), Some(vec![]));
/// assert_eq!(arange(0.0, 1.0, 1e-300), None);
/// ```
pub fn arange(start: f64, stop: f64, step: f64) -> Option<Vec<f64>> {
    if !(step > 0.0) || !step.is_finite() || !(stop > start) {
        return Some(Vec::new());
    }
    let count = ((stop - start) / step).ceil();
    if !(count <= MAX_AXIS_LEN as f64) {
        return None;
    }
    let n = count as usize;
    Some((0..n).map(|i| start + i as f64 * step).collect())
}

/// Whether `axis` is strictly increasing.
pub fn is_ascending(axis: &[f64]) -> bool {
    axis.windows(2).all(|w| w[0] < w[1])
}

/// Return `axis` in ascending order, reversing a strictly decreasing axis.
pub fn ascending(name: &'static str, mut axis: Vec<f64>) -> Result<Vec<f64>, GridError> {
    if is_ascending(&axis) {
        return Ok(axis);
    }
    axis.reverse();
    if is_ascending(&axis) {
        Ok(axis)
    } else {
        Err(GridError::UnsortedAxis(name))
    }
}

/// Index range `lb(min) .. lb(max)` of an ascending axis, where `lb` is the
/// first index whose value is `>= bound`.
pub fn subset_range(axis: &[f64], min: f64, max: f64) -> std::ops::Range<usize> {
    let lo = axis.partition_point(|&v| v < min);
    let hi = axis.partition_point(|&v| v < max).max(lo);
    lo..hi
}

/// Subset ascending `x` and `y` axes to the window `bounds`.
///
/// Binary-search lower bounds on each edge, half-open on the max side.
pub fn subset_to_rectangle(x: &[f64], y: &[f64], bounds: &Bounds2D) -> (Vec<f64>, Vec<f64>) {
    let xr = subset_range(x, bounds.x_min, bounds.x_max);
    let yr = subset_range(y, bounds.y_min, bounds.y_max);
    (x[xr].to_vec(), y[yr].to_vec())
}

/// Coordinate axes extracted from an existing raster.
///
/// Both axes are ascending after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterAxes {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl RasterAxes {
    /// Build from monotonic axes; descending axes are reversed.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, GridError> {
        Ok(Self {
            x: ascending("x", x)?,
            y: ascending("y", y)?,
        })
    }

    /// Pixel-centre axes of a north-up affine raster.
    ///
    /// `origin` is the top-left corner, `pixel_size` the (positive) cell
    /// width and height.
    pub fn from_affine(
        origin: (f64, f64),
        pixel_size: (f64, f64),
        width: usize,
        height: usize,
    ) -> Result<Self, GridError> {
        let (sx, sy) = pixel_size;
        if !(sx > 0.0) || !(sy > 0.0) {
            return Err(GridError::InvalidResolution { dx: sx, dy: sy });
        }
        let x = (0..width)
            .map(|col| origin.0 + (col as f64 + 0.5) * sx)
            .collect();
        // Row 0 is the northernmost row
        let y = (0..height)
            .rev()
            .map(|row| origin.1 - (row as f64 + 0.5) * sy)
            .collect();
        Ok(Self { x, y })
    }

    /// Ascending x axis.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Ascending y axis.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Consume into `(x, y)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }
}
