//! Structured (regular) grid of values.

use super::GridError;
use super::axes::is_ascending;

/// Values on a rectilinear grid.
///
/// `values` is row-major: row `j` holds y = `y[j]`, column `i` holds
/// x = `x[i]`, so `value(j, i)` is the value at `(x[i], y[j])`.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredGrid {
    x: Vec<f64>,
    y: Vec<f64>,
    values: Vec<f64>,
}

impl StructuredGrid {
    /// Create a grid, checking axis order and array shape.
    pub fn new(x: Vec<f64>, y: Vec<f64>, values: Vec<f64>) -> Result<Self, GridError> {
        if !is_ascending(&x) {
            return Err(GridError::UnsortedAxis("x"));
        }
        if !is_ascending(&y) {
            return Err(GridError::UnsortedAxis("y"));
        }
        if values.len() != x.len() * y.len() {
            return Err(GridError::ShapeMismatch {
                rows: y.len(),
                cols: x.len(),
                found: values.len(),
            });
        }
        Ok(Self { x, y, values })
    }

    /// x axis (columns).
    #[inline]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// y axis (rows).
    #[inline]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Row-major values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of rows (y count).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.y.len()
    }

    /// Number of columns (x count).
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.x.len()
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    /// Value at row `row`, column `col`.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.x.len() + col]
    }

    /// One row of values.
    pub fn row(&self, row: usize) -> &[f64] {
        let nx = self.x.len();
        &self.values[row * nx..(row + 1) * nx]
    }

    /// Number of NaN (unresolved) cells.
    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Range of the finite values, or `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Consume into `(x, y, values)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.x, self.y, self.values)
    }
}
