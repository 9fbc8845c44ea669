//! Structured grids: axes, point specifications and sampling.

mod axes;
mod sampler;
mod structured;

use thiserror::Error;

use crate::interp::InterpolationError;

pub use axes::{
    MAX_AXIS_LEN, RasterAxes, arange, ascending, is_ascending, subset_range, subset_to_rectangle,
};
pub use sampler::{GridSampler, PointSources, PointSpec, SampledGrid, UnresolvedPoint};
pub use structured::StructuredGrid;

/// Error type for grid construction and sampling.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    /// Neither explicit points, raster axes nor a resolution was given.
    #[error("no grid point source: give explicit axes, a raster, or a resolution")]
    NoPointSource,

    #[error("{0} axis is not monotonic")]
    UnsortedAxis(&'static str),

    #[error("grid resolution must be positive, got dx={dx}, dy={dy}")]
    InvalidResolution { dx: f64, dy: f64 },

    /// The resolution would generate more than `MAX_AXIS_LEN` points on an axis.
    #[error("resolution dx={dx}, dy={dy} is too fine for the grid window")]
    TooFine { dx: f64, dy: f64 },

    /// No grid point falls inside the window.
    #[error("grid is empty ({nx} x {ny} points)")]
    EmptyGrid { nx: usize, ny: usize },

    #[error("value array of length {found} does not match a {rows} x {cols} grid")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        found: usize,
    },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}
