//! Sampling a mesh field on a structured grid.
//!
//! Grid points are generated column by column (x outer, y inner), run
//! through the interpolator, and transposed into the row-major layout of
//! [`StructuredGrid`]: the flat result at `col * ny + row` lands at
//! `row * nx + col`.

use tracing::{debug, warn};

use super::GridError;
use super::axes::{RasterAxes, arange, ascending, subset_to_rectangle};
use super::structured::StructuredGrid;
use crate::interp::MeshInterpolator;
use crate::types::Bounds2D;

/// How grid coordinates are chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum PointSpec {
    /// Caller-supplied axes, subset to the window
    Explicit { x: Vec<f64>, y: Vec<f64> },
    /// Axes of an existing raster, subset to the window
    Raster(RasterAxes),
    /// Regular spacing over the window
    Resolution { dx: f64, dy: f64 },
}

impl PointSpec {
    /// Concrete `(x, y)` axes inside `bounds`.
    pub fn axes(&self, bounds: &Bounds2D) -> Result<(Vec<f64>, Vec<f64>), GridError> {
        let (x, y) = match self {
            PointSpec::Explicit { x, y } => {
                let x = ascending("x", x.clone())?;
                let y = ascending("y", y.clone())?;
                subset_to_rectangle(&x, &y, bounds)
            }
            PointSpec::Raster(axes) => subset_to_rectangle(axes.x(), axes.y(), bounds),
            PointSpec::Resolution { dx, dy } => {
                let (dx, dy) = (*dx, *dy);
                if !(dx > 0.0) || !(dy > 0.0) || !dx.is_finite() || !dy.is_finite() {
                    return Err(GridError::InvalidResolution { dx, dy });
                }
                let x = arange(bounds.x_min, bounds.x_max, dx);
                let y = arange(bounds.y_min, bounds.y_max, dy);
                x.zip(y).ok_or(GridError::TooFine { dx, dy })?
            }
        };

        if x.is_empty() || y.is_empty() {
            return Err(GridError::EmptyGrid {
                nx: x.len(),
                ny: y.len(),
            });
        }
        Ok((x, y))
    }
}

/// Candidate point sources; the first one present wins.
///
/// Precedence: explicit axes, then raster axes, then resolution.
#[derive(Clone, Debug, Default)]
pub struct PointSources {
    pub explicit: Option<(Vec<f64>, Vec<f64>)>,
    pub raster: Option<RasterAxes>,
    pub resolution: Option<(f64, f64)>,
}

impl PointSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_explicit(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.explicit = Some((x, y));
        self
    }

    pub fn with_raster(mut self, axes: RasterAxes) -> Self {
        self.raster = Some(axes);
        self
    }

    pub fn with_resolution(mut self, dx: f64, dy: f64) -> Self {
        self.resolution = Some((dx, dy));
        self
    }

    /// Select the point specification to use.
    pub fn resolve(&self) -> Result<PointSpec, GridError> {
        if let Some((x, y)) = &self.explicit {
            return Ok(PointSpec::Explicit {
                x: x.clone(),
                y: y.clone(),
            });
        }
        if let Some(axes) = &self.raster {
            return Ok(PointSpec::Raster(axes.clone()));
        }
        if let Some((dx, dy)) = self.resolution {
            return Ok(PointSpec::Resolution { dx, dy });
        }
        Err(GridError::NoPointSource)
    }
}

/// A grid cell whose point could not be located in the mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnresolvedPoint {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
}

/// Sampling output: the grid (NaN where unresolved) and the failed points.
#[derive(Clone, Debug)]
pub struct SampledGrid {
    pub grid: StructuredGrid,
    pub unresolved: Vec<UnresolvedPoint>,
}

/// Fixed grid of query points.
#[derive(Clone, Debug)]
pub struct GridSampler {
    x: Vec<f64>,
    y: Vec<f64>,
    points: Vec<(f64, f64)>,
}

impl GridSampler {
    /// Create a sampler for ascending, non-empty axes.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, GridError> {
        if x.is_empty() || y.is_empty() {
            return Err(GridError::EmptyGrid {
                nx: x.len(),
                ny: y.len(),
            });
        }
        let x = ascending("x", x)?;
        let y = ascending("y", y)?;

        let points = x
            .iter()
            .flat_map(|&xi| y.iter().map(move |&yj| (xi, yj)))
            .collect();

        Ok(Self { x, y, points })
    }

    /// Create a sampler from a point specification and window.
    pub fn from_spec(spec: &PointSpec, bounds: &Bounds2D) -> Result<Self, GridError> {
        let (x, y) = spec.axes(bounds)?;
        debug!(nx = x.len(), ny = y.len(), "grid axes");
        Self::new(x, y)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Query points in generation order (x outer, y inner).
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Interpolate node `values` at every grid point.
    pub fn sample(
        &self,
        interp: &MeshInterpolator,
        values: &[f64],
    ) -> Result<SampledGrid, GridError> {
        let flat = interp.interpolate(&self.points, values)?;

        let nx = self.x.len();
        let ny = self.y.len();
        let mut grid_values = vec![f64::NAN; nx * ny];
        let mut unresolved = Vec::new();

        for col in 0..nx {
            for row in 0..ny {
                match flat[col * ny + row] {
                    Ok(v) => grid_values[row * nx + col] = v,
                    Err(_) => unresolved.push(UnresolvedPoint {
                        row,
                        col,
                        x: self.x[col],
                        y: self.y[row],
                    }),
                }
            }
        }

        if !unresolved.is_empty() {
            warn!(
                unresolved = unresolved.len(),
                total = nx * ny,
                "grid points outside the mesh"
            );
        }

        let grid = StructuredGrid::new(self.x.clone(), self.y.clone(), grid_values)?;
        Ok(SampledGrid { grid, unresolved })
    }
}
