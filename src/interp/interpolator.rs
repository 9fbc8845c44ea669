//! Barycentric interpolation of node values at arbitrary points.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::locator::{Location, TriangleLocator};
use crate::mesh::TriMesh;

/// Default shift applied to a point that misses the mesh: 1/10800 degree,
/// about 10 m at the equator.
pub const DEFAULT_EPSILON: f64 = 1.0 / 10_800.0;

/// The same shift for projected coordinates, in metres.
pub const DEFAULT_PROJECTED_EPSILON: f64 = 10.0;

/// Default number of shifted retries before a point is reported as outside.
pub const DEFAULT_MAX_RETRIES: usize = 1;

/// A query point that no triangle contains, even after shifting.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("point ({x}, {y}) is outside the mesh after {attempts} attempts")]
pub struct PointOutsideMeshError {
    pub x: f64,
    pub y: f64,
    pub attempts: usize,
}

/// Error type for interpolation requests as a whole.
#[derive(Debug, Error, PartialEq)]
pub enum InterpolationError {
    #[error("expected {expected} node values (one per vertex), got {found}")]
    ValueCountMismatch { expected: usize, found: usize },
}

/// Per-point interpolation results, in query order.
pub type InterpolationResult = Vec<Result<f64, PointOutsideMeshError>>;

/// Interpolates node values of a planar mesh at query points.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use seisgrid::interp::{MeshInterpolator, TriangleLocator};
/// use seisgrid::mesh::TriMesh;
///
/// let mesh = Arc::new(TriMesh::new(
///     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
///     vec![[0, 1, 2]],
/// ).unwrap());
/// let locator = Arc::new(TriangleLocator::new(&mesh));
/// let interp = MeshInterpolator::new(mesh, locator);
///
/// let out = interp.interpolate(&[(0.5, 0.0), (2.0, 2.0)], &[0.0, 10.0, 20.0]).unwrap();
/// assert!((out[0].unwrap() - 5.0).abs() < 1e-12);
/// assert!(out[1].is_err());
/// ```
#[derive(Clone, Debug)]
pub struct MeshInterpolator {
    mesh: Arc<TriMesh>,
    locator: Arc<TriangleLocator>,
    epsilon: f64,
    max_retries: usize,
}

impl MeshInterpolator {
    /// Create an interpolator with the default epsilon and retry count.
    pub fn new(mesh: Arc<TriMesh>, locator: Arc<TriangleLocator>) -> Self {
        Self {
            mesh,
            locator,
            epsilon: DEFAULT_EPSILON,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the shift applied to points that miss the mesh.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set how many shifted retries are made before giving up.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The mesh being interpolated on.
    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    /// The spatial index.
    pub fn locator(&self) -> &TriangleLocator {
        &self.locator
    }

    /// Locate a point, shifting it by `+epsilon` in x and y after each miss.
    ///
    /// The shift accumulates: retry `k` queries `(x + k·ε, y + k·ε)`.
    pub fn locate(&self, x: f64, y: f64) -> Result<Location, PointOutsideMeshError> {
        let attempts = self.max_retries + 1;
        for k in 0..attempts {
            let shift = k as f64 * self.epsilon;
            if let Some(loc) = self.locator.locate_with_weights(x + shift, y + shift) {
                return Ok(loc);
            }
        }
        Err(PointOutsideMeshError { x, y, attempts })
    }

    /// Interpolated value at one point.
    #[inline]
    fn value_at(&self, x: f64, y: f64, values: &[f64]) -> Result<f64, PointOutsideMeshError> {
        let loc = self.locate(x, y)?;
        let [a, b, c] = self.mesh.faces()[loc.face.get()];
        let [wa, wb, wc] = loc.weights;
        Ok(wa * values[a] + wb * values[b] + wc * values[c])
    }

    /// Interpolate `values` (one per vertex) at every point.
    ///
    /// The result has one entry per point in the same order. Points that
    /// miss the mesh are reported individually and do not fail the call.
    pub fn interpolate(
        &self,
        points: &[(f64, f64)],
        values: &[f64],
    ) -> Result<InterpolationResult, InterpolationError> {
        if values.len() != self.mesh.n_vertices() {
            return Err(InterpolationError::ValueCountMismatch {
                expected: self.mesh.n_vertices(),
                found: values.len(),
            });
        }

        #[cfg(feature = "parallel")]
        let results: InterpolationResult = {
            use rayon::prelude::*;
            points
                .par_iter()
                .map(|&(x, y)| self.value_at(x, y, values))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: InterpolationResult = points
            .iter()
            .map(|&(x, y)| self.value_at(x, y, values))
            .collect();

        let misses = results.iter().filter(|r| r.is_err()).count();
        debug!(points = points.len(), misses, "interpolated");

        Ok(results)
    }
}
