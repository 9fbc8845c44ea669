//! Coordinate transforms between two CRSs and mesh reprojection.

use tracing::debug;

use super::definition::Crs;
use super::error::ProjectionError;
use crate::grid::arange;
use crate::mesh::TriMesh;
use crate::types::Bounds2D;

/// Transform from one CRS to another, through geographic coordinates.
///
/// # Example
///
/// ```
/// use seisgrid::crs::{Crs, CrsTransform};
///
/// let utm = Crs::parse("EPSG:32631").unwrap();
/// let t = CrsTransform::new(&utm, &Crs::wgs84());
///
/// let (lon, lat) = t.transform(500_000.0, 0.0).unwrap();
/// assert!((lon - 3.0).abs() < 1e-9);
/// assert!(lat.abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct CrsTransform {
    source: Crs,
    target: Crs,
    identity: bool,
}

impl CrsTransform {
    /// Create a transform from `source` to `target`.
    pub fn new(source: &Crs, target: &Crs) -> Self {
        let identity = source.definition() == target.definition();
        Self {
            source: source.clone(),
            target: target.clone(),
            identity,
        }
    }

    /// Source CRS.
    pub fn source(&self) -> &Crs {
        &self.source
    }

    /// Target CRS.
    pub fn target(&self) -> &Crs {
        &self.target
    }

    /// The transform with source and target swapped.
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            identity: self.identity,
        }
    }

    /// Transform one coordinate.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if self.identity {
            return if x.is_finite() && y.is_finite() {
                Ok((x, y))
            } else {
                Err(ProjectionError::OutOfDomain {
                    x,
                    y,
                    crs: self.source.definition().to_string(),
                })
            };
        }
        let (lon, lat) = self.source.to_geographic(x, y)?;
        self.target.from_geographic(lon, lat)
    }

    /// Transform many coordinates, preserving order.
    ///
    /// Fails with the error of the first failing point in input order.
    pub fn transform_many(&self, points: &[(f64, f64)]) -> Result<Vec<(f64, f64)>, ProjectionError> {
        #[cfg(feature = "parallel")]
        let results: Vec<_> = {
            use rayon::prelude::*;
            points
                .par_iter()
                .map(|&(x, y)| self.transform(x, y))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = points.iter().map(|&(x, y)| self.transform(x, y)).collect();

        results.into_iter().collect()
    }
}

/// Reproject the planar coordinates of a mesh.
///
/// Returns a flattened (z = 0) mesh sharing the input's face array. Any
/// vertex outside the transform's domain aborts the reprojection.
pub fn reproject_mesh(mesh: &TriMesh, transform: &CrsTransform) -> Result<TriMesh, ProjectionError> {
    let xy: Vec<(f64, f64)> = mesh.vertices().iter().map(|v| (v[0], v[1])).collect();
    let projected = transform.transform_many(&xy)?;

    debug!(
        n_vertices = projected.len(),
        source = transform.source().definition(),
        target = transform.target().definition(),
        "reprojected mesh"
    );

    Ok(mesh.with_vertices(projected.into_iter().map(|(x, y)| [x, y, 0.0]).collect()))
}

/// Axis-aligned rectangle in the target CRS lying inside the image of
/// `bounds`.
///
/// Every edge of `bounds` is sampled every `step` source units (both ends
/// included) and transformed. The result keeps the innermost extent on each
/// side: the largest x of the left edge, the smallest x of the right edge,
/// the largest y of the bottom edge and the smallest y of the top edge.
pub fn inscribed_rectangle(
    bounds: &Bounds2D,
    transform: &CrsTransform,
    step: f64,
) -> Result<Bounds2D, ProjectionError> {
    if !(step > 0.0) || !step.is_finite() {
        return Err(ProjectionError::InvalidStep(step));
    }

    let edge = |min: f64, max: f64| -> Result<Vec<f64>, ProjectionError> {
        let mut samples = arange(min, max, step).ok_or(ProjectionError::InvalidStep(step))?;
        samples.push(max);
        Ok(samples)
    };
    let xs = edge(bounds.x_min, bounds.x_max)?;
    let ys = edge(bounds.y_min, bounds.y_max)?;

    let side = |points: Vec<(f64, f64)>| transform.transform_many(&points);

    let left = side(ys.iter().map(|&y| (bounds.x_min, y)).collect())?;
    let right = side(ys.iter().map(|&y| (bounds.x_max, y)).collect())?;
    let bottom = side(xs.iter().map(|&x| (x, bounds.y_min)).collect())?;
    let top = side(xs.iter().map(|&x| (x, bounds.y_max)).collect())?;

    let x_min = left.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let x_max = right.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let y_min = bottom.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let y_max = top.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);

    if !(x_min < x_max) || !(y_min < y_max) {
        return Err(ProjectionError::EmptyFootprint {
            x_min,
            x_max,
            y_min,
            y_max,
        });
    }

    debug!(x_min, x_max, y_min, y_max, "inscribed rectangle");
    Ok(Bounds2D::new(x_min, x_max, y_min, y_max))
}
