//! Point location and barycentric interpolation on a planar triangle mesh.
//!
//! [`TriangleLocator`] indexes the reprojected mesh once; [`MeshInterpolator`]
//! evaluates node values at query points in parallel, preserving order.

mod barycentric;
mod interpolator;
mod locator;

pub use barycentric::{barycentric, is_inside, signed_area2};
pub use interpolator::{
    DEFAULT_EPSILON, DEFAULT_MAX_RETRIES, DEFAULT_PROJECTED_EPSILON, InterpolationError,
    InterpolationResult, MeshInterpolator, PointOutsideMeshError,
};
pub use locator::{DEFAULT_INSIDE_TOL, Location, TriangleLocator};
