//! Coordinate reference systems and reprojection.
//!
//! - [`Crs`]: parsed CRS definition (EPSG code or PROJ-style string); the
//!   `proj` feature hands unsupported definitions to PROJ
//! - [`CrsTransform`]: source → target transform through geographic coordinates
//! - [`reproject_mesh`]: reproject mesh vertices, keeping the connectivity
//! - [`inscribed_rectangle`]: conservative target-CRS window of a source rectangle

mod definition;
mod error;
#[cfg(feature = "proj")]
mod external;
mod projection;
mod transform;

pub use definition::{Crs, CrsKind};
pub use error::ProjectionError;
pub use projection::{Ellipsoid, Mercator, Projection, TransverseMercator};
pub use transform::{CrsTransform, inscribed_rectangle, reproject_mesh};
