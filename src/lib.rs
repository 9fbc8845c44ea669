//! # seisgrid
//!
//! Resample cell-centred fields on triangulated surface meshes onto
//! regular, reprojected raster grids.
//!
//! The conversion runs in stages:
//! - Geometry loading (in-memory arrays or SeisSol XDMF surface output)
//! - Face-to-node aggregation (area-weighted, cached per field and time step)
//! - CRS reprojection (geographic, UTM / transverse Mercator, Mercator)
//! - Point location (R-tree) and barycentric interpolation
//! - Grid output (in memory or NetCDF with the `netcdf` feature)
//!
//! # Example
//!
//! ```
//! use seisgrid::io::{MemoryGridWriter, MemorySource};
//! use seisgrid::pipeline::{ConversionConfig, Converter};
//!
//! let source = MemorySource::new(
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
//!     vec![[0, 1, 2], [1, 3, 2]],
//! )
//! .with_field("u3", vec![vec![0.0, 2.0]]);
//!
//! let config = ConversionConfig::from_definitions("EPSG:4326", "EPSG:4326")
//!     .unwrap()
//!     .only_vertical()
//!     .with_edge_step(0.5)
//!     .with_resolution(0.5, 0.5);
//!
//! let mut writer = MemoryGridWriter::new();
//! let report = Converter::new(config).run(&source, &mut writer).unwrap();
//! assert_eq!(report.slices_written, 1);
//!
//! let grid = writer.slice("u3", Some(0)).unwrap();
//! assert_eq!(grid.shape(), (2, 2));
//! ```

pub mod crs;
pub mod grid;
pub mod interp;
pub mod io;
pub mod mesh;
pub mod pipeline;
pub mod types;

pub use crs::{Crs, CrsTransform, ProjectionError};
pub use grid::{GridError, GridSampler, PointSpec, StructuredGrid};
pub use interp::{MeshInterpolator, PointOutsideMeshError, TriangleLocator};
pub use io::{GeometrySource, GridWriter, NodeValueCache};
pub use mesh::{NodeAggregator, TriMesh};
pub use pipeline::{ConversionConfig, ConversionError, ConversionReport, Converter};
pub use types::{Bounds2D, FaceIndex, VertexIndex};
