//! File I/O for the conversion pipeline.
//!
//! This module provides:
//! - **Geometry sources**: read-only access to surface mesh output
//!   ([`GeometrySource`], [`MemorySource`], SeisSol XDMF via [`XdmfSource`])
//! - **Node value cache**: aggregated per-vertex arrays keyed by variable and
//!   time step ([`NodeValueCache`], in memory or as `.npy` files)
//! - **Raster axes**: sample-point axes taken from an existing GeoTIFF or
//!   NetCDF grid
//! - **Grid writers**: [`GridWriter`] sinks for structured grids, in memory
//!   or as NetCDF (requires `netcdf` feature)
//!
//! # Example
//!
//! ```ignore
//! use seisgrid::io::{GeometrySource, XdmfSource, load_mesh, read_geotiff_axes};
//!
//! let source = XdmfSource::open("output/fault-surface.xdmf")?;
//! let mesh = load_mesh(&source)?;
//! println!("{} faces, {} time steps", mesh.n_faces(), source.n_time_steps());
//!
//! // Sample points from an existing bathymetry raster
//! let axes = read_geotiff_axes("bathy.tif")?;
//! ```

mod cache;
mod geotiff;
#[cfg(feature = "netcdf")]
mod netcdf_io;
mod source;
mod writer;
mod xdmf;

pub use cache::{
    CacheError, CacheKey, MemoryCache, NodeValueCache, NpyDirectoryCache, decode_npy, encode_npy,
};
pub use geotiff::{GeoTransform, RasterAxesError, read_geotiff_axes};
#[cfg(feature = "netcdf")]
pub use netcdf_io::{
    FILL_VALUE_F64, NetCdfError, NetCdfGridWriter, X_NAMES, Y_NAMES, read_netcdf_axes,
};
pub use source::{
    GeometrySource, MemorySource, SourceDataError, load_mesh, read_face_field, vertices_from_rows,
};
pub use writer::{
    DEGREES_EAST, DEGREES_NORTH, GridHeader, GridLayout, GridWriter, METERS, MemoryGridWriter,
    WriteError,
};
pub use xdmf::XdmfSource;
