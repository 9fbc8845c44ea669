//! End-to-end conversion: simulation output in, structured grids out.
//!
//! [`Converter`] wires the geometry source, node value aggregation and
//! cache, CRS reprojection, grid sampling and the grid writer together.
//! [`ConversionConfig`] holds the run parameters.

mod config;
mod report;
mod runner;

pub use config::{BATHYMETRY_VARIABLE, ConversionConfig, DEFAULT_VARIABLES, VERTICAL_VARIABLE};
pub use report::{ConversionError, ConversionReport, SliceUnresolved, Stage};
pub use runner::Converter;
